use std::path::PathBuf;

use stacked_cards::{
    FrameIndex, FrameRange, InMemorySink, PngSequenceSink, StageConfig, StageSession,
    StageSessionOpts, Toggles,
};

fn demo() -> StageConfig {
    StageConfig::from_path(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data")
            .join("demo.json"),
    )
    .unwrap()
}

fn pixel(frame: &stacked_cards::FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn frames_are_deterministic_and_opaque() {
    let sess = StageSession::new(demo(), StageSessionOpts::default()).unwrap();
    let a = sess.render_frame(FrameIndex(7)).unwrap();
    let b = sess.render_frame(FrameIndex(7)).unwrap();
    assert_eq!(a, b);
    assert!(a.premultiplied);
    assert_eq!(a.data.len(), 120 * 260 * 4);
    assert!(a.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn front_card_covers_the_center_of_the_stage() {
    let sess = StageSession::new(demo(), StageSessionOpts::default()).unwrap();
    let frame = sess.render_frame(FrameIndex(0)).unwrap();

    let background = sess.config().background.to_rgba8();
    // top-left corner is plain background
    assert_eq!(pixel(&frame, 0, 0), background);
    // stage center lies inside the red front card
    let center = pixel(&frame, 60, 90);
    assert_ne!(center, background);
    assert!(center[0] > center[2], "expected a red-dominant pixel, got {center:?}");
}

#[test]
fn indicator_switch_changes_the_frame() {
    let mut cfg = demo();
    cfg.toggle_events.clear();
    let off = StageSession::new(cfg.clone(), StageSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(0))
        .unwrap();

    cfg.toggles = Toggles {
        rotation_enabled: true,
        show_indicators: true,
    };
    let on = StageSession::new(cfg, StageSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(0))
        .unwrap();
    assert_ne!(off.data, on.data);
}

#[test]
fn title_and_labels_are_drawn_when_a_font_is_available() {
    let Some((path, _)) = stacked_cards::FontBytes::fallback() else {
        return;
    };
    let mut cfg = demo();
    cfg.font = Some(path);
    let with_title = StageSession::new(cfg.clone(), StageSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(0))
        .unwrap();

    cfg.title.clear();
    let without_title = StageSession::new(cfg, StageSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(0))
        .unwrap();
    assert_ne!(with_title.data, without_title.data);

    // "Stack" rises above the top of the stage (y = 20)
    let background = demo().background.to_rgba8();
    let inked = (0..20)
        .flat_map(|y| (16..60).map(move |x| (x, y)))
        .filter(|&(x, y)| pixel(&with_title, x, y) != background)
        .count();
    assert!(inked > 20, "expected title glyphs, found {inked} inked pixels");
}

#[test]
fn parallel_range_matches_single_frames() {
    let sess = StageSession::new(
        demo(),
        StageSessionOpts {
            parallel: true,
            threads: Some(3),
            chunk_size: 7,
            ..StageSessionOpts::default()
        },
    )
    .unwrap();
    let mut sink = InMemorySink::new();
    let stats = sess
        .render_range(FrameRange::new(FrameIndex(0), FrameIndex(20)).unwrap(), &mut sink)
        .unwrap();

    assert_eq!(stats.frames_total, 20);
    assert_eq!(sink.frames().len(), 20);
    for (idx, frame) in sink.frames() {
        assert_eq!(frame, &sess.render_frame(*idx).unwrap());
    }
}

#[test]
fn png_sequence_sink_writes_numbered_files() {
    let dir = PathBuf::from("target").join("render_smoke_pngs");
    let _ = std::fs::remove_dir_all(&dir);

    let sess = StageSession::new(demo(), StageSessionOpts::default()).unwrap();
    let mut sink = PngSequenceSink::new(&dir);
    sess.render_range(FrameRange::new(FrameIndex(0), FrameIndex(3)).unwrap(), &mut sink)
        .unwrap();

    for i in 0..3 {
        let path = dir.join(format!("frame_{i:06}.png"));
        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 120);
        assert_eq!(img.height(), 260);
    }
    assert_eq!(sink.written().len(), 3);
}

#[test]
#[ignore = "requires ffmpeg on PATH"]
fn ffmpeg_sink_writes_mp4() {
    if !stacked_cards::is_ffmpeg_on_path() {
        return;
    }
    let out = PathBuf::from("target").join("render_smoke").join("demo.mp4");
    let sess = StageSession::new(demo(), StageSessionOpts::default()).unwrap();
    let mut sink = stacked_cards::FfmpegSink::for_stage(&demo(), &out, true).unwrap();
    sess.render_range(sess.full_range(), &mut sink).unwrap();
    assert!(out.exists());
}
