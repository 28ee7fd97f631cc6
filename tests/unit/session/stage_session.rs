use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::scene::config::{LayoutDef, ScrollDef, ToggleEvent};
use crate::scene::model::default_items;

fn small_config(duration: u64) -> StageConfig {
    StageConfig {
        canvas: Canvas {
            width: 64,
            height: 160,
        },
        duration,
        items: default_items().into_iter().take(3).collect(),
        layout: LayoutDef {
            stage_top: 8.0,
            stage_height: 80.0,
            card_padding_x: 8.0,
            card_padding_y: 6.0,
            card_corner_radius: 4.0,
            ..LayoutDef::default()
        },
        scroll: ScrollDef {
            frames_per_page: 4,
            hold_frames: 2,
            ..ScrollDef::default()
        },
        ..StageConfig::default()
    }
}

fn opts(parallel: bool, elide: bool) -> StageSessionOpts {
    StageSessionOpts {
        parallel,
        chunk_size: 5,
        threads: parallel.then_some(2),
        static_frame_elision: elide,
        channel_capacity: 2,
        backend: BackendKind::Cpu,
    }
}

fn range(end: u64) -> FrameRange {
    FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(end),
    }
}

/// Sink that fails before accepting any frame.
struct RefusingSink;

impl FrameSink for RefusingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StackResult<()> {
        Err(StackError::encode("sink refused to start"))
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> StackResult<()> {
        Ok(())
    }

    fn end(&mut self) -> StackResult<()> {
        Ok(())
    }
}

#[test]
fn render_frame_rejects_frames_past_the_timeline() {
    let sess = StageSession::new(small_config(4), opts(false, false)).unwrap();
    assert!(sess.render_frame(FrameIndex(3)).is_ok());
    assert!(sess.render_frame(FrameIndex(4)).is_err());
    assert!(sess.probe(FrameIndex(4)).is_err());
}

#[test]
fn render_range_is_ordered_and_counts_every_frame() {
    let sess = StageSession::new(small_config(12), opts(true, false)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = sess.render_range(range(12), &mut sink).unwrap();

    assert_eq!(
        stats,
        RenderStats {
            frames_total: 12,
            frames_rendered: 12,
            frames_elided: 0,
        }
    );
    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 12);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(frame.width, 64);
        assert_eq!(frame.data.len(), 64 * 160 * 4);
    }
    assert_ne!(
        sink.frames()[0].1.data,
        sink.frames()[4].1.data,
        "expected the cards to move"
    );
}

#[test]
fn parallel_matches_sequential_output() {
    let mut seq = InMemorySink::new();
    StageSession::new(small_config(12), opts(false, false))
        .unwrap()
        .render_range(range(12), &mut seq)
        .unwrap();

    let mut par = InMemorySink::new();
    StageSession::new(small_config(12), opts(true, false))
        .unwrap()
        .render_range(range(12), &mut par)
        .unwrap();

    assert_eq!(seq.frames(), par.frames());
}

#[test]
fn static_frames_are_elided_without_changing_pixels() {
    let mut plain = InMemorySink::new();
    StageSession::new(small_config(12), opts(false, false))
        .unwrap()
        .render_range(range(12), &mut plain)
        .unwrap();

    for parallel in [false, true] {
        let mut elided = InMemorySink::new();
        let stats = StageSession::new(small_config(12), opts(parallel, true))
            .unwrap()
            .render_range(range(12), &mut elided)
            .unwrap();
        assert_eq!(stats.frames_total, 12);
        assert_eq!(stats.frames_rendered + stats.frames_elided, 12);
        // the held frames at the start of each leg repeat
        assert!(stats.frames_elided >= 2);
        assert_eq!(plain.frames(), elided.frames());
    }
}

#[test]
fn range_validation() {
    let sess = StageSession::new(small_config(4), opts(false, true)).unwrap();
    let mut sink = InMemorySink::new();
    assert!(sess.render_range(range(0), &mut sink).is_err());
    assert!(sess.render_range(range(5), &mut sink).is_err());

    let zero_threads = StageSessionOpts {
        threads: Some(0),
        ..opts(true, false)
    };
    let sess = StageSession::new(small_config(4), zero_threads).unwrap();
    assert!(sess.render_range(range(4), &mut sink).is_err());
}

#[test]
fn sink_errors_win_over_the_closed_channel() {
    for parallel in [false, true] {
        let sess = StageSession::new(small_config(30), opts(parallel, false)).unwrap();
        let err = sess.render_range(range(30), &mut RefusingSink).unwrap_err();
        assert!(
            err.to_string().contains("sink refused to start"),
            "parallel={parallel}: {err}"
        );
    }
}

#[test]
fn probe_reports_pinned_cards_and_toggles() {
    let mut cfg = small_config(30);
    cfg.toggle_events = vec![ToggleEvent {
        frame: 20,
        toggles: Toggles {
            rotation_enabled: false,
            show_indicators: true,
        },
    }];
    let sess = StageSession::new(cfg, opts(false, true)).unwrap();

    let p = sess.probe(FrameIndex(0)).unwrap();
    assert_eq!(p.scroll_x, 0.0);
    assert_eq!(p.snapped_page, 0);
    let front = p.cards.last().unwrap();
    assert_eq!(front.item, ItemId(0));
    assert_eq!(front.corrections, CardCorrections::IDENTITY);
    assert!(p.cards.iter().all(|c| c.corrections.leading_offset <= 0.0));

    let later = sess.probe(FrameIndex(29)).unwrap();
    assert!((later.time_secs - 29.0 / 30.0).abs() < 1e-12);
    assert!(later.toggles.show_indicators);
    assert!(!later.toggles.rotation_enabled);
    assert_eq!(later.factors.rotation_degrees, 0.0);

    let json = serde_json::to_value(&p).unwrap();
    assert!(json["cards"].as_array().is_some_and(|c| !c.is_empty()));
}
