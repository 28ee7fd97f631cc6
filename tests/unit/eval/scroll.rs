use super::*;

fn w(x: f64) -> ContainerWidth {
    ContainerWidth::new(x).unwrap()
}

fn sweep(pages: usize) -> PagingScroll {
    PagingScroll::new(
        w(300.0),
        pages,
        &ScrollDef {
            frames_per_page: 10,
            hold_frames: 5,
            ease: Ease::Linear,
        },
    )
}

#[test]
fn single_page_never_scrolls() {
    let s = sweep(1);
    assert_eq!(s.cycle_frames(), 0);
    assert_eq!(s.max_offset(), 0.0);
    for f in [0, 7, 1000] {
        assert_eq!(s.offset_at(f), 0.0);
    }
}

#[test]
fn holds_then_moves_forward() {
    let s = sweep(3);
    assert_eq!(s.offset_at(0), 0.0);
    assert_eq!(s.offset_at(4), 0.0);
    assert_eq!(s.offset_at(10), 150.0);
    assert_eq!(s.offset_at(15), 300.0);
    assert_eq!(s.offset_at(30), 600.0);
}

#[test]
fn sweeps_back_and_repeats() {
    let s = sweep(3);
    assert_eq!(s.cycle_frames(), 60);
    // leg 2 starts back from the last page
    assert_eq!(s.offset_at(34), 600.0);
    assert_eq!(s.offset_at(40), 450.0);
    assert_eq!(s.offset_at(45), 300.0);
    assert_eq!(s.offset_at(60), s.offset_at(0));
    assert_eq!(s.offset_at(73), s.offset_at(13));
}

#[test]
fn offsets_stay_within_content() {
    let s = PagingScroll::new(w(390.0), 6, &ScrollDef::default());
    for f in 0..s.cycle_frames() {
        let x = s.offset_at(f);
        assert!((0.0..=s.max_offset() + 1e-9).contains(&x), "frame {f}: {x}");
    }
}

#[test]
fn snap_rounds_without_velocity() {
    assert_eq!(snap_to_page(0.0, 0.0, w(300.0), 4), 0);
    assert_eq!(snap_to_page(140.0, 0.0, w(300.0), 4), 0);
    assert_eq!(snap_to_page(160.0, 0.0, w(300.0), 4), 1);
}

#[test]
fn snap_follows_fling_direction() {
    assert_eq!(snap_to_page(40.0, 500.0, w(300.0), 4), 1);
    assert_eq!(snap_to_page(300.0, 500.0, w(300.0), 4), 2);
    assert_eq!(snap_to_page(280.0, -500.0, w(300.0), 4), 0);
}

#[test]
fn snap_clamps_to_content() {
    assert_eq!(snap_to_page(-200.0, -900.0, w(300.0), 4), 0);
    assert_eq!(snap_to_page(5000.0, 900.0, w(300.0), 4), 3);
    assert_eq!(snap_to_page(10.0, 0.0, w(300.0), 0), 0);
}
