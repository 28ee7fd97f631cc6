use super::*;

fn layout(pages: usize) -> StageLayout {
    StageLayout::new(
        Canvas {
            width: 300,
            height: 800,
        },
        LayoutDef::default(),
        ContainerWidth::new(300.0).unwrap(),
        pages,
    )
}

#[test]
fn page_frames_follow_scroll_offset() {
    let l = layout(4);
    assert_eq!(l.page_frame(0, 0.0), CardFrame::new(0.0, 300.0));
    assert_eq!(l.page_frame(2, 0.0), CardFrame::new(600.0, 900.0));
    assert_eq!(l.page_frame(1, 150.0), CardFrame::new(150.0, 450.0));
    assert_eq!(l.content_width(), 1200.0);
    assert_eq!(l.max_scroll(), 900.0);
}

#[test]
fn card_is_inset_inside_its_page() {
    let l = layout(1);
    let page = l.page_rect(l.page_frame(0, 0.0));
    assert_eq!(page.y0, 96.0);
    assert_eq!(page.height(), 410.0);

    let card = l.card_shape(page).rect();
    assert_eq!(card.x0, 65.0);
    assert_eq!(card.x1, 235.0);
    assert_eq!(card.y0, 111.0);
    assert_eq!(card.y1, 491.0);
}

#[test]
fn visible_pages_skip_left_and_stop_after_first_capped() {
    let l = layout(8);
    // page 0 fills the viewport; pages 1, 2 are within the cap, page 3 is the first capped page
    assert_eq!(l.visible_pages(0.0, 2.0), vec![0, 1, 2, 3]);
    // page 0 fully gone, page 1 partially gone
    assert_eq!(l.visible_pages(450.0, 2.0), vec![1, 2, 3, 4]);
    assert_eq!(l.visible_pages(0.0, 0.5), vec![0, 1]);
}

#[test]
fn visible_pages_never_exceed_item_count() {
    let l = layout(2);
    assert_eq!(l.visible_pages(0.0, 2.0), vec![0, 1]);
    assert!(layout(0).visible_pages(0.0, 2.0).is_empty());
}

#[test]
fn indicator_tracks_scroll_fraction() {
    let l = layout(4);
    let start = l.indicator(0.0).rect();
    let end = l.indicator(l.max_scroll()).rect();
    assert_eq!(start.x0, 6.0);
    assert!((end.x1 - 294.0).abs() < 1e-9);
    assert!((start.width() - 288.0 / 4.0).abs() < 1e-9);
    // overscroll is clamped
    assert_eq!(l.indicator(-50.0).rect(), start);
}

#[test]
fn switch_knob_side_reflects_state() {
    let l = layout(1);
    let off = l.switch(0, false);
    let on = l.switch(0, true);
    assert!(on.knob_center.x > off.knob_center.x);
    assert_eq!(on.track.rect(), off.track.rect());

    let second = l.switch(1, false);
    assert!(second.row.y0 > off.row.y1);
    assert!(l.panel().rect().contains(second.knob_center));
}
