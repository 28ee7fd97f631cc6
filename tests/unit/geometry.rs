use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn w(x: f64) -> ContainerWidth {
    ContainerWidth::new(x).unwrap()
}

#[test]
fn container_width_rejects_degenerate_values() {
    assert!(ContainerWidth::new(0.0).is_err());
    assert!(ContainerWidth::new(-1.0).is_err());
    assert!(ContainerWidth::new(f64::NAN).is_err());
    assert!(ContainerWidth::new(f64::INFINITY).is_err());
    assert_eq!(w(300.0).get(), 300.0);
}

#[test]
fn progress_is_trailing_ratio_minus_one() {
    let width = w(300.0);
    assert!(approx(progress(CardFrame::new(0.0, 300.0), width, 2.0), 0.0));
    assert!(approx(progress(CardFrame::new(150.0, 450.0), width, 2.0), 0.5));
    assert!(approx(progress(CardFrame::new(-150.0, 150.0), width, 2.0), -0.5));
}

#[test]
fn progress_cap_triggers_past_limit() {
    let width = w(300.0);
    // 1200 / 300 - 1 = 3 > 2
    assert_eq!(progress(CardFrame::new(900.0, 1200.0), width, 2.0), 2.0);
    // exactly at the limit
    assert_eq!(progress(CardFrame::new(600.0, 900.0), width, 2.0), 2.0);
    // custom limit
    assert_eq!(progress(CardFrame::new(600.0, 900.0), width, 1.0), 1.0);
}

#[test]
fn leading_offset_pins_cards_right_of_the_edge() {
    assert_eq!(leading_offset(-0.5), 0.0);
    assert_eq!(leading_offset(-300.0), 0.0);
    assert_eq!(leading_offset(150.0), -150.0);
    assert_eq!(leading_offset(0.0), 0.0);
}

#[test]
fn filling_card_has_identity_corrections() {
    let c = compute_corrections(
        CardFrame::new(0.0, 300.0),
        w(300.0),
        &StackFactors::for_toggles(Toggles::default()),
    );
    assert!(approx(c.progress, 0.0));
    assert!(approx(c.scale, 1.0));
    assert!(approx(c.rotation_degrees, 0.0));
    assert!(approx(c.leading_offset, 0.0));
    assert!(approx(c.excess_offset, 0.0));
    assert!(approx(c.transform(Rect::new(0.0, 0.0, 300.0, 410.0)).determinant(), 1.0));
}

#[test]
fn half_page_scenario_with_rotation() {
    let toggles = Toggles {
        rotation_enabled: true,
        show_indicators: false,
    };
    let c = compute_corrections(
        CardFrame::new(150.0, 450.0),
        w(300.0),
        &StackFactors::for_toggles(toggles),
    );
    assert!(approx(c.progress, 0.5));
    assert!(approx(c.scale, 0.95));
    assert!(approx(c.rotation_degrees, 2.5));
    assert!(approx(c.leading_offset, -150.0));
    assert!(approx(c.excess_offset, 4.0));
}

#[test]
fn half_page_scenario_without_rotation() {
    let toggles = Toggles {
        rotation_enabled: false,
        show_indicators: true,
    };
    let c = compute_corrections(
        CardFrame::new(150.0, 450.0),
        w(300.0),
        &StackFactors::for_toggles(toggles),
    );
    assert!(approx(c.scale, 0.95));
    assert_eq!(c.rotation_degrees, 0.0);
    assert!(approx(c.leading_offset, -150.0));
    assert!(approx(c.excess_offset, 5.0));
}

#[test]
fn factor_blend_clamps_t() {
    let on = StackFactors::for_toggles(Toggles {
        rotation_enabled: true,
        show_indicators: false,
    });
    let off = StackFactors::for_toggles(Toggles {
        rotation_enabled: false,
        show_indicators: false,
    });
    assert_eq!(StackFactors::lerp(on, off, -1.0), on);
    assert_eq!(StackFactors::lerp(on, off, 2.0), off);
    let mid = StackFactors::lerp(on, off, 0.5);
    assert!(approx(mid.rotation_degrees, 2.5));
    assert!(approx(mid.offset, 9.0));
}

#[test]
fn transform_keeps_trailing_anchor_when_only_scaling() {
    let c = CardCorrections {
        scale: 0.8,
        ..CardCorrections::IDENTITY
    };
    let rect = Rect::new(100.0, 0.0, 400.0, 200.0);
    let t = c.transform(rect);
    let anchor = t * Point::new(400.0, 100.0);
    assert!(approx(anchor.x, 400.0));
    assert!(approx(anchor.y, 100.0));
    let leading = t * Point::new(100.0, 100.0);
    assert!(approx(leading.x, 160.0));
}

#[test]
fn transform_applies_translations_last() {
    let c = CardCorrections {
        leading_offset: -150.0,
        excess_offset: 4.0,
        ..CardCorrections::IDENTITY
    };
    let t = c.transform(Rect::new(150.0, 0.0, 450.0, 100.0));
    let p = t * Point::new(150.0, 0.0);
    assert!(approx(p.x, 4.0));
    assert!(approx(p.y, 0.0));
}

#[test]
fn rotation_turns_clockwise_in_y_down_space() {
    let c = CardCorrections {
        rotation_degrees: 90.0,
        ..CardCorrections::IDENTITY
    };
    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let p = c.transform(rect) * Point::new(100.0, 50.0);
    assert!(approx(p.x, 50.0));
    assert!(approx(p.y, 100.0));
}
