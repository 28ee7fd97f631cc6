use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(2)).unwrap();
    assert!(r.is_empty());
    assert_eq!(r.len_frames(), 0);
}

#[test]
fn leading_range_is_clipped_to_the_timeline() {
    assert_eq!(FrameRange::leading(300, None).len_frames(), 300);
    assert_eq!(FrameRange::leading(300, Some(40)).end, FrameIndex(40));
    assert_eq!(FrameRange::leading(300, Some(900)).end, FrameIndex(300));
    assert!(FrameRange::leading(300, Some(0)).is_empty());
}

#[test]
fn frame_timestamps_follow_the_rational_rate() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert_eq!(FrameIndex(0).seconds(ntsc), 0.0);
    assert!((FrameIndex(30).seconds(ntsc) - 1.001).abs() < 1e-12);
    assert_eq!(FrameIndex(45).seconds(Fps::new(30, 1).unwrap()), 1.5);
}

#[test]
fn canvas_sizes() {
    let phone = Canvas {
        width: 390,
        height: 844,
    };
    assert!(phone.is_even());
    assert_eq!(phone.rgba_len(), 390 * 844 * 4);
    assert_eq!(phone.raster_size().unwrap(), (390, 844));

    let odd = Canvas {
        width: 391,
        height: 844,
    };
    assert!(!odd.is_even());
    let huge = Canvas {
        width: 70_000,
        height: 10,
    };
    assert!(huge.raster_size().is_err());
}

#[test]
fn premultiply_rounds_to_nearest() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}

#[test]
fn premul_lerp_hits_endpoints_and_midpoint() {
    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    assert_eq!(white.lerp(red, 0.0), white);
    assert_eq!(white.lerp(red, 1.0), red);
    assert_eq!(white.lerp(red, 0.5).to_array(), [255, 128, 128, 255]);
    assert_eq!(white.lerp(red, 7.0), red);
}
