use super::*;

#[test]
fn blend_over_opaque_replaces() {
    let mut c = RgbaCanvas::new(Size::new(2, 1));
    c.clear([0.0, 0.0, 1.0, 1.0]);
    c.blend_over(0, 0, [1.0, 0.0, 0.0, 1.0], 1.0);
    assert_eq!(c.pixel(0, 0), Some([1.0, 0.0, 0.0, 1.0]));
    assert_eq!(c.pixel(1, 0), Some([0.0, 0.0, 1.0, 1.0]));
}

#[test]
fn blend_over_half_coverage_mixes() {
    let mut c = RgbaCanvas::new(Size::new(1, 1));
    c.clear([0.0, 0.0, 0.0, 1.0]);
    c.blend_over(0, 0, [1.0, 1.0, 1.0, 1.0], 0.5);
    let p = c.pixel(0, 0).unwrap();
    assert!((p[0] - 0.5).abs() < 1e-6);
    assert_eq!(p[3], 1.0);
}

#[test]
fn stretch_downsamples_nearest() {
    let src: Vec<Rgba> = (0..16).map(|i| [i as f32, 0.0, 0.0, 1.0]).collect();
    let mut c = RgbaCanvas::new(Size::new(2, 2));
    c.draw_stretched(&src, Size::new(4, 4));
    assert_eq!(c.pixel(0, 0).unwrap()[0], 0.0);
    assert_eq!(c.pixel(1, 0).unwrap()[0], 2.0);
    assert_eq!(c.pixel(0, 1).unwrap()[0], 8.0);
}

#[test]
fn read_region_pads_outside() {
    let mut c = RgbaCanvas::new(Size::new(2, 2));
    c.clear([1.0; 4]);
    let r = c.read_region(1, 1, Size::new(2, 2));
    assert_eq!(r.pixel(0, 0), Some([1.0; 4]));
    assert_eq!(r.pixel(1, 1), Some([0.0; 4]));
}

#[test]
fn quantize_to_eight_bit() {
    let mut c = RgbaCanvas::new(Size::new(1, 1));
    c.clear([0.5, 1.2, -0.1, 1.0]);
    c.quantize(255.0);
    let p = c.pixel(0, 0).unwrap();
    assert_eq!(p[0], 128.0 / 255.0);
    assert_eq!(p[1], 1.0);
    assert_eq!(p[2], 0.0);
}
