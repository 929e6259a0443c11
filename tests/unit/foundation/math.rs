use super::*;

#[test]
fn half_float_known_values() {
    assert_eq!(f32_to_f16_bits(1.0), 0x3c00);
    assert_eq!(f32_to_f16_bits(0.5), 0x3800);
    assert_eq!(f32_to_f16_bits(-2.0), 0xc000);
    assert_eq!(f32_to_f16_bits(0.0), 0x0000);
    assert_eq!(f32_to_f16_bits(1.0e6), 0x7c00);
}

#[test]
fn half_float_decodes_back() {
    for v in [0.0f32, 0.25, 1.0, -3.5, 1024.0] {
        assert_eq!(f16_bits_to_f32(f32_to_f16_bits(v)), v);
    }
    // Smallest subnormal half.
    assert_eq!(f16_bits_to_f32(0x0001), 2f32.powi(-24));
    assert!(f16_bits_to_f32(0x7c00).is_infinite());
}

#[test]
fn quantize_clamps_and_rounds() {
    assert_eq!(quantize(1.5, 255.0), 255);
    assert_eq!(quantize(-1.0, 255.0), 0);
    assert_eq!(quantize(0.5, 255.0), 128);
}
