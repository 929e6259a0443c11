use super::*;
use crate::foundation::core::{ImageLayout, Size};

#[test]
fn rgba_u8_survives_encode_decode() {
    let size = Size::new(2, 1);
    let mut img = Image::new(ImageInfo::new(size, PixelType::RgbaU8));
    encode_rgba(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0]], &mut img).unwrap();
    assert_eq!(img.data(), &[255, 0, 0, 255, 0, 255, 0, 0]);
    let back = decode_rgba(&img).unwrap();
    assert_eq!(back[1], [0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn luminance_uses_rec709_weights() {
    let mut img = Image::new(ImageInfo::new(Size::new(1, 1), PixelType::LU8));
    encode_rgba(&[[0.0, 1.0, 0.0, 1.0]], &mut img).unwrap();
    assert_eq!(img.data(), &[182]);
}

#[test]
fn big_endian_u16_layout() {
    let mut info = ImageInfo::new(Size::new(1, 1), PixelType::RgbU16);
    info.layout.endian = Endian::Msb;
    let mut img = Image::new(info);
    encode_rgba(&[[1.0, 0.0, 0.0, 1.0]], &mut img).unwrap();
    assert_eq!(img.data(), &[0xff, 0xff, 0, 0, 0, 0]);
    assert_eq!(decode_rgba(&img).unwrap()[0], [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn aligned_rows_keep_padding_untouched() {
    let info = ImageInfo {
        size: Size::new(1, 2),
        pixel_type: PixelType::RgbU8,
        layout: ImageLayout {
            alignment: 4,
            endian: Endian::native(),
        },
    };
    let mut img = Image::new(info);
    assert_eq!(img.data().len(), 8);
    encode_rgba(&[[1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 1.0]], &mut img).unwrap();
    assert_eq!(img.data(), &[255, 255, 255, 0, 0, 0, 0, 0]);
}

#[test]
fn half_float_keeps_values() {
    let mut img = Image::new(ImageInfo::new(Size::new(1, 1), PixelType::RgbaF16));
    encode_rgba(&[[0.5, 0.25, 2.0, 1.0]], &mut img).unwrap();
    assert_eq!(decode_rgba(&img).unwrap()[0], [0.5, 0.25, 2.0, 1.0]);
}

#[test]
fn planar_types_are_rejected() {
    let mut img = Image::new(ImageInfo::new(Size::new(2, 2), PixelType::Yuv420PU8));
    let err = encode_rgba(&[[0.0; 4]; 4], &mut img).unwrap_err();
    assert!(matches!(err, BakeError::InvalidPixelFormat(_)));
    assert!(!is_encodable(PixelType::RgbU10));
}
