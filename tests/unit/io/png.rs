use super::*;
use crate::foundation::core::Size;

fn io_info(pixel_type: PixelType) -> IoInfo {
    IoInfo {
        video: vec![ImageInfo::new(Size::new(4, 2), pixel_type)],
        ..IoInfo::default()
    }
}

#[test]
fn write_info_rejects_float_types() {
    let plugin = PngPlugin::new();
    let opts = IoOptions::new();
    let size = Size::new(8, 8);
    assert!(
        plugin
            .write_info(&ImageInfo::new(size, PixelType::RgbaF32), &opts)
            .is_none()
    );
    let ok = plugin
        .write_info(&ImageInfo::new(size, PixelType::RgbU16), &opts)
        .unwrap();
    assert_eq!(ok.pixel_type, PixelType::RgbU16);
}

#[test]
fn writes_numbered_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = MediaPath::parse(dir.path().join("shot.0001.png"));
    let plugin = PngPlugin::new();
    let mut writer = plugin
        .write(&path, &io_info(PixelType::RgbaU8), &IoOptions::new())
        .unwrap();

    let mut image = Image::new(ImageInfo::new(Size::new(4, 2), PixelType::RgbaU8));
    image.data_mut().fill(200);
    writer
        .write_video(RationalTime::new(12.0, 24.0), &image)
        .unwrap();
    writer
        .write_video(RationalTime::new(13.0, 24.0), &image)
        .unwrap();
    writer.finish().unwrap();

    let first = image::open(dir.path().join("shot.0012.png")).unwrap();
    assert_eq!((first.width(), first.height()), (4, 2));
    assert!(dir.path().join("shot.0013.png").exists());
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = MediaPath::parse(dir.path().join("f.png"));
    let mut writer = PngPlugin::new()
        .write(&path, &io_info(PixelType::LU8), &IoOptions::new())
        .unwrap();

    let image = Image::new(ImageInfo::new(Size::new(4, 2), PixelType::LU8));
    writer.write_video(RationalTime::new(5.0, 24.0), &image).unwrap();
    assert!(writer.write_video(RationalTime::new(5.0, 24.0), &image).is_err());

    let wrong = Image::new(ImageInfo::new(Size::new(2, 2), PixelType::LU8));
    assert!(writer.write_video(RationalTime::new(6.0, 24.0), &wrong).is_err());
}
