use super::*;
use crate::foundation::core::ImageInfo;
use crate::render::backend::TransferFormat;

#[test]
fn degenerate_or_unavailable_is_resource_allocation() {
    let mut backend = CpuBackend::default();
    let err = backend
        .create_offscreen(Size::new(0, 10), PixelType::RgbaF32)
        .unwrap_err();
    assert!(matches!(err, BakeError::ResourceAllocation(_)));

    let mut off = CpuBackend::new(CpuBackendOpts {
        available: false,
        ..CpuBackendOpts::default()
    });
    let err = off
        .create_offscreen(Size::new(4, 4), PixelType::RgbaF32)
        .unwrap_err();
    assert!(matches!(err, BakeError::ResourceAllocation(_)));
    assert_eq!(off.live_buffers(), 0);
}

#[test]
fn buffers_are_counted_until_dropped() {
    let mut backend = CpuBackend::default();
    let a = backend
        .create_offscreen(Size::new(4, 4), PixelType::RgbaF32)
        .unwrap();
    let b = backend
        .create_offscreen(Size::new(4, 4), PixelType::RgbaU8)
        .unwrap();
    assert_eq!(backend.live_buffers(), 2);
    assert_ne!(a.id(), b.id());
    drop(a);
    assert_eq!(backend.live_buffers(), 1);
    drop(b);
    assert_eq!(backend.live_buffers(), 0);
}

#[test]
fn binding_unbinds_on_drop_and_rejects_rebind() {
    let mut backend = CpuBackend::default();
    let mut buf = backend
        .create_offscreen(Size::new(2, 2), PixelType::RgbaF32)
        .unwrap();
    {
        let binding = OffscreenBinding::bind(&mut buf).unwrap();
        assert!(binding.is_bound());
    }
    assert!(!buf.is_bound());

    std::mem::forget(OffscreenBinding::bind(&mut buf).unwrap());
    assert!(buf.is_bound());
    assert!(OffscreenBinding::bind(&mut buf).is_err());
}

#[test]
fn draw_then_read_back_converts() {
    let mut backend = CpuBackend::default();
    let mut buf = backend
        .create_offscreen(Size::new(2, 1), PixelType::RgbaF32)
        .unwrap();

    let mut frame = Image::new(ImageInfo::new(Size::new(2, 1), PixelType::RgbU8));
    frame.data_mut().copy_from_slice(&[255, 0, 0, 0, 0, 255]);
    {
        let mut binding = OffscreenBinding::bind(&mut buf).unwrap();
        backend
            .draw_video(&mut binding, &frame, &DrawOptions::default())
            .unwrap();
    }

    let mut out = Image::new(ImageInfo::new(Size::new(2, 1), PixelType::RgbaU8));
    backend.read_pixels(&buf, &mut out).unwrap();
    assert_eq!(out.data(), &[255, 0, 0, 255, 0, 0, 255, 255]);
    assert_eq!(backend.stats().draws, 1);
    assert_eq!(backend.stats().reads, 1);
}

#[test]
fn readback_validates_pixel_type_and_size() {
    let mut backend = CpuBackend::default();
    let buf = backend
        .create_offscreen(Size::new(2, 2), PixelType::RgbaF32)
        .unwrap();

    let mut yuv = Image::new(ImageInfo::new(Size::new(2, 2), PixelType::Yuv420PU8));
    assert!(matches!(
        backend.read_pixels(&buf, &mut yuv),
        Err(BakeError::InvalidPixelFormat(_))
    ));
    let mut small = Image::new(ImageInfo::new(Size::new(1, 1), PixelType::RgbaU8));
    assert!(backend.read_pixels(&buf, &mut small).is_err());
    assert_eq!(backend.stats().reads, 0);
}

#[test]
fn transfer_formats() {
    assert_eq!(
        read_pixels_format(PixelType::LaU16),
        Some((TransferFormat::Rg, ComponentType::U16))
    );
    assert_eq!(
        read_pixels_format(PixelType::RgbF16),
        Some((TransferFormat::Rgb, ComponentType::F16))
    );
    assert_eq!(read_pixels_format(PixelType::RgbU10), None);
    assert_eq!(read_pixels_format(PixelType::Yuv444PU8), None);
}
