use super::*;
use crate::foundation::core::Size;
use crate::io::MemoryPlugin;

fn registry(plugin: MemoryPlugin) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(plugin));
    registry
}

fn movie_registry() -> PluginRegistry {
    registry(MemoryPlugin::new(&[
        (".mov", FileType::Movie),
        (".mp4", FileType::Movie),
        (".mkv", FileType::Movie),
        (".png", FileType::Sequence),
        (".exr", FileType::Sequence),
        (".hdr", FileType::Sequence),
    ]))
}

fn negotiate_for(dest: &Destination, pixel_type: PixelType, annotations: bool) -> Negotiated {
    let requested = ImageInfo::new(Size::new(64, 32), pixel_type);
    negotiate(dest, requested, annotations, PixelType::RgbaF16, &IoOptions::new())
}

#[test]
fn prores_moves_to_mov() {
    let dir = tempfile::tempdir().unwrap();
    let dest = select_writer(
        &movie_registry(),
        &dir.path().join("clip.mp4"),
        Path::new("/media/source.mov"),
        Profile::ProRes,
    )
    .unwrap();
    assert!(dest.corrected);
    assert_eq!(dest.extension(), ".mov");
    assert_eq!(dest.file_type, FileType::Movie);
}

#[test]
fn acceptable_extensions_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    for (file, profile) in [
        ("a.mkv", Profile::Vp9),
        ("b.mkv", Profile::Av1),
        ("c.mov", Profile::Hap),
        ("d.mp4", Profile::H264),
    ] {
        let dest = select_writer(
            &movie_registry(),
            &dir.path().join(file),
            Path::new("source.mov"),
            profile,
        )
        .unwrap();
        assert!(!dest.corrected, "{file}");
    }
}

#[test]
fn sequences_are_never_renamed_for_a_profile() {
    let dest = select_writer(
        &movie_registry(),
        Path::new("shots/frame.0001.png"),
        Path::new("source.mov"),
        Profile::ProRes,
    )
    .unwrap();
    assert!(!dest.corrected);
    assert_eq!(dest.file_type, FileType::Sequence);
}

#[test]
fn corrected_path_never_overwrites_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.mkv"), b"keep").unwrap();
    let err = select_writer(
        &movie_registry(),
        &dir.path().join("clip.mov"),
        Path::new("source.mov"),
        Profile::Cineform,
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::WriterOpen(_)));
    assert_eq!(std::fs::read(dir.path().join("clip.mkv")).unwrap(), b"keep");
}

#[test]
fn saving_over_the_source_is_refused() {
    let err = select_writer(
        &movie_registry(),
        Path::new("media/source.mov"),
        Path::new("media/source.mov"),
        Profile::None,
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::WriterOpen(_)));
}

#[test]
fn unknown_extension_is_unsupported() {
    let err = select_writer(
        &movie_registry(),
        Path::new("out.xyz"),
        Path::new("source.mov"),
        Profile::None,
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::UnsupportedFormat(_)));
}

#[test]
fn rejected_type_falls_back_to_rgb_u8() {
    let registry = registry(
        MemoryPlugin::new(&[(".mov", FileType::Movie)]).accepting(&[PixelType::RgbU8]),
    );
    let dest = select_writer(
        &registry,
        Path::new("out.mov"),
        Path::new("in.mov"),
        Profile::None,
    )
    .unwrap();
    let n = negotiate_for(&dest, PixelType::RgbaF16, false);
    assert_eq!(n.info.pixel_type, PixelType::RgbU8);
    assert_eq!(n.info.size, Size::new(64, 32));
    assert_eq!(n.buffer_color_type, PixelType::RgbU8);
    assert!(n.substituted);
}

#[test]
fn accepted_type_is_kept_with_a_float_buffer() {
    let dest = select_writer(
        &movie_registry(),
        Path::new("out.mov"),
        Path::new("in.mov"),
        Profile::None,
    )
    .unwrap();
    let n = negotiate_for(&dest, PixelType::RgbaU8, false);
    assert_eq!(n.info.pixel_type, PixelType::RgbaU8);
    assert_eq!(n.buffer_color_type, PixelType::RgbaF32);
    assert!(!n.substituted);
}

#[test]
fn exr_and_hdr_overrides() {
    let registry = movie_registry();
    let exr = select_writer(&registry, Path::new("o.exr"), Path::new("i.mov"), Profile::None)
        .unwrap();
    let plain = negotiate_for(&exr, PixelType::RgbaU8, false);
    assert_eq!(plain.info.pixel_type, PixelType::RgbaF16);
    let annotated = negotiate_for(&exr, PixelType::RgbaU8, true);
    assert_eq!(annotated.info.pixel_type, PixelType::RgbaU8);

    let hdr = select_writer(&registry, Path::new("o.hdr"), Path::new("i.mov"), Profile::None)
        .unwrap();
    let n = negotiate_for(&hdr, PixelType::RgbaU8, false);
    assert_eq!(n.info.pixel_type, PixelType::RgbF32);
    assert_eq!(n.buffer_color_type, PixelType::RgbF32);
}

#[test]
fn open_failures_become_writer_open_errors() {
    let registry = registry(MemoryPlugin::new(&[(".mov", FileType::Movie)]).failing_open());
    let dest = select_writer(&registry, Path::new("o.mov"), Path::new("i.mov"), Profile::None)
        .unwrap();
    let err = open(&dest, &IoInfo::default(), &IoOptions::new()).err().unwrap();
    assert!(matches!(err, BakeError::WriterOpen(_)));
}
