use super::*;
use crate::foundation::core::Size;

#[test]
fn write_info_maps_float_to_sixteen_bit() {
    let plugin = FfmpegPlugin::new();
    let opts = IoOptions::new();
    let size = Size::new(16, 8);
    let info = |p| ImageInfo::new(size, p);

    assert_eq!(
        plugin.write_info(&info(PixelType::RgbaF32), &opts).unwrap().pixel_type,
        PixelType::RgbaU16
    );
    assert_eq!(
        plugin.write_info(&info(PixelType::RgbF16), &opts).unwrap().pixel_type,
        PixelType::RgbU16
    );
    assert_eq!(
        plugin.write_info(&info(PixelType::LU8), &opts).unwrap().pixel_type,
        PixelType::LU8
    );
    assert!(plugin.write_info(&info(PixelType::LaU8), &opts).is_none());
    assert!(plugin.write_info(&info(PixelType::Yuv420PU8), &opts).is_none());
}

#[test]
fn claims_movie_and_audio_extensions() {
    let plugin = FfmpegPlugin::new();
    assert_eq!(plugin.file_type(".mov"), Some(FileType::Movie));
    assert_eq!(plugin.file_type(".wav"), Some(FileType::Audio));
    assert_eq!(plugin.file_type(".png"), None);
}

#[test]
fn pixel_format_option_names() {
    assert_eq!(output_pix_fmt("YUV_420P"), "yuv420p");
    assert_eq!(output_pix_fmt("YUV444P"), "yuv444p");
    assert_eq!(output_pix_fmt("RGBA_U8"), "rgba");
    assert_eq!(output_pix_fmt("yuv422p10le"), "yuv422p10le");
}

#[test]
fn raw_input_formats_follow_endianness() {
    assert_eq!(raw_pix_fmt(PixelType::RgbaU16, Endian::Lsb), Some("rgba64le"));
    assert_eq!(raw_pix_fmt(PixelType::RgbaU16, Endian::Msb), Some("rgba64be"));
    assert_eq!(raw_pix_fmt(PixelType::RgbF32, Endian::Lsb), None);
}

#[test]
fn preset_lines_become_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let preset = dir.path().join("fast.pst");
    std::fs::write(&preset, "# comment\npreset=veryfast\n\ncrf = 18\nbogus\n").unwrap();
    let args = read_preset_args(&preset).unwrap();
    assert_eq!(args, vec!["-preset", "veryfast", "-crf", "18"]);
    assert!(read_preset_args(&dir.path().join("missing.pst")).is_err());
}

#[test]
fn video_only_path_is_hidden_sibling() {
    let p = video_only_path(Path::new("/tmp/out/review.mov"));
    assert_eq!(p, PathBuf::from("/tmp/out/.video_review.mov"));
}

#[test]
fn audio_spool_is_removed_when_dropped() {
    let spool = open_audio_spool(AudioInfo::new(2, 48_000), AudioCodec::Aac).unwrap();
    let path = spool.file.get_ref().path().to_path_buf();
    assert!(path.is_file());
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("f32le"));

    drop(spool);
    assert!(!path.exists());
}
