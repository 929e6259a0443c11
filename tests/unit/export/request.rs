use super::*;

#[test]
fn resolution_divides_and_zooms() {
    assert_eq!(Resolution::Full.divisor(), 1);
    assert_eq!(Resolution::Half.zoom(), 0.5);
    assert_eq!(Resolution::Quarter.zoom(), 0.25);
}

#[test]
fn io_options_carry_codec_and_exr_settings() {
    let options = SaveOptions {
        profile: Profile::ProRes,
        audio_codec: AudioCodec::PcmS16le,
        hardware_encode: true,
        preset: Some(PathBuf::from("/tmp/fast.pst")),
        ..SaveOptions::default()
    };
    let io = options.io_options();
    assert_eq!(io.get(keys::FFMPEG_WRITE_PROFILE), Some("ProRes"));
    assert_eq!(io.get(keys::FFMPEG_AUDIO_CODEC), Some("PCM_S16LE"));
    assert_eq!(io.get(keys::FFMPEG_PIXEL_FORMAT), Some("YUV_420P"));
    assert!(io.flag(keys::FFMPEG_HARDWARE_ENCODE));
    assert_eq!(io.get(keys::FFMPEG_PRESET_FILE), Some("/tmp/fast.pst"));
    assert_eq!(io.get(keys::EXR_ZIP_LEVEL), Some("4"));
    assert_eq!(io.get(keys::EXR_DWA_LEVEL), Some("45"));
}

#[test]
fn color_fields_only_pass_through_when_overridden() {
    let plain = SaveOptions::default().io_options();
    assert_eq!(plain.get(keys::FFMPEG_COLOR_SPACE), None);

    let overridden = SaveOptions {
        color_override: true,
        color_space: "bt2020nc".into(),
        ..SaveOptions::default()
    }
    .io_options();
    assert_eq!(overridden.get(keys::FFMPEG_COLOR_SPACE), Some("bt2020nc"));
    assert_eq!(overridden.get(keys::FFMPEG_COLOR_RANGE), Some("tv"));
}

#[test]
fn request_json_fills_missing_options_with_defaults() {
    let request: ExportRequest = serde_json::from_str(
        r#"{"path": "out/clip.mov", "options": {"resolution": "half", "annotations": true}}"#,
    )
    .unwrap();
    assert_eq!(request.path, PathBuf::from("out/clip.mov"));
    assert_eq!(request.options.resolution, Resolution::Half);
    assert!(request.options.annotations);
    assert!(request.options.save_video);
    assert_eq!(request.options.exr_pixel_type, PixelType::RgbaF16);

    let bare: ExportRequest = serde_json::from_str(r#"{"path": "a.png"}"#).unwrap();
    assert_eq!(bare.options, SaveOptions::default());
}
