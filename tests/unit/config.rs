use super::*;
use crate::export::Resolution;
use crate::io::Profile;

#[test]
fn partial_options_fill_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(&path, r#"{ "annotations": true, "resolution": "half" }"#).unwrap();

    let options = load_save_options(&path).unwrap();
    assert!(options.annotations);
    assert_eq!(options.resolution, Resolution::Half);
    assert!(options.save_video);
    assert_eq!(options.pixel_format, "YUV_420P");
}

#[test]
fn written_options_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("options.json");
    let options = SaveOptions {
        profile: Profile::ProRes,
        no_rename: true,
        thread_count: 4,
        ..SaveOptions::default()
    };
    write_save_options(&path, &options).unwrap();
    assert_eq!(load_save_options(&path).unwrap(), options);
}

#[test]
fn bad_files_are_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_save_options(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, BakeError::Validation(_)));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_save_options(&path).unwrap_err();
    assert!(err.to_string().contains("parse save options"));
}

#[test]
fn annotations_load_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(
        &path,
        r#"[{"time": {"value": 0.0, "rate": 24.0}, "all_frames": true,
             "shapes": [{"kind": "note", "text": "fix the sky"}]}]"#,
    )
    .unwrap();
    let set = load_annotations(&path).unwrap();
    assert_eq!(set.annotations().len(), 1);
    assert!(set.annotations()[0].all_frames);
}
