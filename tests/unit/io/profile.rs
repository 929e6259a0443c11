use super::*;

#[test]
fn extension_correction_table() {
    assert_eq!(Profile::ProResHq.corrected_extension(".mp4"), Some(".mov"));
    assert_eq!(Profile::ProRes.corrected_extension(".MOV"), None);
    assert_eq!(Profile::Vp9.corrected_extension(".webm"), None);
    assert_eq!(Profile::Vp9.corrected_extension(".mov"), Some(".mp4"));
    assert_eq!(Profile::Av1.corrected_extension(".webm"), Some(".mp4"));
    assert_eq!(Profile::Av1.corrected_extension(".mkv"), None);
    assert_eq!(Profile::Cineform.corrected_extension(".mov"), Some(".mkv"));
    assert_eq!(Profile::Hap.corrected_extension(".mp4"), Some(".mov"));
    assert_eq!(Profile::H264.corrected_extension(".avi"), None);
    assert_eq!(Profile::DnxHrHq.corrected_extension(".mxf"), None);
}

#[test]
fn labels_round_trip_through_from_str() {
    for p in Profile::ALL {
        assert_eq!(p.label().parse::<Profile>().unwrap(), p);
    }
    for c in AudioCodec::ALL {
        assert_eq!(c.label().parse::<AudioCodec>().unwrap(), c);
    }
    assert!("Theora".parse::<Profile>().is_err());
}

#[test]
fn serde_uses_labels() {
    let json = serde_json::to_string(&Profile::ProRes4444).unwrap();
    assert_eq!(json, "\"ProRes_4444\"");
    let codec: AudioCodec = serde_json::from_str("\"True_HD\"").unwrap();
    assert_eq!(codec, AudioCodec::TrueHd);
}

#[test]
fn wav_and_aiff_restrict_audio_codecs() {
    assert_eq!(AudioCodec::Opus.for_container(".wav"), AudioCodec::Aac);
    assert_eq!(AudioCodec::Mp3.for_container(".wav"), AudioCodec::Mp3);
    assert_eq!(AudioCodec::Aac.for_container(".aiff"), AudioCodec::PcmS16le);
    assert_eq!(AudioCodec::Opus.for_container(".ogg"), AudioCodec::Opus);
}

#[test]
fn prores_args_carry_profile_name() {
    let args = Profile::ProResXq.codec_args(false);
    assert_eq!(args, vec!["-c:v", "prores_ks", "-profile:v", "4444xq"]);
    assert_eq!(Profile::ProResXq.default_pix_fmt(true), "yuva444p10le");
}
