use super::*;

#[test]
fn rejects_ragged_interleaving() {
    let info = AudioInfo::new(2, 48_000);
    assert!(AudioBuffer::new(info, vec![0.0; 5]).is_err());
    assert!(AudioBuffer::new(AudioInfo::new(0, 48_000), vec![]).is_err());
    assert_eq!(AudioBuffer::new(info, vec![0.0; 6]).unwrap().sample_count(), 3);
}

#[test]
fn truncation_keeps_whole_sample_frames() {
    let info = AudioInfo::new(2, 4);
    let buf = AudioBuffer::new(info, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let head = buf.truncated(2);
    assert_eq!(head.sample_count(), 2);
    assert_eq!(head.data(), &[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(buf.truncated(10).sample_count(), 3);
}

#[test]
fn silence_is_zeroed() {
    let buf = AudioBuffer::silence(AudioInfo::new(2, 48_000), 48_000);
    assert_eq!(buf.sample_count(), 48_000);
    assert!(buf.data().iter().all(|&s| s == 0.0));
    assert_eq!(buf.to_f32le_bytes().len(), 48_000 * 2 * 4);
}
