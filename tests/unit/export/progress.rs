use std::cell::Cell;
use std::rc::Rc;

use super::*;

#[test]
fn token_cancels_every_clone() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());
    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn hook_runs_before_the_cancellation_check() {
    let seen = Rc::new(Cell::new(0));
    let seen_in_hook = Rc::clone(&seen);
    let mut progress = TokenProgress::new(CancelToken::new()).with_hook(move |frame, token| {
        seen_in_hook.set(seen_in_hook.get() + 1);
        if frame == 12 {
            token.cancel();
        }
    });
    progress.show("Saving Movie without Audio 10 - 19", 10, 19);
    assert!(progress.tick(RationalTime::new(10.0, 24.0)));
    assert!(progress.tick(RationalTime::new(11.0, 24.0)));
    assert!(!progress.tick(RationalTime::new(12.0, 24.0)));
    assert_eq!(seen.get(), 3);
    assert_eq!(progress.ticks(), 3);
    assert_eq!(progress.frame_range(), (10, 19));
    assert!((progress.fraction() - 0.3).abs() < 1e-9);
}

#[test]
fn log_progress_never_cancels() {
    let mut progress = LogProgress::new();
    progress.show("Saving Audio 0 - 47", 0, 47);
    assert!((0..5).all(|i| progress.tick(RationalTime::new(f64::from(i), 24.0))));
    assert_eq!(progress.ticks(), 5);
}

#[test]
fn titles_follow_the_output_kind() {
    assert_eq!(
        SaveKind::Movie { with_audio: true }.title(100, 109),
        "Saving Movie with Audio 100 - 109"
    );
    assert_eq!(
        SaveKind::Movie { with_audio: false }.title(1, 2),
        "Saving Movie without Audio 1 - 2"
    );
    assert_eq!(SaveKind::Audio.title(0, 47), "Saving Audio 0 - 47");
    assert_eq!(
        SaveKind::Pictures.title(5, 6),
        "Saving Pictures without Audio 5 - 6"
    );
}

#[test]
fn classification_matches_streams_to_targets() {
    use AudioCodec::{Aac, None as NoCodec};
    assert_eq!(
        SaveKind::classify(FileType::Movie, true, true, Aac).unwrap(),
        SaveKind::Movie { with_audio: true }
    );
    assert_eq!(
        SaveKind::classify(FileType::Movie, true, true, NoCodec).unwrap(),
        SaveKind::Movie { with_audio: false }
    );
    assert_eq!(
        SaveKind::classify(FileType::Sequence, true, true, Aac).unwrap(),
        SaveKind::Pictures
    );
    assert!(!SaveKind::Pictures.writes_audio());
    assert_eq!(
        SaveKind::classify(FileType::Audio, false, true, Aac).unwrap(),
        SaveKind::Audio
    );
    let err = SaveKind::classify(FileType::Movie, false, true, Aac).unwrap_err();
    assert!(err.to_string().contains("audio only in timeline"));
    assert!(SaveKind::classify(FileType::Sequence, false, true, Aac).is_err());
}
