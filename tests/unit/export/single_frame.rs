use std::sync::Arc;

use super::*;
use crate::export::progress::{CancelToken, LogProgress, TokenProgress};
use crate::io::{MemoryPlugin, PluginRegistry, PngPlugin};
use crate::player::{TestPatternPlayer, TimelinePlayer};
use crate::render::CpuBackend;

fn png_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(PngPlugin::new()));
    registry
}

fn t(frame: f64) -> RationalTime {
    RationalTime::new(frame, 24.0)
}

fn player_at(frame: f64) -> TestPatternPlayer {
    let mut player = TestPatternPlayer::builder()
        .size(crate::foundation::core::Size::new(16, 8))
        .build()
        .unwrap();
    player.seek(t(frame));
    player
}

fn save(
    player: &mut TestPatternPlayer,
    registry: &PluginRegistry,
    path: &Path,
    options: &SaveOptions,
) -> BakeResult<FrameSummary> {
    let mut backend = CpuBackend::default();
    let mut progress = LogProgress::new();
    let mut ctx = ExportContext::new(player, &mut backend, registry, &mut progress);
    save_single_frame(&mut ctx, path, options)
}

#[test]
fn numbered_frame_is_renamed_to_the_requested_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = player_at(5.0);
    let requested = dir.path().join("still.png");
    let summary = save(&mut player, &png_registry(), &requested, &SaveOptions::default()).unwrap();

    assert!(summary.renamed);
    assert_eq!(summary.path, requested);
    assert_eq!(summary.time, t(5.0));
    assert!(requested.is_file());
    assert!(!dir.path().join("still5.png").exists());
    assert_eq!(player.current_time(), t(5.0));
}

#[test]
fn no_rename_keeps_the_padded_number() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = player_at(7.0);
    let options = SaveOptions {
        no_rename: true,
        ..SaveOptions::default()
    };
    let summary = save(
        &mut player,
        &png_registry(),
        &dir.path().join("shot.0100.png"),
        &options,
    )
    .unwrap();

    assert!(!summary.renamed);
    assert_eq!(summary.path, dir.path().join("shot.0007.png"));
    assert!(summary.path.is_file());
}

#[test]
fn audio_only_sources_have_no_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = TestPatternPlayer::builder()
        .without_video()
        .audio(crate::audio::AudioInfo::new(2, 48_000))
        .build()
        .unwrap();
    let err = save(
        &mut player,
        &png_registry(),
        &dir.path().join("still.png"),
        &SaveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::EmptyMedia(_)));
}

#[test]
fn multiple_frames_become_a_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = player_at(1.0);
    let registry = png_registry();
    let mut backend = CpuBackend::default();
    let mut progress = LogProgress::new();
    let times = [t(2.0), t(4.0), t(6.0)];
    let written = {
        let mut ctx = ExportContext::new(&mut player, &mut backend, &registry, &mut progress);
        save_multiple_frames(
            &mut ctx,
            &dir.path().join("seq.0000.png"),
            &times,
            &SaveOptions::default(),
        )
        .unwrap()
    };

    assert_eq!(written, 3);
    for frame in ["seq.0002.png", "seq.0004.png", "seq.0006.png"] {
        assert!(dir.path().join(frame).is_file(), "{frame}");
    }
    assert_eq!(player.current_time(), t(1.0));
    assert_eq!(progress.ticks(), 3);
}

#[test]
fn multiple_frames_stop_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = player_at(0.0);
    let registry = png_registry();
    let mut backend = CpuBackend::default();
    let mut progress = TokenProgress::new(CancelToken::new()).with_hook(|frame, token| {
        if frame >= 3 {
            token.cancel();
        }
    });
    let times = [t(1.0), t(2.0), t(3.0), t(4.0)];
    let mut ctx = ExportContext::new(&mut player, &mut backend, &registry, &mut progress);
    let written = save_multiple_frames(
        &mut ctx,
        &dir.path().join("seq.0000.png"),
        &times,
        &SaveOptions::default(),
    )
    .unwrap();
    assert_eq!(written, 2);
    assert!(!dir.path().join("seq.0003.png").exists());
}

#[test]
fn multiple_frames_need_a_sequence_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = player_at(0.0);
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(MemoryPlugin::new(&[(".mov", FileType::Movie)])));
    let mut backend = CpuBackend::default();
    let mut progress = LogProgress::new();
    let mut ctx = ExportContext::new(&mut player, &mut backend, &registry, &mut progress);
    let err = save_multiple_frames(
        &mut ctx,
        &dir.path().join("clip.mov"),
        &[t(1.0)],
        &SaveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::UnsupportedFormat(_)));
}
