use super::*;
use crate::foundation::core::Size;
use crate::player::TestPatternPlayer;
use crate::viewport::SoftwareViewport;

#[test]
fn player_guard_stops_mutes_and_restores() {
    let mut player = TestPatternPlayer::builder()
        .frames(0.0, 48.0)
        .state(true, false)
        .build()
        .unwrap();
    {
        let mut guard = PlayerGuard::new(&mut player);
        assert!(!guard.is_playing());
        assert!(guard.is_muted());
        assert!(!guard.saved_mute());
        guard.frame_next();
        guard.set_cursor(RationalTime::new(30.0, 24.0));
    }
    assert!(!player.is_muted());
    assert!(!player.is_playing());
    assert_eq!(player.current_time(), RationalTime::new(30.0, 24.0));
    assert_eq!(player.calls().seeks, vec![RationalTime::new(30.0, 24.0)]);
}

#[test]
fn player_guard_keeps_an_already_muted_player_muted() {
    let mut player = TestPatternPlayer::builder().state(false, true).build().unwrap();
    drop(PlayerGuard::new(&mut player));
    assert!(player.is_muted());
}

#[test]
fn view_guard_restores_the_saved_state() {
    let mut view = SoftwareViewport::new(Size::new(8, 8));
    let before = view.view_state();
    {
        let mut guard = ViewGuard::new(&mut view);
        guard.enter_presentation(false);
        guard.hide_hud();
        guard.set_zoom(0.25);
        let during = guard.view_state();
        assert!(during.presentation && !during.hud && !during.show_video);
        assert!(!during.frame_view);
        assert_eq!(guard.saved(), before);
    }
    assert_eq!(view.view_state(), before);
}
