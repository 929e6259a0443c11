//! Scoped player and view state overrides held for the duration of an export.

use std::ops::{Deref, DerefMut};

use crate::foundation::time::RationalTime;
use crate::player::TimelinePlayer;
use crate::viewport::{ViewState, Viewport};

/// Stops and mutes the player; on drop seeks it to the export cursor and restores the mute state.
///
/// Playback is not restarted.
pub struct PlayerGuard<'a> {
    player: &'a mut dyn TimelinePlayer,
    muted: bool,
    cursor: RationalTime,
}

impl<'a> PlayerGuard<'a> {
    /// Stop and mute `player`, remembering its mute state.
    pub fn new(player: &'a mut dyn TimelinePlayer) -> Self {
        player.stop();
        let muted = player.is_muted();
        player.set_mute(true);
        let cursor = player.in_out_range().start_time();
        Self {
            player,
            muted,
            cursor,
        }
    }

    /// Time the player is moved to on drop.
    pub fn cursor(&self) -> RationalTime {
        self.cursor
    }

    /// Update the time the player is moved to on drop.
    pub fn set_cursor(&mut self, time: RationalTime) {
        self.cursor = time;
    }

    /// Mute state restored on drop.
    pub fn saved_mute(&self) -> bool {
        self.muted
    }
}

impl<'a> Deref for PlayerGuard<'a> {
    type Target = dyn TimelinePlayer + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.player
    }
}

impl DerefMut for PlayerGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.player
    }
}

impl Drop for PlayerGuard<'_> {
    fn drop(&mut self) {
        self.player.seek(self.cursor);
        self.player.set_mute(self.muted);
        tracing::debug!(cursor = %self.cursor, muted = self.muted, "player state restored");
    }
}

/// Saves the view state on creation and restores it on drop.
pub struct ViewGuard<'a> {
    view: &'a mut dyn Viewport,
    saved: ViewState,
}

impl<'a> ViewGuard<'a> {
    /// Remember `view`'s current state.
    pub fn new(view: &'a mut dyn Viewport) -> Self {
        let saved = view.view_state();
        Self { view, saved }
    }

    /// State restored on drop.
    pub fn saved(&self) -> ViewState {
        self.saved
    }

    /// Turn the HUD off so it is not captured.
    pub fn hide_hud(&mut self) {
        let state = ViewState {
            hud: false,
            ..self.view.view_state()
        };
        self.view.set_view_state(state);
    }

    /// Presentation mode with `show_video` as requested.
    pub fn enter_presentation(&mut self, show_video: bool) {
        let state = ViewState {
            presentation: true,
            show_video,
            ..self.view.view_state()
        };
        self.view.set_view_state(state);
    }
}

impl<'a> Deref for ViewGuard<'a> {
    type Target = dyn Viewport + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.view
    }
}

impl DerefMut for ViewGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.view
    }
}

impl Drop for ViewGuard<'_> {
    fn drop(&mut self) {
        self.view.set_view_state(ViewState {
            show_video: true,
            ..self.saved
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/guard.rs"]
mod tests;
