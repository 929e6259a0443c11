//! Timeline player interface and a synthetic test-pattern player.

mod pattern;

pub use pattern::{PlayerCalls, TestPatternPlayer, TestPatternPlayerBuilder};

use std::path::Path;

use crate::audio::AudioBuffer;
use crate::foundation::core::Image;
use crate::foundation::error::BakeResult;
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::IoInfo;

/// Audio returned for one second of timeline time, one entry per layer.
///
/// An empty list means the timeline had nothing to report for that second. A `None` layer means
/// the layer exists but is silent.
pub type AudioLayers = Vec<Option<AudioBuffer>>;

/// Playback and media access the export loop drives.
pub trait TimelinePlayer {
    /// Path of the media being played.
    fn path(&self) -> &Path;

    /// Stream description of the media.
    fn io_info(&self) -> &IoInfo;

    /// Full time range of the timeline.
    fn time_range(&self) -> TimeRange;

    /// Current in/out range; equals [`TimelinePlayer::time_range`] when unset.
    fn in_out_range(&self) -> TimeRange;

    /// Timeline start time (for timecode), if the media carries one.
    fn global_start_time(&self) -> Option<RationalTime> {
        None
    }

    /// Playback speed in frames per second.
    fn speed(&self) -> f64;

    /// Playhead position.
    fn current_time(&self) -> RationalTime;

    /// Move the playhead.
    fn seek(&mut self, time: RationalTime);

    /// Step the playhead one frame forward.
    fn frame_next(&mut self);

    /// Move the playhead to the start of the in/out range.
    fn go_to_start(&mut self);

    /// Stop playback.
    fn stop(&mut self);

    /// `true` while playing.
    fn is_playing(&self) -> bool;

    /// `true` when audio output is muted.
    fn is_muted(&self) -> bool;

    /// Mute or unmute audio output.
    fn set_mute(&mut self, mute: bool);

    /// Block until the frame at `time` is decoded and cached.
    fn wait_for_frame(&mut self, _time: RationalTime) -> BakeResult<()> {
        Ok(())
    }

    /// Decoded first video layer at `time`, `None` when the decoder produced nothing.
    fn video(&mut self, time: RationalTime) -> BakeResult<Option<Image>>;

    /// One second of audio starting at `seconds`.
    fn audio(&mut self, seconds: f64) -> BakeResult<AudioLayers>;
}
