use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::RationalTime;
use crate::io::{AudioCodec, FileType};

/// Per-iteration progress report with cooperative cancellation.
pub trait Progress {
    /// Announce an export of `start_frame..=end_frame` titled `title`.
    fn show(&mut self, title: &str, start_frame: i64, end_frame: i64);

    /// Report the cursor at the top of an iteration; `false` cancels the export.
    fn tick(&mut self, time: RationalTime) -> bool;
}

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type TickHook = Box<dyn FnMut(i64, &CancelToken)>;

/// Interactive progress backed by a [`CancelToken`].
///
/// The optional hook runs on every tick before the token is checked; a UI uses it to pump its
/// event loop, and it may cancel the token itself.
pub struct TokenProgress {
    token: CancelToken,
    hook: Option<TickHook>,
    title: String,
    start_frame: i64,
    end_frame: i64,
    ticks: u64,
    last_frame: Option<i64>,
}

impl TokenProgress {
    /// Progress observing `token`.
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            hook: None,
            title: String::new(),
            start_frame: 0,
            end_frame: 0,
            ticks: 0,
            last_frame: None,
        }
    }

    /// Run `hook(frame, token)` on every tick.
    pub fn with_hook(mut self, hook: impl FnMut(i64, &CancelToken) + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// The observed token.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Title passed to [`Progress::show`].
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Frame range passed to [`Progress::show`].
    pub fn frame_range(&self) -> (i64, i64) {
        (self.start_frame, self.end_frame)
    }

    /// Ticks received.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frame of the last tick.
    pub fn last_frame(&self) -> Option<i64> {
        self.last_frame
    }

    /// Completed fraction in `0..=1` based on the last tick.
    pub fn fraction(&self) -> f64 {
        let Some(frame) = self.last_frame else {
            return 0.0;
        };
        let span = (self.end_frame - self.start_frame + 1).max(1) as f64;
        ((frame - self.start_frame + 1) as f64 / span).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for TokenProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProgress")
            .field("title", &self.title)
            .field("ticks", &self.ticks)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Progress for TokenProgress {
    fn show(&mut self, title: &str, start_frame: i64, end_frame: i64) {
        self.title = title.to_owned();
        self.start_frame = start_frame;
        self.end_frame = end_frame;
        tracing::info!(title, start_frame, end_frame, "export started");
    }

    fn tick(&mut self, time: RationalTime) -> bool {
        let frame = time.to_frames();
        self.ticks += 1;
        self.last_frame = Some(frame);
        if let Some(hook) = self.hook.as_mut() {
            hook(frame, &self.token);
        }
        !self.token.is_cancelled()
    }
}

/// Non-interactive progress: logs every tick and never cancels.
#[derive(Clone, Debug, Default)]
pub struct LogProgress {
    ticks: u64,
}

impl LogProgress {
    /// New log-only progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks received.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Progress for LogProgress {
    fn show(&mut self, title: &str, start_frame: i64, end_frame: i64) {
        tracing::info!(start_frame, end_frame, "{title}");
    }

    fn tick(&mut self, time: RationalTime) -> bool {
        self.ticks += 1;
        tracing::info!("Saving... {time}");
        true
    }
}

/// What an export writes, used to title its progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveKind {
    /// Video (and possibly audio) into a movie container.
    Movie {
        /// The movie carries an audio stream.
        with_audio: bool,
    },
    /// Audio into an audio-only container.
    Audio,
    /// Video into an image sequence; audio is dropped.
    Pictures,
}

impl SaveKind {
    /// Classify an export writing `file_type` from a source with the given streams.
    pub fn classify(
        file_type: FileType,
        has_video: bool,
        has_audio: bool,
        audio_codec: AudioCodec,
    ) -> BakeResult<Self> {
        match file_type {
            FileType::Movie if has_video => Ok(Self::Movie {
                with_audio: has_audio && audio_codec != AudioCodec::None,
            }),
            FileType::Audio if has_audio => Ok(Self::Audio),
            FileType::Sequence if has_video => Ok(Self::Pictures),
            _ if !has_video => Err(BakeError::validation(
                "audio only in timeline, but not trying to save audio",
            )),
            _ => Err(BakeError::validation(format!(
                "nothing to write into a {file_type:?} output"
            ))),
        }
    }

    /// Progress title for frames `start..=end`.
    pub fn title(self, start: i64, end: i64) -> String {
        match self {
            Self::Movie { with_audio: true } => format!("Saving Movie with Audio {start} - {end}"),
            Self::Movie { with_audio: false } => {
                format!("Saving Movie without Audio {start} - {end}")
            }
            Self::Audio => format!("Saving Audio {start} - {end}"),
            Self::Pictures => format!("Saving Pictures without Audio {start} - {end}"),
        }
    }

    /// `true` when audio samples are written.
    pub fn writes_audio(self) -> bool {
        matches!(self, Self::Movie { with_audio: true } | Self::Audio)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/progress.rs"]
mod tests;
