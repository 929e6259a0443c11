use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::IoInfo;

/// Granularity of one stepper iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// One video frame.
    VideoFrame,
    /// One second of audio (audio-only exports).
    AudioSecond,
}

/// Frame and sample range an export covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRange {
    /// The player's in/out range the export was derived from.
    pub in_out: TimeRange,
    /// First exported instant, at the in/out rate.
    pub start: RationalTime,
    /// Last exported instant (inclusive), at the in/out rate.
    pub end: RationalTime,
    /// Span of video to write, at the source video rate (the audio span for audio-only exports).
    pub video_time: TimeRange,
    /// Span of audio to write, at the sample rate.
    pub audio_time: Option<TimeRange>,
    /// Video is rendered and written.
    pub has_video: bool,
    /// Iteration unit.
    pub step: Step,
    /// Audio sample rate, `0.0` without audio.
    pub sample_rate: f64,
    /// Sample position of `start`.
    pub start_audio_sample: u64,
    /// Sample position of `end`.
    pub end_audio_sample_count: u64,
    /// Samples in the in/out range; the audio write budget.
    pub max_audio_sample_count: u64,
}

impl ResolvedRange {
    /// `true` when audio is written.
    pub fn has_audio(&self) -> bool {
        self.audio_time.is_some()
    }

    /// Inclusive start frame, for progress reporting.
    pub fn start_frame(&self) -> i64 {
        self.start.to_frames()
    }

    /// Inclusive end frame, for progress reporting.
    pub fn end_frame(&self) -> i64 {
        self.end.to_frames()
    }

    /// Time added to the cursor after each iteration.
    pub fn step_duration(&self) -> RationalTime {
        let rate = self.start.rate();
        match self.step {
            Step::VideoFrame => RationalTime::new(1.0, rate),
            Step::AudioSecond => RationalTime::new(rate, rate),
        }
    }
}

/// Derive the export range from the player's full range, its in/out range and the source streams.
///
/// `want_video` is `false` when video must not be written even if the source has it.
pub fn resolve(
    player_range: TimeRange,
    in_out: TimeRange,
    info: &IoInfo,
    want_video: bool,
) -> BakeResult<ResolvedRange> {
    if !info.has_video() && !info.has_audio() {
        return Err(BakeError::empty_media("source has neither video nor audio"));
    }
    if !in_out.is_valid() || in_out.start_time().rate() <= 0.0 {
        return Err(BakeError::validation(format!("invalid in/out range {in_out}")));
    }

    let start = in_out.start_time();
    let end = in_out.end_time_inclusive();
    let has_video = info.has_video() && want_video;
    let range_changed = player_range != in_out;

    let mut video_time = info.video_time;
    if range_changed
        || info.video_time.start_time() != start
        || info.video_time.duration() != in_out.duration()
    {
        let rate = info.video_time.duration().rate();
        if rate > 0.0 {
            video_time = in_out.rescaled_to(rate);
        }
    }

    let mut audio_time = None;
    let mut sample_rate = 0.0;
    if let Some(audio) = info.audio.filter(|a| a.is_valid()) {
        sample_rate = f64::from(audio.sample_rate);
        let rescaled_start = start.rescaled_to(sample_rate);
        audio_time = Some(
            if range_changed || info.audio_time.start_time() != rescaled_start {
                in_out.rescaled_to(sample_rate)
            } else {
                info.audio_time
            },
        );
    }

    let step = if has_video {
        Step::VideoFrame
    } else {
        let Some(audio_time) = audio_time else {
            return Err(BakeError::empty_media("video disabled and source has no audio"));
        };
        video_time = audio_time;
        Step::AudioSecond
    };

    let samples = |t: RationalTime| t.value_rescaled_to(sample_rate).max(0.0) as u64;
    Ok(ResolvedRange {
        in_out,
        start,
        end,
        video_time,
        audio_time,
        has_video,
        step,
        sample_rate,
        start_audio_sample: samples(start),
        end_audio_sample_count: samples(end),
        max_audio_sample_count: samples(in_out.duration()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/range.rs"]
mod tests;
