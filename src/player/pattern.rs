use std::path::{Path, PathBuf};

use crate::audio::{AudioBuffer, AudioInfo};
use crate::foundation::core::{Image, ImageInfo, PixelType, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::IoInfo;
use crate::player::{AudioLayers, TimelinePlayer};
use crate::render::canvas::Rgba;
use crate::render::convert::encode_rgba;

const BARS: [Rgba; 7] = [
    [0.75, 0.75, 0.75, 1.0],
    [0.75, 0.75, 0.0, 1.0],
    [0.0, 0.75, 0.75, 1.0],
    [0.0, 0.75, 0.0, 1.0],
    [0.75, 0.0, 0.75, 1.0],
    [0.75, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.75, 1.0],
];

/// Calls received by a [`TestPatternPlayer`], for inspection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerCalls {
    /// Seek targets, in order.
    pub seeks: Vec<RationalTime>,
    /// `frame_next` count.
    pub frame_nexts: usize,
    /// `video` request times, in order.
    pub video_requests: Vec<RationalTime>,
    /// `audio` request seconds, in order.
    pub audio_requests: Vec<f64>,
}

/// Builder for [`TestPatternPlayer`].
#[derive(Clone, Debug)]
pub struct TestPatternPlayerBuilder {
    path: PathBuf,
    size: Size,
    pixel_type: PixelType,
    rate: f64,
    start_frame: f64,
    frames: f64,
    in_out: Option<(f64, f64)>,
    video: bool,
    audio: Option<AudioInfo>,
    tone_hz: f32,
    global_start: Option<RationalTime>,
    missing_frames: Vec<i64>,
    silent_audio: bool,
    playing: bool,
    muted: bool,
}

impl Default for TestPatternPlayerBuilder {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pattern://bars"),
            size: Size::new(320, 180),
            pixel_type: PixelType::RgbaU8,
            rate: 24.0,
            start_frame: 0.0,
            frames: 48.0,
            in_out: None,
            video: true,
            audio: None,
            tone_hz: 440.0,
            global_start: None,
            missing_frames: Vec::new(),
            silent_audio: false,
            playing: false,
            muted: false,
        }
    }
}

impl TestPatternPlayerBuilder {
    /// Source path reported by the player.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Frame size.
    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Pixel type of decoded frames.
    pub fn pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    /// Frame rate.
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Timeline of `frames` frames starting at `start_frame`.
    pub fn frames(mut self, start_frame: f64, frames: f64) -> Self {
        self.start_frame = start_frame;
        self.frames = frames;
        self
    }

    /// In/out range of `frames` frames starting at `start_frame`.
    pub fn in_out(mut self, start_frame: f64, frames: f64) -> Self {
        self.in_out = Some((start_frame, frames));
        self
    }

    /// Drop the video stream.
    pub fn without_video(mut self) -> Self {
        self.video = false;
        self
    }

    /// Add a sine-tone audio stream.
    pub fn audio(mut self, info: AudioInfo) -> Self {
        self.audio = Some(info);
        self
    }

    /// Tone frequency.
    pub fn tone_hz(mut self, hz: f32) -> Self {
        self.tone_hz = hz;
        self
    }

    /// Timeline start time used for timecode.
    pub fn global_start(mut self, time: RationalTime) -> Self {
        self.global_start = Some(time);
        self
    }

    /// Frames whose decode yields nothing.
    pub fn missing_frames(mut self, frames: &[i64]) -> Self {
        self.missing_frames = frames.to_vec();
        self
    }

    /// Report the audio layer as present but silent.
    pub fn silent_audio(mut self) -> Self {
        self.silent_audio = true;
        self
    }

    /// Initial playback and mute state.
    pub fn state(mut self, playing: bool, muted: bool) -> Self {
        self.playing = playing;
        self.muted = muted;
        self
    }

    /// Build the player.
    pub fn build(self) -> BakeResult<TestPatternPlayer> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(BakeError::validation(format!("invalid frame rate {}", self.rate)));
        }
        if self.frames <= 0.0 {
            return Err(BakeError::validation("test pattern needs at least one frame"));
        }
        if self.video && self.size.is_degenerate() {
            return Err(BakeError::validation(format!("invalid frame size {}", self.size)));
        }

        let time_range = TimeRange::new(
            RationalTime::new(self.start_frame, self.rate),
            RationalTime::new(self.frames, self.rate),
        );
        let in_out_range = match self.in_out {
            Some((start, frames)) => TimeRange::new(
                RationalTime::new(start, self.rate),
                RationalTime::new(frames, self.rate),
            ),
            None => time_range,
        };

        let mut io_info = IoInfo {
            video_time: time_range,
            ..IoInfo::default()
        };
        if self.video {
            io_info.video.push(ImageInfo::new(self.size, self.pixel_type));
        }
        if let Some(audio) = self.audio.filter(|a| a.is_valid()) {
            io_info.audio = Some(audio);
            io_info.audio_time = time_range.rescaled_to(f64::from(audio.sample_rate));
        }

        Ok(TestPatternPlayer {
            current: in_out_range.start_time(),
            path: self.path,
            io_info,
            time_range,
            in_out_range,
            tone_hz: self.tone_hz,
            global_start: self.global_start,
            missing_frames: self.missing_frames,
            silent_audio: self.silent_audio,
            playing: self.playing,
            muted: self.muted,
            calls: PlayerCalls::default(),
        })
    }
}

/// Timeline player producing SMPTE-style color bars and a sine tone.
///
/// A white marker column moves one step per frame so consecutive frames differ.
#[derive(Debug)]
pub struct TestPatternPlayer {
    path: PathBuf,
    io_info: IoInfo,
    time_range: TimeRange,
    in_out_range: TimeRange,
    tone_hz: f32,
    global_start: Option<RationalTime>,
    missing_frames: Vec<i64>,
    silent_audio: bool,
    current: RationalTime,
    playing: bool,
    muted: bool,
    calls: PlayerCalls,
}

impl TestPatternPlayer {
    /// Start building a player.
    pub fn builder() -> TestPatternPlayerBuilder {
        TestPatternPlayerBuilder::default()
    }

    /// Calls received so far.
    pub fn calls(&self) -> &PlayerCalls {
        &self.calls
    }

    /// Start playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    fn render_frame(&self, info: ImageInfo, frame: i64) -> BakeResult<Image> {
        let (w, h) = (info.size.w as usize, info.size.h as usize);
        let marker = (frame.rem_euclid(w as i64)) as usize;
        let mut pixels = Vec::with_capacity(w * h);
        for _y in 0..h {
            for x in 0..w {
                pixels.push(if x == marker {
                    [1.0, 1.0, 1.0, 1.0]
                } else {
                    BARS[x * BARS.len() / w]
                });
            }
        }
        let mut image = Image::new(info);
        encode_rgba(&pixels, &mut image)?;
        Ok(image)
    }
}

impl TimelinePlayer for TestPatternPlayer {
    fn path(&self) -> &Path {
        &self.path
    }

    fn io_info(&self) -> &IoInfo {
        &self.io_info
    }

    fn time_range(&self) -> TimeRange {
        self.time_range
    }

    fn in_out_range(&self) -> TimeRange {
        self.in_out_range
    }

    fn global_start_time(&self) -> Option<RationalTime> {
        self.global_start
    }

    fn speed(&self) -> f64 {
        self.time_range.duration().rate()
    }

    fn current_time(&self) -> RationalTime {
        self.current
    }

    fn seek(&mut self, time: RationalTime) {
        self.calls.seeks.push(time);
        self.current = time.rescaled_to(self.time_range.duration().rate());
    }

    fn frame_next(&mut self) {
        self.calls.frame_nexts += 1;
        self.current += RationalTime::new(1.0, self.current.rate());
    }

    fn go_to_start(&mut self) {
        self.current = self.in_out_range.start_time();
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
    }

    fn video(&mut self, time: RationalTime) -> BakeResult<Option<Image>> {
        self.calls.video_requests.push(time);
        let Some(info) = self.io_info.video.first().copied() else {
            return Ok(None);
        };
        let frame = time.to_frames_at(self.time_range.duration().rate());
        if self.missing_frames.contains(&frame) {
            return Ok(None);
        }
        self.render_frame(info, frame).map(Some)
    }

    fn audio(&mut self, seconds: f64) -> BakeResult<AudioLayers> {
        self.calls.audio_requests.push(seconds);
        let Some(info) = self.io_info.audio else {
            return Ok(Vec::new());
        };
        if self.silent_audio {
            return Ok(vec![None]);
        }

        let rate = info.sample_rate as usize;
        let channels = usize::from(info.channels);
        let first = (seconds * info.sample_rate as f64).round() as i64;
        let step = std::f32::consts::TAU * self.tone_hz / info.sample_rate as f32;
        let mut data = Vec::with_capacity(rate * channels);
        for i in 0..rate as i64 {
            let phase = ((first + i).rem_euclid(info.sample_rate as i64)) as f32 * step;
            let v = 0.25 * phase.sin();
            data.extend(std::iter::repeat_n(v, channels));
        }
        Ok(vec![Some(AudioBuffer::new(info, data)?)])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/pattern.rs"]
mod tests;
