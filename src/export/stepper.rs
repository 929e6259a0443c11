use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::audio::{AudioBuffer, AudioInfo};
use crate::export::ExportContext;
use crate::export::guard::{PlayerGuard, ViewGuard};
use crate::export::progress::{Progress, SaveKind};
use crate::export::range::{ResolvedRange, resolve};
use crate::export::request::{ExportRequest, SaveOptions};
use crate::export::writer::{self, Destination, Negotiated};
use crate::foundation::core::{Image, ImageInfo, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::locale::NumericLocaleGuard;
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::{IoInfo, IoOptions, MediaPath, PluginRegistry, Writer, keys};
use crate::player::TimelinePlayer;
use crate::render::{
    DrawOptions, OffscreenBinding, OffscreenBuffer, RenderBackend, read_pixels_format,
};
use crate::viewport::{Viewport, annotation_layout};

/// Lifecycle of one export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportState {
    /// Nothing started.
    Idle,
    /// Resolving the range, opening the writer and allocating render targets.
    Initializing,
    /// Iterating.
    Stepping,
    /// The cursor passed the end of the range.
    Completed,
    /// Progress reported a cancellation.
    Cancelled,
    /// An iteration failed.
    Failed,
}

impl ExportState {
    /// `true` for `Completed`, `Cancelled` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Export position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCursor {
    /// Time of the next iteration.
    pub current_time: RationalTime,
    /// Audio samples written so far.
    pub total_samples_written: u64,
}

/// Outcome of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSummary {
    /// `Completed` or `Cancelled`.
    pub state: ExportState,
    /// Path written, after extension correction.
    pub path: PathBuf,
    /// What was written.
    pub kind: SaveKind,
    /// Description of every written image, `None` for audio-only exports.
    pub output: Option<ImageInfo>,
    /// The writer substituted the requested pixel type.
    pub substituted: bool,
    /// Iterations started (cancelled iterations excluded).
    pub iterations: u64,
    /// Video frames written.
    pub frames_written: u64,
    /// Final cursor.
    pub cursor: FrameCursor,
}

/// Start timecode written into the output: the in point's, or the timeline's global start.
pub fn start_timecode(start: RationalTime, global_start: Option<RationalTime>) -> Option<String> {
    if start.value() > 0.0 || global_start.is_some() {
        start
            .to_timecode()
            .or_else(|| global_start.and_then(RationalTime::to_timecode))
    } else {
        None
    }
}

fn is_quarter_turn(degrees: f64) -> bool {
    (degrees.rem_euclid(180.0) - 90.0).abs() < 1e-6
}

/// Size video is rendered at, before any annotation fitting.
fn render_size(
    source: Size,
    options: &SaveOptions,
    view: Option<&(dyn Viewport + '_)>,
) -> Size {
    let mut size = source;
    if options.annotations
        && let Some(view) = view
    {
        let view_size = view.render_size();
        if !view_size.is_degenerate() {
            size = view_size;
        }
        if is_quarter_turn(view.rotation()) {
            size = size.transposed();
            tracing::info!(%size, "rotated image info");
        }
    }
    let size = size.scaled_down(options.resolution.divisor());
    tracing::info!(%size, resolution = ?options.resolution, "render size");
    size
}

/// Output size and capture origin of an annotated export; puts the view into presentation mode.
fn layout_view(
    view: &mut ViewGuard<'_>,
    render_size: Size,
    options: &SaveOptions,
) -> (Size, (u32, u32)) {
    view.enter_presentation(options.show_video);
    let layout = annotation_layout(
        render_size,
        view.viewport_size(),
        view.pixels_per_unit(),
        options.resolution.zoom(),
    );
    match layout.zoom {
        Some(zoom) => {
            view.set_zoom(zoom);
            view.center_view();
        }
        None => {
            tracing::warn!("Image too big for Save Annotations. Will scale to the viewport size.");
            view.frame_view();
        }
    }
    tracing::info!(
        viewport = %view.viewport_size(),
        x = layout.x,
        y = layout.y,
        "annotation capture layout"
    );
    (layout.output_size, (layout.x, layout.y))
}

/// Produces one output image per iteration, from the offscreen target or the annotated view.
pub(crate) struct VideoPath {
    output: Image,
    buffer: Option<OffscreenBuffer>,
    capture_origin: Option<(u32, u32)>,
    draw: DrawOptions,
    tags: BTreeMap<String, String>,
}

impl VideoPath {
    /// Size the output for `source`, negotiate its pixel type with the destination's plugin and
    /// allocate the render target.
    ///
    /// Records the negotiated type under [`keys::EXR_PIXEL_TYPE`] and hides the view's HUD.
    pub(crate) fn prepare(
        backend: &mut dyn RenderBackend,
        mut view: Option<&mut ViewGuard<'_>>,
        source: ImageInfo,
        destination: &Destination,
        options: &SaveOptions,
        io_options: &mut IoOptions,
    ) -> BakeResult<(Self, Negotiated)> {
        if options.annotations && view.is_none() {
            return Err(BakeError::validation("annotation export needs a viewport"));
        }
        let render_size = render_size(source.size, options, view.as_deref().map(|v| &**v));

        let mut output_size = render_size;
        let mut origin = None;
        if options.annotations
            && let Some(view) = view.as_deref_mut()
        {
            let (size, xy) = layout_view(view, render_size, options);
            output_size = size;
            origin = Some(xy);
        }

        let agreed = writer::negotiate(
            destination,
            ImageInfo::new(output_size, source.pixel_type),
            options.annotations,
            options.exr_pixel_type,
            io_options,
        );
        tracing::info!(
            size = %agreed.info.size,
            pixel_type = %agreed.info.pixel_type,
            "output info"
        );
        io_options.set(keys::EXR_PIXEL_TYPE, agreed.info.pixel_type.label());
        if let Some(view) = view {
            view.hide_hud();
        }
        let path = Self::new(backend, render_size, &agreed, origin)?;
        Ok((path, agreed))
    }

    /// Validate the readback format and allocate the offscreen target when not capturing.
    fn new(
        backend: &mut dyn RenderBackend,
        render_size: Size,
        negotiated: &Negotiated,
        capture_origin: Option<(u32, u32)>,
    ) -> BakeResult<Self> {
        let pixel_type = negotiated.info.pixel_type;
        if read_pixels_format(pixel_type).is_none() {
            return Err(BakeError::invalid_pixel_format(format!(
                "no read pixels format and type for {pixel_type}"
            )));
        }
        if negotiated.info.size.is_degenerate() {
            return Err(BakeError::resource_allocation(format!(
                "degenerate output size {}",
                negotiated.info.size
            )));
        }
        let buffer = match capture_origin {
            Some(_) => None,
            None => {
                tracing::info!(color_type = %negotiated.buffer_color_type, "offscreen buffer info");
                Some(backend.create_offscreen(render_size, negotiated.buffer_color_type)?)
            }
        };
        Ok(Self {
            output: Image::new(negotiated.info),
            buffer,
            capture_origin,
            draw: DrawOptions::default(),
            tags: BTreeMap::new(),
        })
    }

    /// Render `frame` (the decoded image at `time`) into the output image.
    ///
    /// A missing frame leaves the previous output in place.
    pub(crate) fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: Option<&mut (dyn Viewport + '_)>,
        time: RationalTime,
        frame: Option<&Image>,
    ) -> BakeResult<()> {
        match frame {
            Some(frame) => self.tags = frame.tags().clone(),
            None => tracing::warn!("Empty video data at time {time}. Repeating frame."),
        }

        if let Some((x, y)) = self.capture_origin {
            let view = view.ok_or_else(|| BakeError::render("annotation capture needs a viewport"))?;
            view.redraw(time, frame)?;
            view.capture(x, y, &mut self.output)?;
            self.tags = view.tags();
            return Ok(());
        }

        let (Some(frame), Some(buffer)) = (frame, self.buffer.as_mut()) else {
            return Ok(());
        };
        {
            let mut binding = OffscreenBinding::bind(buffer)?;
            let _locale = NumericLocaleGuard::new(backend.numeric_locale());
            backend.draw_video(&mut binding, frame, &self.draw)?;
        }
        backend.read_pixels(buffer, &mut self.output)
    }

    /// The current output image, tagged for writing.
    pub(crate) fn tagged_output(&mut self) -> &Image {
        self.output.set_tags(self.tags.clone());
        &self.output
    }
}

struct Plan {
    range: ResolvedRange,
    kind: SaveKind,
    audio: Option<(AudioInfo, TimeRange)>,
    annotations: bool,
    destination: Destination,
    negotiated: Option<Negotiated>,
}

/// The export loop.
///
/// Created by [`FrameStepper::prepare`] in the `Stepping` state; each [`FrameStepper::step`] runs
/// one iteration (progress, audio, video, advance). Dropping the stepper in any state releases
/// the offscreen buffer, drops the writer and restores view and player state.
pub struct FrameStepper<'c> {
    state: ExportState,
    plan: Plan,
    cursor: FrameCursor,
    sample_position: u64,
    iterations: u64,
    frames_written: u64,
    writer: Option<Box<dyn Writer>>,
    video: Option<VideoPath>,
    backend: &'c mut dyn RenderBackend,
    progress: &'c mut dyn Progress,
    view: Option<ViewGuard<'c>>,
    player: PlayerGuard<'c>,
}

impl<'c> FrameStepper<'c> {
    /// Resolve the range, open the writer and allocate render targets.
    pub fn prepare(ctx: &'c mut ExportContext<'_>, request: &ExportRequest) -> BakeResult<Self> {
        let ExportContext {
            player,
            backend,
            registry,
            viewport,
            progress,
        } = ctx;
        tracing::debug!(state = ?ExportState::Initializing);

        let mut player = PlayerGuard::new(&mut **player);
        let mut view = viewport.as_deref_mut().map(|v| ViewGuard::new(v));
        let options = &request.options;

        let in_out = player.in_out_range();
        let requested = MediaPath::parse(&request.path);
        let want_video = options.save_video && !registry.is_audio(&requested);
        let range = resolve(player.time_range(), in_out, player.io_info(), want_video)?;

        let mut io_options = base_io_options(&*player, registry, options);
        let destination =
            writer::select_writer(registry, &request.path, player.path(), options.profile)?;
        let kind = SaveKind::classify(
            destination.file_type,
            range.has_video,
            range.has_audio(),
            options.audio_codec,
        )?;
        let audio = match (player.io_info().audio, range.audio_time) {
            (Some(info), Some(time)) if kind.writes_audio() => Some((info, time)),
            _ => None,
        };
        tracing::info!(path = %destination.path, ?kind, "saving");

        let source_video = player.io_info().video.first().copied();
        let mut negotiated = None;
        let mut video = None;
        player.go_to_start();
        if let Some(source) = source_video.filter(|_| range.has_video) {
            let (path, agreed) = VideoPath::prepare(
                &mut **backend,
                view.as_mut(),
                source,
                &destination,
                options,
                &mut io_options,
            )?;
            video = Some(path);
            negotiated = Some(agreed);
        }

        let mut io_info = IoInfo {
            video: negotiated.iter().map(|n| n.info).collect(),
            video_time: range.video_time,
            ..IoInfo::default()
        };
        if let Some((info, time)) = audio {
            io_info.audio = Some(info);
            io_info.audio_time = time;
        }
        let writer = writer::open(&destination, &io_info, &io_options)?;

        progress.show(
            &kind.title(range.start_frame(), range.end_frame()),
            range.start_frame(),
            range.end_frame(),
        );
        player.wait_for_frame(range.start)?;
        player.set_cursor(range.start);

        Ok(Self {
            state: ExportState::Stepping,
            cursor: FrameCursor {
                current_time: range.start,
                total_samples_written: 0,
            },
            sample_position: range.start_audio_sample,
            iterations: 0,
            frames_written: 0,
            writer: Some(writer),
            video,
            backend: &mut **backend,
            progress: &mut **progress,
            view,
            player,
            plan: Plan {
                range,
                kind,
                audio,
                annotations: options.annotations,
                destination,
                negotiated,
            },
        })
    }

    /// Current state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Current cursor.
    pub fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    /// Resolved export range.
    pub fn range(&self) -> &ResolvedRange {
        &self.plan.range
    }

    /// Run one iteration; a no-op once a terminal state is reached.
    pub fn step(&mut self) -> BakeResult<ExportState> {
        if self.state != ExportState::Stepping {
            return Ok(self.state);
        }
        match self.iterate() {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(err) => {
                self.state = ExportState::Failed;
                tracing::error!(time = %self.cursor.current_time, error = %err, "export failed");
                Err(err)
            }
        }
    }

    /// Step until a terminal state, then finish the writer.
    pub fn run(mut self) -> BakeResult<ExportSummary> {
        while self.step()? == ExportState::Stepping {}

        if self.state == ExportState::Cancelled {
            tracing::info!(time = %self.cursor.current_time, "export cancelled");
        }
        if let Some(writer) = self.writer.take()
            && let Err(err) = writer.finish()
        {
            self.state = ExportState::Failed;
            tracing::error!(error = %err, "closing the writer failed");
            return Err(err);
        }

        let summary = ExportSummary {
            state: self.state,
            path: self.plan.destination.path.to_path_buf(),
            kind: self.plan.kind,
            output: self.plan.negotiated.map(|n| n.info),
            substituted: self.plan.negotiated.is_some_and(|n| n.substituted),
            iterations: self.iterations,
            frames_written: self.frames_written,
            cursor: self.cursor,
        };
        tracing::info!(
            state = ?summary.state,
            frames = summary.frames_written,
            samples = summary.cursor.total_samples_written,
            "export finished"
        );
        Ok(summary)
    }

    fn iterate(&mut self) -> BakeResult<ExportState> {
        let time = self.cursor.current_time;
        if !self.progress.tick(time) {
            return Ok(ExportState::Cancelled);
        }
        self.iterations += 1;

        if self.plan.audio.is_some() {
            self.step_audio(time)?;
        }
        if self.video.is_some() {
            self.step_video(time)?;
        }

        let next = time + self.plan.range.step_duration();
        self.cursor.current_time = next;
        self.player.set_cursor(next);
        if next > self.plan.range.end {
            return Ok(ExportState::Completed);
        }
        if !self.plan.range.has_video {
            self.player.seek(next);
        } else if self.plan.annotations {
            self.player.frame_next();
        }
        Ok(ExportState::Stepping)
    }

    fn step_audio(&mut self, time: RationalTime) -> BakeResult<()> {
        let Some((info, audio_time)) = self.plan.audio else {
            return Ok(());
        };
        let seconds = time.to_seconds();
        let Some(layer) = self.player.audio(seconds)?.into_iter().next() else {
            return Ok(());
        };

        let range = if self.plan.range.has_video {
            TimeRange::new(time, RationalTime::new(1.0, time.rate()))
        } else {
            TimeRange::new(RationalTime::from_seconds(seconds), RationalTime::from_seconds(1.0))
        };
        let sample_rate = self.plan.range.sample_rate;
        let mut audio =
            layer.unwrap_or_else(|| AudioBuffer::silence(info, info.sample_rate as usize));
        let current_audio_time = time.rescaled_to(sample_rate);

        let mut skip = false;
        if current_audio_time.value().round() >= self.sample_position as f64 {
            let count = audio.sample_count() as u64;
            if self.sample_position + count >= self.plan.range.end_audio_sample_count {
                let budget = self.plan.range.max_audio_sample_count as i64
                    - self.cursor.total_samples_written as i64;
                if budget > 0 {
                    audio = audio.truncated((budget as u64).min(count) as usize);
                } else {
                    skip = true;
                }
            }
        } else {
            skip = true;
        }

        if !skip && audio_time.contains(current_audio_time) {
            self.writer
                .as_mut()
                .ok_or_else(|| BakeError::writer("writer already closed"))?
                .write_audio(range, &audio)?;
            let count = audio.sample_count() as u64;
            self.sample_position += count;
            self.cursor.total_samples_written += count;
        }
        Ok(())
    }

    fn step_video(&mut self, time: RationalTime) -> BakeResult<()> {
        let frame = self.player.video(time)?;
        let Some(video) = self.video.as_mut() else {
            return Ok(());
        };
        video.render(
            &mut *self.backend,
            self.view.as_deref_mut(),
            time,
            frame.as_ref(),
        )?;

        if self.plan.range.video_time.contains(time) {
            self.writer
                .as_mut()
                .ok_or_else(|| BakeError::writer("writer already closed"))?
                .write_video(time, video.tagged_output())?;
            self.frames_written += 1;
        }
        Ok(())
    }
}

/// Writer options shared by movie and frame exports.
pub(crate) fn base_io_options(
    player: &dyn TimelinePlayer,
    registry: &PluginRegistry,
    options: &SaveOptions,
) -> IoOptions {
    let mut io_options = options.io_options();
    let speed = player.speed();
    if !registry.is_movie(&MediaPath::parse(player.path())) {
        io_options.set(keys::FFMPEG_SPEED, speed);
    }
    io_options.set(keys::EXR_SPEED, speed);
    let start = player.in_out_range().start_time();
    if let Some(timecode) = start_timecode(start, player.global_start_time()) {
        io_options.set(keys::TIMECODE, timecode);
    }
    io_options
}

/// Export the player's in/out range to `request.path`.
///
/// Errors are logged here and returned; a cancelled export is not an error.
#[tracing::instrument(skip(ctx, request), fields(path = %request.path.display()))]
pub fn export_movie(
    ctx: &mut ExportContext<'_>,
    request: &ExportRequest,
) -> BakeResult<ExportSummary> {
    let stepper = match FrameStepper::prepare(ctx, request) {
        Ok(stepper) => stepper,
        Err(err) => {
            tracing::error!(error = %err, "export setup failed");
            return Err(err);
        }
    };
    stepper.run()
}

#[cfg(test)]
#[path = "../../tests/unit/export/stepper.rs"]
mod tests;
