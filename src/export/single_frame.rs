use std::path::{Path, PathBuf};

use crate::export::ExportContext;
use crate::export::guard::{PlayerGuard, ViewGuard};
use crate::export::progress::SaveKind;
use crate::export::request::SaveOptions;
use crate::export::stepper::{VideoPath, base_io_options};
use crate::export::writer;
use crate::foundation::core::ImageInfo;
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::{FileType, IoInfo, MediaPath};

/// Result of saving one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSummary {
    /// Timeline time of the saved frame.
    pub time: RationalTime,
    /// Where the frame ended up.
    pub path: PathBuf,
    /// Description of the written image.
    pub output: ImageInfo,
    /// The numbered output was renamed to the requested path.
    pub renamed: bool,
}

/// Save the frame under the playhead to `path`.
///
/// Image sequence writers number their output by frame; the numbered file is renamed to `path`
/// afterwards unless `options.no_rename` is set. A failed rename is logged and the numbered file
/// is kept.
#[tracing::instrument(skip(ctx, options), fields(path = %path.display()))]
pub fn save_single_frame(
    ctx: &mut ExportContext<'_>,
    path: &Path,
    options: &SaveOptions,
) -> BakeResult<FrameSummary> {
    save_frame(ctx, path, options, !options.no_rename).inspect_err(|err| {
        tracing::error!(error = %err, "saving frame failed");
    })
}

/// Save the frames at `times` as a numbered sequence next to `path`.
///
/// Returns the number of frames written; stops early when progress reports a cancellation. The
/// playhead is returned to where it was.
#[tracing::instrument(skip(ctx, times, options), fields(path = %path.display(), frames = times.len()))]
pub fn save_multiple_frames(
    ctx: &mut ExportContext<'_>,
    path: &Path,
    times: &[RationalTime],
    options: &SaveOptions,
) -> BakeResult<usize> {
    if !ctx.registry.is_sequence(&MediaPath::parse(path)) {
        let err = BakeError::unsupported_format(format!(
            "{}: multiple frames need an image sequence format",
            path.display()
        ));
        tracing::error!(error = %err, "saving frames failed");
        return Err(err);
    }
    let (Some(first), Some(last)) = (times.first(), times.last()) else {
        return Ok(0);
    };
    let title = SaveKind::Pictures.title(first.to_frames(), last.to_frames());
    ctx.progress.show(&title, first.to_frames(), last.to_frames());

    let home = ctx.player.current_time();
    let mut written = 0;
    let mut failure = None;
    for &time in times {
        if !ctx.progress.tick(time) {
            tracing::info!(%time, "saving frames cancelled");
            break;
        }
        if let Err(err) = save_at(ctx, path, options, time) {
            failure = Some(err);
            break;
        }
        written += 1;
    }
    ctx.player.seek(home);

    match failure {
        None => Ok(written),
        Some(err) => {
            tracing::error!(error = %err, written, "saving frames failed");
            Err(err)
        }
    }
}

fn save_at(
    ctx: &mut ExportContext<'_>,
    path: &Path,
    options: &SaveOptions,
    time: RationalTime,
) -> BakeResult<()> {
    ctx.player.seek(time);
    ctx.player.wait_for_frame(time)?;
    save_frame(ctx, path, options, false).map(|_| ())
}

fn save_frame(
    ctx: &mut ExportContext<'_>,
    path: &Path,
    options: &SaveOptions,
    rename: bool,
) -> BakeResult<FrameSummary> {
    let ExportContext {
        player,
        backend,
        registry,
        viewport,
        ..
    } = ctx;
    let mut player = PlayerGuard::new(&mut **player);
    let mut view = viewport.as_deref_mut().map(|v| ViewGuard::new(v));
    let time = player.current_time();
    player.set_cursor(time);

    let source = player
        .io_info()
        .video
        .first()
        .copied()
        .ok_or_else(|| BakeError::empty_media("no video to save a frame from"))?;
    let destination = writer::select_writer(registry, path, player.path(), options.profile)?;
    if destination.file_type == FileType::Audio {
        return Err(BakeError::unsupported_format(format!(
            "{}: cannot save a frame to an audio file",
            destination.path
        )));
    }

    let mut io_options = base_io_options(&*player, registry, options);
    let (mut video, negotiated) = VideoPath::prepare(
        &mut **backend,
        view.as_mut(),
        source,
        &destination,
        options,
        &mut io_options,
    )?;
    let io_info = IoInfo {
        video: vec![negotiated.info],
        video_time: TimeRange::new(time, RationalTime::new(1.0, time.rate())),
        ..IoInfo::default()
    };
    let mut writer = writer::open(&destination, &io_info, &io_options)?;

    player.wait_for_frame(time)?;
    let frame = player.video(time)?;
    video.render(&mut **backend, view.as_deref_mut(), time, frame.as_ref())?;
    writer.write_video(time, video.tagged_output())?;
    writer.finish()?;

    let (path, renamed) = match destination.file_type {
        FileType::Sequence => {
            let numbered = destination.path.frame_path(time.to_frames());
            let requested = destination.path.to_path_buf();
            if rename && numbered != requested {
                match std::fs::rename(&numbered, &requested) {
                    Ok(()) => (requested, true),
                    Err(err) => {
                        tracing::error!(
                            from = %numbered.display(),
                            to = %requested.display(),
                            error = %err,
                            "could not rename saved frame"
                        );
                        (numbered, false)
                    }
                }
            } else {
                (numbered, false)
            }
        }
        _ => (destination.path.to_path_buf(), false),
    };
    tracing::info!(path = %path.display(), %time, "saved frame");

    Ok(FrameSummary {
        time,
        path,
        output: negotiated.info,
        renamed,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/single_frame.rs"]
mod tests;
