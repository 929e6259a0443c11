use std::io::{BufWriter, Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tempfile::NamedTempFile;

use crate::audio::{AudioBuffer, AudioInfo};
use crate::foundation::core::{Endian, Image, ImageInfo, PixelType};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::info::IoInfo;
use crate::io::options::{IoOptions, keys};
use crate::io::path::MediaPath;
use crate::io::plugin::{FileType, Writer, WriterPlugin};
use crate::io::profile::{AudioCodec, Profile};

const EXTENSIONS: &[(&str, FileType)] = &[
    (".mov", FileType::Movie),
    (".mp4", FileType::Movie),
    (".m4v", FileType::Movie),
    (".mkv", FileType::Movie),
    (".webm", FileType::Movie),
    (".avi", FileType::Movie),
    (".mxf", FileType::Movie),
    (".wav", FileType::Audio),
    (".aiff", FileType::Audio),
    (".mp3", FileType::Audio),
    (".aac", FileType::Audio),
    (".flac", FileType::Audio),
    (".ogg", FileType::Audio),
    (".opus", FileType::Audio),
    (".m4a", FileType::Audio),
];

/// Movie and audio writer driving the system `ffmpeg` binary.
///
/// Video frames are streamed as raw pixels to `ffmpeg`'s stdin. Audio is spooled to a temporary
/// `f32le` file and muxed in a second pass when the writer finishes.
#[derive(Debug, Default)]
pub struct FfmpegPlugin;

impl FfmpegPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self
    }
}

impl WriterPlugin for FfmpegPlugin {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn extensions(&self) -> &[(&'static str, FileType)] {
        EXTENSIONS
    }

    fn write_info(&self, info: &ImageInfo, _options: &IoOptions) -> Option<ImageInfo> {
        use PixelType::*;
        let pixel_type = match info.pixel_type {
            LU8 | LU16 | RgbU8 | RgbU16 | RgbaU8 | RgbaU16 => info.pixel_type,
            RgbF16 | RgbF32 => RgbU16,
            RgbaF16 | RgbaF32 => RgbaU16,
            _ => return None,
        };
        Some(ImageInfo::new(info.size, pixel_type))
    }

    fn write(
        &self,
        path: &MediaPath,
        info: &IoInfo,
        options: &IoOptions,
    ) -> BakeResult<Box<dyn Writer>> {
        if !is_ffmpeg_on_path() {
            return Err(BakeError::writer_open(
                "ffmpeg is required for movie and audio output, but was not found on PATH",
            ));
        }
        FfmpegWriter::open(path, info, options).map(|w| Box::new(w) as Box<dyn Writer>)
    }
}

struct VideoPipe {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    info: ImageInfo,
    target: PathBuf,
}

impl VideoPipe {
    fn wait(mut self) -> BakeResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| BakeError::writer(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BakeError::writer("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| BakeError::writer(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(BakeError::writer(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

struct AudioSpool {
    info: AudioInfo,
    codec: AudioCodec,
    file: BufWriter<NamedTempFile>,
    samples: u64,
}

struct FfmpegWriter {
    out_path: PathBuf,
    video: Option<VideoPipe>,
    audio: Option<AudioSpool>,
    last_time: Option<RationalTime>,
    scratch: Vec<u8>,
    finished: bool,
}

impl FfmpegWriter {
    fn open(path: &MediaPath, info: &IoInfo, options: &IoOptions) -> BakeResult<Self> {
        let out_path = path.to_path_buf();
        ensure_parent_dir(&out_path).map_err(|e| BakeError::writer_open(e.to_string()))?;

        let extension = path.extension_lower();
        let codec = options
            .get(keys::FFMPEG_AUDIO_CODEC)
            .map(str::parse::<AudioCodec>)
            .transpose()
            .map_err(|e| BakeError::writer_open(e.to_string()))?
            .unwrap_or_default();
        let container_codec = codec.for_container(&extension);
        if container_codec != codec {
            tracing::error!(
                requested = %codec,
                using = %container_codec,
                extension = %extension,
                "invalid audio codec for container, switching"
            );
        }

        let audio = match info.audio {
            Some(a) if a.is_valid() && container_codec != AudioCodec::None => {
                Some(open_audio_spool(a, container_codec)?)
            }
            _ => None,
        };

        let video = match info.video.first() {
            Some(image_info) => Some(open_video_pipe(
                &out_path,
                *image_info,
                info,
                options,
                audio.is_some(),
            )?),
            None if audio.is_none() => {
                return Err(BakeError::writer_open(format!(
                    "{path}: nothing to write (no video and no audio)"
                )));
            }
            None => None,
        };

        tracing::info!(
            path = %out_path.display(),
            video = video.is_some(),
            audio = audio.is_some(),
            "ffmpeg writer opened"
        );
        Ok(Self {
            out_path,
            video,
            audio,
            last_time: None,
            scratch: Vec::new(),
            finished: false,
        })
    }

    fn close(&mut self) -> BakeResult<()> {
        let video_target = match self.video.take() {
            Some(pipe) => {
                let target = pipe.target.clone();
                pipe.wait()?;
                Some(target)
            }
            None => None,
        };

        let Some(mut audio) = self.audio.take() else {
            return Ok(());
        };
        audio
            .file
            .flush()
            .map_err(|e| BakeError::writer(format!("failed to flush audio spool: {e}")))?;

        if audio.samples == 0 {
            if let Some(target) = video_target.filter(|t| *t != self.out_path) {
                std::fs::rename(&target, &self.out_path)?;
            }
            return Ok(());
        }

        let spool = audio.file.get_ref().path().to_path_buf();
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"]);
        if let Some(target) = video_target.as_ref() {
            cmd.arg("-i").arg(target);
        }
        cmd.args([
            "-f",
            "f32le",
            "-ar",
            &audio.info.sample_rate.to_string(),
            "-ac",
            &audio.info.channels.to_string(),
            "-i",
        ])
        .arg(&spool);
        if video_target.is_some() {
            cmd.args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"]);
        }
        if let Some(encoder) = audio.codec.encoder() {
            cmd.args(["-c:a", encoder]);
        }
        cmd.arg(&self.out_path);
        run_to_completion(cmd)?;

        if let Some(target) = video_target.filter(|t| *t != self.out_path) {
            let _ = std::fs::remove_file(target);
        }
        tracing::debug!(samples = audio.samples, "muxed audio");
        Ok(())
    }
}

impl Writer for FfmpegWriter {
    fn write_video(&mut self, time: RationalTime, image: &Image) -> BakeResult<()> {
        let Some(pipe) = self.video.as_mut() else {
            return Err(BakeError::writer("ffmpeg writer has no video stream"));
        };
        if let Some(last) = self.last_time
            && time <= last
        {
            return Err(BakeError::writer(
                "ffmpeg writer received out-of-order frame time",
            ));
        }
        if image.size() != pipe.info.size || image.pixel_type() != pipe.info.pixel_type {
            return Err(BakeError::writer(format!(
                "frame mismatch: got {}, expected {}",
                image.info(),
                pipe.info
            )));
        }
        self.last_time = Some(time);

        self.scratch = crate::io::tight_rows(image)?;
        let Some(stdin) = pipe.stdin.as_mut() else {
            return Err(BakeError::writer("ffmpeg writer is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            BakeError::writer(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn write_audio(&mut self, _range: TimeRange, audio: &AudioBuffer) -> BakeResult<()> {
        let Some(spool) = self.audio.as_mut() else {
            return Ok(());
        };
        if audio.info() != spool.info {
            return Err(BakeError::writer(format!(
                "audio mismatch: got {} ch @ {} Hz, expected {} ch @ {} Hz",
                audio.info().channels,
                audio.info().sample_rate,
                spool.info.channels,
                spool.info.sample_rate
            )));
        }
        spool
            .file
            .write_all(&audio.to_f32le_bytes())
            .map_err(|e| BakeError::writer(format!("failed to spool audio: {e}")))?;
        spool.samples += audio.sample_count() as u64;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> BakeResult<()> {
        self.finished = true;
        self.close()
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.close() {
            tracing::warn!(path = %self.out_path.display(), error = %err, "ffmpeg writer closed with error");
        }
    }
}

fn open_audio_spool(info: AudioInfo, codec: AudioCodec) -> BakeResult<AudioSpool> {
    let file = tempfile::Builder::new()
        .prefix("framebake_audio_")
        .suffix(".f32le")
        .tempfile()
        .map_err(|e| BakeError::writer_open(format!("failed to create audio spool: {e}")))?;
    tracing::debug!(spool = %file.path().display(), "audio spool");
    Ok(AudioSpool {
        info,
        codec,
        file: BufWriter::new(file),
        samples: 0,
    })
}

fn open_video_pipe(
    out_path: &Path,
    image_info: ImageInfo,
    info: &IoInfo,
    options: &IoOptions,
    mux_audio_later: bool,
) -> BakeResult<VideoPipe> {
    let input_fmt = raw_pix_fmt(image_info.pixel_type, image_info.layout.endian).ok_or_else(|| {
        BakeError::writer_open(format!(
            "{}: unsupported video {}",
            out_path.display(),
            image_info.pixel_type
        ))
    })?;
    let profile = options
        .get(keys::FFMPEG_WRITE_PROFILE)
        .map(str::parse::<Profile>)
        .transpose()
        .map_err(|e| BakeError::writer_open(e.to_string()))?
        .unwrap_or_default();

    let mut rate = info.video_time.duration().rate();
    // Speed only overrides the rate when no audio has to stay in sync.
    if !mux_audio_later
        && let Some(speed) = options.get_parsed::<f64>(keys::FFMPEG_SPEED)
        && speed > 0.0
    {
        rate = speed;
    }

    let target = if mux_audio_later {
        video_only_path(out_path)
    } else {
        out_path.to_path_buf()
    };

    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd.args([
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        input_fmt,
        "-s",
        &image_info.size.to_string(),
        "-r",
        &rate.to_string(),
        "-i",
        "pipe:0",
        "-an",
    ]);
    if let Some(threads) = options.get_parsed::<u32>(keys::FFMPEG_THREAD_COUNT) {
        cmd.args(["-threads", &threads.to_string()]);
    }
    cmd.args(profile.codec_args(options.flag(keys::FFMPEG_HARDWARE_ENCODE)));

    let pix_fmt = options
        .get(keys::FFMPEG_PIXEL_FORMAT)
        .filter(|s| !s.trim().is_empty())
        .map(output_pix_fmt)
        .unwrap_or_else(|| {
            profile
                .default_pix_fmt(image_info.pixel_type.has_alpha())
                .to_owned()
        });
    cmd.args(["-pix_fmt", &pix_fmt]);

    for (key, flag) in [
        (keys::FFMPEG_COLOR_RANGE, "-color_range"),
        (keys::FFMPEG_COLOR_SPACE, "-colorspace"),
        (keys::FFMPEG_COLOR_PRIMARIES, "-color_primaries"),
        (keys::FFMPEG_COLOR_TRC, "-color_trc"),
    ] {
        if let Some(v) = options.get(key).filter(|v| !v.is_empty()) {
            cmd.args([flag, v]);
        }
    }
    if let Some(preset) = options.get(keys::FFMPEG_PRESET_FILE) {
        cmd.args(read_preset_args(Path::new(preset))?);
    }
    if let Some(tc) = options
        .get(keys::TIMECODE)
        .or_else(|| info.tags.get(keys::TIMECODE).map(String::as_str))
    {
        cmd.args(["-timecode", tc]);
    }
    cmd.arg(&target);

    tracing::debug!(?cmd, "spawning ffmpeg");
    let mut child = cmd.spawn().map_err(|e| {
        BakeError::writer_open(format!(
            "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| BakeError::writer_open("failed to open ffmpeg stdin (unexpected)"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| BakeError::writer_open("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes)?;
        Ok(stderr_bytes)
    });

    Ok(VideoPipe {
        child,
        stdin: Some(stdin),
        stderr_drain: Some(stderr_drain),
        info: image_info,
        target,
    })
}

fn raw_pix_fmt(pixel_type: PixelType, endian: Endian) -> Option<&'static str> {
    let le = endian == Endian::Lsb;
    Some(match pixel_type {
        PixelType::LU8 => "gray",
        PixelType::LU16 if le => "gray16le",
        PixelType::LU16 => "gray16be",
        PixelType::RgbU8 => "rgb24",
        PixelType::RgbU16 if le => "rgb48le",
        PixelType::RgbU16 => "rgb48be",
        PixelType::RgbaU8 => "rgba",
        PixelType::RgbaU16 if le => "rgba64le",
        PixelType::RgbaU16 => "rgba64be",
        _ => return None,
    })
}

/// Map a pixel format option such as `YUV_420P` or `RGBA_U8` to an `ffmpeg` name.
pub(crate) fn output_pix_fmt(value: &str) -> String {
    let name: String = value
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    match name.as_str() {
        "rgbu8" => "rgb24".to_owned(),
        "rgbau8" => "rgba".to_owned(),
        _ => name,
    }
}

/// Read `key=value` lines from an encoder preset file into `-key value` arguments.
fn read_preset_args(path: &Path) -> BakeResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        BakeError::writer_open(format!(
            "failed to read preset '{}': {e}",
            path.display()
        ))
    })?;
    let mut args = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            tracing::warn!(line, "ignoring malformed preset line");
            continue;
        };
        args.push(format!("-{}", key.trim()));
        args.push(value.trim().to_owned());
    }
    Ok(args)
}

fn video_only_path(out_path: &Path) -> PathBuf {
    let name = out_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_path.with_file_name(format!(".video_{name}"))
}

fn run_to_completion(mut cmd: Command) -> BakeResult<()> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| BakeError::writer(format!("failed to spawn ffmpeg: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BakeError::writer(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> BakeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/io/ffmpeg.rs"]
mod tests;
