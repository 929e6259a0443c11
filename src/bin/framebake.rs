use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use framebake::annotation::AnnotationSet;
use framebake::config::{load_annotations, load_save_options};
use framebake::{
    AudioInfo, CpuBackend, ExportContext, ExportRequest, LogProgress, PluginRegistry,
    RationalTime, SaveOptions, Size, SoftwareViewport, TestPatternPlayer, TimelinePlayer,
};

#[derive(Parser, Debug)]
#[command(name = "framebake", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the test-pattern timeline's in/out range as a movie, audio file or image sequence.
    Movie(MovieArgs),
    /// Save a single frame of the test-pattern timeline.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Frame size as WIDTHxHEIGHT.
    #[arg(long, default_value = "320x180", value_parser = parse_size)]
    size: Size,

    /// Frame rate.
    #[arg(long, default_value_t = 24.0)]
    rate: f64,

    /// First frame of the timeline.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Timeline length in frames.
    #[arg(long, default_value_t = 48.0)]
    frames: f64,

    /// First exported frame (defaults to the timeline start).
    #[arg(long)]
    in_point: Option<f64>,

    /// Last exported frame, inclusive (defaults to the timeline end).
    #[arg(long)]
    out_point: Option<f64>,

    /// Add a sine tone at this sample rate.
    #[arg(long)]
    audio_rate: Option<u32>,

    /// Timeline without a video track.
    #[arg(long)]
    no_video: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path; the extension selects the writer.
    #[arg(long)]
    out: PathBuf,

    /// Save options JSON.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Annotations JSON to burn in through a software viewport.
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Viewport size used for annotation capture, as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720", value_parser = parse_size)]
    viewport: Size,
}

#[derive(Args, Debug)]
struct MovieArgs {
    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Frame to save.
    #[arg(long)]
    at: f64,

    /// Keep the frame-numbered file name.
    #[arg(long)]
    no_rename: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);
    match cli.cmd {
        Command::Movie(args) => cmd_movie(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_logging(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let w = w.trim().parse().map_err(|e| format!("width '{w}': {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("height '{h}': {e}"))?;
    Ok(Size::new(w, h))
}

fn build_player(source: &SourceArgs) -> anyhow::Result<TestPatternPlayer> {
    let mut builder = TestPatternPlayer::builder()
        .size(source.size)
        .rate(source.rate)
        .frames(source.start, source.frames);
    if source.in_point.is_some() || source.out_point.is_some() {
        let first = source.in_point.unwrap_or(source.start);
        let last = source
            .out_point
            .unwrap_or(source.start + source.frames - 1.0);
        if last < first {
            anyhow::bail!("out point {last} is before in point {first}");
        }
        builder = builder.in_out(first, last - first + 1.0);
    }
    if let Some(rate) = source.audio_rate {
        builder = builder.audio(AudioInfo::new(2, rate));
    }
    if source.no_video {
        builder = builder.without_video();
    }
    Ok(builder.build()?)
}

fn read_options(output: &OutputArgs) -> anyhow::Result<(SaveOptions, Option<AnnotationSet>)> {
    let mut options = match &output.options {
        Some(path) => load_save_options(path)
            .with_context(|| format!("load save options '{}'", path.display()))?,
        None => SaveOptions::default(),
    };
    let annotations = output
        .annotations
        .as_deref()
        .map(load_annotations)
        .transpose()
        .context("load annotations")?;
    if annotations.is_some() {
        options.annotations = true;
    }
    Ok((options, annotations))
}

fn viewport(output: &OutputArgs, annotations: Option<AnnotationSet>) -> Option<SoftwareViewport> {
    annotations.map(|set| SoftwareViewport::new(output.viewport).with_annotations(set))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_movie(args: MovieArgs) -> anyhow::Result<()> {
    let mut player = build_player(&args.source)?;
    let (options, annotations) = read_options(&args.output)?;
    let mut view = viewport(&args.output, annotations);
    ensure_parent(&args.output.out)?;

    let registry = PluginRegistry::with_defaults();
    let mut backend = CpuBackend::default();
    let mut progress = LogProgress::new();
    let mut ctx = ExportContext::new(&mut player, &mut backend, &registry, &mut progress);
    if let Some(view) = view.as_mut() {
        ctx = ctx.with_viewport(view);
    }

    let request = ExportRequest::new(&args.output.out).with_options(options);
    let summary = framebake::export_movie(&mut ctx, &request)?;
    eprintln!(
        "{:?}: {} frames, {} audio samples -> {}",
        summary.state,
        summary.frames_written,
        summary.cursor.total_samples_written,
        summary.path.display()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut player = build_player(&args.source)?;
    player.seek(RationalTime::new(args.at, args.source.rate));
    let (mut options, annotations) = read_options(&args.output)?;
    options.no_rename |= args.no_rename;
    let mut view = viewport(&args.output, annotations);
    ensure_parent(&args.output.out)?;

    let registry = PluginRegistry::with_defaults();
    let mut backend = CpuBackend::default();
    let mut progress = LogProgress::new();
    let mut ctx = ExportContext::new(&mut player, &mut backend, &registry, &mut progress);
    if let Some(view) = view.as_mut() {
        ctx = ctx.with_viewport(view);
    }

    let summary = framebake::save_single_frame(&mut ctx, &args.output.out, &options)?;
    eprintln!("wrote {}", summary.path.display());
    Ok(())
}
