use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use stacked_cards::{
    FfmpegSink, FrameIndex, FrameRange, PngSequenceSink, StageConfig, StageSession,
    StageSessionOpts,
};

#[derive(Parser, Debug)]
#[command(name = "stacked-cards", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Stage configuration JSON. The built-in demo is used when omitted.
    #[arg(long = "in", global = true)]
    in_path: Option<PathBuf>,

    /// Start with the rotation switch off.
    #[arg(long, global = true, default_value_t = false)]
    no_rotation: bool,

    /// Start with the scroll indicator switch on.
    #[arg(long, global = true, default_value_t = false)]
    indicators: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a PNG sequence into a directory.
    Frames(FramesArgs),
    /// Print per-card geometry for a frame as JSON.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Rasterize every frame even when it repeats the previous one.
    #[arg(long, default_value_t = false)]
    no_elision: bool,

    /// Stop before this frame instead of at the end of the timeline.
    #[arg(long)]
    end: Option<u64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    let cfg = load_config(&cli.global)?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(cfg, args),
        Command::Render(args) => cmd_render(cfg, args),
        Command::Frames(args) => cmd_frames(cfg, args),
        Command::Probe(args) => cmd_probe(cfg, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<StageConfig> {
    let mut cfg = match &global.in_path {
        Some(path) => StageConfig::from_path(path)
            .with_context(|| format!("load stage config '{}'", path.display()))?,
        None => StageConfig::default(),
    };
    if global.no_rotation {
        cfg.toggles.rotation_enabled = false;
    }
    if global.indicators {
        cfg.toggles.show_indicators = true;
    }
    Ok(cfg)
}

fn session_opts(args: &RangeArgs) -> StageSessionOpts {
    StageSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        static_frame_elision: !args.no_elision,
        ..StageSessionOpts::default()
    }
}

fn frame_range(sess: &StageSession, end: Option<u64>) -> FrameRange {
    FrameRange::leading(sess.duration(), end)
}

fn cmd_frame(cfg: StageConfig, args: FrameArgs) -> anyhow::Result<()> {
    let sess = StageSession::new(cfg, StageSessionOpts::default())?;
    let frame = sess.render_frame(FrameIndex(args.frame))?;
    stacked_cards::write_png(&args.out, &frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(cfg: StageConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut sink = FfmpegSink::for_stage(&cfg, &args.out, !args.no_overwrite)?;
    let sess = StageSession::new(cfg, session_opts(&args.range))?;
    let range = frame_range(&sess, args.range.end);
    let stats = sess.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames, {} rendered)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_frames(cfg: StageConfig, args: FramesArgs) -> anyhow::Result<()> {
    let sess = StageSession::new(cfg, session_opts(&args.range))?;
    let range = frame_range(&sess, args.range.end);

    let mut sink = PngSequenceSink::new(&args.out_dir);
    let stats = sess.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_total,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_probe(cfg: StageConfig, args: ProbeArgs) -> anyhow::Result<()> {
    let sess = StageSession::new(cfg, StageSessionOpts::default())?;
    let probe = sess.probe(FrameIndex(args.frame))?;
    println!("{}", serde_json::to_string_pretty(&probe)?);
    Ok(())
}
