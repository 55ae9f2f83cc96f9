use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use framescrub::{
    DrawOutcome, FrameIndex, FrameLoader, FrameRenderer, FrameSequence, FsFetcher, PageConfig,
    PixmapCanvas, PlayerState, ScrollPlayer, SequenceStore, SimulatedHost, Size, Surface,
    Viewport, frame_index_for_progress,
};

#[derive(Parser, Debug)]
#[command(name = "framescrub", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the sequence catalog.
    Sequences(SequencesArgs),
    /// Print every beat's visual at a progress value as JSON.
    Beats(BeatsArgs),
    /// Draw the frame for one progress value as a PNG.
    Frame(FrameArgs),
    /// Scroll the simulated page top to bottom and write one PNG per redraw.
    Sweep(SweepArgs),
}

#[derive(Parser, Debug)]
struct SequencesArgs {
    /// Page config JSON (defaults to the built-in page).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BeatsArgs {
    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Page config JSON (defaults to the built-in page).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Directory frame locators resolve against.
    #[arg(long)]
    assets: PathBuf,

    /// Sequence id.
    #[arg(long)]
    sequence: u32,

    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Canvas width in logical pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Canvas height in logical pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Page config JSON (defaults to the built-in page).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for the preload.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Directory frame locators resolve against.
    #[arg(long)]
    assets: PathBuf,

    /// Sequence id.
    #[arg(long)]
    sequence: u32,

    /// Number of scroll steps from top to bottom.
    #[arg(long, default_value_t = 60)]
    steps: u32,

    /// Viewport/canvas width in logical pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport/canvas height in logical pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Output directory for `frame_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Page config JSON (defaults to the built-in page).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for the preload.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Sequences(args) => cmd_sequences(args),
        Command::Beats(args) => cmd_beats(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PageConfig> {
    match path {
        Some(p) => PageConfig::from_json_path(p)
            .with_context(|| format!("load page config '{}'", p.display())),
        None => Ok(PageConfig::builtin()),
    }
}

fn find_sequence(cfg: &PageConfig, id: u32) -> anyhow::Result<Arc<FrameSequence>> {
    let registry = cfg.registry()?;
    registry
        .get(id)
        .cloned()
        .with_context(|| format!("unknown sequence id {id}"))
}

fn check_progress(p: f64) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&p),
        "progress must be within [0, 1], got {p}"
    );
    Ok(())
}

fn save_png(canvas: &PixmapCanvas, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    canvas
        .buffer()
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_sequences(args: SequencesArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let registry = cfg.registry()?;
    for seq in registry.list() {
        let first = seq.path_for(FrameIndex(0))?;
        println!("{}\t{}\t{}\t{}", seq.id, seq.label, seq.count, first);
    }
    Ok(())
}

fn cmd_beats(args: BeatsArgs) -> anyhow::Result<()> {
    check_progress(args.progress)?;
    let cfg = load_config(args.config.as_deref())?;
    let track = cfg.beat_track()?;
    let rows: Vec<serde_json::Value> = track
        .beats()
        .iter()
        .zip(track.evaluate(args.progress))
        .map(|(beat, v)| {
            serde_json::json!({
                "id": beat.id,
                "opacity": v.opacity,
                "offset_y": v.offset_y,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    check_progress(args.progress)?;
    let cfg = load_config(args.config.as_deref())?;
    let sequence = find_sequence(&cfg, args.sequence)?;

    let mut loader = FrameLoader::new(Arc::new(FsFetcher::new(&args.assets)), cfg.loader_opts())?;
    loader.load(Arc::clone(&sequence));
    let frames = loader.wait_ready(Duration::from_secs(args.timeout_secs))?;
    if frames.failed_count() > 0 {
        tracing::warn!(
            failed = frames.failed_count(),
            count = frames.len(),
            "some frames failed to load"
        );
    }

    let index = frame_index_for_progress(args.progress, frames.len());
    let mut canvas = PixmapCanvas::new(Size::new(args.width, args.height));
    let mut renderer = FrameRenderer::new();
    match renderer.draw(&mut canvas, frames.get(index), index, args.dpr) {
        DrawOutcome::Drawn { .. } => {}
        DrawOutcome::Skipped(reason) => {
            anyhow::bail!("frame {} was not drawn: {reason:?}", index.0);
        }
    }

    save_png(&canvas, &args.out)?;
    eprintln!("wrote {} (frame {})", args.out.display(), index.0);
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.steps >= 1, "steps must be >= 1");
    let cfg = load_config(args.config.as_deref())?;
    let sequence = find_sequence(&cfg, args.sequence)?;

    let mut store = SequenceStore::new(cfg.registry()?);
    store.select_id(sequence.id)?;

    let loader = FrameLoader::new(Arc::new(FsFetcher::new(&args.assets)), cfg.loader_opts())?;
    let canvas = PixmapCanvas::new(Size::new(args.width, args.height));
    let mut player = ScrollPlayer::new(loader, canvas, cfg.beat_track()?);
    let mut host = SimulatedHost::new(Viewport::new(args.height), cfg.scroll_height_multiplier);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    player.mount(&store, &mut host);
    let deadline = Instant::now() + Duration::from_secs(args.timeout_secs);
    while !matches!(player.state(), PlayerState::Running { .. }) {
        anyhow::ensure!(
            Instant::now() < deadline,
            "sequence {} did not finish loading within {}s",
            sequence.id,
            args.timeout_secs
        );
        player.pump_wait(&store, &mut host, Duration::from_millis(100));
    }

    let mut written = 0usize;
    let first = args.out_dir.join("frame_0000.png");
    save_png(player.surface(), &first)?;
    written += 1;

    let mut redraws = 0u32;
    for step in 0..=args.steps {
        let progress = f64::from(step) / f64::from(args.steps);
        host.scroll_to_progress(progress);
        let Some(handle) = host.take_due_tick() else {
            anyhow::bail!("player stopped scheduling ticks at step {step}");
        };
        let Some(report) = player.tick(&store, &mut host, handle) else {
            continue;
        };
        for (i, beat) in player.track().beats().iter().enumerate() {
            if let Some(v) = host.beat_visual(i) {
                tracing::debug!(
                    step,
                    beat = beat.id.as_str(),
                    opacity = v.opacity,
                    offset_y = v.offset_y,
                    "beat"
                );
            }
        }
        if let Some(DrawOutcome::Drawn { .. }) = report.redraw {
            redraws += 1;
            let path = args
                .out_dir
                .join(format!("frame_{:04}.png", report.index.0));
            save_png(player.surface(), &path)?;
            written += 1;
        }
    }

    player.unmount(&mut host);
    let logical = player.surface().logical_size();
    println!(
        "sequence {}: {} ticks, {} redraws, {} pngs ({}x{})",
        sequence.id,
        args.steps + 1,
        redraws,
        written,
        logical.width,
        logical.height
    );
    Ok(())
}
