use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ldiview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one 2D frame as a PNG.
    Frame(FrameArgs),
    /// Render a left/right pair for a headset or a stereo screen.
    Stereo(StereoArgs),
    /// Render a row of viewpoints for a multi-view panel.
    Multiview(MultiviewArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Input view manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Render options JSON (defaults apply when omitted).
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Fixed refinement mode: full, blur_only or bypass.
    #[arg(long)]
    mode: Option<ldiview::RefineMode>,

    /// Evaluate pixel rows in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Head position in millimeters relative to the screen center, as `x,y,z`.
    #[arg(long, value_parser = parse_xyz)]
    head: Option<ldiview::DVec3>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StereoArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Per-eye resolution as `WIDTHxHEIGHT`.
    #[arg(long, default_value = "1024x1024", value_parser = parse_resolution)]
    eye_size: ldiview::Resolution,

    /// Per-eye symmetric field of view in degrees (headset mode).
    #[arg(long, default_value_t = 90.0)]
    fov_deg: f64,

    /// Treat the eyes as looking at a shared screen this far away (millimeters) instead of a
    /// headset. The screen size comes from the display options.
    #[arg(long)]
    screen_distance_mm: Option<f64>,

    /// Left eye output PNG path.
    #[arg(long)]
    out_left: PathBuf,

    /// Right eye output PNG path.
    #[arg(long)]
    out_right: PathBuf,
}

#[derive(Parser, Debug)]
struct MultiviewArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of viewpoints.
    #[arg(long, default_value_t = 8)]
    count: usize,

    /// Horizontal distance between neighboring viewpoints in millimeters.
    #[arg(long, default_value_t = 10.0)]
    spacing_mm: f64,

    /// Output directory; frames are written as `view_<i>.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Stereo(args) => cmd_stereo(args),
        Command::Multiview(args) => cmd_multiview(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut driver = load_driver(&args.scene)?;
    let frames = driver.render_frame(args.head.map(ldiview::Viewpoint::Head), None)?;
    let frame = frames
        .first()
        .context("renderer returned no frame")?;
    write_png(frame, &args.out)
}

fn cmd_stereo(args: StereoArgs) -> anyhow::Result<()> {
    let mut driver = load_driver(&args.scene)?;
    let display = driver.opts().display.clone();
    let half_ipd = display.ipd_mm * 0.5;

    let setup = |x: f64| {
        let frustum = match args.screen_distance_mm {
            Some(d) => screen_frustum(x, &display, d),
            None => {
                let t = (args.fov_deg.to_radians() * 0.5).tan();
                ldiview::FrustumDescriptor::symmetric(t, t)
            }
        };
        ldiview::EyeSetup {
            pose: ldiview::Pose::at(ldiview::DVec3::new(x, 0.0, 0.0)),
            projection: frustum.to_projection(0.1, 10_000.0),
            resolution: args.eye_size,
        }
    };
    let geometry = driver.start_session(&setup(-half_ipd), &setup(half_ipd))?;
    eprintln!(
        "{:?}: plane {:.1}x{:.1} mm at {:.1} mm",
        geometry.kind, geometry.plane.width, geometry.plane.height, geometry.plane.distance
    );

    let frames = driver.render_frame(None, None)?;
    let [left, right] = frames.as_slice() else {
        anyhow::bail!("expected two eye frames, got {}", frames.len());
    };
    write_png(left, &args.out_left)?;
    write_png(right, &args.out_right)
}

fn cmd_multiview(args: MultiviewArgs) -> anyhow::Result<()> {
    let mut driver = load_driver(&args.scene)?;
    let frames = driver.render_multiview(args.count, args.spacing_mm)?;
    for (i, frame) in frames.iter().enumerate() {
        write_png(frame, &args.out_dir.join(format!("view_{i}.png")))?;
    }
    Ok(())
}

fn load_driver(args: &SceneArgs) -> anyhow::Result<ldiview::RenderDriver> {
    let mut opts = match &args.opts {
        Some(p) => ldiview::RenderOpts::from_path(p)?,
        None => ldiview::RenderOpts::default(),
    }
    .with_env_overrides();
    if args.mode.is_some() {
        opts.refine_mode = args.mode;
    }
    opts.parallel |= args.parallel;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }

    let mut driver = ldiview::RenderDriver::new(opts)?;
    driver.begin_loading();
    let scene = ldiview::load_scene(&args.in_path)
        .with_context(|| format!("load manifest '{}'", args.in_path.display()))?;
    driver.finish_loading(scene)?;
    Ok(driver)
}

/// Frustum of an eye at `x` looking at the configured screen `distance_mm` away.
fn screen_frustum(
    x: f64,
    display: &ldiview::DisplayOpts,
    distance_mm: f64,
) -> ldiview::FrustumDescriptor {
    let half_w = display.screen_width_mm * 0.5;
    let half_h = display.screen_height_mm * 0.5;
    ldiview::FrustumDescriptor {
        left: (x + half_w) / distance_mm,
        right: (half_w - x) / distance_mm,
        up: half_h / distance_mm,
        down: half_h / distance_mm,
    }
}

fn write_png(frame: &ldiview::FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn parse_xyz(s: &str) -> Result<ldiview::DVec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(ldiview::DVec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn parse_resolution(s: &str) -> Result<ldiview::Resolution, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    ldiview::Resolution::new(w, h).map_err(|e| e.to_string())
}
