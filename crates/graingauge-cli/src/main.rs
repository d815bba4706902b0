//! graingauge CLI — command-line grain-size measurement for micrographs.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use graingauge::{
    AnalysisError, AnalysisReport, AnalyzerConfig, BoundaryStages, MaterialTable,
    ScaleCalibration, analyze_with_mask, calibrate_two_point, extract_boundary_stages,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "graingauge")]
#[command(
    about = "Measure grain size in etched micrographs (ASTM E112 circular intercepts, Hall-Petch strength estimate)"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a micrograph and report grain-size metrics.
    Analyze(CliAnalyzeArgs),

    /// Derive pixels-per-micron from two picked points over a known length.
    Calibrate(CliCalibrateArgs),

    /// List the built-in Hall-Petch material table.
    Materials,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Path to the input micrograph.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the analysis report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the annotated overlay (PNG).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Path to write the boundary mask (PNG).
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Directory to dump every intermediate pipeline stage as PNG.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Material for the Hall-Petch strength estimate.
    #[arg(long, default_value = "Steel (Low Carbon)")]
    material: String,

    /// Fixed seed for circle placement; omit for entropy-seeded runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of sampling circles.
    #[arg(long, default_value = "5")]
    circles: usize,

    /// Circle radius as a fraction of min(width, height).
    #[arg(long, default_value = "0.35")]
    radius_frac: f64,

    /// Maximum center jitter as a fraction of each image dimension.
    #[arg(long, default_value = "0.10")]
    jitter_frac: f64,

    /// CLAHE clip limit.
    #[arg(long, default_value = "2.5")]
    clahe_clip: f32,

    /// CLAHE tile count per axis.
    #[arg(long, default_value = "8")]
    clahe_tiles: u32,

    /// Gaussian blur kernel size (odd).
    #[arg(long, default_value = "5")]
    blur_kernel: u32,

    /// Adaptive-threshold neighborhood size (odd).
    #[arg(long, default_value = "11")]
    block_size: u32,

    /// Constant subtracted from the local mean before thresholding.
    #[arg(long, default_value = "2")]
    threshold_c: i32,

    /// Structuring-element size for the morphological opening.
    #[arg(long, default_value = "2")]
    open_kernel: u32,

    /// Number of opening passes.
    #[arg(long, default_value = "1")]
    open_iterations: u32,

    /// Canny hysteresis low threshold.
    #[arg(long, default_value = "50.0")]
    canny_low: f32,

    /// Canny hysteresis high threshold.
    #[arg(long, default_value = "150.0")]
    canny_high: f32,

    #[command(flatten)]
    scale: CliScaleArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct CliScaleArgs {
    /// Known image scale in pixels per micron. Alternative to the two-point
    /// flags.
    #[arg(long)]
    pixels_per_micron: Option<f64>,

    /// Two-point calibration: first point x (display px). If set, the other
    /// point flags and --length-um are required too.
    #[arg(long)]
    p1x: Option<f64>,
    /// Two-point calibration: first point y (display px).
    #[arg(long)]
    p1y: Option<f64>,
    /// Two-point calibration: second point x (display px).
    #[arg(long)]
    p2x: Option<f64>,
    /// Two-point calibration: second point y (display px).
    #[arg(long)]
    p2y: Option<f64>,
    /// Factor by which the source image was scaled for display.
    #[arg(long, default_value_t = 1.0)]
    display_ratio: f64,
    /// Physical length between the two points in microns.
    #[arg(long)]
    length_um: Option<f64>,
}

impl CliScaleArgs {
    fn resolve(&self) -> CliResult<ScaleCalibration> {
        if let Some(ppm) = self.pixels_per_micron {
            return Ok(ScaleCalibration::try_new(ppm)?);
        }

        let two_point = [self.p1x, self.p1y, self.p2x, self.p2y, self.length_um];
        if two_point.iter().all(Option::is_none) {
            return Err(
                "missing scale; provide --pixels-per-micron or the two-point flags"
                    .to_string()
                    .into(),
            );
        }
        if two_point.iter().any(Option::is_none) {
            return Err(
                "two-point calibration is partial; provide all of --p1x --p1y --p2x --p2y --length-um"
                    .to_string()
                    .into(),
            );
        }

        Ok(calibrate_two_point(
            [self.p1x.expect("validated"), self.p1y.expect("validated")],
            [self.p2x.expect("validated"), self.p2y.expect("validated")],
            self.display_ratio,
            self.length_um.expect("validated"),
        )?)
    }
}

#[derive(Debug, Clone, Args)]
struct CliCalibrateArgs {
    /// First point x (display px).
    #[arg(long)]
    p1x: f64,
    /// First point y (display px).
    #[arg(long)]
    p1y: f64,
    /// Second point x (display px).
    #[arg(long)]
    p2x: f64,
    /// Second point y (display px).
    #[arg(long)]
    p2y: f64,
    /// Factor by which the source image was scaled for display.
    #[arg(long, default_value_t = 1.0)]
    display_ratio: f64,
    /// Physical length between the two points in microns.
    #[arg(long)]
    length_um: f64,
}

impl CliAnalyzeArgs {
    fn to_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default();
        config.boundary.clahe_clip_limit = self.clahe_clip;
        config.boundary.clahe_tile_grid = [self.clahe_tiles, self.clahe_tiles];
        config.boundary.blur_kernel_size = self.blur_kernel;
        config.boundary.threshold_block_size = self.block_size;
        config.boundary.threshold_c = self.threshold_c;
        config.boundary.open_kernel_size = self.open_kernel;
        config.boundary.open_iterations = self.open_iterations;
        config.boundary.canny_low = self.canny_low;
        config.boundary.canny_high = self.canny_high;
        config.sampling.circle_count = self.circles;
        config.sampling.radius_frac = self.radius_frac;
        config.sampling.jitter_frac = self.jitter_frac;
        config.sampling.seed = self.seed;
        config
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Materials => run_materials(),
    }
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());

    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let calibration = args.scale.resolve()?;
    let config = args.to_config();
    let materials = MaterialTable::builtin();
    let material = materials.get(&args.material)?;

    let stages = extract_boundary_stages(&rgb, &config.boundary);
    if let Some(dir) = &args.debug_dir {
        write_stage_dumps(dir, &stages)?;
    }

    let mut rng = match config.sampling.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = match analyze_with_mask(&rgb, &stages.mask, calibration, material, &config, &mut rng)
    {
        Ok(outcome) => outcome,
        Err(err @ AnalysisError::NoBoundariesDetected { .. }) => {
            // Leave the mask behind so the user can judge the contrast.
            let mask_path = args
                .mask
                .clone()
                .unwrap_or_else(|| args.image.with_extension("mask.png"));
            stages.mask.save(&mask_path).map_err(|e| -> CliError {
                format!("failed to write {}: {}", mask_path.display(), e).into()
            })?;
            tracing::warn!("No crossings found; mask written to {}", mask_path.display());
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    print_report(&outcome.report);

    if let Some(path) = &args.out {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        std::fs::write(path, &json)?;
        tracing::info!("Report written to {}", path.display());
    }
    if let Some(path) = &args.overlay {
        outcome.overlay.save(path).map_err(|e| -> CliError {
            format!("failed to write {}: {}", path.display(), e).into()
        })?;
        tracing::info!("Overlay written to {}", path.display());
    }
    if let Some(path) = &args.mask {
        stages.mask.save(path).map_err(|e| -> CliError {
            format!("failed to write {}: {}", path.display(), e).into()
        })?;
        tracing::info!("Boundary mask written to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let metrics = &report.metrics;
    let radius = report
        .sampling
        .circles
        .first()
        .map(|c| c.radius)
        .unwrap_or(0);

    println!("graingauge report");
    println!(
        "  image:                {}x{} px",
        report.image_size[0], report.image_size[1]
    );
    println!("  scale:                {:.4} px/um", report.pixels_per_micron);
    println!(
        "  circles:              {} (radius {} px)",
        report.sampling.circles.len(),
        radius
    );
    println!("  intercepts:           {}", metrics.intercept_count);
    println!(
        "  mean intercept:       {:.4} um",
        metrics.mean_lineal_intercept_um
    );
    println!("  grain diameter:       {:.4} mm", metrics.grain_diameter_mm);
    println!("  ASTM grain number G:  {:.4}", metrics.astm_grain_number);
    println!("  material:             {}", metrics.material.name);
    println!(
        "  friction stress:      {:.1} MPa",
        metrics.material.friction_stress_mpa
    );
    println!(
        "  locking parameter:    {:.1} MPa*mm^1/2",
        metrics.material.locking_parameter
    );
    println!(
        "  yield strength:       {:.4} MPa",
        metrics.yield_strength_mpa
    );
}

fn write_stage_dumps(dir: &Path, stages: &BoundaryStages) -> CliResult<()> {
    std::fs::create_dir_all(dir)?;
    for (name, stage) in [
        ("01_gray", &stages.gray),
        ("02_equalized", &stages.equalized),
        ("03_blurred", &stages.blurred),
        ("04_thresholded", &stages.thresholded),
        ("05_opened", &stages.opened),
        ("06_edges", &stages.edges),
        ("07_mask", &stages.mask),
    ] {
        let path = dir.join(format!("{name}.png"));
        stage.save(&path).map_err(|e| -> CliError {
            format!("failed to write {}: {}", path.display(), e).into()
        })?;
    }
    tracing::info!("Stage dumps written to {}", dir.display());
    Ok(())
}

// ── calibrate ──────────────────────────────────────────────────────────

fn run_calibrate(args: &CliCalibrateArgs) -> CliResult<()> {
    let cal = calibrate_two_point(
        [args.p1x, args.p1y],
        [args.p2x, args.p2y],
        args.display_ratio,
        args.length_um,
    )?;

    println!("pixels per micron: {:.4}", cal.pixels_per_micron());
    println!("microns per pixel: {:.4}", 1.0 / cal.pixels_per_micron());
    Ok(())
}

// ── materials ──────────────────────────────────────────────────────────

fn run_materials() -> CliResult<()> {
    let table = MaterialTable::builtin();
    println!("built-in Hall-Petch materials");
    for material in table.iter() {
        println!(
            "  {:<26} sigma0 = {:>6.1} MPa   k = {:>5.1} MPa*mm^1/2",
            material.name, material.friction_stress_mpa, material.locking_parameter
        );
    }
    Ok(())
}
