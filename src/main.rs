use clap::{Args, Parser, Subcommand};
use img2strip::{format, render, Frame, TraceError, TracingConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "img2strip", about = "Bitmap image to line-art strips for vector playback")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace an image (or a directory of frames) into a strip file
    Generate(GenerateArgs),
    /// Draw a strip file back into a PNG
    Render(RenderArgs),
    /// Print per-frame strip and point counts of a strip file
    Info {
        /// Strip file to inspect
        input: PathBuf,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Input image, or a directory of frames traced in name order
    input: PathBuf,

    /// Output strip file
    output: PathBuf,

    /// Also write the unoptimized strips here
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Also write the raw segments here as i16 records
    #[arg(long)]
    segments: Option<PathBuf>,

    /// Write linesegments.png and contourpoints.png into this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    #[command(flatten)]
    options: TracingArgs,
}

/// Overrides applied on top of the preset (or the defaults).
#[derive(Args)]
struct TracingArgs {
    /// JSON preset to start from
    #[arg(long)]
    config: Option<PathBuf>,

    /// Luma delta above which a pixel is an edge point (0-255)
    #[arg(long)]
    grey_threshold: Option<u8>,

    /// Nearest-candidate distance that starts a new cluster
    #[arg(long)]
    cluster_cutoff: Option<f64>,

    /// Distance from the segment start that ends a segment
    #[arg(long)]
    line_cutoff: Option<f64>,

    /// Cosine of the largest direction change inside a long line
    #[arg(long, allow_hyphen_values = true)]
    line_angle: Option<f64>,

    /// Distance after which a segment tracks its direction
    #[arg(long)]
    long_line: Option<f64>,

    /// Cosine above which consecutive segments are merged
    #[arg(long, allow_hyphen_values = true)]
    opt_angle: Option<f64>,

    /// Block edge length in pixels
    #[arg(long)]
    block_size: Option<u32>,

    /// Skip the collinear merge
    #[arg(long)]
    no_optimize: bool,

    /// Per-step diagnostics at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Strip file to draw
    input: PathBuf,

    /// Output PNG
    output: PathBuf,

    #[arg(long, default_value = "256")]
    width: u32,

    #[arg(long, default_value = "256")]
    height: u32,

    /// Frame to draw (0-based)
    #[arg(long)]
    frame: Option<usize>,
}

impl TracingArgs {
    fn to_config(&self) -> Result<TracingConfig, TraceError> {
        let mut config = match &self.config {
            Some(path) => TracingConfig::load(path)?,
            None => TracingConfig::default(),
        };
        if let Some(v) = self.grey_threshold {
            config.grey_threshold = v;
        }
        if let Some(v) = self.cluster_cutoff {
            config.cluster_cutoff_distance = v;
        }
        if let Some(v) = self.line_cutoff {
            config.line_cutoff_distance = v;
        }
        if let Some(v) = self.line_angle {
            config.line_cutoff_angle = v;
        }
        if let Some(v) = self.long_line {
            config.long_line_distance = v;
        }
        if let Some(v) = self.opt_angle {
            config.optimization_cutoff_angle = v;
        }
        if let Some(v) = self.block_size {
            config.block_size = v;
        }
        if self.no_optimize {
            config.optimize = false;
        }
        config.verbose |= self.verbose;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Generate(args) if args.options.verbose);
    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate(args) => generate(&args)?,
        Command::Render(args) => render_file(&args)?,
        Command::Info { input } => print_info(&input)?,
    }
    Ok(())
}

fn generate(args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.options.to_config()?;

    eprintln!();
    eprintln!("  img2strip \u{00b7} {}", args.input.display());
    eprintln!();

    if args.input.is_dir() {
        return generate_animation(&args.input, &args.output, &config);
    }

    let result = img2strip::trace(&args.input, &config)?;
    eprintln!("  Points      {}", result.points.len());
    eprintln!(
        "  Segments    {} \u{2192} {}",
        result.segments.len(),
        result.final_segments().len()
    );
    eprintln!(
        "  Strips      {} ({} points)",
        result.strips.len(),
        result.num_strip_points()
    );

    format::save_strips(&args.output, &result.strips)?;
    eprintln!();
    eprintln!("  \u{2713} {}", args.output.display());

    if let Some(path) = &args.raw {
        format::save_strips(path, &result.raw_strips)?;
        eprintln!("  \u{2713} {}", path.display());
    }
    if let Some(path) = &args.segments {
        let mut buf = Vec::new();
        format::write_segments(&mut buf, &result.segments)?;
        fs::write(path, buf)?;
        eprintln!("  \u{2713} {}", path.display());
    }
    if let Some(dir) = &args.debug_dir {
        fs::create_dir_all(dir)?;
        let segments = render::draw_segments(result.width, result.height, &result.segments);
        render::save_png(&segments, &dir.join("linesegments.png"))?;
        let points = render::draw_contour_points(result.width, result.height, &result.points);
        render::save_png(&points, &dir.join("contourpoints.png"))?;
        eprintln!("  Debug       {}", dir.display());
    }
    eprintln!();
    Ok(())
}

/// Trace every image in `dir` in name order into one concatenated file.
fn generate_animation(
    dir: &Path,
    output: &Path,
    config: &TracingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && image::ImageFormat::from_path(path).is_ok())
        .collect();
    inputs.sort();

    let mut frames = Vec::with_capacity(inputs.len());
    for path in &inputs {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match img2strip::trace(path, config) {
            Ok(result) => {
                info!(file = %name, segments = result.final_segments().len(), "traced frame");
                frames.push(Frame::new(result.strips));
            }
            Err(TraceError::NoContours) => {
                warn!(file = %name, "no contours, writing empty frame");
                frames.push(Frame::default());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut buf = Vec::new();
    format::write_frames(&mut buf, &frames)?;
    fs::write(output, buf)?;

    eprintln!("  Frames      {}", frames.len());
    eprintln!();
    eprintln!("  \u{2713} {}", output.display());
    eprintln!();
    Ok(())
}

fn render_file(args: &RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let frames = format::load_frames(&args.input)?;
    let index = args.frame.unwrap_or(0);
    let frame = frames
        .get(index)
        .ok_or_else(|| format!("{} has {} frames, no frame {index}", args.input.display(), frames.len()))?;
    let img = render::draw_strips(args.width, args.height, &frame.strips);
    render::save_png(&img, &args.output)?;
    eprintln!("  \u{2713} {}", args.output.display());
    Ok(())
}

fn print_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let frames = format::load_frames(input)?;
    println!("{}: {} frames", input.display(), frames.len());
    for (i, frame) in frames.iter().enumerate() {
        println!(
            "  frame {i:>4}  {:>3} strips  {:>5} points",
            frame.strips.len(),
            frame.num_points()
        );
    }
    Ok(())
}
