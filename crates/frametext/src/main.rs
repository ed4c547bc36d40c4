//! frametext: batch-convert a directory of video frames into ASCII art.
//!
//! Every supported image in the input directory (`.jpg`, `.jpeg`,
//! `.png`) is edge-filtered, shrunk to the character grid, and written
//! as `<stem>.txt` in the output directory.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin frametext -- [OPTIONS] [INPUT_DIR] [OUTPUT_DIR]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod batch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use frametext_pipeline::{EdgeKernel, EdgePolarity, GlyphRamp, PipelineConfig, ResampleFilter};
use tracing::level_filters::LevelFilter;

use crate::batch::{BatchOptions, run_batch};

/// Convert extracted video frames into edge-traced ASCII art.
///
/// Reads every frame in INPUT_DIR in name order and writes one text
/// file per frame to OUTPUT_DIR.
#[derive(Parser)]
#[command(name = "frametext", version)]
struct Cli {
    /// Directory containing the input frames.
    #[arg(default_value = "frames")]
    input_dir: PathBuf,

    /// Directory receiving the `.txt` files (created if missing).
    #[arg(default_value = "ascii_frames")]
    output_dir: PathBuf,

    /// Output width in characters.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_WIDTH, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Character aspect correction applied to the output height.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_WIDTH_SCALE)]
    width_scale: f64,

    /// Glyphs ordered from darkest to lightest.
    #[arg(long, default_value = PipelineConfig::DEFAULT_RAMP)]
    ramp: String,

    /// How edges map onto the ramp.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_POLARITY)]
    polarity: Polarity,

    /// Edge-detection kernel.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_KERNEL)]
    kernel: Kernel,

    /// Resampling filter for shrinking to the character grid.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_FILTER)]
    filter: Filter,

    /// Save the cropped edge image next to each input as `edges_<name>`.
    #[arg(long)]
    save_edges: bool,

    /// Number of frames converted in parallel (default: all cores).
    #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    jobs: Option<usize>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Edge polarity selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Polarity {
    /// Edges drawn with the darkest glyphs on a blank background.
    Dark,
    /// Edges drawn with the lightest glyphs on a dense background.
    Light,
}

/// Edge kernel selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kernel {
    /// 8-neighbour Laplacian.
    FindEdges,
    /// Sobel gradient magnitude.
    Sobel,
}

/// Resample filter selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Filter {
    /// Area average (smooth, keeps thin edges visible).
    Box,
    /// Nearest-neighbor (fastest, may drop thin edges).
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic Catmull-Rom.
    CatmullRom,
    /// Lanczos with 3 lobes (sharpest).
    Lanczos3,
}

const fn polarity_from_pipeline(p: EdgePolarity) -> Polarity {
    match p {
        EdgePolarity::DarkEdges => Polarity::Dark,
        EdgePolarity::LightEdges => Polarity::Light,
    }
}

const fn kernel_from_pipeline(k: EdgeKernel) -> Kernel {
    match k {
        EdgeKernel::FindEdges => Kernel::FindEdges,
        EdgeKernel::Sobel => Kernel::Sobel,
    }
}

const fn filter_from_pipeline(f: ResampleFilter) -> Filter {
    match f {
        ResampleFilter::Box => Filter::Box,
        ResampleFilter::Nearest => Filter::Nearest,
        ResampleFilter::Triangle => Filter::Triangle,
        ResampleFilter::CatmullRom => Filter::CatmullRom,
        ResampleFilter::Lanczos3 => Filter::Lanczos3,
    }
}

// CLI defaults derived from the pipeline defaults so the two cannot
// silently diverge.
const CLI_DEFAULT_POLARITY: Polarity = polarity_from_pipeline(PipelineConfig::DEFAULT_POLARITY);
const CLI_DEFAULT_KERNEL: Kernel = kernel_from_pipeline(PipelineConfig::DEFAULT_EDGE_KERNEL);
const CLI_DEFAULT_FILTER: Filter = filter_from_pipeline(PipelineConfig::DEFAULT_RESAMPLE_FILTER);

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            width: cli.width,
            width_scale: cli.width_scale,
            ramp: GlyphRamp::new(&cli.ramp).map_err(|e| format!("Error parsing --ramp: {e}"))?,
            polarity: match cli.polarity {
                Polarity::Dark => EdgePolarity::DarkEdges,
                Polarity::Light => EdgePolarity::LightEdges,
            },
            edge_kernel: match cli.kernel {
                Kernel::FindEdges => EdgeKernel::FindEdges,
                Kernel::Sobel => EdgeKernel::Sobel,
            },
            resample_filter: match cli.filter {
                Filter::Box => ResampleFilter::Box,
                Filter::Nearest => ResampleFilter::Nearest,
                Filter::Triangle => ResampleFilter::Triangle,
                Filter::CatmullRom => ResampleFilter::CatmullRom,
                Filter::Lanczos3 => ResampleFilter::Lanczos3,
            },
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    if config.width == 0 {
        return Err("width must be at least 1".to_string());
    }
    Ok(config)
}

/// Map `-v`/`-q` to a maximum log level.
const fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "pipeline config");

    let options = BatchOptions {
        input_dir: cli.input_dir,
        output_dir: cli.output_dir,
        save_edges: cli.save_edges,
        jobs: cli.jobs,
    };

    match run_batch(&options, &config) {
        Ok(report) => {
            println!("{}", report.summary(&options.output_dir));
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
