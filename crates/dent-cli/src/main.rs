//! dent: command-line interface for dental model preparation.
//!
//! Exposes orientation, solidification and margin line work from
//! `dent-model` for scripting and batch processing of intraoral scans.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=dent_model=info` - Operation summaries
//! - `RUST_LOG=dent_model=debug` - Intermediate counts
//! - `RUST_LOG=dent_mesh::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! dent orient scan.stl -o up.stl --preset occlusalUp
//! dent margin detect up.stl -o margin.json --density 80
//! dent margin refine margin.json -o margin.json
//! dent margin export margin.json --case 1042 --tooth 36
//! dent solidify up.stl -o solid.stl --thickness 1.5
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dent_model::ModelingConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{info, margin, orient, presets, solidify};

/// dent - Prepare intraoral scans for restoration design.
///
/// Orient models, detect and refine margin lines, and turn open scans into
/// printable solids.
#[derive(Parser)]
#[command(name = "dent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file (presets and default parameters)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl Cli {
    /// The configuration file if one was given, defaults otherwise.
    pub fn load_config(&self) -> Result<ModelingConfig> {
        match &self.config {
            Some(path) => Ok(ModelingConfig::load(path)?),
            None => Ok(ModelingConfig::default()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display model statistics
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// List orientation presets
    Presets,

    /// Rotate a model by preset or explicit angles
    Orient {
        /// Input mesh file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Named view preset (e.g. occlusalDown)
        #[arg(long)]
        preset: Option<String>,

        /// Rotation in degrees as X,Y,Z
        #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        rotation: Option<Vec<f64>>,
    },

    /// Turn an open scan into a closed solid with walls
    Solidify {
        /// Input mesh file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Wall thickness in mm
        #[arg(long, short)]
        thickness: Option<f64>,
    },

    /// Margin line detection, refinement and export
    Margin {
        #[command(subcommand)]
        command: MarginCommands,
    },
}

#[derive(Subcommand)]
pub enum MarginCommands {
    /// Detect the margin line of a prepared tooth
    Detect {
        /// Input mesh file
        input: PathBuf,

        /// Output points file (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Height threshold in standard deviations above the mean
        #[arg(long, allow_hyphen_values = true)]
        height_offset: Option<f64>,

        /// Maximum number of points
        #[arg(long)]
        density: Option<usize>,

        /// Candidate filter sensitivity (0-1)
        #[arg(long)]
        sensitivity: Option<f64>,
    },

    /// Smooth a detected margin line
    Refine {
        /// Input points file (JSON)
        input: PathBuf,

        /// Output points file (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Gaussian width in points
        #[arg(long)]
        smoothness: Option<f64>,
    },

    /// Export margin points as a PTS file
    Export {
        /// Input points file (JSON)
        input: PathBuf,

        /// Output file path [default: margin_<case>_tooth<tooth>.pts]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Case identifier
        #[arg(long, default_value = "unknown")]
        case: String,

        /// Tooth number
        #[arg(long, default_value = "0")]
        tooth: String,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "dent_mesh=info,dent_model=info",
            2 => "dent_mesh=debug,dent_model=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Presets => presets::run(&cli),
        Commands::Orient {
            input,
            output,
            preset,
            rotation,
        } => orient::run(input, output, preset.as_deref(), rotation.as_deref(), &cli),
        Commands::Solidify {
            input,
            output,
            thickness,
        } => solidify::run(input, output, *thickness, &cli),
        Commands::Margin { command } => margin::run(command, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(model_err) = e.downcast_ref::<dent_model::ModelError>() {
                eprintln!("{}: {}", "Error".red().bold(), model_err);
                eprintln!("  {}: {}", "Code".cyan(), model_err.code());
                eprintln!("  {}: {}", "Suggestion".green(), model_err.recovery_suggestion());
                if let dent_model::ModelError::Mesh(mesh_err) = model_err {
                    print_mesh_location(mesh_err);
                }
            } else if let Some(mesh_err) = e.downcast_ref::<dent_mesh::MeshError>() {
                eprintln!("{}: {}", "Error".red().bold(), mesh_err);
                eprintln!("  {}: {}", "Code".cyan(), mesh_err.code());
                eprintln!("  {}: {}", "Suggestion".green(), mesh_err.recovery_suggestion());
                print_mesh_location(mesh_err);
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {}", "Caused by".yellow(), cause);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_mesh_location(err: &dent_mesh::MeshError) {
    if let Some(location) = err.location() {
        eprintln!("  {}: {}", "Location".yellow(), location);
    }
}
