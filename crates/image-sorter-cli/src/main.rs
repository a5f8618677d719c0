//! image-sorter CLI - keyboard-driven like/dislike image review

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Review images one at a time and export what you liked.
#[derive(Parser)]
#[command(name = "image-sorter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a manifest listing the images in a directory
    Manifest {
        /// Directory to scan (not recursive)
        dir: PathBuf,

        /// Output manifest file [default: <dir>/manifest.json]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accepted extensions (repeatable); defaults to common image types
        #[arg(long = "ext")]
        extensions: Vec<String>,
    },

    /// Review images interactively
    Review(ReviewArgs),

    /// Show the contents of an exported results file
    Summary {
        /// Results JSON written by `review`
        input: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct ReviewArgs {
    /// Manifest listing the default images
    #[arg(short, long, env = "IMAGE_SORTER_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory the manifest's file names are relative to [default: manifest's directory]
    #[arg(long)]
    base: Option<PathBuf>,

    /// Extra image files to review after the manifest images (repeatable)
    #[arg(short, long)]
    upload: Vec<PathBuf>,

    /// Number of images expected, for progress display
    #[arg(long)]
    total_expected: Option<usize>,

    /// Directory for result files
    #[arg(short, long, env = "IMAGE_SORTER_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Do not export automatically when the review finishes
    #[arg(long)]
    no_export: bool,

    /// Skip the per-decision CSV
    #[arg(long)]
    no_csv: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Manifest { dir, output, extensions } => {
            commands::manifest::run(&dir, output.as_deref(), extensions, cli.verbose)
        }
        Commands::Review(args) => commands::review::run(args, cli.verbose),
        Commands::Summary { input } => commands::summary::run(&input, cli.verbose),
    }
}
