use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sidm")]
#[command(author, version, about = "Smart image dataset manager")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one or more processes over a directory of images
    Run {
        /// Name of the process to run
        process: String,

        /// Directory containing images to process
        source_dir: PathBuf,

        /// Further processes to apply to each file, in order
        #[arg(long = "then", value_name = "PROCESS")]
        then: Vec<String>,

        /// Stop processing at the first error
        #[arg(long)]
        stop_on_error: bool,

        /// Only process files directly inside the source directory
        #[arg(long, conflicts_with = "recursive")]
        shallow: bool,

        /// Descend into subdirectories (overrides the config)
        #[arg(long)]
        recursive: bool,

        /// Print the run report as JSON instead of the processing log
        #[arg(long)]
        json: bool,
    },

    /// List the registered rule and action identifiers
    ListPlugins,

    /// Validate configuration file and build every process
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
