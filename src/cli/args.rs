//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

/// Generate AI videos from text prompts
#[derive(Parser, Debug)]
#[command(name = "reelprompt")]
#[command(version, about = "Generate AI videos from text prompts", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Interactive studio (default)
    reelprompt

    # One-shot generation, saving the video
    reelprompt generate \"a red fox running through snow\" --download

    # Talk to a different backend
    reelprompt --server http://192.168.1.20:8000 health")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video server base URL (default: $REELPROMPT_SERVER_URL or config)
    #[arg(long, short, global = true)]
    pub server: Option<String>,

    /// Generation request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory for saved videos
    #[arg(long, short, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Command-line values that override config and environment.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            timeout_secs: self.timeout,
            download_dir: self.output_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive studio: type prompts, watch progress, save results
    Interactive,
    /// Generate a single video and exit
    Generate {
        /// Text description of the video (3-200 characters)
        prompt: String,
        /// Save the video after generation
        #[arg(long, short)]
        download: bool,
    },
    /// Check the video server's health endpoint
    Health,
    /// Show the video server's API information
    Info,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
