//! Command-line interface definitions and helpers.
//!
//! This module contains argument parsing, the interactive prompt reader, and
//! subcommand handlers.

mod args;
mod commands;
mod prompt;

pub use args::{Args, Command, ConfigAction};
pub use commands::{handle_config_action, run_generate, run_health, run_info, run_interactive};
pub use prompt::{PromptCommand, PromptInput, HELP};
