//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod prompt;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use prompt::{LoginArgs, prompt_credentials};
