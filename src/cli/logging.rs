//! Logging initialization

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on debug flag
///
/// Without `--debug`, progress goes to stderr at `info` (or whatever
/// `RUST_LOG` asks for) so stdout stays clean for the report summary.
/// With `--debug`, everything down to `debug` goes to a temp file whose path
/// is returned.
pub fn init_logging(debug: bool) -> Result<Option<PathBuf>> {
    if debug {
        // Use Builder to create a named temp file that outlives the process
        let (file, path) = tempfile::Builder::new()
            .prefix("kube-inventory-")
            .suffix(".log")
            .tempfile()
            .context("Failed to create debug log file")?
            .keep()
            .context("Failed to keep debug log file")?;

        tracing_subscriber::fmt()
            .with_writer(file)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_ansi(false) // No ANSI codes in log file
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();

        Ok(Some(path))
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();

        Ok(None)
    }
}
