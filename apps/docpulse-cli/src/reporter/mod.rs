//! Renewal log reporting
//!
//! Formats the logs produced by a scan for people or for other tools.
//!
//! # Output Formats
//!
//! - **Console**: Human-readable digest grouped by owner
//! - **JSON**: Machine-readable array of logs
//! - **JSON Pretty**: The same, indented
//!
//! # Example
//!
//! ```no_run
//! use docpulse_cli::reporter::{OutputFormat, Reporter};
//! use docpulse_core::RenewalLog;
//!
//! # fn example(logs: Vec<RenewalLog>) -> anyhow::Result<()> {
//! Reporter::new(OutputFormat::Console).report(&logs)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::Json).write_to_file(&logs, "renewals.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::{Context, Result};
use clap::ValueEnum;
use docpulse_core::RenewalLog;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for renewal logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Digest for terminals
    #[default]
    Console,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// Reporter for renewal logs
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report logs to stdout
    pub fn report(&self, logs: &[RenewalLog]) -> Result<()> {
        let output = self.format_logs(logs)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, logs: &[RenewalLog], path: P) -> Result<()> {
        let path = path.as_ref();
        let output = self.format_logs(logs)?;
        fs::write(path, output)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    pub fn format_logs(&self, logs: &[RenewalLog]) -> Result<String> {
        match self.format {
            OutputFormat::Console => ConsoleReporter::format(logs),
            OutputFormat::Json => JsonReporter::format(logs, false),
            OutputFormat::JsonPretty => JsonReporter::format(logs, true),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
