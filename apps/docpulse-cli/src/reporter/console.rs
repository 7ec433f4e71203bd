//! Console reporter for renewal logs
//!
//! One block per company, items grouped by the owner who has to act.

use anyhow::Result;
use docpulse_core::{RenewalLog, Severity};
use std::fmt::Write;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(logs: &[RenewalLog]) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                     DOCUMENT RENEWAL LOG                     ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        if logs.is_empty() {
            writeln!(output, "No companies scanned.")?;
        }
        for log in logs {
            Self::format_log(&mut output, log)?;
        }

        Ok(output)
    }

    fn format_log(output: &mut String, log: &RenewalLog) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Company:   {}", log.company())?;
        writeln!(output, "Log date:  {}", log.log_date())?;
        writeln!(output, "Flagged:   {}", log.total_documents_flagged())?;

        let counts = log.severity_counts();
        let summary: Vec<String> = Severity::ALL
            .iter()
            .map(|severity| format!("{}: {}", severity, counts.get(severity).unwrap_or(&0)))
            .collect();
        writeln!(output, "           {}", summary.join(", "))?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;

        if log.is_empty() {
            writeln!(output, "  ✓ No documents need attention")?;
            writeln!(output)?;
            return Ok(());
        }

        for (owner, items) in log.by_owner() {
            writeln!(output)?;
            writeln!(output, "  Owner: {}", owner)?;
            for item in items {
                let marker = match item.severity {
                    Severity::Overdue => "✗",
                    Severity::DueToday => "!",
                    Severity::DueSoon => "•",
                };
                writeln!(
                    output,
                    "    {} [{}] {} ({}, {})",
                    marker, item.severity, item.document_name, item.category, item.authority
                )?;
                writeln!(
                    output,
                    "      {}  expires {}  {}  status: {}",
                    item.document,
                    item.expiry_date,
                    Self::describe_days(item.days_to_expiry),
                    item.current_status
                )?;
            }
        }

        writeln!(output)?;
        Ok(())
    }

    fn describe_days(days: i64) -> String {
        match days {
            0 => "today".to_string(),
            1 => "in 1 day".to_string(),
            -1 => "1 day ago".to_string(),
            d if d > 0 => format!("in {} days", d),
            d => format!("{} days ago", -d),
        }
    }
}
