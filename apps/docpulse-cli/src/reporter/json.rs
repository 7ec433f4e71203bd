//! JSON reporter for renewal logs

use anyhow::Result;
use docpulse_core::RenewalLog;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format logs as a JSON array, optionally pretty-printed
    pub fn format(logs: &[RenewalLog], pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(logs)?
        } else {
            serde_json::to_string(logs)?
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_support::sample_log;
    use serde_json::Value;

    #[test]
    fn test_json_format_compact() {
        let output = JsonReporter::format(&[sample_log()], false).unwrap();

        assert!(!output.contains('\n'));
        assert!(output.contains("\"total_documents_flagged\":2"));
    }

    #[test]
    fn test_json_format_pretty() {
        let output = JsonReporter::format(&[sample_log()], true).unwrap();
        assert!(output.contains('\n'));
        assert!(output.contains("  "));
    }

    #[test]
    fn test_json_uses_template_labels() {
        let output = JsonReporter::format(&[sample_log()], false).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        let items = &parsed[0]["items"];

        assert_eq!(items[0]["severity"], "Overdue");
        assert_eq!(items[0]["current_status"], "Expired");
        assert_eq!(items[1]["severity"], "Due Soon");
        assert_eq!(items[1]["current_status"], "Active Soon to Expire");
    }
}
