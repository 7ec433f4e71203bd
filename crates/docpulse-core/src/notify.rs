//! Handoff of renewal logs to whatever delivers them

use tracing::info;

use crate::error::Result;
use crate::renewal_log::RenewalLog;

/// Notification collaborator. Rendering and transport are its business.
pub trait Notifier {
    fn notify(&self, log: &RenewalLog) -> Result<()>;
}

impl<F> Notifier for F
where
    F: Fn(&RenewalLog) -> Result<()>,
{
    fn notify(&self, log: &RenewalLog) -> Result<()> {
        self(log)
    }
}

/// Writes a per-owner digest of each log to the tracing output
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, log: &RenewalLog) -> Result<()> {
        info!(
            company = log.company(),
            log_date = %log.log_date(),
            total = log.total_documents_flagged(),
            "Renewal log"
        );
        for (owner, items) in log.by_owner() {
            for item in items {
                info!(
                    owner,
                    document = %item.document,
                    name = %item.document_name,
                    expiry_date = %item.expiry_date,
                    days_to_expiry = item.days_to_expiry,
                    severity = %item.severity,
                    "Renewal pending"
                );
            }
        }
        Ok(())
    }
}
