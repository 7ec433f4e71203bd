//! The unit of work the external scheduler triggers once a day

use std::time::Instant;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::{DocPulseError, Result};
use crate::notify::Notifier;
use crate::renewal_log::RenewalLog;
use crate::store::DocumentStore;
use crate::tracker::DocumentTracker;

/// Scan and hand the resulting logs to a notifier
pub struct DailyRenewalJob<S, C, N> {
    tracker: DocumentTracker<S, C>,
    notifier: N,
}

impl<S: DocumentStore, C: Clock, N: Notifier> DailyRenewalJob<S, C, N> {
    pub fn new(tracker: DocumentTracker<S, C>, notifier: N) -> Self {
        Self { tracker, notifier }
    }

    pub fn tracker(&self) -> &DocumentTracker<S, C> {
        &self.tracker
    }

    pub fn into_tracker(self) -> DocumentTracker<S, C> {
        self.tracker
    }

    /// Scan one company and deliver its log
    ///
    /// The log is returned even when there is nothing to report. A
    /// notifier failure is reported to the caller after the scan's status
    /// changes have been persisted.
    pub fn run_daily_scan(&mut self, company: &str) -> Result<RenewalLog> {
        let started = Instant::now();
        info!(company, "Renewal log job started");

        let result = self
            .tracker
            .run_daily_scan(company)
            .and_then(|log| self.notifier.notify(&log).map(|_| log));

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(log) => info!(
                company,
                flagged = log.total_documents_flagged(),
                duration_ms,
                "Renewal log job completed"
            ),
            Err(err) => error!(
                company,
                duration_ms,
                error = %err,
                "Renewal log job failed"
            ),
        }
        result
    }

    /// One log per company with scan candidates, each delivered in turn
    ///
    /// Every log is offered to the notifier even when an earlier delivery
    /// failed; the failures come back together as
    /// [`DocPulseError::Delivery`].
    pub fn run_all_companies(&mut self) -> Result<Vec<RenewalLog>> {
        let outcomes = self.tracker.scan_all()?;
        let mut logs = Vec::with_capacity(outcomes.len());
        let mut companies = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            if let Err(err) = self.notifier.notify(&outcome.log) {
                warn!(company = outcome.log.company(), error = %err, "Renewal log delivery failed");
                companies.push(outcome.log.company().to_string());
                errors.push(err);
            }
            logs.push(outcome.log);
        }

        if !errors.is_empty() {
            error!(failed = errors.len(), total = logs.len(), "Renewal log job failed");
            return Err(DocPulseError::Delivery { companies, errors });
        }
        info!(companies = logs.len(), "Renewal log job completed for all companies");
        Ok(logs)
    }
}
