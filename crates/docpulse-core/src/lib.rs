//! DocPulse core
//!
//! Tracks licenses, contracts and certifications through their lifecycle
//! and runs the daily renewal scan:
//!
//! - [`lifecycle`]: the status state machine and its guards
//! - [`policy`]: lead-time classes and severity classification
//! - [`scanner`]: the daily scan that moves documents and builds a [`RenewalLog`]
//! - [`tracker`]: store-backed entry points for every user operation
//!
//! ```
//! use chrono::NaiveDate;
//! use docpulse_core::{DocumentTracker, FixedClock, InMemoryStore, NewDocument, Status};
//!
//! # fn main() -> docpulse_core::Result<()> {
//! let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let mut tracker = DocumentTracker::with_clock(InMemoryStore::new(), FixedClock(today));
//!
//! let id = tracker.register(
//!     NewDocument::new("Trade License", "License", "City Council", "Acme", "grace")
//!         .with_expiry(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()),
//! )?;
//! tracker.activate(&id)?;
//!
//! let log = tracker.run_daily_scan("Acme")?;
//! assert_eq!(log.total_documents_flagged(), 1);
//! assert_eq!(tracker.load(&id)?.status(), Status::ActiveSoonToExpire);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod lifecycle;
pub mod notify;
pub mod policy;
pub mod renewal_log;
pub mod scanner;
pub mod store;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use document::{Document, DocumentId, LifecycleState, NewDocument, Status};
pub use error::{DocPulseError, Result};
pub use job::DailyRenewalJob;
pub use lifecycle::{AutoTransition, Operation};
pub use notify::{Notifier, TracingNotifier};
pub use policy::{Assessment, LeadTimeClass, RenewalLeadTime, RenewalPolicy, Severity};
pub use renewal_log::{RenewalLog, RenewalPendingItem};
pub use scanner::{RenewalScanner, ScanOutcome};
pub use store::{DocumentFilter, DocumentStore, InMemoryStore};
pub use tracker::DocumentTracker;
