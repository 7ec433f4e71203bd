//! Daily renewal scan
//!
//! Walks the Current documents of a company, applies the renewal policy,
//! moves documents whose computed state changed and collects flagged ones
//! into a [`RenewalLog`]. A failure on one document is logged and skipped;
//! it never aborts the batch.
//!
//! Running the scan again on unchanged data is safe: transitions that are
//! already in place are skipped and the resulting log is identical.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::document::DocumentId;
use crate::error::{DocPulseError, Result};
use crate::lifecycle::{self, AutoTransition};
use crate::renewal_log::{RenewalLog, RenewalPendingItem};
use crate::store::{DocumentFilter, DocumentStore};

/// Everything one scan did, including what it could not do
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub log: RenewalLog,
    /// Documents evaluated without error
    pub evaluated: usize,
    pub transitions: Vec<(DocumentId, AutoTransition)>,
    pub failures: Vec<(DocumentId, DocPulseError)>,
}

pub struct RenewalScanner;

impl RenewalScanner {
    /// Scan one company
    ///
    /// Only a failing candidate query is fatal; per-document errors end up
    /// in [`ScanOutcome::failures`].
    #[instrument(skip(store))]
    pub fn scan<S: DocumentStore + ?Sized>(
        store: &mut S,
        company: &str,
        today: NaiveDate,
    ) -> Result<ScanOutcome> {
        let started = Instant::now();
        let candidates = store.query(&DocumentFilter::scan_candidates().company(company))?;
        debug!("Evaluating {} candidate documents", candidates.len());

        let mut items = Vec::new();
        let mut transitions = Vec::new();
        let mut failures = Vec::new();
        let mut evaluated = 0;

        for candidate in candidates {
            match Self::evaluate(store, &candidate.id, today) {
                Ok((item, transition)) => {
                    evaluated += 1;
                    if let Some(transition) = transition {
                        transitions.push((candidate.id.clone(), transition));
                    }
                    items.extend(item);
                }
                Err(err) => {
                    warn!(document = %candidate.id, error = %err, "Skipping document");
                    failures.push((candidate.id, err));
                }
            }
        }

        let log = RenewalLog::new(company, today, items);
        info!(
            flagged = log.total_documents_flagged(),
            transitions = transitions.len(),
            failures = failures.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Renewal scan complete"
        );

        Ok(ScanOutcome {
            log,
            evaluated,
            transitions,
            failures,
        })
    }

    /// Scan every company that has candidate documents, one log each,
    /// ordered by company name
    pub fn scan_all<S: DocumentStore + ?Sized>(
        store: &mut S,
        today: NaiveDate,
    ) -> Result<Vec<ScanOutcome>> {
        let companies: BTreeSet<String> = store
            .query(&DocumentFilter::scan_candidates())?
            .into_iter()
            .map(|doc| doc.company)
            .collect();

        info!("Scanning {} companies", companies.len());
        companies
            .iter()
            .map(|company| Self::scan(&mut *store, company, today))
            .collect()
    }

    /// Re-load the latest state, apply the policy and persist any change
    fn evaluate<S: DocumentStore + ?Sized>(
        store: &mut S,
        id: &DocumentId,
        today: NaiveDate,
    ) -> Result<(Option<RenewalPendingItem>, Option<AutoTransition>)> {
        let mut document = store.load(id)?;

        let Some(expiry_date) = document.expiry_date() else {
            debug!(document = %id, "No expiry date");
            return Ok((None, None));
        };
        let Some(assessment) = document.assess(today) else {
            return Ok((None, None));
        };

        let transition = lifecycle::apply_assessment(&mut document, &assessment);
        if let Some(transition) = transition {
            store.save(&document)?;
            info!(
                document = %id,
                status = %document.status(),
                "Applied {:?}",
                transition
            );
        }

        debug!(
            document = %id,
            days_to_expiry = assessment.days_to_expiry,
            severity = %assessment.severity,
            "Assessed document"
        );

        let item = RenewalPendingItem::snapshot(&document, expiry_date, &assessment);
        Ok((Some(item), transition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NewDocument, Status};
    use crate::policy::{RenewalLeadTime, Severity};
    use crate::store::InMemoryStore;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn add_active(store: &mut InMemoryStore, id: &str, company: &str, expiry: NaiveDate, lead: i64) {
        let new = NewDocument::new(id, "License", "Registry", company, "frank")
            .with_expiry(expiry)
            .with_lead_time(RenewalLeadTime::custom(lead).unwrap());
        let mut doc = Document::draft(DocumentId::new(id), new).unwrap();
        lifecycle::activate(&mut doc).unwrap();
        store.create(doc).unwrap();
    }

    fn statuses(store: &InMemoryStore) -> Vec<(String, Status)> {
        store
            .documents()
            .map(|d| (d.id.to_string(), d.status()))
            .collect()
    }

    #[test]
    fn test_scan_classifies_and_transitions() {
        let mut store = InMemoryStore::new();
        add_active(&mut store, "DOC-LATE", "Acme", date(2025, 5, 31), 7);
        add_active(&mut store, "DOC-TODAY", "Acme", date(2025, 6, 1), 7);
        add_active(&mut store, "DOC-SOON", "Acme", date(2025, 6, 6), 7);
        add_active(&mut store, "DOC-LATER", "Acme", date(2025, 7, 1), 7);

        let outcome = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        let flagged: Vec<_> = outcome
            .log
            .items()
            .iter()
            .map(|i| (i.document.as_str(), i.days_to_expiry, i.severity))
            .collect();
        assert_eq!(
            flagged,
            vec![
                ("DOC-LATE", -1, Severity::Overdue),
                ("DOC-TODAY", 0, Severity::DueToday),
                ("DOC-SOON", 5, Severity::DueSoon),
            ]
        );
        assert_eq!(outcome.evaluated, 4);
        assert!(outcome.failures.is_empty());
        assert_eq!(
            statuses(&store),
            vec![
                ("DOC-LATE".to_string(), Status::Expired),
                ("DOC-LATER".to_string(), Status::Active),
                ("DOC-SOON".to_string(), Status::ActiveSoonToExpire),
                ("DOC-TODAY".to_string(), Status::ActiveSoonToExpire),
            ]
        );
    }

    #[test]
    fn test_second_scan_is_idempotent() {
        let mut store = InMemoryStore::new();
        add_active(&mut store, "DOC-LATE", "Acme", date(2025, 5, 20), 7);
        add_active(&mut store, "DOC-SOON", "Acme", date(2025, 6, 3), 7);

        let first = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        let second = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();

        assert_eq!(first.transitions.len(), 2);
        assert!(second.transitions.is_empty());
        assert_eq!(first.log, second.log);
    }

    #[test]
    fn test_empty_scan_still_produces_log() {
        let mut store = InMemoryStore::new();
        let outcome = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        assert_eq!(outcome.log.company(), "Acme");
        assert_eq!(outcome.log.log_date(), today());
        assert_eq!(outcome.log.total_documents_flagged(), 0);
        assert!(outcome.log.items().is_empty());
    }

    #[test]
    fn test_scan_is_scoped_to_company() {
        let mut store = InMemoryStore::new();
        add_active(&mut store, "DOC-A", "Acme", date(2025, 6, 2), 7);
        add_active(&mut store, "DOC-G", "Globex", date(2025, 6, 2), 7);

        let outcome = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        assert_eq!(outcome.log.total_documents_flagged(), 1);
        assert_eq!(store.load(&"DOC-G".into()).unwrap().status(), Status::Active);

        let all = RenewalScanner::scan_all(&mut store, today()).unwrap();
        let companies: Vec<_> = all.iter().map(|o| o.log.company().to_string()).collect();
        assert_eq!(companies, vec!["Acme", "Globex"]);
    }

    #[test]
    fn test_non_renewable_documents_are_not_scanned() {
        let mut store = InMemoryStore::new();
        let new = NewDocument::new("One-off", "Contract", "Client", "Acme", "frank")
            .with_expiry(date(2025, 5, 1))
            .with_renewable(false);
        let mut doc = Document::draft(DocumentId::new("DOC-X"), new).unwrap();
        lifecycle::activate(&mut doc).unwrap();
        store.create(doc).unwrap();
        add_active(&mut store, "DOC-LATE", "Acme", date(2025, 5, 1), 7);

        let outcome = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        let ids: Vec<_> = outcome.log.items().iter().map(|i| i.document.as_str()).collect();
        assert_eq!(ids, vec!["DOC-LATE"]);
        assert_eq!(outcome.evaluated, 1);
        assert_eq!(
            outcome.transitions,
            vec![(DocumentId::new("DOC-LATE"), AutoTransition::MarkedExpired)]
        );
        assert_eq!(store.load(&"DOC-X".into()).unwrap().status(), Status::Active);
    }

    #[test]
    fn test_expired_documents_keep_being_reported() {
        let mut store = InMemoryStore::new();
        add_active(&mut store, "DOC-LATE", "Acme", date(2025, 5, 1), 30);

        RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        let next_day = RenewalScanner::scan(&mut store, "Acme", date(2025, 6, 2)).unwrap();

        assert!(next_day.transitions.is_empty());
        let item = &next_day.log.items()[0];
        assert_eq!(item.current_status, Status::Expired);
        assert_eq!(item.days_to_expiry, -32);
    }

    /// Store whose saves fail for one document
    struct FlakyStore {
        inner: InMemoryStore,
        broken: DocumentId,
    }

    impl DocumentStore for FlakyStore {
        fn load(&self, id: &DocumentId) -> Result<Document> {
            self.inner.load(id)
        }

        fn save(&mut self, document: &Document) -> Result<u64> {
            if document.id == self.broken {
                return Err(DocPulseError::Storage("disk full".to_string()));
            }
            self.inner.save(document)
        }

        fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
            self.inner.query(filter)
        }

        fn create(&mut self, document: Document) -> Result<DocumentId> {
            self.inner.create(document)
        }
    }

    #[test]
    fn test_failed_document_is_skipped_not_fatal() {
        let mut inner = InMemoryStore::new();
        add_active(&mut inner, "DOC-BAD", "Acme", date(2025, 6, 3), 7);
        add_active(&mut inner, "DOC-GOOD", "Acme", date(2025, 6, 4), 7);
        let mut store = FlakyStore {
            inner,
            broken: DocumentId::new("DOC-BAD"),
        };

        let outcome = RenewalScanner::scan(&mut store, "Acme", today()).unwrap();
        let ids: Vec<_> = outcome.log.items().iter().map(|i| i.document.as_str()).collect();
        assert_eq!(ids, vec!["DOC-GOOD"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, DocumentId::new("DOC-BAD"));
        assert_eq!(outcome.evaluated, 1);
    }
}
