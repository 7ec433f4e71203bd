//! Store-backed entry points for user-invoked operations
//!
//! Each operation re-loads the latest persisted state, applies one
//! transition to that copy and saves it. A failed guard or a stale version
//! leaves the store untouched.

use chrono::NaiveDate;
use tracing::{error, info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::document::{Document, DocumentId, LifecycleState, NewDocument, Status};
use crate::error::{DocPulseError, Result};
use crate::lifecycle::{self, Operation, Renewal};
use crate::policy::RenewalLeadTime;
use crate::renewal_log::RenewalLog;
use crate::scanner::{RenewalScanner, ScanOutcome};
use crate::store::{DocumentFilter, DocumentStore};

pub struct DocumentTracker<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: DocumentStore> DocumentTracker<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: DocumentStore, C: Clock> DocumentTracker<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn load(&self, id: &DocumentId) -> Result<Document> {
        self.store.load(id)
    }

    /// Create a Draft/Current document
    ///
    /// Only one live Current document may exist per name, category and
    /// company; renewal successors are created through [`renew`](Self::renew).
    #[instrument(skip(self, new), fields(name = %new.document_name))]
    pub fn register(&mut self, new: NewDocument) -> Result<DocumentId> {
        new.validate()?;

        let existing = self.store.query(
            &DocumentFilter::new()
                .company(&new.company)
                .document_name(&new.document_name)
                .category(&new.category)
                .lifecycle_state(LifecycleState::Current)
                .excluding(&[Status::Revoked, Status::Cancelled, Status::Renewed]),
        )?;
        if let Some(existing) = existing.into_iter().next() {
            return Err(DocPulseError::DuplicateCurrent {
                existing: existing.id,
                document_name: new.document_name,
                category: new.category,
                company: new.company,
            });
        }

        let document = Document::draft(DocumentId::generate(), new)?;
        let id = self.store.create(document)?;
        info!(document = %id, "Registered document");
        Ok(id)
    }

    pub fn allowed_operations(&self, id: &DocumentId) -> Result<Vec<Operation>> {
        let document = self.store.load(id)?;
        Ok(lifecycle::allowed_operations(
            document.status(),
            document.lifecycle_state(),
            document.is_renewable,
        ))
    }

    pub fn set_expiry_date(&mut self, id: &DocumentId, expiry_date: NaiveDate) -> Result<Document> {
        self.apply(id, |doc| lifecycle::set_expiry_date(doc, expiry_date))
    }

    pub fn set_lead_time(&mut self, id: &DocumentId, lead_time: RenewalLeadTime) -> Result<Document> {
        self.apply(id, |doc| lifecycle::set_lead_time(doc, lead_time))
    }

    pub fn activate(&mut self, id: &DocumentId) -> Result<Document> {
        self.apply(id, lifecycle::activate)
    }

    pub fn mark_renewal_in_progress(&mut self, id: &DocumentId) -> Result<Document> {
        self.apply(id, lifecycle::mark_renewal_in_progress)
    }

    pub fn revert_renewal_status(&mut self, id: &DocumentId) -> Result<Document> {
        self.apply(id, |doc| lifecycle::revert_renewal_status(doc).map(|_| ()))
    }

    /// Revoke or cancel. Permission checks belong to the caller.
    pub fn revoke_or_cancel(&mut self, id: &DocumentId) -> Result<Document> {
        self.apply(id, |doc| lifecycle::revoke_or_cancel(doc).map(|_| ()))
    }

    /// Renew a document, returning the id of its new Draft successor
    ///
    /// The predecessor is saved first so that a stale copy fails before
    /// anything is created. If the successor cannot be created afterwards
    /// the predecessor is put back as it was.
    #[instrument(skip(self))]
    pub fn renew(&mut self, id: &DocumentId) -> Result<DocumentId> {
        let original = self.store.load(id)?;
        let Renewal {
            predecessor,
            successor,
        } = lifecycle::renew(&original, DocumentId::generate(), self.clock.today())?;

        let version = self.store.save(&predecessor)?;
        let successor_id = successor.id.clone();
        if let Err(err) = self.store.create(successor) {
            let mut restored = original;
            restored.version = version;
            if let Err(restore_err) = self.store.save(&restored) {
                error!(
                    document = %id,
                    error = %restore_err,
                    "Failed to restore document after aborted renewal"
                );
            }
            return Err(err);
        }

        info!(document = %id, successor = %successor_id, "Renewed document");
        Ok(successor_id)
    }

    /// Whole renewal chain containing `id`, oldest first
    pub fn renewal_chain(&self, id: &DocumentId) -> Result<Vec<Document>> {
        let mut root = self.store.load(id)?;
        let mut seen = vec![root.id.clone()];
        while let Some(previous) = root.predecessor.clone() {
            if seen.contains(&previous) {
                break;
            }
            seen.push(previous.clone());
            root = self.store.load(&previous)?;
        }

        let mut chain = vec![root];
        while let Some(next) = chain.last().and_then(|doc| doc.successor.clone()) {
            if chain.iter().any(|doc| doc.id == next) {
                break;
            }
            chain.push(self.store.load(&next)?);
        }
        Ok(chain)
    }

    /// The Current member of the chain containing `id`
    pub fn chain_head(&self, id: &DocumentId) -> Result<Document> {
        self.renewal_chain(id)?
            .into_iter()
            .find(Document::is_current)
            .ok_or_else(|| DocPulseError::NotFound(id.clone()))
    }

    /// Scan one company as of today
    pub fn scan(&mut self, company: &str) -> Result<ScanOutcome> {
        let today = self.clock.today();
        RenewalScanner::scan(&mut self.store, company, today)
    }

    pub fn scan_all(&mut self) -> Result<Vec<ScanOutcome>> {
        let today = self.clock.today();
        RenewalScanner::scan_all(&mut self.store, today)
    }

    /// Daily scan entry point for one company
    pub fn run_daily_scan(&mut self, company: &str) -> Result<RenewalLog> {
        self.scan(company).map(|outcome| outcome.log)
    }

    fn apply<F>(&mut self, id: &DocumentId, transition: F) -> Result<Document>
    where
        F: FnOnce(&mut Document) -> Result<()>,
    {
        let mut document = self.store.load(id)?;
        let before = document.status();
        transition(&mut document)?;
        document.version = self.store.save(&document)?;
        info!(
            document = %id,
            from = %before,
            to = %document.status(),
            "Document updated"
        );
        Ok(document)
    }
}
