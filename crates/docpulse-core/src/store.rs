//! Persistence seam
//!
//! The core only needs single-document atomicity: `save` either stores the
//! whole document or nothing. Every stored document carries a version that
//! `save` checks and bumps, so a writer holding a stale copy gets
//! [`DocPulseError::Conflict`] instead of silently overwriting a newer one.

use std::collections::BTreeMap;

use crate::document::{Document, DocumentId, LifecycleState, Status};
use crate::error::{DocPulseError, Result};

/// Selection criteria for [`DocumentStore::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub company: Option<String>,
    pub document_name: Option<String>,
    pub category: Option<String>,
    pub lifecycle_state: Option<LifecycleState>,
    pub renewable: Option<bool>,
    pub exclude_statuses: Vec<Status>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents the daily scan looks at: renewable Current chain heads
    /// that are neither unsubmitted drafts nor terminated by a person
    pub fn scan_candidates() -> Self {
        Self::new()
            .lifecycle_state(LifecycleState::Current)
            .renewable(true)
            .excluding(&[
                Status::Draft,
                Status::Renewed,
                Status::Revoked,
                Status::Cancelled,
            ])
    }

    pub fn company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    pub fn document_name(mut self, document_name: &str) -> Self {
        self.document_name = Some(document_name.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn lifecycle_state(mut self, state: LifecycleState) -> Self {
        self.lifecycle_state = Some(state);
        self
    }

    pub fn renewable(mut self, renewable: bool) -> Self {
        self.renewable = Some(renewable);
        self
    }

    pub fn excluding(mut self, statuses: &[Status]) -> Self {
        self.exclude_statuses.extend_from_slice(statuses);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        fn field_matches(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |e| e == actual)
        }

        field_matches(&self.company, &document.company)
            && field_matches(&self.document_name, &document.document_name)
            && field_matches(&self.category, &document.category)
            && self
                .lifecycle_state
                .map_or(true, |state| state == document.lifecycle_state())
            && self
                .renewable
                .map_or(true, |renewable| renewable == document.is_renewable)
            && !self.exclude_statuses.contains(&document.status())
    }
}

/// Record store collaborator
pub trait DocumentStore {
    fn load(&self, id: &DocumentId) -> Result<Document>;

    /// Persist an existing document, returning its new version
    fn save(&mut self, document: &Document) -> Result<u64>;

    /// Matching documents, ordered by id
    fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>>;

    /// Insert a new document under its own id
    fn create(&mut self, document: Document) -> Result<DocumentId>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &mut S {
    fn load(&self, id: &DocumentId) -> Result<Document> {
        (**self).load(id)
    }

    fn save(&mut self, document: &Document) -> Result<u64> {
        (**self).save(document)
    }

    fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        (**self).query(filter)
    }

    fn create(&mut self, document: Document) -> Result<DocumentId> {
        (**self).create(document)
    }
}

/// Arena of documents keyed by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: BTreeMap<DocumentId, Document>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an arena from previously persisted documents, keeping their
    /// versions
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Result<Self> {
        let mut store = Self::new();
        for document in documents {
            let id = document.id.clone();
            if store.documents.insert(id.clone(), document).is_some() {
                return Err(DocPulseError::Storage(format!("Duplicate document id: {}", id)));
            }
        }
        Ok(store)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self, id: &DocumentId) -> Result<Document> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| DocPulseError::NotFound(id.clone()))
    }

    fn save(&mut self, document: &Document) -> Result<u64> {
        let stored = self
            .documents
            .get_mut(&document.id)
            .ok_or_else(|| DocPulseError::NotFound(document.id.clone()))?;

        if stored.version != document.version {
            return Err(DocPulseError::Conflict {
                document: document.id.clone(),
                expected: document.version,
                found: stored.version,
            });
        }

        let mut updated = document.clone();
        updated.version += 1;
        let version = updated.version;
        *stored = updated;
        Ok(version)
    }

    fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        Ok(self
            .documents
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    fn create(&mut self, document: Document) -> Result<DocumentId> {
        let id = document.id.clone();
        if self.documents.contains_key(&id) {
            return Err(DocPulseError::Storage(format!("Document {} already exists", id)));
        }
        self.documents.insert(id.clone(), document);
        Ok(id)
    }
}
