//! JSON file persistence for the document arena
//!
//! The whole arena lives in one JSON array. Every successful mutation
//! rewrites the file through a temporary sibling and a rename, so a crash
//! mid-write leaves the previous contents in place.

use anyhow::{Context, Result};
use docpulse_core::{
    DocPulseError, Document, DocumentFilter, DocumentId, DocumentStore, InMemoryStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    documents: InMemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let documents = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store: {}", path.display()))?;
            let documents: Vec<Document> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store: {}", path.display()))?;
            InMemoryStore::from_documents(documents)?
        } else {
            InMemoryStore::new()
        };
        debug!(path = %path.display(), documents = documents.len(), "Opened store");
        Ok(Self { path, documents })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.documents()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Apply `change` to a copy of the arena and keep it only once it is
    /// on disk
    fn commit<T, F>(&mut self, change: F) -> docpulse_core::Result<T>
    where
        F: FnOnce(&mut InMemoryStore) -> docpulse_core::Result<T>,
    {
        let mut next = self.documents.clone();
        let value = change(&mut next)?;
        write_atomic(&self.path, &next)?;
        self.documents = next;
        Ok(value)
    }
}

fn write_atomic(path: &Path, documents: &InMemoryStore) -> docpulse_core::Result<()> {
    let all: Vec<&Document> = documents.documents().collect();
    let json = serde_json::to_string_pretty(&all)
        .map_err(|e| DocPulseError::Storage(format!("Failed to serialize store: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %cleanup, "Temporary store file not removed");
        }
        return Err(DocPulseError::Storage(format!(
            "Failed to write store {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

impl DocumentStore for JsonFileStore {
    fn load(&self, id: &DocumentId) -> docpulse_core::Result<Document> {
        self.documents.load(id)
    }

    fn save(&mut self, document: &Document) -> docpulse_core::Result<u64> {
        self.commit(|documents| documents.save(document))
    }

    fn query(&self, filter: &DocumentFilter) -> docpulse_core::Result<Vec<Document>> {
        self.documents.query(filter)
    }

    fn create(&mut self, document: Document) -> docpulse_core::Result<DocumentId> {
        self.commit(|documents| documents.create(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpulse_core::NewDocument;
    use tempfile::TempDir;

    fn draft(id: &str) -> Document {
        let new = NewDocument::new("Lease", "Contract", "Landlord", "Acme", "judy");
        Document::draft(DocumentId::new(id), new).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("docs.json")).unwrap();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.create(draft("DOC-1")).unwrap();
        let doc = store.load(&"DOC-1".into()).unwrap();
        assert_eq!(store.save(&doc).unwrap(), 1);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.load(&"DOC-1".into()).unwrap().version(), 1);
    }

    #[test]
    fn test_rejected_save_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.create(draft("DOC-1")).unwrap();
        let stale = store.load(&"DOC-1".into()).unwrap();
        store.save(&stale).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(matches!(
            store.save(&stale),
            Err(DocPulseError::Conflict { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.load(&"DOC-1".into()).unwrap().version(), 1);
    }

    #[test]
    fn test_failed_rename_removes_temporary_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        // A directory in the way makes the final rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        assert!(matches!(
            store.create(draft("DOC-1")),
            Err(DocPulseError::Storage(_))
        ));
        assert!(!dir.path().join("docs.json.tmp").exists());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(err.to_string().contains("Failed to parse store"));
    }
}
