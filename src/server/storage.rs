//! JSON document store for lists and items.
//!
//! The whole store is a single JSON file with two collections:
//! ```text
//! {
//!   "items": [ { "id": ..., "list_id": ..., "label": ..., "created_at": ... }, ... ],
//!   "lists": [ { "id": ..., "title": ..., "created_at": ... }, ... ]
//! }
//! ```
//!
//! The document is mirrored in memory. Every mutation rewrites the file
//! before returning, while holding the write lock, so mutations never
//! interleave.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Item, ItemPatch, List, ListPatch};

/// Named collections in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Lists,
    Items,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Lists => "lists",
            Collection::Items => "items",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk layout of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub lists: Vec<List>,
}

/// A record type stored in one of the document's collections.
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial update applied by [`Store::merge`].
    type Patch;

    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn apply_patch(&mut self, patch: Self::Patch);
    fn records(doc: &Document) -> &Vec<Self>;
    fn records_mut(doc: &mut Document) -> &mut Vec<Self>;
}

impl Record for List {
    type Patch = ListPatch;

    const COLLECTION: Collection = Collection::Lists;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: ListPatch) {
        self.apply(patch);
    }

    fn records(doc: &Document) -> &Vec<Self> {
        &doc.lists
    }

    fn records_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.lists
    }
}

impl Record for Item {
    type Patch = ItemPatch;

    const COLLECTION: Collection = Collection::Items;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: ItemPatch) {
        self.apply(patch);
    }

    fn records(doc: &Document) -> &Vec<Self> {
        &doc.items
    }

    fn records_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.items
    }
}

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing the store file.
    IoError(PathBuf, io::Error),
    /// The store file is not a valid document.
    ParseError(PathBuf, serde_json::Error),
    /// The in-memory document could not be serialized.
    SerializeError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreError::ParseError(path, e) => {
                write!(f, "Failed to parse store {}: {}", path.display(), e)
            }
            StoreError::SerializeError(e) => write!(f, "Failed to serialize store: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(_, e) => Some(e),
            StoreError::ParseError(_, e) => Some(e),
            StoreError::SerializeError(e) => Some(e),
        }
    }
}

/// Shared handle to the JSON document store.
///
/// Cloning is cheap; all clones operate on the same document.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    doc: RwLock<Document>,
}

impl Store {
    /// Opens the store at `path`.
    ///
    /// A missing file is created with empty collections.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let doc = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<Document>(&bytes)
                .map_err(|e| StoreError::ParseError(path.clone(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .map_err(|e| StoreError::IoError(parent.to_path_buf(), e))?;
                }
                let doc = Document::default();
                write_document(&path, &doc)?;
                tracing::info!("Created empty store at {}", path.display());
                doc
            }
            Err(e) => return Err(StoreError::IoError(path, e)),
        };

        tracing::debug!(
            lists = doc.lists.len(),
            items = doc.items.len(),
            "Loaded store {}",
            path.display()
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                doc: RwLock::new(doc),
            }),
        })
    }

    /// Returns every record of a collection in insertion order.
    pub async fn all<R: Record>(&self) -> Vec<R> {
        let doc = self.inner.doc.read().await;
        R::records(&doc).clone()
    }

    /// Returns the record with the given id.
    pub async fn find<R: Record>(&self, id: &str) -> Option<R> {
        let doc = self.inner.doc.read().await;
        R::records(&doc).iter().find(|r| r.id() == id).cloned()
    }

    /// Returns every record matching `predicate`, in insertion order.
    pub async fn filter<R, F>(&self, predicate: F) -> Vec<R>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let doc = self.inner.doc.read().await;
        R::records(&doc)
            .iter()
            .filter(|r| predicate(*r))
            .cloned()
            .collect()
    }

    /// Checks if a record with the given id exists.
    pub async fn contains<R: Record>(&self, id: &str) -> bool {
        let doc = self.inner.doc.read().await;
        R::records(&doc).iter().any(|r| r.id() == id)
    }

    /// Appends a record and persists the document.
    pub async fn insert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        let stored = record.clone();
        self.mutate(|doc| R::records_mut(doc).push(record)).await?;
        tracing::debug!("Inserted {} into {}", stored.id(), R::COLLECTION);
        Ok(stored)
    }

    /// Applies `patch` to the record with the given id and persists.
    ///
    /// Returns `Ok(None)` without writing if no such record exists.
    pub async fn merge<R: Record>(
        &self,
        id: &str,
        patch: R::Patch,
    ) -> Result<Option<R>, StoreError> {
        let mut guard = self.inner.doc.write().await;

        let Some(index) = R::records(&guard).iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut next = guard.clone();
        let record = &mut R::records_mut(&mut next)[index];
        record.apply_patch(patch);
        let updated = record.clone();

        write_document(&self.inner.path, &next)?;
        *guard = next;

        Ok(Some(updated))
    }

    /// Removes the record with the given id and persists.
    ///
    /// Returns the removed record, or `Ok(None)` without writing if it was absent.
    pub async fn remove<R: Record>(&self, id: &str) -> Result<Option<R>, StoreError> {
        let mut guard = self.inner.doc.write().await;

        let Some(index) = R::records(&guard).iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut next = guard.clone();
        let removed = R::records_mut(&mut next).remove(index);

        write_document(&self.inner.path, &next)?;
        *guard = next;

        tracing::debug!("Removed {} from {}", id, R::COLLECTION);
        Ok(Some(removed))
    }

    /// Runs `f` on a copy of the document, persists the copy, then swaps it in.
    ///
    /// If persisting fails the in-memory document is left untouched.
    async fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Document),
    {
        let mut guard = self.inner.doc.write().await;
        let mut next = guard.clone();
        f(&mut next);
        write_document(&self.inner.path, &next)?;
        *guard = next;
        Ok(())
    }
}

/// Rewrites the store file atomically using temp file + rename.
fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(doc).map_err(StoreError::SerializeError)?;

    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::IoError(temp_path.clone(), e))?;

    file.write_all(&bytes)
        .map_err(|e| StoreError::IoError(temp_path.clone(), e))?;

    file.sync_all()
        .map_err(|e| StoreError::IoError(temp_path.clone(), e))?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::IoError(path.to_path_buf(), e))?;

    Ok(())
}
