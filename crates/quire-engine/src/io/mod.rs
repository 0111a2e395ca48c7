//! Persistence of rendered markup, keyed by document and revision.
//!
//! Stores only hold strings. They know nothing about the document model,
//! and markup read back from a store goes through the parser like any
//! other input, so truncated or placeholder content loads without error.

use relative_path::{RelativePath, RelativePathBuf};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "html";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait DocumentStore {
    fn save(&mut self, doc_id: &str, revision: u64, markup: &str) -> Result<(), StoreError>;

    /// Markup stored for `revision`, `None` if there is none.
    fn load(&self, doc_id: &str, revision: u64) -> Result<Option<String>, StoreError>;

    /// Stored revisions of `doc_id`, ascending.
    fn revisions(&self, doc_id: &str) -> Result<Vec<u64>, StoreError>;

    /// The newest stored revision and its markup.
    fn latest(&self, doc_id: &str) -> Result<Option<(u64, String)>, StoreError> {
        let Some(&revision) = self.revisions(doc_id)?.last() else {
            return Ok(None);
        };
        Ok(self.load(doc_id, revision)?.map(|markup| (revision, markup)))
    }
}

/// Document ids become directory names, so they must be a single plain
/// path component.
fn validate_id(doc_id: &str) -> Result<(), StoreError> {
    let valid = !doc_id.is_empty()
        && doc_id != "."
        && doc_id != ".."
        && doc_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(doc_id.to_string()))
    }
}

/// Stores each revision as `<root>/<doc_id>/<revision>.html`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn revision_path(doc_id: &str, revision: u64) -> RelativePathBuf {
        RelativePath::new(doc_id).join(format!("{revision}.{EXTENSION}"))
    }
}

impl DocumentStore for FsStore {
    fn save(&mut self, doc_id: &str, revision: u64, markup: &str) -> Result<(), StoreError> {
        validate_id(doc_id)?;
        let path = Self::revision_path(doc_id, revision).to_path(&self.root);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, markup)?;
        log::debug!("saved {doc_id} revision {revision} to {}", path.display());
        Ok(())
    }

    fn load(&self, doc_id: &str, revision: u64) -> Result<Option<String>, StoreError> {
        validate_id(doc_id)?;
        let path = Self::revision_path(doc_id, revision).to_path(&self.root);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn revisions(&self, doc_id: &str) -> Result<Vec<u64>, StoreError> {
        validate_id(doc_id)?;
        let dir = RelativePath::new(doc_id).to_path(&self.root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut revisions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if let Some(ext) = path.extension()
                && ext == EXTENSION
                && let Some(revision) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse().ok())
            {
                revisions.push(revision);
            }
        }
        revisions.sort_unstable();
        Ok(revisions)
    }
}

/// A store that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, BTreeMap<u64, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn save(&mut self, doc_id: &str, revision: u64, markup: &str) -> Result<(), StoreError> {
        validate_id(doc_id)?;
        self.documents
            .entry(doc_id.to_string())
            .or_default()
            .insert(revision, markup.to_string());
        Ok(())
    }

    fn load(&self, doc_id: &str, revision: u64) -> Result<Option<String>, StoreError> {
        validate_id(doc_id)?;
        Ok(self
            .documents
            .get(doc_id)
            .and_then(|revisions| revisions.get(&revision))
            .cloned())
    }

    fn revisions(&self, doc_id: &str) -> Result<Vec<u64>, StoreError> {
        validate_id(doc_id)?;
        Ok(self
            .documents
            .get(doc_id)
            .map(|revisions| revisions.keys().copied().collect())
            .unwrap_or_default())
    }
}
