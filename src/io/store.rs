use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use crate::io::lock::{FileLock, LockError};

/// Error type for document store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// A markdown document as listed by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Vault-relative, `/`-separated
    pub path: String,
    /// File name without the `.md` extension
    pub base_name: String,
}

impl DocumentRef {
    pub fn new(path: &str) -> Self {
        DocumentRef {
            path: path.to_string(),
            base_name: base_name(path),
        }
    }
}

/// Base name of a document path: last segment with the `.md` suffix removed
pub fn base_name(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.strip_suffix(".md").unwrap_or(last).to_string()
}

/// The host document collection the scanner reads from and toggles write to.
pub trait DocumentStore {
    /// Every markdown document, in the store's own order
    fn list_documents(&self) -> Result<Vec<DocumentRef>, StoreError>;

    fn read_content(&self, path: &str) -> Result<String, StoreError>;

    /// Read-modify-write a document. The mutator returns `None` to leave the
    /// document untouched. Returns whether anything was written.
    fn write_content(
        &mut self,
        path: &str,
        mutate: &mut dyn FnMut(&str) -> Option<String>,
    ) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// A vault directory on disk. Dot-directories (`.git`, `.taskhub`, ...) are
/// never listed.
pub struct FsStore {
    root: PathBuf,
    lock_dir: PathBuf,
}

impl FsStore {
    pub fn new(root: &Path, lock_dir: &Path) -> Self {
        FsStore {
            root: root.to_path_buf(),
            lock_dir: lock_dir.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path, refusing anything that escapes the vault
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.is_empty() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<DocumentRef>) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|e| StoreError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let mut entries: Vec<_> = entries.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let rel = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", prefix, name)
            };
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, &rel, out)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
                out.push(DocumentRef::new(&rel));
            }
        }
        Ok(())
    }
}

impl DocumentStore for FsStore {
    fn list_documents(&self) -> Result<Vec<DocumentRef>, StoreError> {
        let mut out = Vec::new();
        self.walk(&self.root, "", &mut out)?;
        Ok(out)
    }

    fn read_content(&self, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::read_to_string(&full).map_err(|e| StoreError::ReadError {
            path: full,
            source: e,
        })
    }

    fn write_content(
        &mut self,
        path: &str,
        mutate: &mut dyn FnMut(&str) -> Option<String>,
    ) -> Result<bool, StoreError> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&self.lock_dir)?;
        let _lock = FileLock::acquire_default(&self.lock_dir)?;

        let current = self.read_content(path)?;
        let Some(updated) = mutate(&current) else {
            return Ok(false);
        };
        atomic_write(&full, updated.as_bytes()).map_err(|e| StoreError::WriteError {
            path: full.clone(),
            source: e,
        })?;
        tracing::debug!(path, "document written");
        Ok(true)
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Ordered in-memory documents; enumeration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Builder-style insert
    pub fn with(mut self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: &str, content: &str) {
        self.docs.insert(path.to_string(), content.to_string());
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.docs.shift_remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.docs.get(path).map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn list_documents(&self) -> Result<Vec<DocumentRef>, StoreError> {
        Ok(self.docs.keys().map(|p| DocumentRef::new(p)).collect())
    }

    fn read_content(&self, path: &str) -> Result<String, StoreError> {
        self.docs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn write_content(
        &mut self,
        path: &str,
        mutate: &mut dyn FnMut(&str) -> Option<String>,
    ) -> Result<bool, StoreError> {
        let current = self
            .docs
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        match mutate(current) {
            Some(updated) => {
                *current = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
