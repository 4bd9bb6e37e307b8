use chrono::Local;

use crate::io::store::{DocumentStore, StoreError};
use crate::model::corpus::Corpus;
use crate::parse::parse_document;

/// Whether `path` lies under any excluded folder. Folders are compared as
/// `/`-terminated prefixes, so `Templates` does not exclude `TemplatesArchive/`.
pub fn is_excluded(path: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|folder| {
        if folder.is_empty() {
            return false;
        }
        if folder.ends_with('/') {
            path.starts_with(folder.as_str())
        } else {
            path.strip_prefix(folder.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        }
    })
}

/// Scan every non-excluded document into a fresh corpus snapshot.
///
/// Only listing failures abort the scan. A document that cannot be read is
/// skipped with a warning so one bad file never blanks the whole view.
pub fn scan_corpus(store: &dyn DocumentStore, excluded: &[String]) -> Result<Corpus, StoreError> {
    let documents = store.list_documents()?;
    let mut roots = Vec::new();
    let mut document_count = 0;

    for doc in &documents {
        if is_excluded(&doc.path, excluded) {
            tracing::trace!(path = %doc.path, "excluded");
            continue;
        }
        let content = match store.read_content(&doc.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %doc.path, error = %e, "skipping unreadable document");
                continue;
            }
        };
        document_count += 1;
        roots.extend(parse_document(&doc.path, &doc.base_name, &content));
    }

    tracing::debug!(
        documents = document_count,
        roots = roots.len(),
        "corpus scanned"
    );

    Ok(Corpus {
        roots,
        document_count,
        scanned_at: Local::now(),
    })
}
