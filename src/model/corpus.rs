use chrono::{DateTime, Local};

use super::task::TaskItem;

/// Snapshot of every task extracted by one scan of the vault.
///
/// Replaced wholesale on each rescan; nothing mutates it in between.
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Document forests concatenated in store enumeration order
    pub roots: Vec<TaskItem>,
    /// Number of documents that were scanned (excluded ones not counted)
    pub document_count: usize,
    pub scanned_at: DateTime<Local>,
}

impl Corpus {
    pub fn empty() -> Self {
        Corpus {
            roots: Vec::new(),
            document_count: 0,
            scanned_at: Local::now(),
        }
    }

    /// Every task, roots and descendants, in document order
    pub fn all_tasks(&self) -> Vec<&TaskItem> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.walk(&mut out);
        }
        out
    }

    /// Find a task by file and source line
    pub fn find(&self, file_path: &str, line: usize) -> Option<&TaskItem> {
        self.all_tasks()
            .into_iter()
            .find(|t| t.file_path == file_path && t.line == line)
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Corpus::empty()
    }
}
