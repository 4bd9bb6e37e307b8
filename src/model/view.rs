use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::task::top_folder;

/// Which grouping the main list uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Folder → file → heading
    #[default]
    Files,
    /// File → heading, restricted to the active document's folder
    Focus,
    /// One group per tag, flat
    Tags,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Files => "Files",
            ViewMode::Focus => "Focus",
            ViewMode::Tags => "Tags",
        }
    }

    pub fn parse_mode(s: &str) -> Option<Self> {
        match s {
            "files" => Some(ViewMode::Files),
            "focus" => Some(ViewMode::Focus),
            "tags" => Some(ViewMode::Tags),
            _ => None,
        }
    }
}

/// Filters for one render. Built fresh by the caller and never stored by the
/// projection code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub show_done: bool,
    pub filter_text: String,
    pub mode: ViewMode,
    /// Path of the frontmost document, which decides the focus folder
    pub active_document: Option<String>,
}

impl ViewState {
    /// Top-level folder of the active document, `""` for a root-level document
    pub fn active_folder(&self) -> Option<&str> {
        self.active_document.as_deref().map(top_folder)
    }
}

/// Expand/collapse state for groups and parent tasks, keyed by stable strings.
/// Lives for the process session only.
#[derive(Debug, Clone, Default)]
pub struct CollapseSet {
    collapsed: HashSet<String>,
}

impl CollapseSet {
    pub fn is_collapsed(&self, key: &str) -> bool {
        self.collapsed.contains(key)
    }

    /// Flip a key; returns true if it is now collapsed
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.collapsed.remove(key) {
            false
        } else {
            self.collapsed.insert(key.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_folder_follows_active_document() {
        let mut state = ViewState::default();
        assert_eq!(state.active_folder(), None);
        state.active_document = Some("Work/plan.md".into());
        assert_eq!(state.active_folder(), Some("Work"));
        state.active_document = Some("todo.md".into());
        assert_eq!(state.active_folder(), Some(""));
    }

    #[test]
    fn collapse_toggle_round_trips() {
        let mut set = CollapseSet::default();
        assert!(set.toggle("Notes.md"));
        assert!(set.is_collapsed("Notes.md"));
        assert!(!set.toggle("Notes.md"));
        assert!(set.is_empty());
    }
}
