use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::task::{TaskItem, top_folder};

/// Persisted settings from `.taskhub/settings.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault-relative folders whose documents are never scanned
    #[serde(default, alias = "excludedFolders")]
    pub excluded_folders: Vec<String>,
    /// Initial state of the "show completed" toggle
    #[serde(default, alias = "showDone")]
    pub show_done: bool,
    /// Document paths hidden from the main list
    #[serde(default, alias = "hiddenFiles")]
    pub hidden_files: Vec<String>,
    /// Task identities (`filePath::taskText`) hidden from the main list
    #[serde(default, alias = "hiddenTasks")]
    pub hidden_tasks: Vec<String>,
    /// Top-level folder names hidden from the main list; `""` is the vault root
    #[serde(default, alias = "hiddenFolders")]
    pub hidden_folders: Vec<String>,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub tag_colors: HashMap<String, String>,
}

impl Settings {
    /// Borrowed set view of the three hide lists
    pub fn hide_lists(&self) -> HideLists<'_> {
        HideLists {
            files: self.hidden_files.iter().map(String::as_str).collect(),
            tasks: self.hidden_tasks.iter().map(String::as_str).collect(),
            folders: self.hidden_folders.iter().map(String::as_str).collect(),
        }
    }
}

/// Hide lists as sets, built once per render
#[derive(Debug, Clone, Default)]
pub struct HideLists<'a> {
    pub files: HashSet<&'a str>,
    pub tasks: HashSet<&'a str>,
    pub folders: HashSet<&'a str>,
}

impl HideLists<'_> {
    /// The task's own identity is on the hidden-task list
    pub fn task_hidden(&self, task: &TaskItem) -> bool {
        self.tasks.contains(task.key().as_str())
    }

    pub fn file_hidden(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn folder_hidden(&self, path: &str) -> bool {
        self.folders.contains(top_folder(path))
    }

    /// A root hidden by its file, its folder, or its own identity
    pub fn directly_hidden(&self, task: &TaskItem) -> bool {
        self.file_hidden(&task.file_path)
            || self.folder_hidden(&task.file_path)
            || self.task_hidden(task)
    }
}
