use super::task::TaskItem;

/// A user action emitted by a presentation surface. Each affordance emits
/// exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Flip a checkbox. `text` and `done` describe what the caller saw, so a
    /// stale target can be detected.
    ToggleDone {
        file_path: String,
        line: usize,
        text: String,
        done: bool,
    },
    /// Open the document at the task's position
    Navigate {
        file_path: String,
        line: usize,
        ch: usize,
    },
    HideTask { key: String },
    UnhideTask { file_path: String, key: String },
    HideFile { file_path: String },
    UnhideFile { file_path: String },
    HideFolder { folder: String },
    UnhideFolder { folder: String },
}

impl Intent {
    pub fn toggle(task: &TaskItem) -> Self {
        Intent::ToggleDone {
            file_path: task.file_path.clone(),
            line: task.line,
            text: task.text.clone(),
            done: task.done,
        }
    }

    pub fn navigate(task: &TaskItem) -> Self {
        Intent::Navigate {
            file_path: task.file_path.clone(),
            line: task.line,
            ch: task.text_ch,
        }
    }

    pub fn hide_task(task: &TaskItem) -> Self {
        Intent::HideTask { key: task.key() }
    }

    pub fn unhide_task(task: &TaskItem) -> Self {
        Intent::UnhideTask {
            file_path: task.file_path.clone(),
            key: task.key(),
        }
    }
}
