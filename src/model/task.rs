use serde::Serialize;

/// Separator between file path and task text in a task's identity key
pub const KEY_SEPARATOR: &str = "::";

/// A checkbox task extracted from one line of a markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskItem {
    /// Vault-relative path of the document, `/`-separated
    pub file_path: String,
    /// Document base name without extension
    pub file_name: String,
    /// Zero-based source line
    pub line: usize,
    /// Character offset where the display text starts on the line
    pub text_ch: usize,
    /// Trimmed text after the checkbox marker
    pub text: String,
    pub done: bool,
    /// Nearest preceding heading (any level)
    pub heading: Option<String>,
    /// Leading whitespace characters on the source line
    pub indent: usize,
    /// Source line of the structural parent, `None` for a document root
    pub parent_line: Option<usize>,
    pub children: Vec<TaskItem>,
    /// `#tag` tokens in order of appearance, duplicates kept
    pub tags: Vec<String>,
}

/// Done/total tally for a task and everything below it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubtreeCount {
    pub done: usize,
    pub total: usize,
}

impl SubtreeCount {
    pub fn add(&mut self, other: SubtreeCount) {
        self.done += other.done;
        self.total += other.total;
    }

    /// Badge text: `done/total` once anything is done, otherwise just `total`
    pub fn badge(&self) -> String {
        if self.done > 0 {
            format!("{}/{}", self.done, self.total)
        } else {
            self.total.to_string()
        }
    }
}

impl TaskItem {
    /// Identity used by the hide list: `filePath::text`
    pub fn key(&self) -> String {
        task_key(&self.file_path, &self.text)
    }

    pub fn is_root(&self) -> bool {
        self.parent_line.is_none()
    }

    /// Top-level folder of the task's document (`""` for the vault root)
    pub fn top_folder(&self) -> &str {
        top_folder(&self.file_path)
    }

    /// Count this task and all descendants, ignoring any visibility filter.
    pub fn count_subtree(&self) -> SubtreeCount {
        let mut count = SubtreeCount {
            done: usize::from(self.done),
            total: 1,
        };
        for child in &self.children {
            count.add(child.count_subtree());
        }
        count
    }

    /// Depth-first walk over this task and its descendants, in source order
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a TaskItem>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

pub fn task_key(file_path: &str, text: &str) -> String {
    format!("{}{}{}", file_path, KEY_SEPARATOR, text)
}

/// Substring of `path` before the first `/`, or `""` when the document sits at
/// the vault root.
pub fn top_folder(path: &str) -> &str {
    match path.split_once('/') {
        Some((folder, _)) => folder,
        None => "",
    }
}
