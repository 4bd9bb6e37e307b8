//! Grouping of the visibility engine's output into the three views and the
//! hidden overlay. No filtering decisions happen here.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::model::corpus::Corpus;
use crate::model::settings::HideLists;
use crate::model::task::{SubtreeCount, TaskItem, top_folder};
use crate::model::view::{ViewMode, ViewState};
use crate::ops::visibility::{FlatTask, Projection, ViewTask, project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingGroup<'a> {
    pub heading: String,
    pub tasks: Vec<ViewTask<'a>>,
    pub count: SubtreeCount,
}

/// Tasks of one document: heading-less tasks first, then heading groups in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup<'a> {
    pub path: String,
    pub file_name: String,
    pub ungrouped: Vec<ViewTask<'a>>,
    pub headings: Vec<HeadingGroup<'a>>,
    pub count: SubtreeCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderGroup<'a> {
    /// Top-level folder name, `""` for the vault root
    pub folder: String,
    pub files: Vec<FileGroup<'a>>,
    pub count: SubtreeCount,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagKey {
    Tag(String),
    Untagged,
}

impl TagKey {
    pub fn label(&self) -> &str {
        match self {
            TagKey::Tag(tag) => tag,
            TagKey::Untagged => "untagged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup<'a> {
    pub key: TagKey,
    /// Member tasks, flat and in document order
    pub tasks: Vec<FlatTask<'a>>,
    /// Done/total over the member tasks themselves
    pub count: SubtreeCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainView<'a> {
    Files(Vec<FolderGroup<'a>>),
    Focus(Vec<FileGroup<'a>>),
    Tags(Vec<TagGroup<'a>>),
}

impl MainView<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            MainView::Files(groups) => groups.is_empty(),
            MainView::Focus(groups) => groups.is_empty(),
            MainView::Tags(groups) => groups.is_empty(),
        }
    }
}

/// Everything a presentation surface needs for one render
#[derive(Debug, Clone)]
pub struct RenderModel<'a> {
    pub main: MainView<'a>,
    pub hidden: Vec<FolderGroup<'a>>,
    /// Number of root entries (originals and shells) in the hidden overlay
    pub hidden_count: usize,
}

/// Project the corpus and group it for the current view mode.
pub fn render_model<'a>(corpus: &'a Corpus, view: &ViewState, hide: &HideLists) -> RenderModel<'a> {
    let Projection { visible, hidden } = project(corpus, view, hide);
    let main = match view.mode {
        ViewMode::Files => MainView::Files(group_folders(visible)),
        ViewMode::Focus => MainView::Focus(group_files(visible)),
        ViewMode::Tags => MainView::Tags(group_tags(&visible)),
    };
    let hidden_count = hidden.len();
    RenderModel {
        main,
        hidden: group_folders(hidden),
        hidden_count,
    }
}

fn sum_counts(tasks: &[ViewTask]) -> SubtreeCount {
    let mut total = SubtreeCount::default();
    for task in tasks {
        total.add(task.count());
    }
    total
}

/// Group roots by document, sorted by path.
pub fn group_files(roots: Vec<ViewTask<'_>>) -> Vec<FileGroup<'_>> {
    let mut by_path: BTreeMap<String, Vec<ViewTask>> = BTreeMap::new();
    for root in roots {
        by_path
            .entry(root.task.file_path.clone())
            .or_default()
            .push(root);
    }

    by_path
        .into_iter()
        .map(|(path, tasks)| {
            let file_name = tasks
                .first()
                .map(|t| t.task.file_name.clone())
                .unwrap_or_default();
            let count = sum_counts(&tasks);

            let mut ungrouped = Vec::new();
            let mut by_heading: IndexMap<String, Vec<ViewTask>> = IndexMap::new();
            for task in tasks {
                match &task.task.heading {
                    Some(h) => by_heading.entry(h.clone()).or_default().push(task),
                    None => ungrouped.push(task),
                }
            }
            let headings = by_heading
                .into_iter()
                .map(|(heading, tasks)| HeadingGroup {
                    count: sum_counts(&tasks),
                    heading,
                    tasks,
                })
                .collect();

            FileGroup {
                path,
                file_name,
                ungrouped,
                headings,
                count,
            }
        })
        .collect()
}

/// Group roots by top-level folder, then by document.
pub fn group_folders(roots: Vec<ViewTask<'_>>) -> Vec<FolderGroup<'_>> {
    let mut by_folder: BTreeMap<String, Vec<ViewTask>> = BTreeMap::new();
    for root in roots {
        by_folder
            .entry(top_folder(&root.task.file_path).to_string())
            .or_default()
            .push(root);
    }
    by_folder
        .into_iter()
        .map(|(folder, tasks)| {
            let count = sum_counts(&tasks);
            FolderGroup {
                folder,
                files: group_files(tasks),
                count,
            }
        })
        .collect()
}

/// Flatten every shown task and file it under each distinct tag it carries.
pub fn group_tags<'a>(roots: &[ViewTask<'a>]) -> Vec<TagGroup<'a>> {
    let mut groups: BTreeMap<TagKey, Vec<FlatTask<'a>>> = BTreeMap::new();
    for row in roots.iter().flat_map(|r| r.flatten()) {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &row.task.tags {
            if seen.contains(&tag.as_str()) {
                continue;
            }
            seen.push(tag);
            groups.entry(TagKey::Tag(tag.clone())).or_default().push(row);
        }
        if seen.is_empty() {
            groups.entry(TagKey::Untagged).or_default().push(row);
        }
    }

    groups
        .into_iter()
        .map(|(key, tasks)| {
            let count = SubtreeCount {
                done: tasks.iter().filter(|t| t.task.done).count(),
                total: tasks.len(),
            };
            TagGroup { key, tasks, count }
        })
        .collect()
}

/// Display name for a top-level folder
pub fn folder_label(folder: &str) -> &str {
    if folder.is_empty() { "(vault root)" } else { folder }
}

// ---------------------------------------------------------------------------
// Collapse keys
// ---------------------------------------------------------------------------

pub fn folder_key(folder: &str) -> String {
    format!("folder:{}", folder)
}

pub fn file_key(path: &str) -> String {
    path.to_string()
}

pub fn heading_key(path: &str, heading: &str) -> String {
    format!("{}\n{}", path, heading)
}

pub fn tag_key(key: &TagKey) -> String {
    format!("tag:{}", key.label())
}

pub fn task_collapse_key(task: &TaskItem) -> String {
    format!("task:{}:{}", task.file_path, task.line)
}

/// Keys inside the hidden overlay are kept apart from the main list's
pub fn hidden_key(key: &str) -> String {
    format!("hidden:{}", key)
}
