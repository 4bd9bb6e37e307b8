use serde::Serialize;

use crate::model::settings::Settings;
use crate::model::task::{SubtreeCount, TaskItem};
use crate::model::view::ViewMode;
use crate::ops::views::{FileGroup, FolderGroup, MainView, RenderModel, TagGroup, folder_label};
use crate::ops::visibility::{FlatTask, NodeKind, ViewTask};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub file: String,
    /// 1-based
    pub line: usize,
    pub text: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub kind: NodeKind,
    pub count: SubtreeCount,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct HeadingJson {
    pub heading: String,
    pub count: SubtreeCount,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct FileJson {
    pub path: String,
    pub name: String,
    pub count: SubtreeCount,
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<HeadingJson>,
}

#[derive(Serialize)]
pub struct FolderJson {
    pub folder: String,
    pub count: SubtreeCount,
    pub files: Vec<FileJson>,
}

#[derive(Serialize)]
pub struct TagJson {
    pub tag: String,
    pub count: SubtreeCount,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum MainJson {
    Files { folders: Vec<FolderJson> },
    Focus { files: Vec<FileJson> },
    Tags { tags: Vec<TagJson> },
}

#[derive(Serialize)]
pub struct ListJson {
    #[serde(flatten)]
    pub main: MainJson,
    pub show_done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub hidden_count: usize,
}

#[derive(Serialize)]
pub struct HiddenJson {
    pub folders: Vec<FolderJson>,
    pub hidden_files: Vec<String>,
    pub hidden_tasks: Vec<String>,
    pub hidden_folders: Vec<String>,
}

pub fn task_to_json(node: &ViewTask) -> TaskJson {
    TaskJson {
        children: node.children.iter().map(task_to_json).collect(),
        ..base_json(node.task, node.kind)
    }
}

fn flat_to_json(row: &FlatTask) -> TaskJson {
    base_json(row.task, row.kind)
}

fn base_json(t: &TaskItem, kind: NodeKind) -> TaskJson {
    TaskJson {
        file: t.file_path.clone(),
        line: t.line + 1,
        text: t.text.clone(),
        done: t.done,
        heading: t.heading.clone(),
        tags: t.tags.clone(),
        kind,
        count: t.count_subtree(),
        children: Vec::new(),
    }
}

pub fn file_to_json(group: &FileGroup) -> FileJson {
    FileJson {
        path: group.path.clone(),
        name: group.file_name.clone(),
        count: group.count,
        tasks: group.ungrouped.iter().map(task_to_json).collect(),
        headings: group
            .headings
            .iter()
            .map(|h| HeadingJson {
                heading: h.heading.clone(),
                count: h.count,
                tasks: h.tasks.iter().map(task_to_json).collect(),
            })
            .collect(),
    }
}

pub fn folders_to_json(groups: &[FolderGroup]) -> Vec<FolderJson> {
    groups
        .iter()
        .map(|g| FolderJson {
            folder: g.folder.clone(),
            count: g.count,
            files: g.files.iter().map(file_to_json).collect(),
        })
        .collect()
}

pub fn tags_to_json(groups: &[TagGroup]) -> Vec<TagJson> {
    groups
        .iter()
        .map(|g| TagJson {
            tag: g.key.label().to_string(),
            count: g.count,
            tasks: g.tasks.iter().map(flat_to_json).collect(),
        })
        .collect()
}

pub fn list_to_json(model: &RenderModel, show_done: bool, filter: Option<&str>) -> ListJson {
    let main = match &model.main {
        MainView::Files(groups) => MainJson::Files {
            folders: folders_to_json(groups),
        },
        MainView::Focus(groups) => MainJson::Focus {
            files: groups.iter().map(file_to_json).collect(),
        },
        MainView::Tags(groups) => MainJson::Tags {
            tags: tags_to_json(groups),
        },
    };
    ListJson {
        main,
        show_done,
        filter: filter.map(str::to_string),
        hidden_count: model.hidden_count,
    }
}

pub fn hidden_to_json(model: &RenderModel, settings: &Settings) -> HiddenJson {
    HiddenJson {
        folders: folders_to_json(&model.hidden),
        hidden_files: settings.hidden_files.clone(),
        hidden_tasks: settings.hidden_tasks.clone(),
        hidden_folders: settings.hidden_folders.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// One task as `[ ] text  :LINE`, with a count badge for parents
pub fn format_task_line(row: &FlatTask) -> String {
    let t = row.task;
    let badge = if row.has_children || !t.children.is_empty() {
        format!("  ({})", t.count_subtree().badge())
    } else {
        String::new()
    };
    let context = if row.kind == NodeKind::Shell {
        "  (context)"
    } else {
        ""
    };
    format!(
        "{} {}  :{}{}{}",
        checkbox(t.done),
        t.text,
        t.line + 1,
        badge,
        context
    )
}

/// Format a task with its shown subtasks, indented
pub fn format_task_tree(node: &ViewTask, indent: usize) -> Vec<String> {
    node.flatten()
        .iter()
        .map(|row| format!("{}{}", "  ".repeat(indent + row.depth), format_task_line(row)))
        .collect()
}

pub fn format_file_group(group: &FileGroup, indent: usize) -> Vec<String> {
    let prefix = "  ".repeat(indent);
    let mut lines = vec![format!("{}{} ({})", prefix, group.path, group.count.badge())];
    for task in &group.ungrouped {
        lines.extend(format_task_tree(task, indent + 1));
    }
    for heading in &group.headings {
        lines.push(format!(
            "{}  # {} ({})",
            prefix,
            heading.heading,
            heading.count.badge()
        ));
        for task in &heading.tasks {
            lines.extend(format_task_tree(task, indent + 2));
        }
    }
    lines
}

pub fn format_folder_groups(groups: &[FolderGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!(
            "{}/ ({})",
            folder_label(&group.folder),
            group.count.badge()
        ));
        for file in &group.files {
            lines.extend(format_file_group(file, 1));
        }
    }
    lines
}

pub fn format_tag_groups(groups: &[TagGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({})", group.key.label(), group.count.badge()));
        for row in &group.tasks {
            let t = row.task;
            lines.push(format!(
                "  {} {}  {}:{}",
                checkbox(t.done),
                t.text,
                t.file_path,
                t.line + 1
            ));
        }
    }
    lines
}

/// Text rendering of the main list, with a trailing hidden summary
pub fn format_list(model: &RenderModel, mode: ViewMode) -> Vec<String> {
    let mut lines = match &model.main {
        MainView::Files(groups) => format_folder_groups(groups),
        MainView::Focus(files) => files
            .iter()
            .flat_map(|f| format_file_group(f, 0))
            .collect(),
        MainView::Tags(groups) => format_tag_groups(groups),
    };
    if model.main.is_empty() {
        lines.push(match mode {
            ViewMode::Focus => "No tasks in the active folder".to_string(),
            _ => "No tasks".to_string(),
        });
    }
    if model.hidden_count > 0 {
        lines.push(String::new());
        lines.push(format!("-- Hidden ({}) --", model.hidden_count));
    }
    lines
}

/// Parse the `--view` flag
pub fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    ViewMode::parse_mode(s)
        .ok_or_else(|| format!("unknown view '{}' (expected: files, focus, tags)", s))
}
