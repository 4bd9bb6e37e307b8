//! Visibility and filtering.
//!
//! Turns the corpus plus the current view state and hide lists into two
//! ordered buckets of root-level [`ViewTask`] trees: what the main list shows,
//! and what the hidden overlay shows. Everything here is a pure function of
//! its inputs; the corpus is only ever borrowed.

use serde::Serialize;

use crate::model::corpus::Corpus;
use crate::model::settings::HideLists;
use crate::model::task::{SubtreeCount, TaskItem};
use crate::model::view::{ViewMode, ViewState};

/// Whether a rendered node is the task itself or a context-only copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Original,
    /// Ancestor kept only to give a hidden descendant its context
    Shell,
}

/// A task as it appears in one render: a borrowed corpus task plus the
/// children that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTask<'a> {
    pub task: &'a TaskItem,
    pub kind: NodeKind,
    /// Some ancestor within the shown subtree is done
    pub parent_done: bool,
    pub children: Vec<ViewTask<'a>>,
}

/// One row of a depth-first flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatTask<'a> {
    pub task: &'a TaskItem,
    pub kind: NodeKind,
    pub depth: usize,
    pub parent_done: bool,
    pub has_children: bool,
}

impl<'a> ViewTask<'a> {
    /// Badge counts always come from the underlying document, never from the
    /// filtered children.
    pub fn count(&self) -> SubtreeCount {
        self.task.count_subtree()
    }

    pub fn is_shell(&self) -> bool {
        self.kind == NodeKind::Shell
    }

    /// Depth-first rows for this node and its shown descendants
    pub fn flatten(&self) -> Vec<FlatTask<'a>> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into(&self, depth: usize, out: &mut Vec<FlatTask<'a>>) {
        out.push(FlatTask {
            task: self.task,
            kind: self.kind,
            depth,
            parent_done: self.parent_done,
            has_children: !self.children.is_empty(),
        });
        for child in &self.children {
            child.flatten_into(depth + 1, out);
        }
    }
}

/// Output of the engine: both buckets, in corpus order
#[derive(Debug, Clone, Default)]
pub struct Projection<'a> {
    pub visible: Vec<ViewTask<'a>>,
    /// Directly hidden roots and reconstructed shells
    pub hidden: Vec<ViewTask<'a>>,
}

impl Projection<'_> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.hidden.is_empty()
    }
}

/// Rules for the recursive copier
struct CopyRules<'h, 'a> {
    show_done: bool,
    /// Drop individually hidden descendants (main list only)
    strip: Option<&'h HideLists<'a>>,
}

impl CopyRules<'_, '_> {
    fn keeps(&self, child: &TaskItem, ancestors_done: bool) -> bool {
        if let Some(hide) = self.strip
            && hide.task_hidden(child)
        {
            return false;
        }
        self.show_done || !ancestors_done
    }
}

/// Copy a subtree into view nodes, applying the done cascade and optional
/// hidden-task stripping. A descendant is suppressed (with its subtree) once
/// any ancestor is done and completed tasks are not shown.
fn copy_tree<'a>(
    task: &'a TaskItem,
    kind: NodeKind,
    parent_done: bool,
    rules: &CopyRules,
) -> ViewTask<'a> {
    let ancestors_done = parent_done || task.done;
    let children = task
        .children
        .iter()
        .filter(|c| rules.keeps(c, ancestors_done))
        .map(|c| copy_tree(c, NodeKind::Original, ancestors_done, rules))
        .collect();
    ViewTask {
        task,
        kind,
        parent_done,
        children,
    }
}

/// Build a shell keeping only branches that lead to an individually hidden
/// task. The first hidden task on a branch ends the shell and is included as
/// an original node with its own subtree. Returns `None` when nothing below
/// `task` is hidden.
fn build_shell<'a>(
    task: &'a TaskItem,
    parent_done: bool,
    hide: &HideLists,
    rules: &CopyRules,
) -> Option<ViewTask<'a>> {
    let ancestors_done = parent_done || task.done;
    let children: Vec<ViewTask<'a>> = task
        .children
        .iter()
        .filter_map(|c| {
            if hide.task_hidden(c) {
                Some(copy_tree(c, NodeKind::Original, ancestors_done, rules))
            } else {
                build_shell(c, ancestors_done, hide, rules)
            }
        })
        .collect();

    if children.is_empty() {
        None
    } else {
        Some(ViewTask {
            task,
            kind: NodeKind::Shell,
            parent_done,
            children,
        })
    }
}

/// Lowercased free-text query, or `None` when the filter is blank
pub fn normalize_query(filter_text: &str) -> Option<String> {
    if filter_text.trim().is_empty() {
        None
    } else {
        Some(filter_text.to_lowercase())
    }
}

/// Does a root pass the text filter? `query` must already be lowercased.
pub fn matches_filter(task: &TaskItem, query: &str) -> bool {
    task.text.to_lowercase().contains(query)
        || task.file_path.to_lowercase().contains(query)
        || task
            .heading
            .as_deref()
            .is_some_and(|h| h.to_lowercase().contains(query))
        || tags_match(task, query)
        || subtree_matches(task, query)
}

fn tags_match(task: &TaskItem, query: &str) -> bool {
    task.tags.iter().any(|tag| tag.to_lowercase().contains(query))
}

/// Any descendant's text or tags contain the query
fn subtree_matches(task: &TaskItem, query: &str) -> bool {
    task.children.iter().any(|child| {
        child.text.to_lowercase().contains(query)
            || tags_match(child, query)
            || subtree_matches(child, query)
    })
}

/// Compute both buckets for one render.
pub fn project<'a>(corpus: &'a Corpus, view: &ViewState, hide: &HideLists) -> Projection<'a> {
    let query = normalize_query(&view.filter_text);
    let focus_folder = match view.mode {
        ViewMode::Focus => Some(view.active_folder()),
        _ => None,
    };
    let in_scope = |task: &TaskItem| match focus_folder {
        None => true,
        Some(None) => false,
        Some(Some(folder)) => task.top_folder() == folder,
    };

    let visible_rules = CopyRules {
        show_done: view.show_done,
        strip: Some(hide),
    };
    let hidden_rules = CopyRules {
        show_done: view.show_done,
        strip: None,
    };

    let mut projection = Projection::default();

    for root in corpus.roots.iter().filter(|t| t.is_root()) {
        if !in_scope(root) {
            continue;
        }

        if hide.directly_hidden(root) {
            projection
                .hidden
                .push(copy_tree(root, NodeKind::Original, false, &hidden_rules));
            continue;
        }

        if let Some(shell) = build_shell(root, false, hide, &hidden_rules) {
            projection.hidden.push(shell);
        }

        if root.done && !view.show_done {
            continue;
        }
        if let Some(q) = &query
            && !matches_filter(root, q)
        {
            continue;
        }
        projection
            .visible
            .push(copy_tree(root, NodeKind::Original, false, &visible_rules));
    }

    projection
}
