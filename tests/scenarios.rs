//! End-to-end behavior of the scan, visibility and projection pipeline,
//! driven through the public library API over in-memory documents.

use pretty_assertions::assert_eq;

use taskhub::io::store::MemoryStore;
use taskhub::model::corpus::Corpus;
use taskhub::model::intent::Intent;
use taskhub::model::settings::Settings;
use taskhub::model::task::TaskItem;
use taskhub::model::view::{ViewMode, ViewState};
use taskhub::ops::scan::scan_corpus;
use taskhub::ops::session::{Outcome, Session};
use taskhub::ops::views::{MainView, TagKey, render_model};
use taskhub::ops::visibility::{NodeKind, ViewTask, project};
use taskhub::parse::parse_document;

const NOTES: &str = "# Work\n- [ ] Buy milk #errand\n  - [x] Call store\n- [x] Done task\n";

fn scan(docs: &[(&str, &str)], settings: &Settings) -> Corpus {
    let store = docs
        .iter()
        .fold(MemoryStore::new(), |store, (path, content)| store.with(path, content));
    scan_corpus(&store, &settings.excluded_folders).unwrap()
}

fn session(docs: &[(&str, &str)], settings: Settings) -> Session {
    let store = docs
        .iter()
        .fold(MemoryStore::new(), |store, (path, content)| store.with(path, content));
    Session::detached(Box::new(store), settings).unwrap()
}

fn texts(nodes: &[ViewTask]) -> Vec<String> {
    nodes.iter().map(|n| n.task.text.clone()).collect()
}

/// Every (task, depth) in a forest, depth-first
fn walk_forest(roots: &[TaskItem]) -> Vec<&TaskItem> {
    let mut out = Vec::new();
    for root in roots {
        root.walk(&mut out);
    }
    out
}

#[test]
fn notes_document_parses_into_expected_forest() {
    let roots = parse_document("Notes.md", "Notes", NOTES);
    assert_eq!(roots.len(), 2);

    let buy = &roots[0];
    assert_eq!(buy.text, "Buy milk #errand");
    assert_eq!(buy.heading.as_deref(), Some("Work"));
    assert_eq!(buy.tags, vec!["#errand"]);
    assert_eq!(buy.line, 1);
    assert_eq!(buy.children.len(), 1);
    assert_eq!(buy.children[0].text, "Call store");
    assert!(buy.children[0].done);
    assert_eq!(buy.children[0].parent_line, Some(1));

    assert_eq!(roots[1].text, "Done task");
    assert!(roots[1].done);
}

#[test]
fn done_child_stays_visible_under_open_parent() {
    let corpus = scan(&[("Notes.md", NOTES)], &Settings::default());
    let settings = Settings::default();
    let projection = project(&corpus, &ViewState::default(), &settings.hide_lists());

    assert_eq!(texts(&projection.visible), vec!["Buy milk #errand"]);
    assert_eq!(texts(&projection.visible[0].children), vec!["Call store"]);
    assert!(projection.hidden.is_empty());
}

#[test]
fn open_child_under_done_parent_is_suppressed_until_done_shown() {
    let doc = "- [x] Parent\n  - [ ] Child\n- [ ] Open root\n  - [x] Done child\n    - [ ] Grandchild";
    let corpus = scan(&[("a.md", doc)], &Settings::default());
    let settings = Settings::default();
    let hide = settings.hide_lists();

    let projection = project(&corpus, &ViewState::default(), &hide);
    assert_eq!(texts(&projection.visible), vec!["Open root"]);
    let done_child = &projection.visible[0].children[0];
    assert_eq!(done_child.task.text, "Done child");
    // the grandchild inherits doneness from its ancestor
    assert!(done_child.children.is_empty());

    let view = ViewState {
        show_done: true,
        ..Default::default()
    };
    let projection = project(&corpus, &view, &hide);
    assert_eq!(texts(&projection.visible), vec!["Parent", "Open root"]);
    assert!(projection.visible[0].children[0].parent_done);
}

#[test]
fn hierarchy_is_a_forest_with_increasing_indent() {
    let doc = "\
- [ ] a
    - [ ] b
  - [ ] c
      - [ ] d
  - [ ] e
- [ ] f
 - [ ] g
";
    let roots = parse_document("x.md", "x", doc);
    let all = walk_forest(&roots);
    assert_eq!(all.len(), 7);
    for task in &all {
        for child in &task.children {
            assert!(child.indent > task.indent);
            assert_eq!(child.parent_line, Some(task.line));
        }
    }
    // equal indentation is a sibling, not a child
    assert_eq!(texts_of(&roots[0].children), vec!["b", "c", "e"]);
    assert_eq!(texts_of(&roots[1].children), vec!["g"]);
}

fn texts_of(tasks: &[TaskItem]) -> Vec<&str> {
    tasks.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn rescanning_unchanged_documents_is_idempotent() {
    let docs = [("Notes.md", NOTES), ("Work/plan.md", "- [ ] a\n  - [ ] b")];
    let first = scan(&docs, &Settings::default());
    let second = scan(&docs, &Settings::default());
    assert_eq!(first.roots, second.roots);
}

#[test]
fn subtree_counts_ignore_filters() {
    let doc = "- [ ] root\n  - [x] one\n  - [ ] two\n    - [x] three";
    let corpus = scan(&[("a.md", doc)], &Settings::default());
    let root = &corpus.roots[0];
    let count = root.count_subtree();
    assert_eq!((count.done, count.total), (2, 4));

    let child_sum = root
        .children
        .iter()
        .map(|c| c.count_subtree())
        .fold((0, 0), |(d, t), c| (d + c.done, t + c.total));
    assert_eq!(count.total, 1 + child_sum.1);
    assert_eq!(count.done, usize::from(root.done) + child_sum.0);

    // the badge is the same whatever the filter hides
    let settings = Settings::default();
    let view = ViewState {
        filter_text: "root".into(),
        ..Default::default()
    };
    let projection = project(&corpus, &view, &settings.hide_lists());
    assert_eq!(projection.visible[0].count(), count);
}

#[test]
fn every_hidden_task_appears_once_in_hidden_bucket() {
    let doc = "\
- [ ] root
  - [ ] keep
  - [ ] branch
    - [ ] hidden one
      - [ ] hidden below hidden
  - [ ] hidden two
- [ ] other root
";
    let mut settings = Settings::default();
    settings.hidden_tasks = vec![
        "a.md::hidden one".into(),
        "a.md::hidden two".into(),
        "a.md::hidden below hidden".into(),
        "a.md::other root".into(),
    ];
    let corpus = scan(&[("a.md", doc)], &settings);
    let projection = project(&corpus, &ViewState::default(), &settings.hide_lists());

    let mut seen: Vec<String> = Vec::new();
    for root in &projection.hidden {
        for row in root.flatten() {
            if row.kind == NodeKind::Original {
                seen.push(row.task.text.clone());
            }
        }
    }
    seen.sort();
    assert_eq!(
        seen,
        vec!["hidden below hidden", "hidden one", "hidden two", "other root"]
    );

    let shell = &projection.hidden[0];
    assert!(shell.is_shell());
    // "keep" has no hidden descendant, so the shell drops it
    let shell_children: Vec<&str> = shell.children.iter().map(|c| c.task.text.as_str()).collect();
    assert_eq!(shell_children, vec!["branch", "hidden two"]);

    // the main list strips the hidden tasks but keeps the rest
    let visible = &projection.visible[0];
    assert_eq!(texts(&visible.children), vec!["keep", "branch"]);
    assert!(visible.children[1].children.is_empty());
}

#[test]
fn tasks_with_several_tags_join_each_group() {
    let doc = "- [ ] both #a #b\n- [ ] plain\n- [ ] twice #a #a";
    let corpus = scan(&[("a.md", doc)], &Settings::default());
    let view = ViewState {
        mode: ViewMode::Tags,
        ..Default::default()
    };
    let settings = Settings::default();
    let model = render_model(&corpus, &view, &settings.hide_lists());
    let MainView::Tags(groups) = &model.main else {
        panic!("expected tags view");
    };

    let summary: Vec<(TagKey, Vec<&str>)> = groups
        .iter()
        .map(|g| {
            (
                g.key.clone(),
                g.tasks.iter().map(|t| t.task.text.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (TagKey::Tag("#a".into()), vec!["both #a #b", "twice #a #a"]),
            (TagKey::Tag("#b".into()), vec!["both #a #b"]),
            (TagKey::Untagged, vec!["plain"]),
        ]
    );
}

#[test]
fn hidden_parent_keeps_identity_after_child_toggle() {
    let mut settings = Settings::default();
    settings.hidden_tasks = vec!["Notes.md::Buy milk #errand".into()];
    let mut session = session(&[("Notes.md", NOTES)], settings);

    let before = {
        let model = session.render(&ViewState::default());
        let root = &model.hidden[0].files[0].headings[0].tasks[0];
        (root.task.key(), root.task.file_path.clone(), root.kind)
    };

    let child = session.corpus().find("Notes.md", 2).unwrap().clone();
    let outcome = session.apply(Intent::toggle(&child)).unwrap();
    assert_eq!(outcome, Outcome::Toggled { done: false });
    session.rescan().unwrap();

    let model = session.render(&ViewState::default());
    let root = &model.hidden[0].files[0].headings[0].tasks[0];
    assert_eq!(
        (root.task.key(), root.task.file_path.clone(), root.kind),
        before
    );
    assert!(!root.children[0].task.done);
}

#[test]
fn excluded_folder_needs_separator_match() {
    let mut settings = Settings::default();
    settings.excluded_folders = vec!["Templates".into()];
    let corpus = scan(
        &[
            ("Templates/daily.md", "- [ ] template task"),
            ("Templates/nested/deep.md", "- [ ] deep template"),
            ("TemplatesArchive/x.md", "- [ ] archived"),
        ],
        &settings,
    );
    let all: Vec<&str> = corpus.roots.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(all, vec!["archived"]);
    assert_eq!(corpus.document_count, 1);
}

#[test]
fn duplicate_texts_share_identity() {
    let doc = "- [ ] same\n- [ ] other\n- [ ] same";
    let mut session = session(&[("a.md", doc)], Settings::default());
    let first = session.corpus().roots[0].clone();
    session.apply(Intent::hide_task(&first)).unwrap();

    let model = session.render(&ViewState::default());
    assert_eq!(model.hidden_count, 2);
    let MainView::Files(folders) = &model.main else {
        panic!("expected files view");
    };
    let shown: Vec<&str> = folders[0].files[0]
        .ungrouped
        .iter()
        .map(|t| t.task.text.as_str())
        .collect();
    assert_eq!(shown, vec!["other"]);
}

#[test]
fn corpus_order_follows_store_enumeration() {
    let corpus = scan(
        &[("z.md", "- [ ] from z"), ("a.md", "- [ ] from a")],
        &Settings::default(),
    );
    let order: Vec<&str> = corpus.roots.iter().map(|t| t.file_path.as_str()).collect();
    assert_eq!(order, vec!["z.md", "a.md"]);
}
