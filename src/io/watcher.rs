use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::vault_io::{SETTINGS_FILE, STATE_DIR};

/// Kind of change reported by the vault watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
    Rename,
}

/// Events sent from the file watcher to the main loop.
#[derive(Debug)]
pub enum VaultEvent {
    /// Markdown documents, folders holding them, or the settings file changed.
    Changed(ChangeKind, Vec<PathBuf>),
}

/// Watches a vault directory for markdown changes.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<VaultEvent>,
}

impl VaultWatcher {
    /// Start watching `root` recursively.
    /// Call `poll()` each tick to drain pending events.
    pub fn start(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root_owned = root.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watcher error");
                        return;
                    }
                };

                let Some(kind) = classify(&event.kind) else {
                    return;
                };

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_relevant(&root_owned, p, kind))
                    .collect();

                if !relevant.is_empty() {
                    let _ = tx.send(VaultEvent::Changed(kind, relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(VaultWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events.
    pub fn poll(&self) -> Vec<VaultEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Modify(_) => Some(ChangeKind::Modify),
        EventKind::Remove(_) => Some(ChangeKind::Delete),
        _ => None,
    }
}

/// Markdown files inside the vault and outside any dot-directory, plus the
/// settings file. A folder moved or deleted as a whole reports only its own
/// path, so extensionless paths count for structural changes.
fn is_relevant(root: &Path, path: &Path, kind: ChangeKind) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    if rel == Path::new(STATE_DIR).join(SETTINGS_FILE).as_path() {
        return true;
    }
    let in_dot_dir = rel
        .components()
        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')));
    if in_dot_dir || rel.as_os_str().is_empty() {
        return false;
    }
    match path.extension() {
        Some(ext) => ext == "md",
        None => kind != ChangeKind::Modify,
    }
}
