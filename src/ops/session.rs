//! One open vault: the current corpus snapshot, settings, and the collapse
//! set, plus the single entry point that applies user intents.

use std::fs;
use std::path::PathBuf;

use crate::io::lock::{FileLock, LockError};
use crate::io::settings_io::{read_settings, sync_settings, write_settings};
use crate::io::store::{DocumentStore, FsStore, StoreError};
use crate::io::vault_io::{Vault, VaultError};
use crate::model::corpus::Corpus;
use crate::model::intent::Intent;
use crate::model::settings::Settings;
use crate::model::view::{CollapseSet, ViewState};
use crate::ops::hide_ops;
use crate::ops::navigate::{EditorCommand, open_command};
use crate::ops::scan::scan_corpus;
use crate::ops::toggle::{ToggleOutcome, toggle_task};
use crate::ops::views::{RenderModel, render_model};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// What a surface should do after an intent was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Settings changed; re-render from the cached corpus
    Rerender,
    /// A checkbox was written. The store's change notification drives the rescan.
    Toggled { done: bool },
    /// Launch the editor; `file_path` becomes the active document
    Open {
        command: EditorCommand,
        file_path: String,
    },
    /// Nothing changed; show this to the user
    Notice(String),
    Unchanged,
}

pub struct Session {
    /// `None` for sessions without a backing vault (tests, embedding)
    vault: Option<Vault>,
    store: Box<dyn DocumentStore>,
    settings: Settings,
    corpus: Corpus,
    pub collapsed: CollapseSet,
}

impl Session {
    /// Open a vault on disk and run the initial scan.
    pub fn open(vault: Vault) -> Result<Self, SessionError> {
        let store = FsStore::new(&vault.root, &vault.state_dir);
        let mut session = Session {
            vault: Some(vault),
            store: Box::new(store),
            settings: Settings::default(),
            corpus: Corpus::empty(),
            collapsed: CollapseSet::default(),
        };
        session.rescan()?;
        Ok(session)
    }

    /// A session over any store, with settings that are never persisted.
    pub fn detached(store: Box<dyn DocumentStore>, settings: Settings) -> Result<Self, SessionError> {
        let mut session = Session {
            vault: None,
            store,
            settings,
            corpus: Corpus::empty(),
            collapsed: CollapseSet::default(),
        };
        session.rescan()?;
        Ok(session)
    }

    pub fn vault(&self) -> Option<&Vault> {
        self.vault.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Reload settings from disk, then replace the corpus with a fresh scan.
    pub fn rescan(&mut self) -> Result<(), SessionError> {
        if let Some(vault) = &self.vault {
            self.settings = read_settings(&vault.state_dir)?.0;
        }
        self.corpus = scan_corpus(self.store.as_ref(), &self.settings.excluded_folders)?;
        Ok(())
    }

    pub fn render(&self, view: &ViewState) -> RenderModel<'_> {
        render_model(&self.corpus, view, &self.settings.hide_lists())
    }

    /// Initial value for the "show completed" toggle
    pub fn default_show_done(&self) -> bool {
        self.settings.show_done
    }

    /// Apply one user intent.
    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, SessionError> {
        tracing::debug!(?intent, "applying intent");
        match intent {
            Intent::ToggleDone {
                file_path,
                line,
                text,
                done,
            } => self.toggle(&file_path, line, &text, done),
            Intent::Navigate {
                file_path,
                line,
                ch,
            } => Ok(self.navigate(file_path, line, ch)),
            Intent::HideTask { key } => self.update_settings(|s| hide_ops::hide_task(s, &key)),
            Intent::UnhideTask { file_path, key } => {
                self.update_settings(|s| hide_ops::unhide_task(s, &file_path, &key))
            }
            Intent::HideFile { file_path } => {
                self.update_settings(|s| hide_ops::hide_file(s, &file_path))
            }
            Intent::UnhideFile { file_path } => {
                self.update_settings(|s| hide_ops::unhide_file(s, &file_path))
            }
            Intent::HideFolder { folder } => {
                self.update_settings(|s| hide_ops::hide_folder(s, &folder))
            }
            Intent::UnhideFolder { folder } => {
                self.update_settings(|s| hide_ops::unhide_folder(s, &folder))
            }
        }
    }

    /// Add a folder to the scan exclusions and rescan.
    pub fn exclude_folder(&mut self, folder: &str) -> Result<Outcome, SessionError> {
        let outcome = self.update_settings(|s| hide_ops::exclude_folder(s, folder))?;
        if outcome == Outcome::Rerender {
            self.rescan()?;
        }
        Ok(outcome)
    }

    pub fn include_folder(&mut self, folder: &str) -> Result<Outcome, SessionError> {
        let outcome = self.update_settings(|s| hide_ops::include_folder(s, folder))?;
        if outcome == Outcome::Rerender {
            self.rescan()?;
        }
        Ok(outcome)
    }

    fn toggle(
        &mut self,
        file_path: &str,
        line: usize,
        text: &str,
        done: bool,
    ) -> Result<Outcome, SessionError> {
        match toggle_task(self.store.as_mut(), file_path, line, text, done) {
            Ok(ToggleOutcome::Toggled { done }) => Ok(Outcome::Toggled { done }),
            Ok(ToggleOutcome::Stale) | Err(StoreError::NotFound(_)) => Ok(Outcome::Notice(
                format!("{}:{} changed on disk; rescan and try again", file_path, line + 1),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn navigate(&self, file_path: String, line: usize, ch: usize) -> Outcome {
        let Some(vault) = &self.vault else {
            return Outcome::Notice("navigation is unavailable without a vault".into());
        };
        let full: PathBuf = vault.root.join(&file_path);
        match open_command(&full, line, ch) {
            Ok(command) => Outcome::Open { command, file_path },
            Err(e) => {
                tracing::info!(error = %e, "navigation unavailable");
                Outcome::Notice(e.to_string())
            }
        }
    }

    /// Mutate settings and persist them when something changed. On disk the
    /// mutation is applied to a fresh read under the vault lock, so writes
    /// from other processes are kept.
    fn update_settings(
        &mut self,
        mutate: impl FnOnce(&mut Settings) -> bool,
    ) -> Result<Outcome, SessionError> {
        let Some(state_dir) = self.vault.as_ref().map(|v| v.state_dir.clone()) else {
            return Ok(if mutate(&mut self.settings) {
                Outcome::Rerender
            } else {
                Outcome::Unchanged
            });
        };

        fs::create_dir_all(&state_dir).map_err(VaultError::from)?;
        let _lock = FileLock::acquire_default(&state_dir)?;
        let (mut settings, mut doc) = read_settings(&state_dir)?;
        let changed = mutate(&mut settings);
        if changed {
            sync_settings(&mut doc, &settings);
            write_settings(&state_dir, &doc)?;
            tracing::info!(path = %state_dir.display(), "settings saved");
        }
        self.settings = settings;
        Ok(if changed {
            Outcome::Rerender
        } else {
            Outcome::Unchanged
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::io::vault_io::init_vault;
    use crate::model::task::task_key;
    use crate::ops::views::MainView;
    use std::fs;
    use tempfile::TempDir;

    fn memory_session(docs: &[(&str, &str)]) -> Session {
        let mut store = MemoryStore::new();
        for (path, content) in docs {
            store.insert(path, content);
        }
        Session::detached(Box::new(store), Settings::default()).unwrap()
    }

    #[test]
    fn hide_then_unhide_round_trips_without_rescan() {
        let mut session = memory_session(&[("a.md", "- [ ] one\n- [ ] two")]);
        let key = task_key("a.md", "one");

        let outcome = session.apply(Intent::HideTask { key: key.clone() }).unwrap();
        assert_eq!(outcome, Outcome::Rerender);
        assert_eq!(session.render(&ViewState::default()).hidden_count, 1);

        let again = session.apply(Intent::HideTask { key: key.clone() }).unwrap();
        assert_eq!(again, Outcome::Unchanged);

        session
            .apply(Intent::UnhideTask {
                file_path: "a.md".into(),
                key,
            })
            .unwrap();
        assert_eq!(session.render(&ViewState::default()).hidden_count, 0);
    }

    #[test]
    fn stale_toggle_becomes_a_notice() {
        let mut session = memory_session(&[("a.md", "- [ ] one")]);
        let outcome = session
            .apply(Intent::ToggleDone {
                file_path: "a.md".into(),
                line: 0,
                text: "renamed".into(),
                done: false,
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::Notice(_)));

        let outcome = session
            .apply(Intent::ToggleDone {
                file_path: "missing.md".into(),
                line: 0,
                text: "one".into(),
                done: false,
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::Notice(_)));
    }

    #[test]
    fn toggle_then_rescan_reflects_new_state() {
        let mut session = memory_session(&[("a.md", "- [ ] one")]);
        let task = session.corpus().roots[0].clone();
        let outcome = session.apply(Intent::toggle(&task)).unwrap();
        assert_eq!(outcome, Outcome::Toggled { done: true });

        // cached snapshot is untouched until the rescan
        assert!(!session.corpus().roots[0].done);
        session.rescan().unwrap();
        assert!(session.corpus().roots[0].done);
    }

    #[test]
    fn navigation_without_vault_is_a_notice() {
        let mut session = memory_session(&[("a.md", "- [ ] one")]);
        let task = session.corpus().roots[0].clone();
        let outcome = session.apply(Intent::navigate(&task)).unwrap();
        assert!(matches!(outcome, Outcome::Notice(_)));
    }

    #[test]
    fn settings_changes_persist_to_disk() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "- [ ] one\n").unwrap();
        fs::create_dir_all(tmp.path().join("Templates")).unwrap();
        fs::write(tmp.path().join("Templates/t.md"), "- [ ] template\n").unwrap();
        let vault = init_vault(tmp.path(), false).unwrap();

        let mut session = Session::open(vault.clone()).unwrap();
        assert_eq!(session.corpus().roots.len(), 2);

        session
            .apply(Intent::HideFile {
                file_path: "a.md".into(),
            })
            .unwrap();
        session.exclude_folder("Templates").unwrap();
        assert_eq!(session.corpus().roots.len(), 1);

        let reopened = Session::open(vault).unwrap();
        assert_eq!(reopened.settings().hidden_files, vec!["a.md"]);
        assert_eq!(reopened.settings().excluded_folders, vec!["Templates"]);
        let text = fs::read_to_string(tmp.path().join(".taskhub/settings.toml")).unwrap();
        assert!(text.starts_with("# taskhub settings"));

        let model = reopened.render(&ViewState::default());
        assert!(matches!(model.main, MainView::Files(ref f) if f.is_empty()));
        assert_eq!(model.hidden_count, 1);
    }

    #[test]
    fn concurrent_sessions_keep_each_others_hides() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "- [ ] one\n- [ ] two\n").unwrap();
        let vault = init_vault(tmp.path(), false).unwrap();

        let mut first = Session::open(vault.clone()).unwrap();
        let mut second = Session::open(vault.clone()).unwrap();
        first
            .apply(Intent::HideTask {
                key: task_key("a.md", "one"),
            })
            .unwrap();
        second
            .apply(Intent::HideTask {
                key: task_key("a.md", "two"),
            })
            .unwrap();

        assert_eq!(second.settings().hidden_tasks, vec!["a.md::one", "a.md::two"]);
        let reopened = Session::open(vault).unwrap();
        assert_eq!(reopened.settings().hidden_tasks.len(), 2);
        assert_eq!(reopened.render(&ViewState::default()).hidden_count, 2);
    }

    #[test]
    fn rescan_reloads_settings_written_elsewhere() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "- [ ] one\n").unwrap();
        let vault = init_vault(tmp.path(), false).unwrap();

        let mut viewer = Session::open(vault.clone()).unwrap();
        let mut editor = Session::open(vault).unwrap();
        editor
            .apply(Intent::HideFile {
                file_path: "a.md".into(),
            })
            .unwrap();

        assert_eq!(viewer.render(&ViewState::default()).hidden_count, 0);
        viewer.rescan().unwrap();
        assert_eq!(viewer.render(&ViewState::default()).hidden_count, 1);
    }

    #[test]
    fn hide_keeps_camel_case_settings_readable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "- [ ] one\n- [ ] two\n").unwrap();
        let vault = init_vault(tmp.path(), false).unwrap();
        fs::write(vault.settings_path(), "hiddenTasks = [\"a.md::one\"]\n").unwrap();

        let mut session = Session::open(vault.clone()).unwrap();
        session
            .apply(Intent::HideTask {
                key: task_key("a.md", "two"),
            })
            .unwrap();

        let reopened = Session::open(vault).unwrap();
        assert_eq!(reopened.settings().hidden_tasks, vec!["a.md::one", "a.md::two"]);
    }
}
