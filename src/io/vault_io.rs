use std::fs;
use std::path::{Path, PathBuf};

use crate::io::store::atomic_write;

/// Per-vault state directory
pub const STATE_DIR: &str = ".taskhub";
pub const SETTINGS_FILE: &str = "settings.toml";
pub const LOG_FILE: &str = "taskhub.log";

const SETTINGS_TEMPLATE: &str = r##"# taskhub settings

# Folders (relative to the vault root) that are never scanned
excluded_folders = []

# Show completed tasks when a view opens
show_done = false

# Managed by hide/unhide. Task entries are "path/to/file.md::task text";
# "" in hidden_folders stands for documents at the vault root.
hidden_files = []
hidden_tasks = []
hidden_folders = []

# [ui.colors]
# highlight = "#FB4196"
# [ui.tag_colors]
# "#errand" = "#44FF88"
"##;

/// Error type for vault and settings I/O
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse settings.toml: {0}")]
    SettingsParseError(#[from] toml::de::Error),
    #[error("could not edit settings.toml: {0}")]
    SettingsEditError(#[from] toml_edit::TomlError),
    #[error("vault already initialized at {0} (use --force to overwrite)")]
    AlreadyInitialized(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Location of a vault and its state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    pub root: PathBuf,
    pub state_dir: PathBuf,
}

impl Vault {
    pub fn at(root: &Path) -> Self {
        Vault {
            root: root.to_path_buf(),
            state_dir: root.join(STATE_DIR),
        }
    }

    /// Walk up from `start` looking for a `.taskhub/` directory. Falls back to
    /// `start` itself, so an uninitialized directory is still a usable vault.
    pub fn discover(start: &Path) -> Self {
        let mut current = start.to_path_buf();
        loop {
            if current.join(STATE_DIR).is_dir() {
                return Vault::at(&current);
            }
            if !current.pop() {
                return Vault::at(start);
            }
        }
    }

    /// Vault for `-C DIR` when given, else for the working directory
    pub fn locate(dir: Option<&str>) -> Result<Self, VaultError> {
        let start = match dir {
            Some(dir) => fs::canonicalize(dir).map_err(|e| VaultError::ReadError {
                path: PathBuf::from(dir),
                source: e,
            })?,
            None => std::env::current_dir()?,
        };
        Ok(Vault::discover(&start))
    }

    pub fn is_initialized(&self) -> bool {
        self.state_dir.is_dir()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.state_dir.join(SETTINGS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE)
    }
}

/// Create `.taskhub/settings.toml` from the commented template.
pub fn init_vault(root: &Path, force: bool) -> Result<Vault, VaultError> {
    let vault = Vault::at(root);
    let settings_path = vault.settings_path();
    if settings_path.exists() && !force {
        return Err(VaultError::AlreadyInitialized(vault.state_dir.clone()));
    }
    fs::create_dir_all(&vault.state_dir)?;
    atomic_write(&settings_path, SETTINGS_TEMPLATE.as_bytes()).map_err(|e| {
        VaultError::WriteError {
            path: settings_path.clone(),
            source: e,
        }
    })?;
    tracing::info!(root = %root.display(), "vault initialized");
    Ok(vault)
}
