use std::path::{Path, PathBuf};

use crate::cli::commands::InitArgs;
use crate::io::vault_io::{STATE_DIR, Vault, init_vault};

/// Directory `init` should create the vault in: `-C DIR` or the working directory
fn init_root(vault_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match vault_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

/// Vault root that already contains `root`, if any
fn enclosing_vault(root: &Path) -> Option<Vault> {
    let parent = root.parent()?;
    let vault = Vault::discover(parent);
    vault.is_initialized().then_some(vault)
}

pub fn cmd_init(args: InitArgs, vault_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = init_root(vault_dir)?;

    if let Some(outer) = enclosing_vault(&root) {
        eprintln!("Note: enclosing vault found at {}/", outer.root.display());
        eprintln!("Creating a nested vault in ./{}/", STATE_DIR);
    }

    let vault = init_vault(&root, args.force)?;
    println!("Initialized taskhub vault at {}", vault.root.display());
    println!("Settings: {}", vault.settings_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn enclosing_vault_is_detected_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        init_vault(tmp.path(), false).unwrap();
        let nested = tmp.path().join("Work");
        std::fs::create_dir_all(&nested).unwrap();

        let outer = enclosing_vault(&nested).unwrap();
        assert_eq!(outer.root, tmp.path());
    }

    #[test]
    fn init_root_rejects_missing_directory() {
        assert!(init_root(Some("/definitely/not/a/vault")).is_err());
    }
}
