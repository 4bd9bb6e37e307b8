use std::fs;
use std::path::Path;

use crate::io::store::atomic_write;
use crate::io::vault_io::{SETTINGS_FILE, VaultError};
use crate::model::settings::Settings;

/// Read settings, returning both the parsed struct and the raw toml_edit
/// document for format-preserving writes. A missing file yields defaults.
pub fn read_settings(state_dir: &Path) -> Result<(Settings, toml_edit::DocumentMut), VaultError> {
    let path = state_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok((Settings::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(&path).map_err(|e| VaultError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let settings: Settings = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((settings, doc))
}

/// Write the settings document back, preserving comments and key order.
pub fn write_settings(state_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), VaultError> {
    fs::create_dir_all(state_dir)?;
    let path = state_dir.join(SETTINGS_FILE);
    atomic_write(&path, doc.to_string().as_bytes()).map_err(|e| VaultError::WriteError {
        path,
        source: e,
    })?;
    Ok(())
}

/// Replace a top-level string array, keeping the key's comments. An array that
/// already holds exactly `values` is left alone so its layout survives.
pub fn set_string_list(doc: &mut toml_edit::DocumentMut, key: &str, values: &[String]) {
    if current_list(doc, key).is_some_and(|cur| cur == values) {
        return;
    }
    let array: toml_edit::Array = values.iter().map(String::as_str).collect();
    replace_value(doc, key, toml_edit::Value::from(array));
}

pub fn set_bool(doc: &mut toml_edit::DocumentMut, key: &str, value: bool) {
    if doc.get(key).and_then(|i| i.as_bool()) == Some(value) {
        return;
    }
    replace_value(doc, key, toml_edit::Value::from(value));
}

fn current_list(doc: &toml_edit::DocumentMut, key: &str) -> Option<Vec<String>> {
    let array = doc.get(key)?.as_array()?;
    array.iter().map(|v| v.as_str().map(str::to_string)).collect()
}

/// Swap a value in place, carrying over its decor (trailing comments)
fn replace_value(doc: &mut toml_edit::DocumentMut, key: &str, mut value: toml_edit::Value) {
    if let Some(old) = doc.get(key).and_then(|i| i.as_value()) {
        *value.decor_mut() = old.decor().clone();
    }
    doc[key] = toml_edit::Item::Value(value);
}

/// Bring the document in line with `settings`. Keys absent from the document
/// are only added once they carry a non-default value. A key the user wrote in
/// its camelCase spelling keeps that spelling.
pub fn sync_settings(doc: &mut toml_edit::DocumentMut, settings: &Settings) {
    let lists: [(&str, &str, &[String]); 4] = [
        ("excluded_folders", "excludedFolders", &settings.excluded_folders),
        ("hidden_files", "hiddenFiles", &settings.hidden_files),
        ("hidden_tasks", "hiddenTasks", &settings.hidden_tasks),
        ("hidden_folders", "hiddenFolders", &settings.hidden_folders),
    ];
    for (key, alias, values) in lists {
        let key = doc_key(doc, key, alias);
        if doc.contains_key(key) || !values.is_empty() {
            set_string_list(doc, key, values);
        }
    }
    let key = doc_key(doc, "show_done", "showDone");
    if doc.contains_key(key) || settings.show_done {
        set_bool(doc, key, settings.show_done);
    }
}

/// The spelling of a setting already present in the document
fn doc_key<'a>(doc: &toml_edit::DocumentMut, key: &'a str, alias: &'a str) -> &'a str {
    if !doc.contains_key(key) && doc.contains_key(alias) {
        alias
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"# my vault
excluded_folders = ["Templates"] # never scan these

show_done = false
hidden_tasks = []
"#;

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let (settings, doc) = read_settings(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SETTINGS_FILE), SAMPLE).unwrap();

        let (settings, doc) = read_settings(tmp.path()).unwrap();
        assert_eq!(settings.excluded_folders, vec!["Templates"]);
        write_settings(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(written, SAMPLE);
    }

    #[test]
    fn sync_updates_lists_and_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = SAMPLE.parse().unwrap();
        let settings = Settings {
            excluded_folders: vec!["Templates".into()],
            hidden_tasks: vec!["Notes.md::Buy milk".into()],
            ..Default::default()
        };
        sync_settings(&mut doc, &settings);
        let text = doc.to_string();

        assert!(text.starts_with("# my vault\n"));
        assert!(text.contains("# never scan these"));
        assert!(text.contains(r#"hidden_tasks = ["Notes.md::Buy milk"]"#));
        // untouched defaults are not added
        assert!(!text.contains("hidden_files"));

        let reparsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(reparsed, settings);
    }

    #[test]
    fn sync_writes_through_camel_case_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(SETTINGS_FILE),
            "hiddenTasks = [\"a.md::one\"]\nshowDone = false\n",
        )
        .unwrap();

        let (mut settings, mut doc) = read_settings(tmp.path()).unwrap();
        settings.hidden_tasks.push("a.md::two".into());
        settings.show_done = true;
        sync_settings(&mut doc, &settings);
        write_settings(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(SETTINGS_FILE)).unwrap();
        assert!(written.contains("hiddenTasks = ["));
        assert!(written.contains("showDone = true"));
        assert!(!written.contains("hidden_tasks"));
        assert!(!written.contains("show_done"));

        let (reread, _) = read_settings(tmp.path()).unwrap();
        assert_eq!(reread, settings);
    }

    #[test]
    fn malformed_settings_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SETTINGS_FILE), "show_done = maybe").unwrap();
        assert!(read_settings(tmp.path()).is_err());
    }
}
