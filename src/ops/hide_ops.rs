//! Hide-list mutations. Each returns whether the settings changed so callers
//! can skip a needless write.

use crate::model::settings::Settings;
use crate::model::task::{KEY_SEPARATOR, top_folder};

fn add_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_where(list: &mut Vec<String>, pred: impl Fn(&str) -> bool) -> bool {
    let before = list.len();
    list.retain(|v| !pred(v));
    list.len() != before
}

/// Does a hidden-task key belong to the document at `file_path`?
fn key_in_file(key: &str, file_path: &str) -> bool {
    key.strip_prefix(file_path)
        .is_some_and(|rest| rest.starts_with(KEY_SEPARATOR))
}

fn path_in_folder(path: &str, folder: &str) -> bool {
    top_folder(path) == folder
}

pub fn hide_task(settings: &mut Settings, key: &str) -> bool {
    add_unique(&mut settings.hidden_tasks, key)
}

/// Unhide a task. The task's file and folder are unhidden too, so the task
/// actually reappears.
pub fn unhide_task(settings: &mut Settings, file_path: &str, key: &str) -> bool {
    let folder = top_folder(file_path);
    let tasks = remove_where(&mut settings.hidden_tasks, |k| k == key);
    let files = remove_where(&mut settings.hidden_files, |f| f == file_path);
    let folders = remove_where(&mut settings.hidden_folders, |f| f == folder);
    tasks || files || folders
}

pub fn hide_file(settings: &mut Settings, file_path: &str) -> bool {
    add_unique(&mut settings.hidden_files, file_path)
}

/// Unhide a document along with every task key recorded for it.
pub fn unhide_file(settings: &mut Settings, file_path: &str) -> bool {
    let files = remove_where(&mut settings.hidden_files, |f| f == file_path);
    let tasks = remove_where(&mut settings.hidden_tasks, |k| key_in_file(k, file_path));
    files || tasks
}

pub fn hide_folder(settings: &mut Settings, folder: &str) -> bool {
    add_unique(&mut settings.hidden_folders, folder)
}

/// Unhide a top-level folder along with hidden files and task keys under it.
pub fn unhide_folder(settings: &mut Settings, folder: &str) -> bool {
    let folders = remove_where(&mut settings.hidden_folders, |f| f == folder);
    let files = remove_where(&mut settings.hidden_files, |f| path_in_folder(f, folder));
    let tasks = remove_where(&mut settings.hidden_tasks, |k| {
        k.split_once(KEY_SEPARATOR)
            .is_some_and(|(path, _)| path_in_folder(path, folder))
    });
    folders || files || tasks
}

/// Add a folder to the scan exclusions
pub fn exclude_folder(settings: &mut Settings, folder: &str) -> bool {
    let folder = folder.trim_end_matches('/');
    !folder.is_empty() && add_unique(&mut settings.excluded_folders, folder)
}

pub fn include_folder(settings: &mut Settings, folder: &str) -> bool {
    let folder = folder.trim_end_matches('/');
    remove_where(&mut settings.excluded_folders, |f| {
        f.trim_end_matches('/') == folder
    })
}
