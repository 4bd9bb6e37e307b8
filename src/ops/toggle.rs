use crate::io::store::{DocumentStore, StoreError};
use crate::parse::parse_task_line;

/// Result of a checkbox toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The marker was flipped; `done` is the new state
    Toggled { done: bool },
    /// The line no longer holds the expected task; nothing was written
    Stale,
}

/// Flip the checkbox on `line` of `content`.
///
/// The line must still parse as a task with `expected_text` and
/// `expected_done`, otherwise `None` is returned. Only the character inside
/// the brackets changes; the rest of the document is copied verbatim.
pub fn toggle_line(
    content: &str,
    line: usize,
    expected_text: &str,
    expected_done: bool,
) -> Option<String> {
    let mut offset = 0;
    for (idx, raw) in content.split('\n').enumerate() {
        if idx < line {
            offset += raw.len() + 1;
            continue;
        }
        let parsed = parse_task_line(raw)?;
        if parsed.text != expected_text || parsed.done != expected_done {
            return None;
        }
        let start = offset + parsed.marker.start;
        let end = offset + parsed.marker.end;
        let replacement = if expected_done { " " } else { "x" };

        let mut out = String::with_capacity(content.len());
        out.push_str(&content[..start]);
        out.push_str(replacement);
        out.push_str(&content[end..]);
        return Some(out);
    }
    None
}

/// Read-modify-write a single checkbox through the store.
pub fn toggle_task(
    store: &mut dyn DocumentStore,
    file_path: &str,
    line: usize,
    expected_text: &str,
    expected_done: bool,
) -> Result<ToggleOutcome, StoreError> {
    let written = store.write_content(file_path, &mut |content| {
        toggle_line(content, line, expected_text, expected_done)
    })?;
    if written {
        tracing::info!(file_path, line, done = !expected_done, "task toggled");
        Ok(ToggleOutcome::Toggled {
            done: !expected_done,
        })
    } else {
        tracing::debug!(file_path, line, "stale toggle ignored");
        Ok(ToggleOutcome::Stale)
    }
}
