use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::TaskItem;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("heading pattern"));

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s*\[([ xX])\]\s+(.+)$").expect("task pattern"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[\w/-]+").expect("tag pattern"));

/// A checkbox line broken into its parts. Offsets are relative to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine<'a> {
    /// Leading whitespace, in characters
    pub indent: usize,
    pub done: bool,
    /// Character offset where the text begins
    pub text_ch: usize,
    /// Trimmed text after the marker
    pub text: &'a str,
    /// Byte range of the character inside `[ ]`
    pub marker: Range<usize>,
}

/// Match a single line against the checkbox pattern.
/// Returns `None` for anything that is not a well-formed task with text.
pub fn parse_task_line(line: &str) -> Option<TaskLine<'_>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let caps = TASK_RE.captures(line)?;
    let lead = caps.get(1)?;
    let marker = caps.get(2)?;
    let rest = caps.get(3)?;

    let text = rest.as_str().trim();
    if text.is_empty() {
        return None;
    }

    Some(TaskLine {
        indent: lead.as_str().chars().count(),
        done: marker.as_str().eq_ignore_ascii_case("x"),
        text_ch: line[..rest.start()].chars().count(),
        text,
        marker: marker.range(),
    })
}

/// Match a heading line (`#` to `######`, whitespace, text). Returns the trimmed text.
pub fn parse_heading_line(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let caps = HEADING_RE.captures(line)?;
    let text = caps.get(1)?.as_str().trim();
    if text.is_empty() { None } else { Some(text) }
}

/// All `#tag` tokens in `text`, left to right, duplicates kept
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_ranges(text)
        .into_iter()
        .map(|r| text[r].to_string())
        .collect()
}

/// Byte ranges of the `#tag` tokens in `text`
pub fn tag_ranges(text: &str) -> Vec<Range<usize>> {
    TAG_RE.find_iter(text).map(|m| m.range()).collect()
}

/// Scan one document into a flat, source-ordered task list.
///
/// Hierarchy is not resolved here: every task comes back with
/// `parent_line == None` and no children.
pub fn scan_lines(file_path: &str, file_name: &str, content: &str) -> Vec<TaskItem> {
    let mut tasks = Vec::new();
    let mut heading: Option<String> = None;

    for (idx, line) in content.split('\n').enumerate() {
        if let Some(h) = parse_heading_line(line) {
            heading = Some(h.to_string());
            continue;
        }

        let Some(parsed) = parse_task_line(line) else {
            continue;
        };

        tasks.push(TaskItem {
            file_path: file_path.to_string(),
            file_name: file_name.to_string(),
            line: idx,
            text_ch: parsed.text_ch,
            text: parsed.text.to_string(),
            done: parsed.done,
            heading: heading.clone(),
            indent: parsed.indent,
            parent_line: None,
            children: Vec::new(),
            tags: extract_tags(parsed.text),
        });
    }

    tasks
}
