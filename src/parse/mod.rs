pub mod hierarchy;
pub mod line_scanner;

pub use hierarchy::build_forest;
pub use line_scanner::{extract_tags, parse_heading_line, parse_task_line, scan_lines, tag_ranges};

use crate::model::task::TaskItem;

/// Scan a document and rebuild its task forest
pub fn parse_document(file_path: &str, file_name: &str, content: &str) -> Vec<TaskItem> {
    build_forest(scan_lines(file_path, file_name, content))
}
