use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::ops::views::folder_label;
use crate::parse::tag_ranges;
use crate::tui::app::{App, Row, RowKind, TaskRow};
use crate::util::unicode;

use super::push_highlighted_spans;

/// Render the flattened task list, scrolled to keep the cursor visible
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible_height = area.height as usize;
    if visible_height == 0 {
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor + 1 - visible_height;
    }

    let filter_re = filter_regex(&app.view.filter_text);
    let width = area.width as usize;
    let end = app.rows.len().min(app.scroll_offset + visible_height);
    let app: &App = app;
    let lines: Vec<Line> = (app.scroll_offset..end)
        .map(|i| render_row(app, &app.rows[i], i == app.cursor, width, filter_re.as_ref()))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

/// Case-insensitive literal match for the filter text
fn filter_regex(filter: &str) -> Option<Regex> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(filter))).ok()
}

fn fold_marker(row: &Row) -> &'static str {
    match (&row.collapse_key, &row.kind) {
        (_, RowKind::HiddenHeader { .. }) | (Some(_), _) => {
            if row.collapsed {
                "\u{25B8} "
            } else {
                "\u{25BE} "
            }
        }
        _ => "  ",
    }
}

fn render_row<'a>(
    app: &App,
    row: &'a Row,
    is_cursor: bool,
    width: usize,
    filter_re: Option<&Regex>,
) -> Line<'a> {
    let theme = &app.theme;
    let bg = if is_cursor { theme.selection_bg } else { theme.background };
    let base = Style::default().bg(bg);
    let dim = base.fg(theme.dim);

    let mut spans: Vec<Span> = vec![
        Span::styled("  ".repeat(row.depth + 1), base),
        Span::styled(fold_marker(row), dim),
    ];

    match &row.kind {
        RowKind::Folder { folder } => {
            let label = if folder.is_empty() {
                folder_label(folder).to_string()
            } else {
                format!("{}/", folder)
            };
            spans.push(Span::styled(
                label,
                base.fg(theme.text_bright).add_modifier(Modifier::BOLD),
            ));
        }
        RowKind::File { name, .. } => {
            spans.push(Span::styled(name.clone(), base.fg(theme.text_bright)));
        }
        RowKind::Heading { heading } => {
            spans.push(Span::styled(format!("# {}", heading), base.fg(theme.purple)));
        }
        RowKind::Tag { label } => {
            let style = if label.starts_with('#') {
                base.fg(theme.tag_color(label))
            } else {
                dim.add_modifier(Modifier::ITALIC)
            };
            spans.push(Span::styled(label.clone(), style));
        }
        RowKind::HiddenHeader { count } => {
            spans.push(Span::styled(
                format!("Hidden ({})", count),
                base.fg(theme.yellow).add_modifier(Modifier::BOLD),
            ));
        }
        RowKind::Empty(message) => {
            spans.push(Span::styled(message.clone(), dim));
        }
        RowKind::Task(task) => {
            let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
            let badge_width = row.badge.as_ref().map_or(0, |b| b.len() + 3);
            let room = width.saturating_sub(used + 4 + badge_width);
            push_task_spans(&mut spans, app, task, base, room, filter_re);
        }
    }

    if let Some(badge) = &row.badge {
        spans.push(Span::styled(format!("  {}", badge), dim));
    }

    // Fill the rest of the cursor line
    if is_cursor {
        let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), base));
        }
    }

    Line::from(spans)
}

/// Checkbox plus task text, with tags colored and filter matches highlighted
fn push_task_spans(
    spans: &mut Vec<Span>,
    app: &App,
    task: &TaskRow,
    base: Style,
    room: usize,
    filter_re: Option<&Regex>,
) {
    let theme = &app.theme;
    let (box_text, box_color) = if task.done {
        ("[x] ", theme.green)
    } else {
        ("[ ] ", theme.text)
    };
    spans.push(Span::styled(box_text, base.fg(box_color)));

    let mut text_style = base.fg(theme.text);
    if task.done {
        text_style = base.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT);
    } else if task.parent_done {
        text_style = base.fg(theme.dim);
    }
    if task.shell {
        text_style = text_style.fg(theme.dim).add_modifier(Modifier::ITALIC);
    }
    let highlight = base
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);

    let text = unicode::truncate_to_width(&task.text, room);
    let mut last = 0;
    for range in tag_ranges(&text) {
        if range.start > last {
            push_highlighted_spans(spans, &text[last..range.start], text_style, highlight, filter_re);
        }
        let tag = &text[range.clone()];
        let tag_style = if task.done || task.shell {
            text_style
        } else {
            base.fg(theme.tag_color(tag))
        };
        spans.push(Span::styled(tag.to_string(), tag_style));
        last = range.end;
    }
    if last < text.len() {
        push_highlighted_spans(spans, &text[last..], text_style, highlight, filter_re);
    }
}
