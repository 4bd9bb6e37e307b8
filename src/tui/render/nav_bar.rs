use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::view::ViewMode;
use crate::tui::app::App;
use crate::util::unicode;

const MODES: [ViewMode; 3] = [ViewMode::Files, ViewMode::Focus, ViewMode::Tags];

/// Render the view tabs with a separator line below
pub fn render_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{2611}", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(" ", bg_style),
    ];
    let mut sep_cols = Vec::new();

    for (i, mode) in MODES.iter().enumerate() {
        let label = match (mode, app.view.active_folder()) {
            (ViewMode::Focus, Some(folder)) if !folder.is_empty() => {
                format!(" {} {}: {} ", i + 1, mode.label(), folder)
            }
            _ => format!(" {} {} ", i + 1, mode.label()),
        };
        spans.push(Span::styled(label, tab_style(app, app.view.mode == *mode)));
        sep_cols.push(spans.iter().map(|s| unicode::display_width(&s.content)).sum());
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
    sep_cols
}

/// Separator line, with view indicators right-aligned when any are active
fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let dim = app.theme.dim;

    let mut indicators: Vec<Span> = Vec::new();
    if app.view.show_done {
        indicators.push(Span::styled(
            "+done",
            Style::default().fg(app.theme.green).bg(bg),
        ));
    }
    if !app.view.filter_text.is_empty() {
        if !indicators.is_empty() {
            indicators.push(Span::styled(" ", Style::default().bg(bg)));
        }
        indicators.push(Span::styled(
            "filter: ",
            Style::default().fg(app.theme.purple).bg(bg),
        ));
        indicators.push(Span::styled(
            app.view.filter_text.clone(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
    }

    let indicator_width: usize = indicators
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum();
    // +2: one space before the indicators, one after
    let line_end = if indicators.is_empty() {
        width
    } else {
        width.saturating_sub(indicator_width + 2)
    };

    let sep_text: String = (0..line_end)
        .map(|col| if sep_cols.contains(&col) { '\u{2534}' } else { '\u{2500}' })
        .collect();
    let mut spans = vec![Span::styled(sep_text, Style::default().fg(dim).bg(bg))];
    if !indicators.is_empty() {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.extend(indicators);
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }

    let sep_widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
