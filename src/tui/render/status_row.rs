use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (spans, hint) = match app.mode {
        Mode::Navigate => {
            let spans = match &app.notice {
                Some(notice) => vec![Span::styled(
                    format!(" {}", notice),
                    Style::default().fg(app.theme.yellow).bg(bg),
                )],
                None => Vec::new(),
            };
            let corpus = app.session.corpus();
            let hint = format!(
                "{} docs  scanned {}  ? help ",
                corpus.document_count,
                corpus.scanned_at.format("%H:%M:%S")
            );
            (spans, hint)
        }
        Mode::Filter => {
            // Filter prompt: /before▌after
            let text = &app.view.filter_text;
            let split = app.filter_cursor.min(text.len());
            let spans = vec![
                Span::styled(
                    format!("/{}", &text[..split]),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(
                    text[split..].to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
            ];
            (spans, "Enter keep  Esc clear ".to_string())
        }
    };

    let mut spans = spans;
    let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let hint_width = unicode::display_width(&hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
