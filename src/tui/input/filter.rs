use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Filter box: edits apply live, Enter keeps the text, Esc clears it.
pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    let mut text = app.view.filter_text.clone();
    let mut cursor = app.filter_cursor.min(text.len());

    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => {
            app.mode = Mode::Navigate;
            return;
        }
        (_, KeyCode::Esc) => {
            app.mode = Mode::Navigate;
            app.set_filter(String::new());
            return;
        }
        (_, KeyCode::Left) => {
            app.filter_cursor = unicode::prev_grapheme_boundary(&text, cursor).unwrap_or(0);
            return;
        }
        (_, KeyCode::Right) => {
            app.filter_cursor = unicode::next_grapheme_boundary(&text, cursor).unwrap_or(cursor);
            return;
        }
        (_, KeyCode::Home) => {
            app.filter_cursor = 0;
            return;
        }
        (_, KeyCode::End) => {
            app.filter_cursor = text.len();
            return;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            text.replace_range(..cursor, "");
            cursor = 0;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            let start = unicode::word_boundary_left(&text, cursor);
            text.replace_range(start..cursor, "");
            cursor = start;
        }
        (_, KeyCode::Backspace) => {
            let Some(start) = unicode::prev_grapheme_boundary(&text, cursor) else {
                return;
            };
            text.replace_range(start..cursor, "");
            cursor = start;
        }
        (_, KeyCode::Delete) => {
            let Some(end) = unicode::next_grapheme_boundary(&text, cursor) else {
                return;
            };
            text.replace_range(cursor..end, "");
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            text.insert(cursor, c);
            cursor += c.len_utf8();
        }
        _ => return,
    }

    app.set_filter(text);
    app.filter_cursor = cursor;
}
