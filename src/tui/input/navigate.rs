use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::view::ViewMode;
use crate::tui::app::{App, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            app.should_quit = true;
        }
        (_, KeyCode::Char('?')) => app.show_help = true,

        // Cursor
        (_, KeyCode::Char('j') | KeyCode::Down) => app.move_cursor(1),
        (_, KeyCode::Char('k') | KeyCode::Up) => app.move_cursor(-1),
        (_, KeyCode::PageDown) => app.move_cursor(10),
        (_, KeyCode::PageUp) => app.move_cursor(-10),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.jump_top(),
        (_, KeyCode::Char('G') | KeyCode::End) => app.jump_bottom(),

        // Folding
        (_, KeyCode::Left) => app.set_collapsed(false),
        (_, KeyCode::Right) => app.set_collapsed(true),
        (_, KeyCode::Char('z')) => app.toggle_collapse(),
        (_, KeyCode::Char('H')) => {
            app.hidden_open = !app.hidden_open;
            app.rebuild_rows();
        }

        // Task actions
        (_, KeyCode::Char(' ') | KeyCode::Char('x')) => app.toggle_current(),
        (_, KeyCode::Enter) => app.activate(),
        (_, KeyCode::Char('o')) => app.open_current(),
        (_, KeyCode::Char('h') | KeyCode::Char('u')) => app.hide_or_unhide_current(),

        // Views
        (_, KeyCode::Tab) => app.cycle_view_mode(),
        (_, KeyCode::Char('1')) => app.set_view_mode(ViewMode::Files),
        (_, KeyCode::Char('2')) => app.set_view_mode(ViewMode::Focus),
        (_, KeyCode::Char('3')) => app.set_view_mode(ViewMode::Tags),
        (_, KeyCode::Char('c')) => app.toggle_show_done(),
        (_, KeyCode::Char('/')) => {
            app.filter_cursor = app.view.filter_text.len();
            app.mode = Mode::Filter;
        }
        (_, KeyCode::Esc) => {
            if !app.view.filter_text.is_empty() {
                app.set_filter(String::new());
            }
        }
        (_, KeyCode::Char('r')) => app.rescan(),
        _ => {}
    }
}
