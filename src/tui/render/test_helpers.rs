use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::store::MemoryStore;
use crate::model::settings::Settings;
use crate::ops::session::Session;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Build an App over in-memory documents with default settings.
pub fn app_with_docs(docs: &[(&str, &str)]) -> App {
    let store = docs
        .iter()
        .fold(MemoryStore::new(), |store, (path, content)| store.with(path, content));
    let session = Session::detached(Box::new(store), Settings::default()).unwrap();
    App::new(session)
}

/// One heading, a parent with a tag, and a completed child.
pub const NOTES_MD: &str = "\
# Work

- [ ] Buy milk #errand
  - [x] Call store
";
