use std::path::Path;
use std::process::Command;

/// Why a task could not be opened
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigateError {
    #[error("no editor configured (set $VISUAL or $EDITOR)")]
    NoEditor,
    #[error("document no longer exists: {0}")]
    Missing(String),
}

/// How an editor wants to be told about a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    /// `+LINE path`
    Plus,
    /// `--goto path:LINE:COL`
    Goto,
    /// `path:LINE:COL`
    Suffix,
    /// Position unsupported; open the file only
    Bare,
}

fn line_style(program: &str) -> LineStyle {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    match name {
        "vi" | "vim" | "nvim" | "gvim" | "nano" | "micro" | "hx" | "helix" | "kak" | "emacs"
        | "emacsclient" => LineStyle::Plus,
        "code" | "code-insiders" | "codium" | "cursor" | "windsurf" => LineStyle::Goto,
        "zed" | "subl" => LineStyle::Suffix,
        _ => LineStyle::Bare,
    }
}

/// A resolved editor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EditorCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// `$VISUAL`, then `$EDITOR`; blank values count as unset
pub fn configured_editor(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(lookup)
        .find(|v| !v.trim().is_empty())
}

/// Build the command that opens `file` at a zero-based `line` and `ch`.
/// The editor string may carry its own arguments (`"code --wait"`).
pub fn editor_command(
    editor: &str,
    file: &Path,
    line: usize,
    ch: usize,
) -> Result<EditorCommand, NavigateError> {
    let mut parts = editor.split_whitespace().map(str::to_string);
    let program = parts.next().ok_or(NavigateError::NoEditor)?;
    let mut args: Vec<String> = parts.collect();

    let path = file.display().to_string();
    let (line, col) = (line + 1, ch + 1);
    match line_style(&program) {
        LineStyle::Plus => {
            args.push(format!("+{}", line));
            args.push(path);
        }
        LineStyle::Goto => {
            args.push("--goto".to_string());
            args.push(format!("{}:{}:{}", path, line, col));
        }
        LineStyle::Suffix => args.push(format!("{}:{}:{}", path, line, col)),
        LineStyle::Bare => args.push(path),
    }
    Ok(EditorCommand { program, args })
}

/// Resolve the editor from the environment and check the document exists.
pub fn open_command(file: &Path, line: usize, ch: usize) -> Result<EditorCommand, NavigateError> {
    if !file.is_file() {
        return Err(NavigateError::Missing(file.display().to_string()));
    }
    let editor =
        configured_editor(|k| std::env::var(k).ok()).ok_or(NavigateError::NoEditor)?;
    editor_command(&editor, file, line, ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(editor: &str) -> Vec<String> {
        editor_command(editor, Path::new("/v/Work/a.md"), 4, 6)
            .unwrap()
            .args
    }

    #[test]
    fn vi_family_gets_plus_line() {
        assert_eq!(args("nvim"), vec!["+5", "/v/Work/a.md"]);
        assert_eq!(args("/usr/bin/hx"), vec!["+5", "/v/Work/a.md"]);
    }

    #[test]
    fn vscode_family_gets_goto_with_column() {
        assert_eq!(args("code --wait"), vec!["--wait", "--goto", "/v/Work/a.md:5:7"]);
    }

    #[test]
    fn unknown_editor_opens_file_only() {
        assert_eq!(args("ed"), vec!["/v/Work/a.md"]);
    }

    #[test]
    fn visual_wins_and_blank_is_unset() {
        let env = |k: &str| match k {
            "VISUAL" => Some("  ".to_string()),
            "EDITOR" => Some("vim".to_string()),
            _ => None,
        };
        assert_eq!(configured_editor(env), Some("vim".to_string()));
        assert_eq!(configured_editor(|_| None), None);
        assert_eq!(
            editor_command("   ", Path::new("a.md"), 0, 0),
            Err(NavigateError::NoEditor)
        );
    }

    #[test]
    fn missing_document_is_reported() {
        let err = open_command(Path::new("/definitely/not/here.md"), 0, 0).unwrap_err();
        assert!(matches!(err, NavigateError::Missing(_)));
    }
}
