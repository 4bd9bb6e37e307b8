mod init;
pub use init::cmd_init;

use std::time::{Duration, Instant};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::debounce::RescanScheduler;
use crate::io::vault_io::Vault;
use crate::io::watcher::{VaultEvent, VaultWatcher};
use crate::model::intent::Intent;
use crate::model::task::TaskItem;
use crate::model::view::ViewState;
use crate::ops::session::{Outcome, Session};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let vault = discover_vault(cli.vault_dir.as_deref())?;

    match cli.command {
        None => Ok(()),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before vault discovery
            Commands::Init(args) => cmd_init(args, cli.vault_dir.as_deref()),

            // Read commands
            Commands::List(args) => cmd_list(vault, args, json),
            Commands::Hidden(args) => cmd_hidden(vault, args, json),
            Commands::Watch(args) => cmd_watch(vault, args, json),

            // Write commands
            Commands::Toggle(args) => cmd_toggle(vault, args),
            Commands::Hide(args) => cmd_hide(vault, args.target),
            Commands::Unhide(args) => cmd_unhide(vault, args.target),
            Commands::Exclude(args) => cmd_exclude(vault, &args.folder),
            Commands::Include(args) => cmd_include(vault, &args.folder),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn discover_vault(vault_dir: Option<&str>) -> Result<Vault, Box<dyn std::error::Error>> {
    Ok(Vault::locate(vault_dir)?)
}

/// Build the view state for `list`/`watch` from flags and settings defaults.
fn list_view(args: &ListArgs, session: &Session) -> Result<ViewState, Box<dyn std::error::Error>> {
    let show_done = if args.done {
        true
    } else if args.no_done {
        false
    } else {
        session.default_show_done()
    };
    Ok(ViewState {
        show_done,
        filter_text: args.filter.clone().unwrap_or_default(),
        mode: parse_view_mode(&args.view)?,
        active_document: args.active.as_deref().map(normalize_path),
    })
}

/// Vault-relative, `/`-separated form of a user-supplied path
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").to_string()
}

/// `""` and `"/"` both name the vault root
fn normalize_folder(folder: &str) -> String {
    folder.trim_matches('/').to_string()
}

/// Find the task at a 1-based line of a document.
fn find_task<'a>(
    session: &'a Session,
    file: &str,
    line: usize,
) -> Result<&'a TaskItem, Box<dyn std::error::Error>> {
    let file = normalize_path(file);
    line.checked_sub(1)
        .and_then(|l| session.corpus().find(&file, l))
        .ok_or_else(|| format!("no task at {}:{}", file, line).into())
}

fn report(outcome: Outcome, changed: &str, unchanged: &str) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        Outcome::Rerender | Outcome::Toggled { .. } => {
            println!("{}", changed);
            Ok(())
        }
        Outcome::Unchanged => {
            println!("{}", unchanged);
            Ok(())
        }
        Outcome::Notice(msg) => Err(msg.into()),
        Outcome::Open { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn print_list(session: &Session, view: &ViewState, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let model = session.render(view);
    if json {
        let filter = Some(view.filter_text.as_str()).filter(|f| !f.trim().is_empty());
        let out = list_to_json(&model, view.show_done, filter);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_list(&model, view.mode) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_list(vault: Vault, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(vault)?;
    let view = list_view(&args, &session)?;
    print_list(&session, &view, json)
}

fn cmd_hidden(vault: Vault, args: HiddenArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(vault)?;
    let view = ViewState {
        show_done: args.done,
        ..Default::default()
    };
    let model = session.render(&view);
    let settings = session.settings();

    if json {
        let out = hidden_to_json(&model, settings);
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if model.hidden.is_empty() {
        println!("No hidden tasks");
    } else {
        for line in format_folder_groups(&model.hidden) {
            println!("{}", line);
        }
    }
    let lists = [
        ("folders", &settings.hidden_folders),
        ("files", &settings.hidden_files),
        ("tasks", &settings.hidden_tasks),
    ];
    for (label, entries) in lists {
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("hidden {}:", label);
        for entry in entries {
            let shown = if entry.is_empty() { "(vault root)" } else { entry };
            println!("  {}", shown);
        }
    }
    Ok(())
}

fn cmd_watch(vault: Vault, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = vault.root.clone();
    let mut session = Session::open(vault)?;
    let view = list_view(&args, &session)?;
    let watcher = VaultWatcher::start(&root)?;
    let mut scheduler = RescanScheduler::default();

    print_list(&session, &view, json)?;
    loop {
        let now = Instant::now();
        for VaultEvent::Changed(kind, paths) in watcher.poll() {
            tracing::debug!(?kind, count = paths.len(), "change notification");
            scheduler.notify(now);
        }

        if scheduler.take_due(Instant::now()) {
            let result = session.rescan();
            scheduler.finish();
            match result {
                Ok(()) => {
                    println!();
                    println!(
                        "-- rescanned {} --",
                        session.corpus().scanned_at.format("%H:%M:%S")
                    );
                    print_list(&session, &view, json)?;
                }
                Err(e) => tracing::warn!(error = %e, "rescan failed"),
            }
        }

        let wait = scheduler
            .time_until_due(Instant::now())
            .unwrap_or(Duration::from_millis(100))
            .min(Duration::from_millis(100));
        std::thread::sleep(wait);
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_toggle(vault: Vault, args: ToggleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(vault)?;
    let task = find_task(&session, &args.file, args.line)?;
    let text = task.text.clone();
    let intent = Intent::toggle(task);
    match session.apply(intent)? {
        Outcome::Toggled { done } => {
            println!("[{}] {}", if done { "x" } else { " " }, text);
            Ok(())
        }
        other => report(other, "", ""),
    }
}

fn cmd_hide(vault: Vault, target: HideTarget) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(vault)?;
    let (intent, what) = match target {
        HideTarget::Task { file, line } => {
            let task = find_task(&session, &file, line)?;
            (Intent::hide_task(task), format!("task \"{}\"", task.text))
        }
        HideTarget::File { file } => {
            let file_path = normalize_path(&file);
            let what = format!("file {}", file_path);
            (Intent::HideFile { file_path }, what)
        }
        HideTarget::Folder { folder } => {
            let folder = normalize_folder(&folder);
            let what = format!("folder {}", folder_name(&folder));
            (Intent::HideFolder { folder }, what)
        }
    };
    let outcome = session.apply(intent)?;
    report(
        outcome,
        &format!("hid {}", what),
        &format!("{} is already hidden", what),
    )
}

fn cmd_unhide(vault: Vault, target: HideTarget) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(vault)?;
    let (intent, what) = match target {
        HideTarget::Task { file, line } => {
            let task = find_task(&session, &file, line)?;
            (Intent::unhide_task(task), format!("task \"{}\"", task.text))
        }
        HideTarget::File { file } => {
            let file_path = normalize_path(&file);
            let what = format!("file {}", file_path);
            (Intent::UnhideFile { file_path }, what)
        }
        HideTarget::Folder { folder } => {
            let folder = normalize_folder(&folder);
            let what = format!("folder {}", folder_name(&folder));
            (Intent::UnhideFolder { folder }, what)
        }
    };
    let outcome = session.apply(intent)?;
    report(
        outcome,
        &format!("unhid {}", what),
        &format!("{} was not hidden", what),
    )
}

fn folder_name(folder: &str) -> &str {
    if folder.is_empty() { "(vault root)" } else { folder }
}

fn cmd_exclude(vault: Vault, folder: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(vault)?;
    let outcome = session.exclude_folder(folder)?;
    report(
        outcome,
        &format!("excluded {}", folder),
        &format!("{} is already excluded", folder),
    )
}

fn cmd_include(vault: Vault, folder: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(vault)?;
    let outcome = session.include_folder(folder)?;
    report(
        outcome,
        &format!("included {}", folder),
        &format!("{} was not excluded", folder),
    )
}
