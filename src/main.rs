use clap::Parser;
use taskhub::cli::commands::{Cli, Commands};
use taskhub::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`RUST_LOG` syntax)
const LOG_ENV: &str = "TASKHUB_LOG";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// CLI logging goes to stderr so stdout stays clean for --json
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The TUI owns the terminal, so its logs go to the vault's log file, or
/// nowhere when the vault has no state directory.
fn init_tui_logging(vault_dir: Option<&str>) {
    let log_file = handlers::discover_vault(vault_dir).ok().and_then(|vault| {
        if !vault.is_initialized() {
            return None;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(vault.log_path())
            .ok()
    });
    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    let vault_dir = cli.vault_dir.clone();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            init_tui_logging(vault_dir.as_deref());
            if let Err(e) = taskhub::tui::run(vault_dir.as_deref()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init(args)) => {
            // Init is handled before vault discovery
            init_cli_logging();
            if let Err(e) = handlers::cmd_init(args, vault_dir.as_deref()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            init_cli_logging();
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
