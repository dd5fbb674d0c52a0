//! Command-line entry point.
//!
//! Everything below the argument parse is testable through the library;
//! this module is the only place that prints to the console or decides
//! the process exit status.

pub mod complete;
pub mod dispatch;
pub mod format;
pub mod system;

pub use complete::{CompletionEngine, CompletionPayload, Suggestion};
pub use dispatch::Dispatcher;
pub use format::OutputFormatter;
pub use system::{SYSTEM_HANDLER, SystemCommands};

use crate::loader::StaticUnitLoader;
use crate::registry::AppRegistry;
use crate::state::StateManager;
use clap::Parser;
use std::path::PathBuf;

/// Application registry and command dispatch for unit-based handlers.
#[derive(Parser, Debug)]
#[command(name = "appdock", version, disable_help_flag = true)]
struct Cli {
    /// Snapshot file overriding the per-user default location.
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Emit completion suggestions for SHELL instead of dispatching.
    #[arg(long, value_name = "SHELL")]
    complete: Option<String>,

    /// Handler, method and arguments (or `--help`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let state = match &cli.state {
        Some(path) => StateManager::new(path),
        None => StateManager::default(),
    };
    let mut registry = AppRegistry::new(Box::new(StaticUnitLoader::with_builtin_classes()))
        .with_state(state);

    // A corrupt or unreadable snapshot must not make the CLI unusable;
    // start empty and say why.
    if let Err(err) = registry.restore_saved() {
        tracing::warn!(error = %err, "saved registry not restored");
        eprintln!("Warning: saved registry not restored: {err}");
    }

    if let Some(shell) = &cli.complete {
        let (cursor, tokens) = split_cursor(&cli.tokens);
        let payload = CompletionEngine::complete(&registry, shell, cursor, tokens);
        println!("{}", payload.to_json_line());
        return Ok(());
    }

    match Dispatcher::dispatch(&mut registry, &cli.tokens) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Completion requests may lead with a numeric cursor index.
///
/// The cursor is optional, so a purely numeric first token is always
/// read as the cursor; a lone numeric fragment being completed at depth
/// zero is misread. The grammar cannot distinguish the two, and handler
/// names are never numeric, so the ambiguity stays.
fn split_cursor(tokens: &[String]) -> (usize, &[String]) {
    match tokens.split_first() {
        Some((first, rest)) if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) => {
            (first.parse().unwrap_or(0), rest)
        }
        _ => (tokens.len(), tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digits_are_a_cursor() {
        let tokens = vec!["2".to_string(), "shop".to_string(), "a".to_string()];
        let (cursor, rest) = split_cursor(&tokens);
        assert_eq!(cursor, 2);
        assert_eq!(rest, &["shop".to_string(), "a".to_string()][..]);
    }

    #[test]
    fn missing_cursor_defaults_to_token_count() {
        let tokens = vec!["shop".to_string()];
        let (cursor, rest) = split_cursor(&tokens);
        assert_eq!(cursor, 1);
        assert_eq!(rest.len(), 1);
    }
}
