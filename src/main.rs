//! Command line interface for the organizer.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use sortbox::config::Config;
use sortbox::history::{self, ConflictType, HistoryStore};
use sortbox::organize::{self, ConflictPolicy, MoveEvent, OrganizeOptions};
use sortbox::watch::{watch_directory, WatchOptions};
use sortbox::{AppError, Result};

#[derive(Parser)]
#[command(
    name = "sortbox",
    version,
    about = "Organize a directory's files into category folders by extension"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move every file in a directory into its category folder
    Organize {
        /// Directory to organize
        target: PathBuf,
        /// Show the plan without moving anything
        #[arg(long)]
        dry_run: bool,
        /// What to do when a destination file already exists
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictPolicy>,
    },
    /// Revert a recorded organize session
    Undo {
        /// Directory whose organize run should be reverted
        target: PathBuf,
        /// Session id to unwind through (defaults to the newest)
        #[arg(long)]
        session: Option<Uuid>,
        /// Skip conflicted operations instead of aborting
        #[arg(long)]
        force: bool,
    },
    /// List recorded organize sessions for a directory
    History {
        /// Directory whose sessions to list
        target: PathBuf,
    },
    /// Keep organizing as new files arrive
    Watch {
        /// Directory to watch
        target: PathBuf,
        /// What to do when a destination file already exists
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictPolicy>,
    },
}

fn main() {
    sortbox::init_logging();
    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(cli.command, &config) {
        report_error(&e);
        process::exit(1);
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Organize {
            target,
            dry_run,
            on_conflict,
        } => cmd_organize(&target, dry_run, on_conflict, config),
        Commands::Undo {
            target,
            session,
            force,
        } => cmd_undo(&target, session, force, config),
        Commands::History { target } => cmd_history(&target, config),
        Commands::Watch {
            target,
            on_conflict,
        } => cmd_watch(&target, on_conflict, config),
    }
}

fn report_error(error: &AppError) {
    match error {
        AppError::NotADirectory { path } => {
            eprintln!("Error: {path} is not a valid directory.");
        }
        other => eprintln!("Error: {other}"),
    }
}

/// History is best-effort for organize and watch; a broken store only
/// costs the undo trail, never the run itself.
fn open_store(config: &Config) -> Option<HistoryStore> {
    match HistoryStore::new(config) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("history disabled: {e}");
            None
        }
    }
}

/// Live runs announce table matches only; fallback moves stay quiet.
/// Dry runs announce the full plan, fallback included.
fn print_move(event: &MoveEvent, dry_run: bool) {
    match event {
        MoveEvent::Moved {
            file_name,
            category,
            matched,
            renamed_to,
        } => {
            if dry_run {
                println!("Would move {file_name} to {category}/");
            } else if *matched {
                match renamed_to {
                    Some(new_name) => println!("Moved {file_name} to {category}/ as {new_name}"),
                    None => println!("Moved {file_name} to {category}/"),
                }
            }
        }
        MoveEvent::Skipped {
            file_name,
            category,
        } => {
            println!("Skipped {file_name} ({category}/{file_name} already exists)");
        }
    }
}

fn cmd_organize(
    target: &Path,
    dry_run: bool,
    on_conflict: Option<ConflictPolicy>,
    config: &Config,
) -> Result<()> {
    let options = OrganizeOptions {
        dry_run,
        on_conflict: on_conflict.unwrap_or(config.on_conflict),
    };
    let store = if dry_run { None } else { open_store(config) };

    let report = organize::organize(target, &options, store.as_ref(), &mut |event| {
        print_move(event, dry_run)
    })?;

    if !report.success() {
        for error in &report.errors {
            eprintln!("Error: {error}");
        }
        process::exit(1);
    }

    if dry_run {
        println!("\n✔ Dry run complete: {} file(s) would move.", report.moved);
    } else {
        println!("\n✔ Organization complete!");
    }
    Ok(())
}

fn cmd_undo(
    target: &Path,
    session: Option<Uuid>,
    force: bool,
    config: &Config,
) -> Result<()> {
    let store = HistoryStore::new(config)?;

    let flight = history::preflight(&store, target, session)?;
    if !flight.clean() {
        eprintln!("Cannot undo session {} safely:", flight.target_session);
        for conflict in &flight.conflicts {
            eprintln!(
                "  {}: {} ({})",
                conflict_label(conflict.conflict),
                conflict.path.display(),
                conflict.detail
            );
        }
        if !force {
            eprintln!("Re-run with --force to skip the conflicted files.");
            process::exit(1);
        }
    }

    let outcome = history::execute_undo(&store, target, session, force)?;
    for kept in &outcome.folders_kept {
        println!("Kept {} (not empty)", kept.display());
    }
    if !outcome.success() {
        for error in &outcome.errors {
            eprintln!("Error: {error}");
        }
        process::exit(1);
    }

    let skipped = if outcome.operations_skipped > 0 {
        format!(", {} skipped", outcome.operations_skipped)
    } else {
        String::new()
    };
    println!(
        "✔ Undid {} operation(s) across {} session(s){skipped}",
        outcome.operations_undone, outcome.sessions_reverted
    );
    Ok(())
}

fn cmd_history(target: &Path, config: &Config) -> Result<()> {
    let store = HistoryStore::new(config)?;
    let summaries = store.summaries(target)?;

    if summaries.is_empty() {
        println!("No history recorded for {}.", target.display());
        return Ok(());
    }

    println!("History for {}:", target.display());
    for summary in summaries {
        let undone = if summary.undone { "  [undone]" } else { "" };
        println!(
            "  {}  {}  {} file(s), {} operation(s){undone}",
            summary.session_id,
            summary.executed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            summary.files_moved,
            summary.operation_count
        );
    }
    Ok(())
}

fn cmd_watch(
    target: &Path,
    on_conflict: Option<ConflictPolicy>,
    config: &Config,
) -> Result<()> {
    let options = WatchOptions {
        on_conflict: on_conflict.unwrap_or(config.on_conflict),
        debounce: config.watch_debounce,
    };
    let store = open_store(config);

    println!("Watching {} for new files (Ctrl-C to stop)", target.display());
    watch_directory(target, &options, store.as_ref(), &mut |event| {
        print_move(event, false)
    })
}

fn conflict_label(conflict: ConflictType) -> &'static str {
    match conflict {
        ConflictType::Modified => "modified",
        ConflictType::Deleted => "missing",
        ConflictType::Blocking => "blocked",
    }
}
