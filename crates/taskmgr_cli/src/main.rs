//! Command-line front end for the task manager.
//!
//! # Responsibility
//! - Parse one user intent per invocation and dispatch it to `TaskManager`.
//! - Act as the presentation layer: print the rendered view, statistics and
//!   notifications.

mod presenter;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use presenter::ConsolePresenter;
use std::io::Read;
use std::path::{Path, PathBuf};
use taskmgr_core::db::open_db;
use taskmgr_core::{
    init_logging, parse_due_date, CoreConfig, KeyValueStore, Priority, SortBy, SqliteKvStore,
    StatusFilter, TaskDraft, TaskManager, TaskStore,
};

#[derive(Debug, Parser)]
#[command(name = "taskmgr", version, about = "Local task list manager")]
struct Cli {
    /// SQLite file holding tasks and settings (overrides TASKMGR_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files (overrides TASKMGR_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a task.
    Add {
        text: String,
        #[arg(long, short)]
        priority: Option<Priority>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },
    /// Show tasks.
    List {
        #[arg(long, short, default_value = "all")]
        filter: StatusFilter,
        #[arg(long, short, default_value = "")]
        search: String,
        /// date | priority | dueDate (defaults to the saved preference).
        #[arg(long)]
        sort: Option<SortBy>,
    },
    /// Replace a task's text.
    Edit { id: String, text: String },
    /// Flip a task between active and completed.
    Toggle { id: String },
    /// Delete a task.
    Delete { id: String },
    /// Delete every completed task.
    ClearCompleted,
    /// Show collection statistics.
    Stats,
    /// Write all tasks to an export file.
    Export {
        /// Directory for the export file.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Import tasks from an export file (`-` reads stdin).
    Import { file: PathBuf },
    /// Switch between light and dark theme.
    Theme,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CoreConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }

    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let store = TaskStore::new(SqliteKvStore::new(conn));
    let mut manager = TaskManager::start(store, ConsolePresenter::default());
    info!("event=cli_command module=cli status=start");

    run(&mut manager, cli.command)
}

fn run<S: KeyValueStore>(
    manager: &mut TaskManager<S, ConsolePresenter>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Add {
            text,
            priority,
            due,
        } => {
            let mut draft = TaskDraft::new(text);
            draft.priority = priority;
            if let Some(raw) = due {
                draft.due_date = Some(parse_due_date(&raw).map_err(anyhow::Error::msg)?);
            }
            if let Some(task) = manager.add_task(draft) {
                println!("{}", task.id);
            }
        }
        Command::List {
            filter,
            search,
            sort,
        } => {
            if let Some(sort) = sort {
                manager.set_sort_by(sort);
            }
            manager.set_filter(filter);
            manager.set_search_term(&search);
            manager.presenter().print_view();
        }
        Command::Edit { id, text } => {
            if manager.update_task(&id, &text).is_none() && manager.get_task(&id).is_none() {
                bail!("no task with id `{id}`");
            }
        }
        Command::Toggle { id } => {
            if manager.toggle_task(&id).is_none() {
                bail!("no task with id `{id}`");
            }
        }
        Command::Delete { id } => {
            manager.delete_task(&id);
        }
        Command::ClearCompleted => {
            let removed = manager.clear_completed();
            println!("removed {removed}");
        }
        Command::Stats => manager.presenter().print_statistics(),
        Command::Export { out_dir } => {
            if let Some(file) = manager.export_tasks() {
                let path = out_dir.join(&file.file_name);
                std::fs::write(&path, file.contents)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("{}", path.display());
            }
        }
        Command::Import { file } => {
            let text = read_import_source(&file)?;
            manager.import_text(&text);
        }
        Command::Theme => {
            let theme = manager.toggle_theme();
            println!("theme: {}", theme.as_str());
        }
    }
    Ok(())
}

fn read_import_source(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}
