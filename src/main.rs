//! Recursive Todo CLI

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use recursive_todo_lib::commands::{self, IntentOutcome, TodoIntent};
use recursive_todo_lib::config::AppConfig;
use recursive_todo_lib::domain::{flatten_tree, TodoRecord};
use recursive_todo_lib::repository::CascadeReport;
use recursive_todo_lib::AppState;

/// Hierarchical todo list
#[derive(Parser)]
#[command(name = "recursive-todo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (default: read from environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User whose todos are read and changed
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show todos as an indented tree
    List,
    /// Add a todo
    Add {
        title: String,
        /// Parent todo ID
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Complete a todo and everything below it
    Complete { id: String },
    /// Mark a single todo as not completed
    Reopen { id: String },
    /// Delete a todo and everything below it
    Delete { id: String },
    /// Apply a url-encoded form submission, e.g. `_intent=toggle&id=..&completed=1`
    Submit { body: String },
    /// Write the effective configuration to a file
    InitConfig { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let _ = rolling_logger::error(&e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };

    if let Err(e) = rolling_logger::init_logger(&config.log_dir, &config.app_name) {
        eprintln!("Failed to initialize logger: {}", e);
    } else {
        let _ = rolling_logger::info(&format!("{} starting", config.app_name));
    }

    if let Commands::InitConfig { path } = &cli.command {
        config.save(path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let state = AppState::from_config(&config).await?;
    execute_and_close(&state, &cli.owner, cli.command).await
}

/// Run one command, then release the backend whatever the outcome
async fn execute_and_close(state: &AppState, owner: &str, command: Commands) -> Result<(), String> {
    let result = execute(state, owner, command).await;
    state.shutdown().await;
    result
}

async fn execute(state: &AppState, owner: &str, command: Commands) -> Result<(), String> {
    match command {
        Commands::List => commands::list_todo_tree(state, owner).await.map(|tree| {
            if tree.is_empty() {
                println!("No todos yet.");
            }
            for (todo, depth) in flatten_tree(&tree) {
                print_todo(todo, depth);
            }
        }),
        Commands::Add { title, parent } => commands::create_todo(state, owner, &title, parent.as_deref())
            .await
            .map(|todo| print_todo(&todo, 0)),
        Commands::Complete { id } => commands::toggle_todo(state, owner, &id, true)
            .await
            .and_then(print_report),
        Commands::Reopen { id } => commands::toggle_todo(state, owner, &id, false)
            .await
            .and_then(print_report),
        Commands::Delete { id } => commands::delete_todo(state, owner, &id)
            .await
            .and_then(print_report),
        Commands::Submit { body } => {
            let intent = TodoIntent::from_urlencoded(&body);
            commands::dispatch_intent(state, owner, intent)
                .await
                .and_then(|outcome| match outcome {
                    IntentOutcome::Created(todo) => {
                        print_todo(&todo, 0);
                        Ok(())
                    }
                    IntentOutcome::Cascaded(report) => print_report(report),
                    IntentOutcome::Skipped => {
                        println!("Nothing to do.");
                        Ok(())
                    }
                })
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn print_todo(todo: &TodoRecord, depth: usize) {
    let mark = if todo.completed { "x" } else { " " };
    println!("{}[{}] {}  ({})", "  ".repeat(depth), mark, todo.title, todo.id);
}

/// Print the cascade summary; any failed row makes the command fail
fn print_report(report: CascadeReport) -> Result<(), String> {
    println!("{}/{} updated", report.succeeded, report.attempted);
    for failure in &report.failed {
        println!("  failed {}: {}", failure.id, failure.error);
    }

    if report.is_complete() {
        Ok(())
    } else {
        let _ = rolling_logger::warn(&format!("{} row(s) failed", report.failed.len()));
        Err(format!("{} of {} todo(s) failed", report.failed.len(), report.attempted))
    }
}
