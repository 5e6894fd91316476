use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod log;
mod model;
mod search;
mod session;

use session::LogSession;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "pipelog")]
#[command(about = "Pipeline log analyzer: tasks, nodes and statistics from JSONL logs", long_about = None)]
struct Cli {
    /// Show debug diagnostics on stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reconstructed tasks, one line each.
    Tasks {
        #[arg(long)]
        log: String,
    },

    /// List the pipeline nodes of one task.
    Nodes {
        #[arg(long)]
        log: String,

        #[arg(long)]
        task: i64,
    },

    /// Print aggregate statistics as JSON.
    Stats {
        #[arg(long)]
        log: String,
    },

    /// Write the full reconstructed model (statistics, tasks, nodes) as JSON.
    Report {
        #[arg(long)]
        log: String,

        #[arg(short = 'o', long)]
        out: String,
    },

    /// Plain-text search for logs that are not structured.
    Search {
        #[arg(long)]
        log: String,

        #[arg(short, long)]
        pattern: String,

        #[arg(short = 'i', long)]
        ignore_case: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Tasks { log } => {
            let session = load_session(&log)?;
            for task in session.tasks() {
                println!(
                    "{:>6}  {:<9}  {:<24}  {:<24}  {:>10}  {:>6}  {}",
                    task.task_id,
                    task.status.as_str(),
                    task.start_time,
                    task.end_time,
                    fmt_duration(task.duration_ms),
                    task.entries.len(),
                    task.entry
                );
            }
        }
        Commands::Nodes { log, task } => {
            let session = load_session(&log)?;
            let Some(found) = session.tasks().into_iter().find(|t| t.task_id == task) else {
                bail!("task {} not found in {}", task, log);
            };
            for node in session.task_nodes(&found) {
                let next: Vec<String> = node
                    .next_list
                    .iter()
                    .map(|n| format!("{}{}", n.name, flag_marks(n.anchor, n.jump_back)))
                    .collect();
                println!(
                    "{:>6}  {:<8}  {:>10}  ops={:<3}  {}{}  next=[{}]",
                    node.node_id.map(|id| id.to_string()).unwrap_or_default(),
                    node.status.as_str(),
                    fmt_duration(node.duration_ms),
                    node.operations.len(),
                    node.name,
                    flag_marks(node.anchor, node.jump_back),
                    next.join(", ")
                );
            }
        }
        Commands::Stats { log } => {
            let session = load_session(&log)?;
            println!("{}", serde_json::to_string_pretty(&session.statistics())?);
        }
        Commands::Report { log, out } => {
            let session = load_session(&log)?;
            let json = serde_json::to_string_pretty(&session.report())?;
            std::fs::write(&out, json).with_context(|| format!("write report {}", out))?;
            info!(path = %out, "report written");
            println!("Wrote {}", out);
        }
        Commands::Search {
            log,
            pattern,
            ignore_case,
        } => {
            let bytes = log::read_log_file(&log)?;
            let text = String::from_utf8_lossy(&bytes);
            for hit in search::search_text(&text, &pattern, ignore_case)? {
                println!("{}:{}", hit.line, hit.text);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_session(path: &str) -> Result<LogSession> {
    let bytes = log::read_log_file(path)?;
    let mut session = LogSession::new();
    session
        .parse_file(&bytes)
        .with_context(|| format!("parse log file {}", path))?;
    info!(path, entries = session.entries().len(), "log loaded");
    Ok(session)
}

fn fmt_duration(ms: Option<i64>) -> String {
    ms.map(|ms| format!("{}ms", ms)).unwrap_or_else(|| "-".to_string())
}

/// `*` marks an anchor, `^` a jump-back target.
fn flag_marks(anchor: bool, jump_back: bool) -> &'static str {
    match (anchor, jump_back) {
        (true, true) => "*^",
        (true, false) => "*",
        (false, true) => "^",
        (false, false) => "",
    }
}
