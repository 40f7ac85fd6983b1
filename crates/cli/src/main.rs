//! Taskdash CLI - record task progress and print progress analytics.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use taskdash_core::{ProgressEntry, TaskId, Time};
use taskdash_progress::{BasicProgressTracker, DerivedPoint, ProgressReport, ProgressTracker};
use taskdash_storage::{JsonProgressStore, ProgressStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskdash")]
#[command(about = "Task progress tracking and analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage path for Taskdash data
    #[arg(short, long, default_value = ".taskdash")]
    storage: std::path::PathBuf,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a progress entry
    Record {
        /// Task ID (a new task is created when omitted)
        #[arg(long)]
        task: Option<String>,
        /// Percentage complete (0-100)
        #[arg(long)]
        progress: f64,
        /// When the progress was made (RFC 3339 or YYYY-MM-DD, default now)
        #[arg(long)]
        at: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Blockers
        #[arg(long)]
        blockers: Option<String>,
        /// Achievements
        #[arg(long)]
        achievements: Option<String>,
    },
    /// Show a task's progress history
    History {
        /// Task ID
        id: String,
    },
    /// List tasks with recorded progress
    Tasks,
    /// Show progress analytics for a task
    Report {
        /// Task ID
        id: String,
        /// Due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Evaluate as of this time instead of now
        #[arg(long)]
        as_of: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut storage = JsonProgressStore::new(&cli.storage)
        .await
        .with_context(|| format!("Failed to open storage at {}", cli.storage.display()))?;

    match cli.command {
        Commands::Record { task, progress, at, notes, blockers, achievements } => {
            let task_id = match task {
                Some(id) => parse_task_id(&id)?,
                None => TaskId::new(),
            };
            let date = match at {
                Some(s) => parse_time(&s).with_context(|| format!("Invalid time: {}", s))?,
                None => Utc::now(),
            };

            let mut entry = ProgressEntry::new(date, progress);
            entry.notes = notes;
            entry.blockers = blockers;
            entry.achievements = achievements;

            storage.append_entry(task_id, &entry).await?;
            info!(%task_id, progress, "Recorded progress");
            println!("Recorded {}% for task {}", progress, task_id);
        }
        Commands::History { id } => {
            let task_id = parse_task_id(&id)?;
            let tracker = BasicProgressTracker::new(storage);
            let mut history = tracker.history(task_id).await?;
            history.sort_by_key(|e| e.date);

            println!("History for {} ({} entries)", task_id, history.len());
            for entry in history {
                println!("  {} | {:>5.1}%", format_time(entry.date), entry.progress_percentage);
                if let Some(notes) = &entry.notes {
                    println!("      notes: {}", notes);
                }
                if let Some(blockers) = &entry.blockers {
                    println!("      blockers: {}", blockers);
                }
                if let Some(achievements) = &entry.achievements {
                    println!("      achievements: {}", achievements);
                }
            }
        }
        Commands::Tasks => {
            let tasks = storage.list_tasks().await?;
            println!("Tasks ({})", tasks.len());
            for task_id in tasks {
                let created = task_id
                    .created_at()
                    .map_or_else(|| "unknown".to_string(), format_time);
                println!("  {} | created {}", task_id, created);
            }
        }
        Commands::Report { id, due, as_of, json } => {
            let task_id = parse_task_id(&id)?;
            let now = match as_of {
                Some(s) => parse_time(&s).with_context(|| format!("Invalid time: {}", s))?,
                None => Utc::now(),
            };
            let due_date = due.as_deref().and_then(|s| {
                let parsed = parse_time(s);
                if parsed.is_none() {
                    warn!(due = s, "Ignoring unparsable due date");
                }
                parsed
            });

            let tracker = BasicProgressTracker::new(storage);
            let report = tracker.report_at(task_id, due_date, now).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
    }

    Ok(())
}

fn parse_task_id(s: &str) -> Result<TaskId> {
    Ok(s.parse()?)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_time(s: &str) -> Option<Time> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn format_time(t: Time) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn render_report(report: &ProgressReport) -> String {
    let mut out = format!("Task {}\n", report.task_id);

    let Some(analytics) = &report.analytics else {
        out.push_str("  No progress recorded yet\n");
        return out;
    };
    let stats = &analytics.stats;

    out.push_str(&format!("  Entries:    {}\n", stats.total_entries));
    out.push_str(&format!("  Average:    {}%\n", stats.average_progress));
    out.push_str(&format!(
        "  Velocity:   {:+.1}%/day ({})\n",
        stats.progress_velocity,
        stats.trend().as_str()
    ));
    out.push_str(&format!(
        "  Estimated:  {}\n",
        stats.estimated_completion.map_or_else(|| "n/a".to_string(), format_time)
    ));
    if let Some(due) = report.due_date {
        out.push_str(&format!("  Due:        {}\n", format_time(due)));
    }
    out.push_str(&format!("  Schedule:   {}\n", report.schedule_status().as_str()));

    out.push_str("  Series:\n");
    for point in &analytics.series {
        match point {
            DerivedPoint::Recorded(p) => out.push_str(&format!(
                "    {} | {:>5.1}% ({:+.1})\n",
                format_time(p.date),
                p.progress,
                p.progress_change
            )),
            DerivedPoint::Target(t) => out.push_str(&format!(
                "    {} | target {}%\n",
                format_time(t.date),
                t.target
            )),
        }
    }
    out
}
