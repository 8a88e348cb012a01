//! Command-line front end over one owner's notification store.
//!
//! Opens a local database, runs reminder sweeps, and lists or mutates
//! notifications. Intended for local inspection and scripting.

use bizdesk_core::{
    default_log_level, init_logging, Clock, Meeting, MeetingRepository, MeetingStatus,
    Notification, Project, ProjectRepository, ProjectStatus, ReminderConfig, Session,
    SystemClock,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "bizdesk", version, about = "Inspect and maintain bizdesk notifications")]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long, env = "BIZDESK_DB_PATH")]
    db: PathBuf,
    /// Owner whose records are read and written.
    #[arg(long, env = "BIZDESK_OWNER")]
    owner: String,
    /// JSON reminder configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create any missing deadline/meeting reminders.
    Sweep {
        /// Evaluate at this epoch-millisecond instant instead of now.
        #[arg(long)]
        now_ms: Option<i64>,
    },
    /// Print notifications, newest first.
    List {
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification read.
    Read { id: Uuid },
    /// Mark every notification read.
    ReadAll,
    /// Delete one notification.
    Dismiss { id: Uuid },
    /// Insert or update a mirrored project.
    PutProject {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_project_status, default_value = "in-progress")]
        status: ProjectStatus,
        /// Deadline in epoch milliseconds.
        #[arg(long)]
        end_ms: Option<i64>,
        #[arg(long)]
        client: Option<String>,
    },
    /// Insert or update a mirrored meeting.
    PutMeeting {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_meeting_status, default_value = "scheduled")]
        status: MeetingStatus,
        /// Start time in epoch milliseconds.
        #[arg(long)]
        at_ms: i64,
        #[arg(long)]
        location: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Sweep { .. } => "sweep",
            Self::List { .. } => "list",
            Self::Read { .. } => "read",
            Self::ReadAll => "read-all",
            Self::Dismiss { .. } => "dismiss",
            Self::PutProject { .. } => "put-project",
            Self::PutMeeting { .. } => "put-meeting",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = match cli.config.as_ref() {
        Some(path) => ReminderConfig::from_file(path)?,
        None => ReminderConfig::default(),
    };
    let session = Session::open(&cli.db, cli.owner.as_str(), config)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Command::Sweep { now_ms } => {
            let now_ms = now_ms.unwrap_or_else(|| SystemClock.now_ms());
            let report = session.refresh_reminders(now_ms)?;
            println!(
                "planned={} created={} duplicates={} failed={}",
                report.planned,
                report.created.len(),
                report.skipped_duplicates,
                report.failed
            );
            for notification in &report.created {
                print_notification(notification);
            }
        }
        Command::List { unread } => {
            let notifications = session.notifications()?.try_list()?;
            for notification in notifications.iter().filter(|n| !unread || !n.read) {
                print_notification(notification);
            }
        }
        Command::Read { id } => session.notifications()?.mark_as_read(id),
        Command::ReadAll => {
            let changed = session.notifications()?.mark_all_as_read();
            println!("marked {changed} notification(s) read");
        }
        Command::Dismiss { id } => session.notifications()?.dismiss(id),
        Command::PutProject {
            id,
            title,
            status,
            end_ms,
            client,
        } => {
            let mut project = Project::new(id, session.owner_id(), title, status);
            project.end_date = end_ms;
            project.client_name = client;
            session.project_repo()?.upsert_project(&project)?;
        }
        Command::PutMeeting {
            id,
            title,
            status,
            at_ms,
            location,
        } => {
            let mut meeting = Meeting::new(id, session.owner_id(), title, status, at_ms);
            meeting.location = location;
            session.meeting_repo()?.upsert_meeting(&meeting)?;
        }
    }

    session.close()?;
    Ok(())
}

fn print_notification(notification: &Notification) {
    println!(
        "{} [{}] {:<8} {:<6} {} - {}",
        notification.id,
        if notification.read { "x" } else { " " },
        notification.kind.as_str(),
        notification.priority.as_str(),
        notification.title,
        notification.message
    );
}

fn parse_project_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value).ok_or_else(|| {
        format!("unknown project status `{value}`; expected planning|in-progress|on-hold|completed|cancelled")
    })
}

fn parse_meeting_status(value: &str) -> Result<MeetingStatus, String> {
    MeetingStatus::parse(value)
        .ok_or_else(|| format!("unknown meeting status `{value}`; expected scheduled|completed|cancelled"))
}
