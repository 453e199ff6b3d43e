use std::fmt;

use onboarding_core::model::{ChatMessage, Sender, Stage, Task, TaskId};
use onboarding_core::progress::StageProgress;
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidStage { raw: String },
    InvalidTaskId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidStage { raw } => {
                write!(f, "invalid stage: {raw} (expected day, week or month)")
            }
            ArgsError::InvalidTaskId { raw } => write!(f, "invalid task id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Progress,
    Checklist(Stage),
    Toggle(Stage, TaskId),
    Ask(String),
    History(Option<String>),
    Dashboard { json: bool },
    Reset(Option<Stage>),
}

fn parse_stage(raw: &str) -> Result<Stage, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidStage {
        raw: raw.to_string(),
    })
}

impl Command {
    fn parse(name: &str, rest: Vec<String>) -> Result<Self, ArgsError> {
        let mut rest = rest.into_iter();
        let command = match name {
            "progress" => Self::Progress,
            "checklist" => {
                let stage = rest.next().ok_or(ArgsError::MissingArgument {
                    command: "checklist",
                    name: "stage",
                })?;
                Self::Checklist(parse_stage(&stage)?)
            }
            "toggle" => {
                let stage = rest.next().ok_or(ArgsError::MissingArgument {
                    command: "toggle",
                    name: "stage",
                })?;
                let id = rest.next().ok_or(ArgsError::MissingArgument {
                    command: "toggle",
                    name: "task-id",
                })?;
                let task_id = id
                    .parse::<TaskId>()
                    .map_err(|_| ArgsError::InvalidTaskId { raw: id.clone() })?;
                Self::Toggle(parse_stage(&stage)?, task_id)
            }
            "ask" => {
                let text = rest.by_ref().collect::<Vec<_>>().join(" ");
                if text.trim().is_empty() {
                    return Err(ArgsError::MissingArgument {
                        command: "ask",
                        name: "text",
                    });
                }
                Self::Ask(text)
            }
            "history" => Self::History(rest.next()),
            "dashboard" => match rest.next().as_deref() {
                None => Self::Dashboard { json: false },
                Some("--json") => Self::Dashboard { json: true },
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            },
            "reset" => Self::Reset(rest.next().as_deref().map(parse_stage).transpose()?),
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = rest.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(command)
    }
}

struct Args {
    db_url: String,
    command: Option<Command>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ONBOARDING_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://onboarding.sqlite3".into(), normalize_sqlite_url);
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        db_url,
                        command: None,
                    });
                }
                _ => positional.push(arg),
            }
        }

        let command = if positional.is_empty() {
            Command::Progress
        } else {
            let name = positional.remove(0);
            Command::parse(&name, positional)?
        };

        Ok(Self {
            db_url,
            command: Some(command),
        })
    }
}

fn print_usage() {
    eprintln!(
        "Usage: app [--db <sqlite_url>] <command>\n\n\
         Commands:\n  \
         progress                  show checklist progress (default)\n  \
         checklist <stage>         list the tasks of a stage (day, week, month)\n  \
         toggle <stage> <task-id>  mark a task done or not done\n  \
         ask <text...>             ask the onboarding assistant\n  \
         history [session-id]      list chat sessions, or show one\n  \
         dashboard [--json]        chat statistics\n  \
         reset [stage]             forget checklist progress\n\n\
         Environment:\n  \
         ONBOARDING_DB_URL, ONBOARDING_CHAT_WEBHOOK_URL, ONBOARDING_PROGRESS_WEBHOOK_URL,\n  \
         ONBOARDING_USER, ONBOARDING_USER_ID, ONBOARDING_USER_EMAIL, ONBOARDING_PAGE_URL"
    );
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn progress_line(label: &str, progress: StageProgress) -> String {
    format!(
        "{label:<12} {:>3}%  ({}/{})",
        progress.percentage, progress.completed, progress.total
    )
}

fn print_tasks(stage: Stage, tasks: &[Task]) {
    println!("{stage}");
    for task in tasks {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("  [{mark}] {:>2}. {}", task.id, task.description);
    }
}

fn print_message(message: &ChatMessage) {
    let who = match message.sender {
        Sender::User => "you",
        Sender::System => "assistant",
    };
    println!(
        "[{}] {who}: {}",
        message.timestamp.format("%H:%M"),
        message.text
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(command) = parsed.command else {
        print_usage();
        return Ok(());
    };

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::debug!(
        db = %parsed.db_url,
        webhooks = services.notifier().is_configured(),
        "services ready"
    );

    match command {
        Command::Progress => {
            let overall = services.checklist().overall_progress().await;
            for stage in Stage::ALL {
                println!("{}", progress_line(stage.label(), overall.stage(stage)));
            }
            println!(
                "{}",
                progress_line(
                    "Overall",
                    StageProgress {
                        total: overall.total,
                        completed: overall.completed,
                        percentage: overall.percentage,
                    }
                )
            );
        }
        Command::Checklist(stage) => {
            let checklist = services.checklist();
            let tasks = checklist.load_stage(stage).await;
            print_tasks(stage, &tasks);
            println!(
                "{}",
                progress_line("Progress", checklist.stage_progress(stage).await)
            );
        }
        Command::Toggle(stage, id) => {
            let checklist = services.checklist();
            let tasks = checklist.toggle_task(stage, id).await?;
            print_tasks(stage, &tasks);
            println!(
                "{}",
                progress_line("Progress", checklist.stage_progress(stage).await)
            );
        }
        Command::Ask(text) => {
            let reply = services.chat().ask(&text).await?;
            print_message(&reply.question);
            print_message(&reply.answer);
            if let Some(category) = &reply.category {
                println!("({category})");
            }
        }
        Command::History(None) => {
            let sessions = services.chat().sessions().await;
            if sessions.is_empty() {
                println!("No chat history.");
            }
            for session in sessions {
                println!(
                    "{}  {} messages, last at {}",
                    session.id,
                    session.messages.len(),
                    session.last_message_at.format("%H:%M")
                );
            }
        }
        Command::History(Some(id)) => {
            let messages = services.chat().session_messages(&id).await;
            if messages.is_empty() {
                println!("No messages for {id}.");
            }
            for message in &messages {
                print_message(message);
            }
        }
        Command::Dashboard { json } => {
            let data = services.dashboard().dashboard().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("Questions:      {}", data.total_questions);
                println!("Users:          {}", data.total_users);
                println!("Top category:   {}", data.top_category);
                println!("Response time:  {}", data.response_time.formatted);
                println!("By category:");
                for stat in &data.by_category {
                    println!("  {:<24} {:>4} ({}%)", stat.category, stat.count, stat.percentage);
                }
                println!("Common questions:");
                for question in &data.common_questions {
                    println!("  {:>3}x {} [{}]", question.count, question.text, question.category);
                }
                println!("Daily volume:");
                for day in &data.daily_volume {
                    println!("  {}  {}", day.label(), day.count);
                }
            }
        }
        Command::Reset(stage) => {
            services.checklist().reset(stage).await?;
            match stage {
                Some(stage) => println!("Reset {stage}."),
                None => println!("Reset all stages."),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
