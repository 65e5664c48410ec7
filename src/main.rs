//! goalpost CLI: personal goal tracker.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use goalpost::clock::Today;
use goalpost::error::{GoalpostError, StoreError};
use goalpost::log::{EntryPatch, LogEntry, LogValue};
use goalpost::paths::{GoalpostPaths, RepoPaths};
use goalpost::report::StatusPeriod;
use goalpost::schedule::Adjustment;
use goalpost::settings::Settings;
use goalpost::store::YamlRepo;
use goalpost::todo::{TaskPatch, TodoTask, UnitTodo};
use goalpost::tracker::Tracker;
use goalpost::vocab::MasterySnapshot;

#[derive(Parser)]
#[command(name = "goalpost", version, about = "Personal goal tracker")]
struct Cli {
    /// Goals repository root (contains `_data/goals.yml`).
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what needs attention today.
    CheckIn,

    /// Summarise progress and recent entries.
    Status {
        /// Goal id, alias or name. All goals when omitted.
        #[arg(long)]
        goal: Option<String>,

        /// today, week, month or all.
        #[arg(long, default_value = "week")]
        period: StatusPeriod,
    },

    /// Log progress on a goal.
    Log {
        goal: String,

        /// Subgoal path, e.g. `ch3` or `ch3/exercises`.
        #[arg(long)]
        path: Option<String>,

        /// A number, or true/false for completion. Defaults to done.
        #[arg(long, value_parser = parse_log_value)]
        value: Option<LogValue>,

        #[arg(long)]
        notes: Option<String>,

        /// Entry date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Also mark a unit task done.
        #[arg(long, requires = "todo_task")]
        todo_unit: Option<String>,

        #[arg(long, requires = "todo_unit")]
        todo_task: Option<String>,

        #[arg(long)]
        todo_notes: Option<String>,
    },

    /// Edit or delete a logged entry.
    Edit {
        goal: String,

        #[arg(long)]
        date: NaiveDate,

        /// Match only the entry with this path.
        #[arg(long)]
        path: Option<String>,

        #[arg(long, value_parser = parse_log_value)]
        value: Option<LogValue>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long, conflicts_with_all = ["value", "notes"])]
        delete: bool,
    },

    /// Show the schedule week in effect for a goal.
    Week { goal: String },

    /// Pause, pin or shift a goal's schedule week.
    Adjust {
        goal: String,

        #[command(subcommand)]
        action: AdjustAction,

        #[arg(long, global = true)]
        reason: Option<String>,
    },

    /// Manage per-unit task lists.
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Pick vocabulary to practise, weighted by mastery tier.
    Vocab {
        /// Current course unit; earlier units are included.
        #[arg(long)]
        unit: i64,

        /// Number of items. Defaults to `practice_count` from settings.
        #[arg(long)]
        count: Option<usize>,
    },

    /// Show or change user settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the settings file location and effective values.
    Show,
    /// Set one key, e.g. `config set repo_path ~/goals`.
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum AdjustAction {
    /// Pin the goal to a week.
    Override { week: u32 },
    /// Shift the goal N weeks behind schedule.
    Offset { weeks: i64 },
    /// Pause until a date (YYYY-MM-DD).
    Pause { until: NaiveDate },
    /// End a pause.
    Resume,
    /// Remove every adjustment.
    Clear,
}

#[derive(Subcommand)]
enum TodoAction {
    /// List a unit's tasks.
    Show { goal: String, unit: String },
    /// Replace a unit's tasks.
    Set {
        goal: String,
        unit: String,
        /// `id` or `id=name`; repeatable.
        #[arg(long = "task", required = true)]
        tasks: Vec<String>,
    },
    /// Mark a task done.
    Done {
        goal: String,
        unit: String,
        task: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

fn parse_log_value(s: &str) -> std::result::Result<LogValue, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "done" => Ok(LogValue::Completion(true)),
        "false" | "no" => Ok(LogValue::Completion(false)),
        other => other
            .parse::<f64>()
            .map(LogValue::Numeric)
            .map_err(|_| format!("expected a number or true/false, got \"{s}\"")),
    }
}

fn parse_task(spec: &str) -> TodoTask {
    match spec.split_once('=') {
        Some((id, name)) => TodoTask::new(id.trim(), name.trim()),
        None => TodoTask {
            id: spec.trim().to_string(),
            ..Default::default()
        },
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let paths = GoalpostPaths::resolve()?;
    let settings = Settings::load(&paths.settings_file())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    if let Commands::Config { action } = &cli.command {
        let path = paths.settings_file();
        match action {
            ConfigAction::Show => {
                println!("# {}", path.display());
                print!("{}", settings.to_toml()?);
            }
            ConfigAction::Set { key, value } => {
                let mut settings = settings;
                settings.set(key, value)?;
                settings.save(&path)?;
                println!("Saved {key} to {}", path.display());
            }
        }
        return Ok(());
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    let repo_paths = RepoPaths::locate(
        cli.repo.as_deref(),
        settings.repo_path.as_deref(),
        &cwd,
    )?;
    tracing::debug!(root = %repo_paths.root.display(), "using goals repository");
    let tracker = Tracker::open(YamlRepo::new(repo_paths))?;
    let today = Today::now();

    match cli.command {
        Commands::CheckIn => {
            print!("{}", tracker.check_in(&today));
        }

        Commands::Status { goal, period } => {
            print!("{}", tracker.status(goal.as_deref(), period, &today)?);
        }

        Commands::Log {
            goal,
            path,
            value,
            notes,
            date,
            todo_unit,
            todo_task,
            todo_notes,
        } => {
            let entry = LogEntry::from_input(date.unwrap_or(today.date()), path, value, notes);
            let summary = serde_json::to_string(&entry).into_diagnostic()?;
            let goal_id = tracker.log(&goal, entry)?;
            println!("Logged to {}: {summary}", tracker.goal(&goal_id)?.display_name());

            if let (Some(unit), Some(task)) = (todo_unit, todo_task) {
                let patch = TaskPatch::mark_done(todo_notes.clone());
                match tracker.update_task(&goal_id, &unit, &task, &patch) {
                    Ok(_) => {
                        println!("Todo updated: {task} marked done");
                        if let Some(notes) = todo_notes {
                            println!("Task notes: {notes}");
                        }
                    }
                    Err(GoalpostError::Store(StoreError::TaskNotFound { .. })) => {
                        eprintln!("Warning: task '{task}' not found in {unit}");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Commands::Edit {
            goal,
            date,
            path,
            value,
            notes,
            delete,
        } => {
            let entry = if delete {
                let removed = tracker.delete_log(&goal, date, path.as_deref())?;
                print!("Deleted: ");
                removed
            } else {
                if value.is_none() && notes.is_none() {
                    miette::bail!("nothing to change: pass --value, --notes or --delete");
                }
                let patch = EntryPatch { value, notes };
                let updated = tracker.edit_log(&goal, date, path.as_deref(), &patch)?;
                print!("Updated: ");
                updated
            };
            println!("{}", serde_json::to_string(&entry).into_diagnostic()?);
        }

        Commands::Week { goal } => {
            let name = tracker.goal(&goal)?.display_name().to_string();
            let week = tracker.effective_week(&goal, &today)?;
            println!("{name}: {week}");
        }

        Commands::Adjust {
            goal,
            action,
            reason,
        } => {
            let adjustment = match action {
                AdjustAction::Override { week } => Adjustment::Override(week),
                AdjustAction::Offset { weeks } => Adjustment::Offset(weeks),
                AdjustAction::Pause { until } => Adjustment::Pause(until),
                AdjustAction::Resume => Adjustment::Resume,
                AdjustAction::Clear => Adjustment::Clear,
            };
            let week = tracker.adjust(&goal, adjustment, reason, &today)?;
            println!("Now on {week}");
        }

        Commands::Todo { action } => match action {
            TodoAction::Show { goal, unit } => {
                let todo = tracker.unit_todo(&goal, &unit)?;
                if todo.tasks.is_empty() {
                    println!("No tasks for {unit}.");
                } else {
                    println!("{unit} ({}/{} done):", todo.completed().count(), todo.tasks.len());
                    for task in &todo.tasks {
                        let mark = if task.done { "x" } else { " " };
                        let mut line = format!("  [{mark}] {}: {}", task.id, task.label());
                        if let Some(when) = &task.scheduled_for {
                            line.push_str(&format!(" @ {when}"));
                        }
                        if let Some(notes) = &task.notes {
                            line.push_str(&format!(" ({notes})"));
                        }
                        println!("{line}");
                    }
                }
            }
            TodoAction::Set { goal, unit, tasks } => {
                let todo = UnitTodo {
                    unit: unit.clone(),
                    tasks: tasks.iter().map(|t| parse_task(t)).collect(),
                };
                tracker.set_unit_todo(&goal, &todo)?;
                println!("Saved {} tasks for {unit}", todo.tasks.len());
            }
            TodoAction::Done {
                goal,
                unit,
                task,
                notes,
            } => {
                let updated =
                    tracker.update_task(&goal, &unit, &task, &TaskPatch::mark_done(notes))?;
                println!("Marked done: {}", updated.label());
            }
        },

        Commands::Vocab { unit, count } => {
            let snapshot = MasterySnapshot::load(&settings.mastery_cache_file(&paths))?;
            let weights = settings.tier_weights()?;
            let count = count.unwrap_or(settings.practice_count);
            let set = tracker.practice_vocab(
                &snapshot,
                unit,
                count,
                &weights,
                &mut rand::thread_rng(),
            );
            if set.is_empty() {
                println!("No vocabulary available up to unit {unit}.");
            } else {
                println!("Practice set ({} items, units <= {unit}):", set.len());
                for (i, vocab) in set.iter().enumerate() {
                    let word = if vocab.transliteration.is_empty() {
                        vocab.id.as_str()
                    } else {
                        vocab.transliteration.as_str()
                    };
                    println!("  {}. {word} - {} [{}]", i + 1, vocab.meaning, vocab.tier);
                }
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
