//! `liftplan` -- a thin demonstration CLI over `liftplan_engine`. Not
//! part of the core contract (§6 "CLI / environment: the core has
//! none"): this binary only loads JSON, calls the library, and prints
//! the result.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use tabled::{Table, Tabled};

use liftplan_engine::{
    adjust_during_session, recommend_session, recommend_session_for_template, update_lift_state, Calendar,
    CompletedSession, GregorianCalendar, SessionPlan, TrainingPlan, UserProfile, WorkoutHistory,
};

#[derive(Parser)]
#[command(name = "liftplan")]
#[command(author = "liftplan-engine contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic training-prescription engine", long_about = None)]
struct Cli {
    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a session plan for a given date.
    Recommend {
        /// Path to a JSON-encoded `TrainingPlan`.
        #[arg(long)]
        plan: PathBuf,
        /// Path to a JSON-encoded `WorkoutHistory`.
        #[arg(long)]
        history: PathBuf,
        /// Path to a JSON-encoded `UserProfile`.
        #[arg(long)]
        user: PathBuf,
        /// Date to plan for (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        /// Readiness score in [0, 100].
        #[arg(long)]
        readiness: i32,
        /// Explicit template id (bypasses schedule selection).
        #[arg(long)]
        template: Option<String>,
    },

    /// Apply a completed session's results to lift state.
    LogSession {
        /// Path to a JSON-encoded `WorkoutHistory` (used only for prior lift states).
        #[arg(long)]
        history: PathBuf,
        /// Path to a JSON-encoded `CompletedSession`.
        #[arg(long)]
        session: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 if cli.quiet => liftplan_engine::LogLevel::Error,
        0 => liftplan_engine::LogLevel::Info,
        1 => liftplan_engine::LogLevel::Debug,
        _ => liftplan_engine::LogLevel::Trace,
    };
    let log_config = liftplan_engine::LogConfig { level: log_level, ..liftplan_engine::LogConfig::default() };
    let _ = liftplan_engine::init_logging(&log_config);

    match cli.command {
        Commands::Recommend { plan, history, user, date, readiness, template } => {
            recommend_command(plan, history, user, date, readiness, template)
        }
        Commands::LogSession { history, session } => log_session_command(history, session),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf, label: &str) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {label} file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {label} JSON: {}", path.display()))
}

fn recommend_command(
    plan_path: PathBuf,
    history_path: PathBuf,
    user_path: PathBuf,
    date: NaiveDate,
    readiness: i32,
    template: Option<String>,
) -> Result<()> {
    let plan: TrainingPlan = load_json(&plan_path, "plan")?;
    let history: WorkoutHistory = load_json(&history_path, "history")?;
    let user: UserProfile = load_json(&user_path, "user profile")?;
    let calendar = GregorianCalendar;

    let session_plan = match template {
        Some(template_id) => recommend_session_for_template(
            date,
            &template_id,
            &user,
            &plan,
            &history,
            readiness,
            &Default::default(),
            &calendar,
        ),
        None => recommend_session(date, &user, &plan, &history, readiness, &calendar),
    };

    print_session_plan(&session_plan);
    Ok(())
}

fn log_session_command(history_path: PathBuf, session_path: PathBuf) -> Result<()> {
    let history: WorkoutHistory = load_json(&history_path, "history")?;
    let session: CompletedSession = load_json(&session_path, "session")?;
    let calendar = GregorianCalendar;

    let updated = update_lift_state(&session, &history.lift_states, &calendar);

    let rows: Vec<LiftStateRow> = updated
        .values()
        .map(|s| LiftStateRow {
            exercise: s.exercise_id.clone(),
            working_weight: format!("{} {:?}", s.last_working_weight.value, s.last_working_weight.unit),
            rolling_e1rm: s.rolling_e1rm.round_dp(1).to_string(),
            trend: format!("{:?}", s.trend),
            failures: s.failure_count,
            successes: s.successful_sessions_count,
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

#[derive(Tabled)]
struct LiftStateRow {
    #[tabled(rename = "exercise")]
    exercise: String,
    #[tabled(rename = "working weight")]
    working_weight: String,
    #[tabled(rename = "rolling e1RM")]
    rolling_e1rm: String,
    #[tabled(rename = "trend")]
    trend: String,
    #[tabled(rename = "failures")]
    failures: u32,
    #[tabled(rename = "successes")]
    successes: u32,
}

#[derive(Tabled)]
struct SetRow {
    #[tabled(rename = "exercise")]
    exercise: String,
    #[tabled(rename = "set")]
    set_index: u32,
    #[tabled(rename = "load")]
    load: String,
    #[tabled(rename = "reps")]
    reps: String,
    #[tabled(rename = "RIR")]
    rir: u32,
    #[tabled(rename = "rest (s)")]
    rest: u32,
}

fn print_session_plan(plan: &SessionPlan) {
    let header = format!("session {} (template: {})", plan.date, plan.template_id.as_deref().unwrap_or("none"));
    if plan.is_deload {
        println!("{}", header.yellow().bold());
        if let Some(reason) = &plan.deload_reason {
            println!("{}", format!("deload: {reason}").yellow());
        }
    } else {
        println!("{}", header.bold());
    }

    let mut rows = Vec::new();
    for exercise_plan in &plan.exercises {
        let direction_label = exercise_plan
            .direction
            .map(|d| format!("{d:?}"))
            .unwrap_or_else(|| "-".to_string());
        for set in &exercise_plan.sets {
            rows.push(SetRow {
                exercise: format!("{} [{}]", exercise_plan.exercise.name, direction_label),
                set_index: set.set_index,
                load: format!("{} {:?}", set.target_load.value, set.target_load.unit),
                reps: set.target_reps.to_string(),
                rir: set.target_rir,
                rest: set.rest_seconds,
            });
        }
    }

    if rows.is_empty() {
        println!("{}", "no exercises prescribed".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }

    for insight in &plan.insights {
        println!("{} {}", "insight:".cyan(), insight.message);
    }
}

#[allow(dead_code)]
fn demo_adjust(current: &liftplan_engine::SetResult, next: &liftplan_engine::SetPlan) -> liftplan_engine::SetPlan {
    adjust_during_session(current, next)
}
