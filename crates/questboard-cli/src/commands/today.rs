//! Due-occurrence listing for CLI.

use chrono::Local;
use clap::Args;
use questboard_core::occurrence::{self, OccurrenceKey};
use questboard_core::storage::{Config, QuestDb};

use super::quest::parse_date;

#[derive(Args)]
pub struct TodayArgs {
    /// Resolve for this date instead of today, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// Emit JSON instead of a human-readable list
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TodayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;
    let config = Config::load();

    let date = match args.date {
        Some(raw) => parse_date(&raw)?,
        None => Local::now().date_naive(),
    };
    let now = Local::now().naive_local();

    let occurrences = occurrence::resolve_due(&db, &config.profile.family_id, date)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&occurrences)?);
        return Ok(());
    }

    if occurrences.is_empty() {
        println!("Nothing due on {date}.");
        return Ok(());
    }

    println!("Due on {date}:");
    for occ in &occurrences {
        let marker = if occ.completed { "x" } else { " " };
        let mut line = format!("[{marker}] {} ({} pts)", occ.title, occ.points);
        if let Some(state) = occ.deadline(date, now) {
            line.push_str(&format!(" -- {}", state.describe()));
        }
        if let OccurrenceKey::Recurring { .. } = occ.key {
            line.push_str("  [recurring]");
        }
        line.push_str(&format!("  id={}", occ.key.quest_id()));
        println!("{line}");
    }
    Ok(())
}
