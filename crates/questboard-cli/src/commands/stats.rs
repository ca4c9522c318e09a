//! Point totals and daily progress for CLI.

use chrono::Local;
use clap::Args;
use questboard_core::occurrence;
use questboard_core::storage::{Config, QuestDb};
use serde::Serialize;

#[derive(Args)]
pub struct StatsArgs {
    /// Emit JSON instead of a human-readable summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MemberStats {
    id: String,
    display_name: String,
    points: i64,
}

#[derive(Serialize)]
struct Stats {
    members: Vec<MemberStats>,
    completions_today: usize,
    total_tasks_today: usize,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;
    let config = Config::load();

    let today = Local::now().date_naive();
    let occurrences = occurrence::resolve_due(&db, &config.profile.family_id, today)?;

    let stats = Stats {
        members: db
            .list_members(&config.profile.family_id)?
            .into_iter()
            .map(|m| MemberStats {
                id: m.id,
                display_name: m.display_name,
                points: m.points,
            })
            .collect(),
        completions_today: occurrences.iter().filter(|o| o.completed).count(),
        total_tasks_today: occurrences.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!(
        "Today: {}/{} quests done",
        stats.completions_today, stats.total_tasks_today
    );
    for member in &stats.members {
        println!("{:>6} pts  {}", member.points, member.display_name);
    }
    Ok(())
}
