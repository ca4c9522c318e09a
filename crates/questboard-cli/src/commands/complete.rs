//! Completion flow for CLI: record the occurrence, credit points, and say
//! something nice about it.

use chrono::{Local, Utc};
use clap::Args;
use questboard_core::completion::{self, CompletionOutcome};
use questboard_core::encourage::{self, MessageCategory, RecentMessages};
use questboard_core::events::Event;
use questboard_core::integrations::{CheerClient, CheerRequest};
use questboard_core::occurrence::OccurrenceKey;
use questboard_core::quest::{FamilyMember, TimeOfDay};
use questboard_core::storage::{Config, QuestDb};

use super::quest::parse_date;

#[derive(Args)]
pub struct CompleteArgs {
    /// Quest ID
    pub quest_id: String,
    /// Occurrence date for recurring quests, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Emit completion events as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct UncompleteArgs {
    /// Quest ID
    pub quest_id: String,
    /// Occurrence date for recurring quests, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

/// kv key holding this member's recent fallback messages.
fn history_key(member_id: &str) -> String {
    format!("recent_messages:{member_id}")
}

fn time_of_day_label(bucket: TimeOfDay) -> &'static str {
    match bucket {
        TimeOfDay::Morning => "morning",
        TimeOfDay::Afternoon => "afternoon",
        TimeOfDay::Evening => "evening",
        TimeOfDay::AnyTime => "any_time",
    }
}

/// Fetch a cheer sentence, or pick a local fallback.
///
/// Collaborator failures of any kind fall through to the selector; the kv
/// store carries the recent-message buffer between invocations so
/// back-to-back completions don't repeat themselves.
fn cheer_message(
    db: &QuestDb,
    config: &Config,
    outcome: &CompletionOutcome,
) -> Result<String, Box<dyn std::error::Error>> {
    if config.cheer.enabled && !config.cheer.endpoint.is_empty() {
        let client = CheerClient::new(&config.cheer.endpoint, config.cheer.timeout_ms);
        let request = CheerRequest {
            task_title: outcome.quest.title.clone(),
            points_earned: outcome.credited_points,
            total_points: outcome.total_points,
            completions_today: outcome.completions_today,
            total_tasks_today: outcome.total_tasks_today,
            time_of_day: time_of_day_label(outcome.quest.time_of_day).to_string(),
            milestone: outcome.milestone.as_ref().map(|m| m.label()),
            completed_late: outcome.was_overdue,
        };
        let runtime = tokio::runtime::Runtime::new()?;
        if let Some(message) = runtime.block_on(client.generate(&request)) {
            return Ok(message);
        }
    }

    let mut history: RecentMessages = db
        .kv_get(&history_key(&config.profile.member_id))?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();

    let category =
        MessageCategory::for_completion(outcome.milestone.as_ref(), outcome.credited_points);
    let message = encourage::pick(category, &mut history, &mut rand::thread_rng());

    db.kv_set(
        &history_key(&config.profile.member_id),
        &serde_json::to_string(&history)?,
    )?;
    Ok(message.to_string())
}

fn occurrence_key(
    db: &QuestDb,
    quest_id: &str,
    date_arg: Option<String>,
) -> Result<OccurrenceKey, Box<dyn std::error::Error>> {
    let quest = db
        .get_quest(quest_id)?
        .ok_or(format!("Quest not found: {quest_id}"))?;
    let date = match date_arg {
        Some(raw) => parse_date(&raw)?,
        None => Local::now().date_naive(),
    };
    Ok(OccurrenceKey::for_quest(&quest, date))
}

pub fn run(args: CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = QuestDb::open()?;
    let config = Config::load();

    // Make sure the acting member exists so point credit has a row to land
    // on. Upsert never clobbers an existing total.
    if db.get_member(&config.profile.member_id)?.is_none() {
        db.upsert_member(&FamilyMember {
            id: config.profile.member_id.clone(),
            family_id: config.profile.family_id.clone(),
            display_name: config.profile.display_name.clone(),
            nickname: None,
            points: 0,
        })?;
    }

    let key = occurrence_key(&db, &args.quest_id, args.date)?;
    let now = Local::now().naive_local();
    let outcome = completion::complete(&mut db, &key, &config.profile.member_id, now)?;
    let message = cheer_message(&db, &config, &outcome)?;

    if args.json {
        let mut events = vec![Event::QuestCompleted {
            quest_id: outcome.quest.id.clone(),
            date: match &outcome.key {
                OccurrenceKey::Recurring { date, .. } => Some(*date),
                OccurrenceKey::OneTime { .. } => None,
            },
            completed_by: config.profile.member_id.clone(),
            points: outcome.credited_points,
            overdue: outcome.was_overdue,
            at: Utc::now(),
        }];
        if let Some(milestone) = &outcome.milestone {
            events.push(Event::MilestoneReached {
                tier: milestone.label(),
                total_points: outcome.total_points,
                at: Utc::now(),
            });
        }
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let late = if outcome.was_overdue { ", completed late" } else { "" };
    println!(
        "Completed: {} (+{} pts{late})",
        outcome.quest.title, outcome.credited_points
    );
    println!(
        "Today: {}/{} done. Total points: {}",
        outcome.completions_today, outcome.total_tasks_today, outcome.total_points
    );
    if let Some(milestone) = &outcome.milestone {
        println!("Milestone: {}", milestone.label());
    }
    println!("{message}");
    Ok(())
}

pub fn run_uncomplete(args: UncompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;

    let key = occurrence_key(&db, &args.quest_id, args.date)?;
    completion::uncomplete(&db, &key)?;

    match &key {
        OccurrenceKey::OneTime { quest_id } => println!("Uncompleted: {quest_id}"),
        OccurrenceKey::Recurring { quest_id, date } => {
            println!("Uncompleted: {quest_id} on {date}")
        }
    }
    Ok(())
}
