//! Quest management commands for CLI.

use chrono::{Local, NaiveDate, NaiveTime};
use clap::Subcommand;
use questboard_core::quest::{Quest, Recurrence, TimeOfDay};
use questboard_core::storage::{Config, QuestDb};

#[derive(Subcommand)]
pub enum QuestAction {
    /// Create a new quest
    Create {
        /// Quest title
        title: String,
        /// Quest description
        #[arg(long)]
        description: Option<String>,
        /// Point value (default: 10)
        #[arg(long, default_value = "10")]
        points: i64,
        /// Recurrence: none, daily, or weekly (default: none)
        #[arg(long, default_value = "none")]
        recurrence: String,
        /// Anchor date, YYYY-MM-DD (default: today)
        #[arg(long)]
        anchor: Option<String>,
        /// Due time within the day, HH:MM
        #[arg(long)]
        due: Option<String>,
        /// Time-of-day bucket: morning, afternoon, evening, or any_time
        #[arg(long, default_value = "any_time")]
        time_of_day: String,
        /// Assignee member id
        #[arg(long)]
        assignee: Option<String>,
    },
    /// List quests
    List,
    /// Get quest details
    Get {
        /// Quest ID
        id: String,
    },
    /// Update a quest
    Update {
        /// Quest ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New point value
        #[arg(long)]
        points: Option<i64>,
        /// New recurrence
        #[arg(long)]
        recurrence: Option<String>,
        /// New anchor date, YYYY-MM-DD
        #[arg(long)]
        anchor: Option<String>,
        /// New due time, HH:MM (empty string clears it)
        #[arg(long)]
        due: Option<String>,
        /// New time-of-day bucket
        #[arg(long)]
        time_of_day: Option<String>,
        /// New assignee member id
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Delete a quest
    Delete {
        /// Quest ID
        id: String,
    },
}

pub(crate) fn parse_recurrence(raw: &str) -> Recurrence {
    match raw {
        "daily" => Recurrence::Daily,
        "weekly" => Recurrence::Weekly,
        _ => Recurrence::None,
    }
}

pub(crate) fn parse_time_of_day(raw: &str) -> TimeOfDay {
    match raw {
        "morning" => TimeOfDay::Morning,
        "afternoon" => TimeOfDay::Afternoon,
        "evening" => TimeOfDay::Evening,
        _ => TimeOfDay::AnyTime,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {raw}").into())
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, Box<dyn std::error::Error>> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| format!("invalid time (expected HH:MM): {raw}").into())
}

pub fn run(action: QuestAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;
    let config = Config::load();

    match action {
        QuestAction::Create {
            title,
            description,
            points,
            recurrence,
            anchor,
            due,
            time_of_day,
            assignee,
        } => {
            let anchor_date = match anchor {
                Some(raw) => Some(parse_date(&raw)?),
                None => Some(Local::now().date_naive()),
            };
            let mut quest = Quest::new(
                &config.profile.family_id,
                &title,
                points,
                parse_recurrence(&recurrence),
                anchor_date,
                &config.profile.member_id,
            );
            quest.description = description;
            quest.time_of_day = parse_time_of_day(&time_of_day);
            quest.assignee_id = assignee;
            if let Some(raw) = due {
                quest.due_time = Some(parse_time(&raw)?);
            }
            db.create_quest(&quest)?;
            println!("Quest created: {}", quest.id);
            println!("{}", serde_json::to_string_pretty(&quest)?);
        }
        QuestAction::List => {
            let quests = db.list_quests(&config.profile.family_id)?;
            println!("{}", serde_json::to_string_pretty(&quests)?);
        }
        QuestAction::Get { id } => match db.get_quest(&id)? {
            Some(quest) => println!("{}", serde_json::to_string_pretty(&quest)?),
            None => println!("Quest not found: {id}"),
        },
        QuestAction::Update {
            id,
            title,
            description,
            points,
            recurrence,
            anchor,
            due,
            time_of_day,
            assignee,
        } => {
            let mut quest = db
                .get_quest(&id)?
                .ok_or(format!("Quest not found: {id}"))?;

            if let Some(t) = title {
                quest.title = t;
            }
            if let Some(d) = description {
                quest.description = Some(d);
            }
            if let Some(p) = points {
                quest.points = p;
            }
            if let Some(r) = recurrence {
                quest.recurrence = parse_recurrence(&r);
            }
            if let Some(a) = anchor {
                quest.anchor_date = Some(parse_date(&a)?);
            }
            if let Some(raw) = due {
                quest.due_time = if raw.is_empty() {
                    None
                } else {
                    Some(parse_time(&raw)?)
                };
            }
            if let Some(t) = time_of_day {
                quest.time_of_day = parse_time_of_day(&t);
            }
            if let Some(a) = assignee {
                quest.assignee_id = Some(a);
            }

            db.update_quest(&quest)?;
            println!("Quest updated:");
            println!("{}", serde_json::to_string_pretty(&quest)?);
        }
        QuestAction::Delete { id } => {
            db.delete_quest(&id)?;
            println!("Quest deleted: {id}");
        }
    }
    Ok(())
}
