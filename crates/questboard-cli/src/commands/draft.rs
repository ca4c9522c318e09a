//! Natural-language quest drafting for CLI.

use chrono::Local;
use clap::Args;
use questboard_core::draft::QuestDraft;
use questboard_core::integrations::DraftClient;
use questboard_core::quest::Quest;
use questboard_core::storage::{Config, QuestDb};

#[derive(Args)]
pub struct DraftArgs {
    /// Free-text description of the quest
    pub text: String,
    /// Create the quest from the normalized draft
    #[arg(long)]
    pub create: bool,
}

pub fn run(args: DraftArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;
    let config = Config::load();

    if config.draft.endpoint.is_empty() {
        return Err("draft endpoint not configured (set draft.endpoint)".into());
    }

    let client = DraftClient::new(&config.draft.endpoint, config.draft.timeout_ms);
    let runtime = tokio::runtime::Runtime::new()?;
    let raw = runtime
        .block_on(client.draft(&args.text))
        .ok_or("draft service unavailable")?;

    let members = db.list_members(&config.profile.family_id)?;
    let draft = QuestDraft::normalize(raw, &members)
        .ok_or("could not draft a quest from that text")?;

    println!("{}", serde_json::to_string_pretty(&draft)?);

    if args.create {
        let mut quest = Quest::new(
            &config.profile.family_id,
            &draft.title,
            draft.points,
            draft.recurrence,
            Some(Local::now().date_naive()),
            &config.profile.member_id,
        );
        quest.description = draft.description.clone();
        quest.time_of_day = draft.time_of_day;
        quest.assignee_id = draft.assignee_id.clone();
        db.create_quest(&quest)?;
        println!("Quest created: {}", quest.id);
    }
    Ok(())
}
