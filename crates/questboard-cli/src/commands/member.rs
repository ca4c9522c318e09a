//! Family roster commands for CLI.

use clap::Subcommand;
use questboard_core::quest::FamilyMember;
use questboard_core::storage::{Config, QuestDb};

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a member to the family roster
    Add {
        /// Display name
        name: String,
        /// Nickname used by assignee resolution
        #[arg(long)]
        nickname: Option<String>,
    },
    /// List family members
    List,
    /// Remove a member from the roster
    Remove {
        /// Member ID
        id: String,
    },
}

pub fn run(action: MemberAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = QuestDb::open()?;
    let config = Config::load();

    match action {
        MemberAction::Add { name, nickname } => {
            let member = FamilyMember::new(&config.profile.family_id, &name, nickname);
            db.upsert_member(&member)?;
            println!("Member added: {}", member.id);
            println!("{}", serde_json::to_string_pretty(&member)?);
        }
        MemberAction::List => {
            let members = db.list_members(&config.profile.family_id)?;
            println!("{}", serde_json::to_string_pretty(&members)?);
        }
        MemberAction::Remove { id } => {
            if db.remove_member(&id)? {
                println!("Member removed: {id}");
            } else {
                println!("Member not found: {id}");
            }
        }
    }
    Ok(())
}
