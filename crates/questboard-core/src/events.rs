use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Every completion-flow state change produces an Event.
/// Outer layers serialize these for `--json` consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    QuestCompleted {
        quest_id: String,
        /// Occurrence date for recurring quests; None for one-off quests.
        date: Option<NaiveDate>,
        completed_by: String,
        points: i64,
        overdue: bool,
        at: DateTime<Utc>,
    },
    QuestUncompleted {
        quest_id: String,
        date: Option<NaiveDate>,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        tier: String,
        total_points: i64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_by_type() {
        let event = Event::MilestoneReached {
            tier: "all-done".to_string(),
            total_points: 120,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"MilestoneReached\""));
        assert!(json.contains("\"tier\":\"all-done\""));
    }
}
