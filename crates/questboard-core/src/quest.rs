//! Quest definitions and the family roster.
//!
//! A quest is a household chore worth points. One-off quests are due on
//! their anchor date and carry their own `completed` flag; recurring quests
//! repeat from the anchor date onward and track done-ness per day through
//! completion records instead.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a quest comes due.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// One-off quest, due exactly on its anchor date.
    None,
    /// Due every day from the anchor date onward.
    Daily,
    /// Due on the anchor date's weekday, every week from the anchor onward.
    Weekly,
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

/// Rough time-of-day bucket used for grouping and for cheer context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    AnyTime,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        TimeOfDay::AnyTime
    }
}

/// A quest definition.
///
/// `completed` is only meaningful when `recurrence == Recurrence::None`;
/// recurring quests derive per-day done-ness from completion records and
/// never read this flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Unique identifier
    pub id: String,
    /// Family this quest belongs to
    pub family_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Member the quest is assigned to, if anyone
    pub assignee_id: Option<String>,
    /// Reward for completing one occurrence
    pub points: i64,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    /// Due date for one-off quests; first eligible date for recurring ones.
    pub anchor_date: Option<NaiveDate>,
    /// Optional deadline within the day (local time)
    pub due_time: Option<NaiveTime>,
    /// Done flag for one-off quests only
    pub completed: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quest {
    /// Create a new quest with a fresh id and creation timestamps.
    pub fn new(
        family_id: &str,
        title: &str,
        points: i64,
        recurrence: Recurrence,
        anchor_date: Option<NaiveDate>,
        created_by: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            family_id: family_id.to_string(),
            title: title.to_string(),
            description: None,
            assignee_id: None,
            points,
            time_of_day: TimeOfDay::default(),
            recurrence,
            anchor_date,
            due_time: None,
            completed: false,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An immutable log entry for one completed occurrence.
///
/// `points` is captured at completion time (after any deadline decay) and
/// never changes afterward, even if the quest's point value is edited later.
/// `completed_on` is `None` for one-off quests and the occurrence date for
/// recurring ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: String,
    pub quest_id: String,
    pub completed_by: String,
    pub points: i64,
    pub completed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(
        quest_id: &str,
        completed_by: &str,
        points: i64,
        completed_on: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            quest_id: quest_id.to_string(),
            completed_by: completed_by.to_string(),
            points,
            completed_on,
            created_at: Utc::now(),
        }
    }
}

/// A member of the family roster.
///
/// `points` is the running reward total; the completion flow only ever adds
/// to it (see `completion::uncomplete` for the one-way policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: String,
    pub family_id: String,
    pub display_name: String,
    pub nickname: Option<String>,
    pub points: i64,
}

impl FamilyMember {
    pub fn new(family_id: &str, display_name: &str, nickname: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            family_id: family_id.to_string(),
            display_name: display_name.to_string(),
            nickname,
            points: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_serialization() {
        let mut quest = Quest::new(
            "fam-1",
            "Take out the trash",
            10,
            Recurrence::Weekly,
            NaiveDate::from_ymd_opt(2025, 3, 3),
            "member-1",
        );
        quest.due_time = NaiveTime::from_hms_opt(18, 30, 0);

        let json = serde_json::to_string(&quest).unwrap();
        let decoded: Quest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.recurrence, Recurrence::Weekly);
        assert_eq!(decoded.anchor_date, quest.anchor_date);
        assert_eq!(decoded.due_time, quest.due_time);
    }

    #[test]
    fn recurrence_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Recurrence::None).unwrap(), "\"none\"");
        assert_eq!(
            serde_json::to_string(&TimeOfDay::AnyTime).unwrap(),
            "\"any_time\""
        );
    }

    #[test]
    fn completion_record_captures_points() {
        let rec = CompletionRecord::new("quest-1", "member-1", 5, None);
        assert_eq!(rec.points, 5);
        assert!(rec.completed_on.is_none());
    }
}
