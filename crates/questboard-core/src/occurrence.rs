//! Occurrence resolution: which quest instances are due on a given date.
//!
//! Occurrences are derived, never persisted. A one-off quest has exactly one
//! occurrence, keyed by its anchor date, with done-ness read straight off the
//! quest row. A recurring quest yields one occurrence per eligible date, and
//! its done-ness comes solely from the existence of a completion record for
//! (quest id, date).

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::deadline::{self, DeadlineState};
use crate::error::CoreError;
use crate::quest::{Quest, Recurrence, TimeOfDay};
use crate::storage::QuestDb;

/// Identity of one completable instance.
///
/// Completion and un-completion dispatch on this tag instead of branching on
/// a nullable recurrence field at every call site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OccurrenceKey {
    /// The single occurrence of a one-off quest.
    OneTime { quest_id: String },
    /// One day's instance of a recurring quest.
    Recurring { quest_id: String, date: NaiveDate },
}

impl OccurrenceKey {
    pub fn quest_id(&self) -> &str {
        match self {
            OccurrenceKey::OneTime { quest_id } => quest_id,
            OccurrenceKey::Recurring { quest_id, .. } => quest_id,
        }
    }

    /// Build the key for `quest` on `date`, dispatching on its recurrence.
    pub fn for_quest(quest: &Quest, date: NaiveDate) -> Self {
        match quest.recurrence {
            Recurrence::None => OccurrenceKey::OneTime {
                quest_id: quest.id.clone(),
            },
            Recurrence::Daily | Recurrence::Weekly => OccurrenceKey::Recurring {
                quest_id: quest.id.clone(),
                date,
            },
        }
    }
}

/// A resolved due instance for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub key: OccurrenceKey,
    pub title: String,
    pub points: i64,
    pub time_of_day: TimeOfDay,
    pub assignee_id: Option<String>,
    pub due_time: Option<NaiveTime>,
    pub completed: bool,
}

impl Occurrence {
    fn from_quest(quest: &Quest, key: OccurrenceKey, completed: bool) -> Self {
        Self {
            key,
            title: quest.title.clone(),
            points: quest.points,
            time_of_day: quest.time_of_day,
            assignee_id: quest.assignee_id.clone(),
            due_time: quest.due_time,
            completed,
        }
    }

    /// Deadline state for this occurrence on its resolution date.
    ///
    /// A completed occurrence has no deadline state at all -- it never shows
    /// warning or overdue styling, however late it was finished.
    pub fn deadline(&self, date: NaiveDate, now: NaiveDateTime) -> Option<DeadlineState> {
        if self.completed {
            return None;
        }
        deadline::evaluate(date, self.due_time, now)
    }
}

/// Resolve the occurrences due on `date` for one family.
///
/// One-off occurrences come first, then recurring ones; order within each
/// group follows the storage order and is never re-sorted. Storage errors
/// propagate unmodified -- this never degrades to an empty or partial list.
pub fn resolve_due(
    db: &QuestDb,
    family_id: &str,
    date: NaiveDate,
) -> Result<Vec<Occurrence>, CoreError> {
    // Anchor-date <= date filtering happens in SQL; quests with no anchor
    // date cannot resolve a start or weekday and are excluded there too.
    let candidates = db.due_candidates(family_id, date)?;

    let mut one_time: Vec<&Quest> = Vec::new();
    let mut recurring: Vec<&Quest> = Vec::new();
    for quest in &candidates {
        match quest.recurrence {
            Recurrence::None => {
                if quest.anchor_date == Some(date) {
                    one_time.push(quest);
                }
            }
            Recurrence::Daily => recurring.push(quest),
            Recurrence::Weekly => {
                // Weekday comparison on date-only values; parsing dates as
                // instants would drift across timezones.
                if let Some(anchor) = quest.anchor_date {
                    if anchor.weekday() == date.weekday() {
                        recurring.push(quest);
                    }
                }
            }
        }
    }

    let completed_ids: HashSet<String> = if recurring.is_empty() {
        HashSet::new()
    } else {
        let ids: Vec<String> = recurring.iter().map(|q| q.id.clone()).collect();
        db.completions_on(&ids, date)?
    };

    let mut occurrences = Vec::with_capacity(one_time.len() + recurring.len());
    for quest in one_time {
        let key = OccurrenceKey::OneTime {
            quest_id: quest.id.clone(),
        };
        occurrences.push(Occurrence::from_quest(quest, key, quest.completed));
    }
    for quest in recurring {
        let key = OccurrenceKey::Recurring {
            quest_id: quest.id.clone(),
            date,
        };
        let completed = completed_ids.contains(&quest.id);
        occurrences.push(Occurrence::from_quest(quest, key, completed));
    }

    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::CompletionRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_quest(db: &QuestDb, title: &str, recurrence: Recurrence, anchor: NaiveDate) -> Quest {
        let quest = Quest::new("fam-1", title, 10, recurrence, Some(anchor), "member-1");
        db.create_quest(&quest).unwrap();
        quest
    }

    #[test]
    fn one_time_due_only_on_anchor_date() {
        let db = QuestDb::open_memory().unwrap();
        let quest = seed_quest(&db, "Clean the garage", Recurrence::None, date(2025, 3, 10));

        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(
            due[0].key,
            OccurrenceKey::OneTime {
                quest_id: quest.id.clone()
            }
        );

        // Neither before nor after the anchor date.
        assert!(resolve_due(&db, "fam-1", date(2025, 3, 9)).unwrap().is_empty());
        assert!(resolve_due(&db, "fam-1", date(2025, 3, 11)).unwrap().is_empty());
    }

    #[test]
    fn daily_due_every_date_from_anchor() {
        let db = QuestDb::open_memory().unwrap();
        seed_quest(&db, "Feed the cat", Recurrence::Daily, date(2025, 3, 1));

        for day in [1, 2, 15, 28] {
            let due = resolve_due(&db, "fam-1", date(2025, 3, day)).unwrap();
            assert_eq!(due.len(), 1, "expected daily quest due on day {day}");
        }
        assert!(resolve_due(&db, "fam-1", date(2025, 2, 28)).unwrap().is_empty());
    }

    #[test]
    fn weekly_due_only_on_anchor_weekday() {
        let db = QuestDb::open_memory().unwrap();
        // 2025-03-03 is a Monday.
        seed_quest(&db, "Water the plants", Recurrence::Weekly, date(2025, 3, 3));

        assert_eq!(resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap().len(), 1);
        assert_eq!(resolve_due(&db, "fam-1", date(2025, 3, 17)).unwrap().len(), 1);
        assert!(resolve_due(&db, "fam-1", date(2025, 3, 11)).unwrap().is_empty());
        assert!(resolve_due(&db, "fam-1", date(2025, 2, 24)).unwrap().is_empty());
    }

    #[test]
    fn recurring_without_anchor_is_excluded() {
        let db = QuestDb::open_memory().unwrap();
        let quest = Quest::new("fam-1", "Orphan", 10, Recurrence::Daily, None, "member-1");
        db.create_quest(&quest).unwrap();

        assert!(resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap().is_empty());
    }

    #[test]
    fn recurring_done_state_comes_from_completion_records() {
        let db = QuestDb::open_memory().unwrap();
        let quest = seed_quest(&db, "Dishes", Recurrence::Daily, date(2025, 3, 1));

        // Flipping the quest row's own flag must not leak into recurring
        // occurrences.
        db.set_quest_completed(&quest.id, true).unwrap();
        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        assert!(!due[0].completed);

        let rec = CompletionRecord::new(&quest.id, "member-1", 10, Some(date(2025, 3, 10)));
        db.insert_completion(&rec).unwrap();

        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        assert!(due[0].completed);
        // Independent per day.
        let due = resolve_due(&db, "fam-1", date(2025, 3, 11)).unwrap();
        assert!(!due[0].completed);
    }

    #[test]
    fn one_time_group_precedes_recurring_group() {
        let db = QuestDb::open_memory().unwrap();
        seed_quest(&db, "Daily sweep", Recurrence::Daily, date(2025, 3, 1));
        seed_quest(&db, "Fix the fence", Recurrence::None, date(2025, 3, 10));

        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].title, "Fix the fence");
        assert_eq!(due[1].title, "Daily sweep");
    }

    #[test]
    fn other_family_quests_are_invisible() {
        let db = QuestDb::open_memory().unwrap();
        seed_quest(&db, "Ours", Recurrence::Daily, date(2025, 3, 1));
        let other = Quest::new("fam-2", "Theirs", 10, Recurrence::Daily, Some(date(2025, 3, 1)), "x");
        db.create_quest(&other).unwrap();

        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "Ours");
    }

    #[test]
    fn completed_occurrence_has_no_deadline_state() {
        let db = QuestDb::open_memory().unwrap();
        let mut quest = Quest::new(
            "fam-1",
            "Laundry",
            10,
            Recurrence::Daily,
            Some(date(2025, 3, 1)),
            "member-1",
        );
        quest.due_time = NaiveTime::from_hms_opt(14, 30, 0);
        db.create_quest(&quest).unwrap();
        let rec = CompletionRecord::new(&quest.id, "member-1", 10, Some(date(2025, 3, 10)));
        db.insert_completion(&rec).unwrap();

        let due = resolve_due(&db, "fam-1", date(2025, 3, 10)).unwrap();
        let occ = &due[0];
        assert!(occ.completed);
        // Well past the due time, but completed never reports overdue.
        let now = date(2025, 3, 10).and_hms_opt(23, 0, 0).unwrap();
        assert!(occ.deadline(date(2025, 3, 10), now).is_none());
    }
}
