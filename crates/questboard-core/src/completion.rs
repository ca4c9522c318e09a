//! Completion tracking: recording and undoing done-ness per occurrence.
//!
//! One-off quests flip their own `completed` flag and log a completion
//! record in a single transaction; recurring quests only ever touch their
//! completion records, one per (quest, date). Points are credited here, at
//! the instant of completion, after deadline decay -- later edits to the
//! quest or an undo never change what was credited.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::deadline::DeadlineStatus;
use crate::error::{CoreError, ValidationError};
use crate::occurrence::{self, OccurrenceKey};
use crate::quest::{CompletionRecord, Quest, Recurrence};
use crate::reward::{self, Milestone};
use crate::storage::QuestDb;

/// What a completion produced.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub quest: Quest,
    pub key: OccurrenceKey,
    pub credited_points: i64,
    pub was_overdue: bool,
    /// Actor's running total after this completion.
    pub total_points: i64,
    pub completions_today: usize,
    pub total_tasks_today: usize,
    pub milestone: Option<Milestone>,
}

/// Client-side guard against double-submitting the same occurrence.
///
/// The tracker itself performs no locking, so a caller driving concurrent
/// UI events must hold one of these per session: `begin` refuses a key that
/// is already in flight, and `finish` releases it once the write settled
/// (successfully or not). The storage layer's unique index on
/// (quest id, completion date) backstops recurring occurrences even against
/// clients that skip this.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    keys: HashSet<OccurrenceKey>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` in flight. Returns false if it already is.
    pub fn begin(&mut self, key: &OccurrenceKey) -> bool {
        self.keys.insert(key.clone())
    }

    pub fn finish(&mut self, key: &OccurrenceKey) {
        self.keys.remove(key);
    }
}

/// Complete one occurrence as `actor` at instant `now`.
///
/// Applies deadline decay, writes the completion, credits the actor's point
/// total, and detects any milestone for the day. Write failures surface as
/// errors with nothing partially applied (the one-off path runs both writes
/// in one transaction).
pub fn complete(
    db: &mut QuestDb,
    key: &OccurrenceKey,
    actor: &str,
    now: NaiveDateTime,
) -> Result<CompletionOutcome, CoreError> {
    let quest = db
        .get_quest(key.quest_id())?
        .ok_or_else(|| ValidationError::NotFound {
            kind: "quest",
            id: key.quest_id().to_string(),
        })?;

    let (occurrence_date, record_date) = match key {
        OccurrenceKey::OneTime { .. } => {
            if quest.recurrence != Recurrence::None {
                return Err(ValidationError::InvalidState {
                    entity: quest.id.clone(),
                    message: "recurring quest completed through a one-time key".to_string(),
                }
                .into());
            }
            if quest.completed {
                return Err(ValidationError::InvalidState {
                    entity: quest.id.clone(),
                    message: "already completed".to_string(),
                }
                .into());
            }
            (quest.anchor_date, None)
        }
        OccurrenceKey::Recurring { date, .. } => {
            if quest.recurrence == Recurrence::None {
                return Err(ValidationError::InvalidState {
                    entity: quest.id.clone(),
                    message: "one-time quest completed through a recurring key".to_string(),
                }
                .into());
            }
            (Some(*date), Some(*date))
        }
    };

    // Decay is locked in at this instant; it is never re-evaluated later.
    let was_overdue = occurrence_date
        .and_then(|date| crate::deadline::evaluate(date, quest.due_time, now))
        .map(|state| state.status == DeadlineStatus::Overdue)
        .unwrap_or(false);
    let credited = reward::credited_points(quest.points, was_overdue);

    let record = CompletionRecord::new(&quest.id, actor, credited, record_date);
    match key {
        OccurrenceKey::OneTime { .. } => db.complete_one_time(&record)?,
        OccurrenceKey::Recurring { .. } => db.insert_completion(&record)?,
    }

    db.add_points(actor, credited)?;
    let total_points = db.member_points(actor)?;

    let today = occurrence::resolve_due(db, &quest.family_id, now.date())?;
    let total_tasks_today = today.len();
    let completions_today = today.iter().filter(|o| o.completed).count();

    let milestone = reward::detect_milestone(
        total_points,
        credited,
        completions_today,
        total_tasks_today,
    );

    Ok(CompletionOutcome {
        key: key.clone(),
        credited_points: credited,
        was_overdue,
        total_points,
        completions_today,
        total_tasks_today,
        milestone,
        quest,
    })
}

/// Undo a completion.
///
/// One-off: clears the quest's own flag. Recurring: deletes the completion
/// record for (quest, date). Previously credited points are deliberately not
/// reversed -- completion is a one-way reward, undo only fixes the
/// checklist.
pub fn uncomplete(db: &QuestDb, key: &OccurrenceKey) -> Result<(), CoreError> {
    match key {
        OccurrenceKey::OneTime { quest_id } => {
            let quest = db
                .get_quest(quest_id)?
                .ok_or_else(|| ValidationError::NotFound {
                    kind: "quest",
                    id: quest_id.clone(),
                })?;
            if quest.recurrence != Recurrence::None {
                return Err(ValidationError::InvalidState {
                    entity: quest.id,
                    message: "recurring quest uncompleted through a one-time key".to_string(),
                }
                .into());
            }
            db.set_quest_completed(quest_id, false)?;
        }
        OccurrenceKey::Recurring { quest_id, date } => {
            db.delete_completion(quest_id, *date)?;
        }
    }
    Ok(())
}
