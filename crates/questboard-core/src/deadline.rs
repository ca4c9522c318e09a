//! Deadline evaluation for due occurrences.
//!
//! A pure function of (date, due time, now) -- no clock is read here. The
//! caller passes "now" explicitly so evaluation is deterministic and
//! replayable. Live views re-run the evaluator on a 60-second tick while an
//! occurrence is incomplete and has a due time; once completed (or without a
//! due time) there is nothing to re-evaluate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How often a live view should re-evaluate deadline state.
pub const REEVALUATE_INTERVAL_SECS: u64 = 60;

/// Urgency bucket for a due time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    /// More than an hour remaining.
    Normal,
    /// An hour or less remaining.
    Warning,
    /// The deadline has passed.
    Overdue,
}

/// Evaluated deadline state at one instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineState {
    /// Whole minutes until the deadline; negative once it has passed.
    pub remaining_minutes: i64,
    pub status: DeadlineStatus,
}

impl DeadlineState {
    /// Human-readable remaining time, e.g. "2h 15m left" or "45m overdue".
    pub fn describe(&self) -> String {
        let total = self.remaining_minutes.abs();
        let hours = total / 60;
        let minutes = total % 60;
        let span = if hours > 0 && minutes > 0 {
            format!("{hours}h {minutes}m")
        } else if hours > 0 {
            format!("{hours}h")
        } else {
            format!("{minutes}m")
        };
        let suffix = if self.status == DeadlineStatus::Overdue {
            "overdue"
        } else {
            "left"
        };
        format!("{span} {suffix}")
    }
}

/// Evaluate the deadline for an occurrence due on `date`.
///
/// Returns `None` when there is no due time -- such occurrences have no
/// deadline state at all. Remaining time is truncated to whole minutes.
pub fn evaluate(
    date: NaiveDate,
    due_time: Option<NaiveTime>,
    now: NaiveDateTime,
) -> Option<DeadlineState> {
    let due_time = due_time?;
    let deadline = date.and_time(due_time);
    let remaining_minutes = (deadline - now).num_minutes();
    let status = if remaining_minutes < 0 {
        DeadlineStatus::Overdue
    } else if remaining_minutes <= 60 {
        DeadlineStatus::Warning
    } else {
        DeadlineStatus::Normal
    };
    Some(DeadlineState {
        remaining_minutes,
        status,
    })
}

/// Whether a live view needs to keep re-evaluating this occurrence.
///
/// Ticks only while the occurrence is incomplete and has a due time.
pub fn needs_reevaluation(completed: bool, due_time: Option<NaiveTime>) -> bool {
    !completed && due_time.is_some()
}
