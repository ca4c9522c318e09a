//! Reward engine: point decay and milestone detection.
//!
//! Decay is applied once, at the instant of completion, using the deadline
//! state for that instant. It is never recomputed afterward -- a completion
//! record keeps the points it was credited with.

use serde::{Deserialize, Serialize};

/// Cumulative point thresholds that earn a celebration, ascending.
pub const MILESTONE_LADDER: [i64; 5] = [50, 100, 250, 500, 1000];

/// A celebration tier earned by a completion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "threshold")]
pub enum Milestone {
    /// Every quest due today is done.
    AllDone,
    /// The running total crossed a ladder threshold.
    PointThreshold(i64),
}

impl Milestone {
    /// Tier label, e.g. "all-done" or "250-points".
    pub fn label(&self) -> String {
        match self {
            Milestone::AllDone => "all-done".to_string(),
            Milestone::PointThreshold(t) => format!("{t}-points"),
        }
    }
}

/// Points actually credited for a completion.
///
/// Completing after the deadline halves the reward, rounding down.
pub fn credited_points(points: i64, overdue: bool) -> i64 {
    if overdue {
        points / 2
    } else {
        points
    }
}

/// Detect the milestone earned by a completion, if any.
///
/// `total_points` is the running total after this completion and
/// `points_earned` what this completion credited; `completions_today`
/// includes this one. Finishing everything due today outranks a point
/// threshold crossed by the same completion, and an empty day never counts
/// as all-done.
pub fn detect_milestone(
    total_points: i64,
    points_earned: i64,
    completions_today: usize,
    total_tasks_today: usize,
) -> Option<Milestone> {
    if total_tasks_today > 0 && completions_today >= total_tasks_today {
        return Some(Milestone::AllDone);
    }

    let before = total_points - points_earned;
    for threshold in MILESTONE_LADDER {
        if before < threshold && threshold <= total_points {
            return Some(Milestone::PointThreshold(threshold));
        }
    }

    None
}
