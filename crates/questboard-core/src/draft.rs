//! Normalization of natural-language quest drafts.
//!
//! The drafting collaborator turns free text into a best-effort draft; this
//! module owns the two normalization steps applied to its response: snapping
//! suggested points onto the reward ladder, and resolving a free-text
//! assignee against the family roster.

use serde::{Deserialize, Serialize};

use crate::quest::{FamilyMember, Recurrence, TimeOfDay};

/// The fixed reward scale drafts are snapped onto.
pub const POINT_LADDER: [i64; 6] = [5, 10, 15, 20, 25, 50];

/// Suggested points when the collaborator offers none.
const DEFAULT_POINTS: i64 = 10;

/// Raw collaborator response, before normalization.
///
/// Every field is optional on the wire; a missing title makes the whole
/// payload unusable (total parse failure, never partial success).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points: Option<i64>,
    pub time_of_day: Option<String>,
    pub recurrence: Option<String>,
    pub assignee: Option<String>,
}

/// A normalized quest draft ready to be turned into a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDraft {
    pub title: String,
    pub description: Option<String>,
    pub points: i64,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    pub assignee_id: Option<String>,
}

/// Snap an arbitrary point suggestion onto [`POINT_LADDER`].
///
/// Nearest member wins; exact ties round to the lower candidate, and values
/// outside the ladder clamp to the nearest boundary.
pub fn snap_points(raw: i64) -> i64 {
    let mut best = POINT_LADDER[0];
    let mut best_distance = (raw - best).abs();
    for candidate in &POINT_LADDER[1..] {
        let distance = (raw - candidate).abs();
        // Strict comparison keeps the earlier (lower) candidate on ties.
        if distance < best_distance {
            best = *candidate;
            best_distance = distance;
        }
    }
    best
}

/// Resolve a free-text assignee against the family roster.
///
/// Case-insensitive tiers over display names and nicknames: exact, then
/// prefix, then substring. The first tier with any match wins, and the first
/// member within that tier wins. No match means unassigned.
pub fn match_assignee<'a>(text: &str, members: &'a [FamilyMember]) -> Option<&'a FamilyMember> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let names = |m: &FamilyMember| {
        let mut v = vec![m.display_name.to_lowercase()];
        if let Some(nick) = &m.nickname {
            v.push(nick.to_lowercase());
        }
        v
    };

    for member in members {
        if names(member).iter().any(|n| *n == needle) {
            return Some(member);
        }
    }
    for member in members {
        if names(member).iter().any(|n| n.starts_with(&needle)) {
            return Some(member);
        }
    }
    for member in members {
        if names(member).iter().any(|n| n.contains(&needle)) {
            return Some(member);
        }
    }
    None
}

fn parse_time_of_day(raw: &str) -> TimeOfDay {
    match raw.trim().to_lowercase().as_str() {
        "morning" => TimeOfDay::Morning,
        "afternoon" => TimeOfDay::Afternoon,
        "evening" => TimeOfDay::Evening,
        _ => TimeOfDay::AnyTime,
    }
}

fn parse_recurrence(raw: &str) -> Recurrence {
    match raw.trim().to_lowercase().as_str() {
        "daily" => Recurrence::Daily,
        "weekly" => Recurrence::Weekly,
        _ => Recurrence::None,
    }
}

impl QuestDraft {
    /// Normalize a raw collaborator response.
    ///
    /// Returns `None` when the draft has no usable title -- a draft without
    /// one is a total parse failure, not a partial result.
    pub fn normalize(raw: RawDraft, members: &[FamilyMember]) -> Option<QuestDraft> {
        let title = raw.title?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let points = snap_points(raw.points.unwrap_or(DEFAULT_POINTS));
        let time_of_day = raw
            .time_of_day
            .as_deref()
            .map(parse_time_of_day)
            .unwrap_or_default();
        let recurrence = raw
            .recurrence
            .as_deref()
            .map(parse_recurrence)
            .unwrap_or_default();
        let assignee_id = raw
            .assignee
            .as_deref()
            .and_then(|text| match_assignee(text, members))
            .map(|m| m.id.clone());

        Some(QuestDraft {
            title,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            points,
            time_of_day,
            recurrence,
            assignee_id,
        })
    }
}
