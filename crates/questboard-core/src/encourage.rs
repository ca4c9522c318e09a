//! Local encouragement messages.
//!
//! This is the fallback for the cheer collaborator: when the external call
//! times out, errors, or returns nothing usable, a canned message is picked
//! instead. Selection avoids the last few messages shown so back-to-back
//! completions don't repeat themselves.
//!
//! The recent-message history is per-session state. Callers own the buffer
//! and pass it in; nothing here is module-level mutable.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::reward::Milestone;

/// How many recent messages are excluded from re-selection.
pub const HISTORY_CAP: usize = 5;

const CELEBRATORY: &[&str] = &[
    "Clean sweep! Every quest on the board is done!",
    "That's the whole board cleared. Legendary!",
    "All quests complete -- the household salutes you!",
    "Nothing left to do today. Take a bow!",
    "Full house! Every last chore conquered.",
    "Board's empty, hero. Enjoy the rest of your day!",
];

const POINTS: &[&str] = &[
    "Big points! That one really counted.",
    "Nice haul -- your total is climbing fast.",
    "That's what a heavy-hitter quest looks like. Well done!",
    "Cha-ching! A serious chunk of points banked.",
    "Strong work. The leaderboard felt that one.",
    "Quest crushed, wallet of points fattened.",
];

const GENERAL: &[&str] = &[
    "Nice work, quest complete!",
    "Another one off the list. Keep it rolling!",
    "Done and dusted. On to the next!",
    "Quest cleared -- small steps, tidy house.",
    "Checked off! The board looks better already.",
    "Good job. Future-you says thanks.",
];

/// Which pool a completion draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Celebratory,
    Points,
    General,
}

impl MessageCategory {
    /// Category for a completion. Finishing the whole board wins even when
    /// the completion also earned a pile of points.
    pub fn for_completion(milestone: Option<&Milestone>, points_earned: i64) -> Self {
        if matches!(milestone, Some(Milestone::AllDone)) {
            MessageCategory::Celebratory
        } else if points_earned >= 10 {
            MessageCategory::Points
        } else {
            MessageCategory::General
        }
    }

    fn pool(&self) -> &'static [&'static str] {
        match self {
            MessageCategory::Celebratory => CELEBRATORY,
            MessageCategory::Points => POINTS,
            MessageCategory::General => GENERAL,
        }
    }
}

/// FIFO buffer of recently shown messages, capped at [`HISTORY_CAP`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentMessages {
    entries: VecDeque<String>,
}

impl RecentMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|m| m == message)
    }

    /// Record a shown message, evicting the oldest beyond the cap.
    pub fn push(&mut self, message: &str) {
        self.entries.push_back(message.to_string());
        while self.entries.len() > HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pick a fallback message for `category`, avoiding recent repeats.
///
/// Uniform choice over the pool minus the history; if the history swallows
/// the entire pool, the unfiltered pool is used instead. The chosen message
/// is pushed onto the history.
pub fn pick<R: Rng>(
    category: MessageCategory,
    history: &mut RecentMessages,
    rng: &mut R,
) -> &'static str {
    let pool = category.pool();
    let fresh: Vec<&'static str> = pool
        .iter()
        .copied()
        .filter(|m| !history.contains(m))
        .collect();
    let candidates: &[&'static str] = if fresh.is_empty() { pool } else { &fresh };
    let chosen = candidates[rng.gen_range(0..candidates.len())];
    history.push(chosen);
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn all_done_takes_precedence_over_points() {
        let category = MessageCategory::for_completion(Some(&Milestone::AllDone), 50);
        assert_eq!(category, MessageCategory::Celebratory);
    }

    #[test]
    fn high_points_without_all_done_uses_points_pool() {
        let category = MessageCategory::for_completion(Some(&Milestone::PointThreshold(50)), 10);
        assert_eq!(category, MessageCategory::Points);
        assert_eq!(MessageCategory::for_completion(None, 9), MessageCategory::General);
    }

    #[test]
    fn history_evicts_oldest_beyond_cap() {
        let mut history = RecentMessages::new();
        for i in 0..7 {
            history.push(&format!("message {i}"));
        }
        assert_eq!(history.len(), HISTORY_CAP);
        assert!(!history.contains("message 0"));
        assert!(!history.contains("message 1"));
        assert!(history.contains("message 6"));
    }

    #[test]
    fn never_repeats_while_pool_has_fresh_messages() {
        let mut history = RecentMessages::new();
        let mut rng = StepRng::new(0, 0x9e3779b97f4a7c15);

        // HISTORY_CAP is below the pool size, so each pick must dodge
        // everything currently in the buffer.
        for _ in 0..50 {
            let before: Vec<String> = history.entries.iter().cloned().collect();
            let chosen = pick(MessageCategory::General, &mut history, &mut rng);
            assert!(!before.iter().any(|m| m == chosen));
        }
    }

    #[test]
    fn falls_back_to_full_pool_when_history_covers_it() {
        let mut history = RecentMessages::new();
        // Fill the history with a pool prefix so only one message stays
        // eligible after filtering.
        for m in GENERAL.iter().take(HISTORY_CAP) {
            history.push(m);
        }
        let mut rng = StepRng::new(0, 1);
        // Only one fresh message remains; it must be chosen.
        let chosen = pick(MessageCategory::General, &mut history, &mut rng);
        assert_eq!(chosen, GENERAL[HISTORY_CAP]);
    }

    #[test]
    fn history_round_trips_through_serde() {
        let mut history = RecentMessages::new();
        history.push("kept");
        let json = serde_json::to_string(&history).unwrap();
        let decoded: RecentMessages = serde_json::from_str(&json).unwrap();
        assert!(decoded.contains("kept"));
    }
}
