//! # Questboard Core Library
//!
//! This library provides the core business logic for Questboard, a household
//! quest (chore) tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI being
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Occurrence Resolver**: expands quest definitions into per-date due
//!   instances, with done-ness decoupled from the definition for recurring
//!   quests
//! - **Deadline Evaluator**: pure (date, due time, now) -> urgency state
//! - **Completion Tracker**: records/undoes completions and credits points,
//!   with deadline decay locked in at the instant of completion
//! - **Reward Engine**: milestone detection over daily ratio and cumulative
//!   point thresholds
//! - **Encouragement Selector**: local fallback messages for the external
//!   cheer collaborator
//! - **Storage**: SQLite quest/completion/roster storage and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`occurrence::resolve_due`]: what's due on a given date
//! - [`completion::complete`] / [`completion::uncomplete`]: done-ness flow
//! - [`QuestDb`]: quest and completion persistence
//! - [`Config`]: application configuration management

pub mod completion;
pub mod deadline;
pub mod draft;
pub mod encourage;
pub mod error;
pub mod events;
pub mod integrations;
pub mod occurrence;
pub mod quest;
pub mod reward;
pub mod storage;

pub use completion::{CompletionOutcome, InFlightGuard};
pub use deadline::{DeadlineState, DeadlineStatus};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use occurrence::{Occurrence, OccurrenceKey};
pub use quest::{CompletionRecord, FamilyMember, Quest, Recurrence, TimeOfDay};
pub use reward::Milestone;
pub use storage::{Config, QuestDb};
