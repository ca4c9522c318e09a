//! External text collaborators.
//!
//! Both clients share the same failure contract: a timeout, transport
//! error, non-success status, or unusable body collapses to `None`, and the
//! caller degrades to its local fallback. Nothing in here is allowed to
//! surface a user-visible error or stall the completion flow.

pub mod cheer;
pub mod draft_client;

pub use cheer::{CheerClient, CheerRequest};
pub use draft_client::DraftClient;
