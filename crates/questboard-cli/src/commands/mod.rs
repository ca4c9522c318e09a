pub mod complete;
pub mod config;
pub mod draft;
pub mod member;
pub mod quest;
pub mod stats;
pub mod today;
