mod config;
pub mod database;
pub mod migrations;

pub use config::{CheerConfig, Config, DraftConfig, ProfileConfig};
pub use database::QuestDb;

use std::path::PathBuf;

/// Returns `~/.config/questboard[-dev]/` based on QUESTBOARD_ENV.
///
/// Set QUESTBOARD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("QUESTBOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("questboard-dev")
    } else {
        base_dir.join("questboard")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
