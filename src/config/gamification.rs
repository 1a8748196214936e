//! Gamification tuning loaded from config.toml.
//!
//! Operators can adjust the per-day quotas and define the badge catalog
//! without a rebuild. Both sections are optional: missing quotas fall back to
//! the built-in defaults, and an empty badge list falls back to the
//! compiled-in catalog.

use crate::core::badges::{BadgeCatalog, BadgeDefinition, Metric};
use crate::core::task::DailyQuotas;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct GamificationConfig {
    /// Per-day creation caps by priority
    #[serde(default)]
    pub quotas: DailyQuotas,
    /// Badge catalog entries; empty means "use the compiled-in catalog"
    #[serde(default)]
    pub badges: Vec<BadgeConfig>,
}

/// Configuration for a single badge definition
#[derive(Debug, Deserialize, Clone)]
pub struct BadgeConfig {
    /// Stable badge identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Metric name (e.g. "level", `completed_tasks`, "auto")
    pub metric: String,
    /// Threshold the metric must reach
    pub requirement: i64,
    /// One-time XP bonus granted at unlock
    pub xp_reward: i64,
}

impl GamificationConfig {
    /// Builds the badge catalog from the configured entries, validating every
    /// metric name. An empty badge list yields the compiled-in catalog.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an unknown metric name or a duplicate
    /// badge ID.
    pub fn catalog(&self) -> Result<BadgeCatalog> {
        if self.badges.is_empty() {
            return Ok(BadgeCatalog::default());
        }

        let mut definitions = Vec::with_capacity(self.badges.len());
        for badge in &self.badges {
            if self.badges.iter().filter(|b| b.id == badge.id).count() > 1 {
                return Err(Error::Config {
                    message: format!("duplicate badge id '{}'", badge.id),
                });
            }
            definitions.push(BadgeDefinition {
                id: badge.id.clone(),
                title: badge.title.clone(),
                metric: Metric::parse(&badge.metric)?,
                requirement: badge.requirement,
                xp_reward: badge.xp_reward,
            });
        }
        Ok(BadgeCatalog::new(definitions))
    }
}

/// Loads gamification configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GamificationConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads gamification configuration from the default location (./config.toml).
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<GamificationConfig> {
    load_config("config.toml")
}
