/// Database configuration and connection management
pub mod database;

/// Gamification tuning (quotas and badge catalog) from config.toml
pub mod gamification;
