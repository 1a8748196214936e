//! Service entry point: wires configuration, logging, and the database
//! together, leaving request handling to whatever front end embeds the crate.

use thrive_core::config::{database, gamification};
use thrive_core::errors::Result;

use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Gamification tuning is optional; fall back to compiled-in defaults
    let gamification_config = match gamification::load_default_config() {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "no usable config.toml; using built-in quotas and badge catalog");
            gamification::GamificationConfig::default()
        }
    };
    let catalog = gamification_config.catalog()?;
    info!(
        badges = catalog.len(),
        high_quota = ?gamification_config.quotas.high,
        medium_quota = ?gamification_config.quotas.medium,
        low_quota = ?gamification_config.quotas.low,
        "gamification configuration loaded"
    );

    // 4. Initialize database
    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!("database initialized");

    info!("economy core ready");
    Ok(())
}
