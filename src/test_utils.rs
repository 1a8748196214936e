//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        account,
        badges::{BadgeCatalog, BadgeDefinition, Metric},
        recurrence::Schedule,
        supervision::SupervisionOracle,
        task::{self, DailyQuotas, Priority, TaskBatch},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// An oracle that supervises everyone; used to exercise cross-account paths.
pub struct Supervises;

impl SupervisionOracle for Supervises {
    fn supervises(&self, _caller_id: i64, _account_id: i64) -> bool {
        true
    }
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test account with zeroed stats.
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user_account::Model> {
    account::create_account(db, name.to_string()).await
}

/// Sets up a complete test environment with one account.
/// Returns (db, account) for common test scenarios.
pub async fn setup_with_account() -> Result<(DatabaseConnection, entities::user_account::Model)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, "Test Account").await?;
    Ok((db, account))
}

/// Creates a single-occurrence task on the account's own behalf with default
/// quotas, returning the whole batch so quota skips stay observable.
pub async fn create_one_off_task(
    db: &DatabaseConnection,
    account_id: i64,
    title: &str,
    priority: Priority,
    due: NaiveDate,
) -> Result<TaskBatch> {
    task::create_task(
        db,
        &Supervises,
        &DailyQuotas::default(),
        account_id,
        account_id,
        title.to_string(),
        priority,
        &Schedule::Once,
        due,
    )
    .await
}

/// A catalog with no definitions, for tests that assert on the raw economy
/// without badge bonuses interfering.
#[must_use]
pub fn empty_catalog() -> BadgeCatalog {
    BadgeCatalog::new(Vec::new())
}

/// A catalog built from explicit definitions.
#[must_use]
pub fn catalog_with(definitions: Vec<BadgeDefinition>) -> BadgeCatalog {
    BadgeCatalog::new(definitions)
}

/// Builds a badge definition with a derived title.
#[must_use]
pub fn test_badge(id: &str, metric: Metric, requirement: i64, xp_reward: i64) -> BadgeDefinition {
    BadgeDefinition {
        id: id.to_string(),
        title: format!("Badge {id}"),
        metric,
        requirement,
        xp_reward,
    }
}

/// Directly credits points to an account, bypassing the task economy.
pub async fn grant_points(db: &DatabaseConnection, account_id: i64, amount: i64) -> Result<()> {
    let account = account::get_account(db, account_id).await?;
    let new_points = account.points + amount;
    let mut model: entities::user_account::ActiveModel = account.into();
    model.points = Set(new_points);
    model.update(db).await?;
    Ok(())
}

/// Zeroes an account's points balance.
pub async fn drain_points(db: &DatabaseConnection, account_id: i64) -> Result<()> {
    let account = account::get_account(db, account_id).await?;
    let mut model: entities::user_account::ActiveModel = account.into();
    model.points = Set(0);
    model.update(db).await?;
    Ok(())
}
