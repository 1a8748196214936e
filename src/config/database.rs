//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions, using `Schema::create_table_from_entity` so the
//! schema always matches the Rust struct definitions without manual SQL.

use crate::entities::{BadgeUnlock, JournalEntry, RewardRequest, TaskInstance, UserAccount};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns the default `SQLite` path.
///
/// # Errors
/// Infallible today; returns `Result` so callers are insulated from future
/// validation of the URL.
pub fn get_database_url() -> Result<String> {
    Ok(std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/thrive.sqlite".to_string()))
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local file.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url()?;
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions.
///
/// Also creates the composite index that backs the per-day-per-priority quota
/// counts during task creation; that query runs once per occurrence in a
/// batch, so it has to stay an index lookup.
///
/// # Errors
/// Returns an error if any DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let account_table = schema.create_table_from_entity(UserAccount);
    let task_table = schema.create_table_from_entity(TaskInstance);
    let reward_table = schema.create_table_from_entity(RewardRequest);
    let badge_table = schema.create_table_from_entity(BadgeUnlock);
    let journal_table = schema.create_table_from_entity(JournalEntry);

    db.execute(builder.build(&account_table)).await?;
    db.execute(builder.build(&task_table)).await?;
    db.execute(builder.build(&reward_table)).await?;
    db.execute(builder.build(&badge_table)).await?;
    db.execute(builder.build(&journal_table)).await?;

    let quota_index = Index::create()
        .name("idx_task_instances_quota")
        .table(TaskInstance)
        .col(crate::entities::TaskInstanceColumn::AccountId)
        .col(crate::entities::TaskInstanceColumn::DueDate)
        .col(crate::entities::TaskInstanceColumn::Priority)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&quota_index)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{
        badge_unlock::Model as BadgeUnlockModel, journal_entry::Model as JournalEntryModel,
        reward_request::Model as RewardRequestModel, task_instance::Model as TaskInstanceModel,
        user_account::Model as UserAccountModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserAccountModel> = UserAccount::find().limit(1).all(&db).await?;
        let _: Vec<TaskInstanceModel> = TaskInstance::find().limit(1).all(&db).await?;
        let _: Vec<RewardRequestModel> = RewardRequest::find().limit(1).all(&db).await?;
        let _: Vec<BadgeUnlockModel> = BadgeUnlock::find().limit(1).all(&db).await?;
        let _: Vec<JournalEntryModel> = JournalEntry::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_rerunnable_index() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // The index carries IF NOT EXISTS, so re-creating it alone is fine.
        let builder = db.get_database_backend();
        let quota_index = Index::create()
            .name("idx_task_instances_quota")
            .table(TaskInstance)
            .col(crate::entities::TaskInstanceColumn::AccountId)
            .col(crate::entities::TaskInstanceColumn::DueDate)
            .col(crate::entities::TaskInstanceColumn::Priority)
            .if_not_exists()
            .to_owned();
        db.execute(builder.build(&quota_index)).await?;

        Ok(())
    }

    #[test]
    fn test_default_database_url() {
        // Only exercise the fallback when the variable is absent; tests must
        // not unset a caller-provided DATABASE_URL.
        if std::env::var("DATABASE_URL").is_err() {
            let url = get_database_url().unwrap();
            assert_eq!(url, "sqlite://data/thrive.sqlite");
        }
    }
}
