//! Account business logic - Creation, lookup, and out-of-band corrections.

use crate::{
    core::leveling,
    entities::{UserAccount, user_account},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// Creates a new account with zeroed stats at level 1.
///
/// # Errors
/// Returns [`Error::Config`] for an empty display name, or an error if the
/// insert fails.
pub async fn create_account(
    db: &DatabaseConnection,
    display_name: String,
) -> Result<user_account::Model> {
    if display_name.trim().is_empty() {
        return Err(Error::Config {
            message: "display name cannot be empty".to_string(),
        });
    }

    let account = user_account::ActiveModel {
        display_name: Set(display_name.trim().to_string()),
        experience: Set(0),
        level: Set(leveling::level_for(0)),
        points: Set(0),
        streak: Set(0),
        completed_task_count: Set(0),
        journal_entry_count: Set(0),
        total_meditation_minutes: Set(0),
        daily_meditation_count: Set(0),
        last_meditation_at: Set(None),
        last_mood_xp_at: Set(None),
        last_task_xp_at: Set(None),
        ..Default::default()
    };
    account.insert(db).await.map_err(Into::into)
}

/// Retrieves an account by ID.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account does not exist.
pub async fn get_account(db: &DatabaseConnection, account_id: i64) -> Result<user_account::Model> {
    UserAccount::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Out-of-band experience correction (operator use).
///
/// Clamps at zero and recomputes the cached level in the same update, so the
/// level invariant holds even through corrections. Badge unlocks are left to
/// the next badge check, whose self-heal pass will remove any level badge the
/// corrected experience no longer justifies.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account does not exist.
pub async fn set_experience(
    db: &DatabaseConnection,
    account_id: i64,
    experience: i64,
) -> Result<user_account::Model> {
    let txn = db.begin().await?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let clamped = experience.max(0);
    let mut model: user_account::ActiveModel = account.into();
    model.experience = Set(clamped);
    model.level = Set(leveling::level_for(clamped));
    let updated = model.update(&txn).await?;

    txn.commit().await?;

    info!(account_id, experience = clamped, "experience corrected out of band");
    Ok(updated)
}
