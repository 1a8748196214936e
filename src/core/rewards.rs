//! Reward ledger business logic - The request → approve-cost → redeem lifecycle.
//!
//! Requests are created pending with cost 0 by the account holder, priced and
//! approved by a supervising role, and redeemed by the owner, which debits the
//! points balance. Status transitions are one-directional and every operation
//! is all-or-nothing: a failed redemption leaves both the request and the
//! balance untouched.

use crate::{
    core::supervision::SupervisionOracle,
    entities::{RewardRequest, UserAccount, reward_request},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Anti-spam cap on non-deleted reward requests per account.
pub const MAX_ACTIVE_REQUESTS: u64 = 20;

/// Lifecycle status of a reward request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardStatus {
    /// Created by the owner, cost not yet set
    Pending,
    /// Cost set by a supervising role, redeemable
    Approved,
    /// Redeemed by the owner; terminal
    Redeemed,
}

impl RewardStatus {
    /// The string form stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Redeemed => "redeemed",
        }
    }

    /// Parses a stored status column value.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for values outside the lifecycle set.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(Error::Config {
                message: format!("unknown reward status '{other}'"),
            }),
        }
    }
}

/// Result of a successful redemption.
#[derive(Debug, Clone)]
pub struct RedemptionOutcome {
    /// The redeemed request, with status and `claimed_at` updated
    pub reward: reward_request::Model,
    /// Points balance remaining after the debit
    pub remaining_points: i64,
}

/// Creates a pending reward request with cost 0.
///
/// # Errors
/// - [`Error::Config`] for an empty title
/// - [`Error::AccountNotFound`] if the account does not exist
/// - [`Error::TooManyActive`] once the account holds [`MAX_ACTIVE_REQUESTS`]
///   non-deleted requests
pub async fn request_reward(
    db: &DatabaseConnection,
    account_id: i64,
    title: String,
    category: String,
) -> Result<reward_request::Model> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "reward title cannot be empty".to_string(),
        });
    }

    // The cap count and the insert must not be separable, or two racing
    // requests could both observe a free slot.
    let txn = db.begin().await?;

    UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let active = RewardRequest::find()
        .filter(reward_request::Column::AccountId.eq(account_id))
        .filter(reward_request::Column::IsDeleted.eq(false))
        .count(&txn)
        .await?;
    if active >= MAX_ACTIVE_REQUESTS {
        return Err(Error::TooManyActive {
            limit: MAX_ACTIVE_REQUESTS,
        });
    }

    let request = reward_request::ActiveModel {
        account_id: Set(account_id),
        title: Set(title.trim().to_string()),
        category: Set(category),
        cost: Set(0),
        status: Set(RewardStatus::Pending.as_str().to_string()),
        created_at: Set(Utc::now()),
        claimed_at: Set(None),
        is_deleted: Set(false),
        ..Default::default()
    };
    let request = request.insert(&txn).await?;
    txn.commit().await?;
    Ok(request)
}

/// Sets a reward's cost and advances it to approved. Supervising role only.
///
/// Re-pricing an already-approved reward is allowed (the status does not move
/// backward); a redeemed reward can no longer be touched.
///
/// # Errors
/// - [`Error::RewardNotFound`] if the request is missing or deleted
/// - [`Error::Forbidden`] when the caller does not supervise the owner
/// - [`Error::InvalidAmount`] for a non-positive cost
/// - [`Error::InvalidState`] if the reward was already redeemed
pub async fn set_reward_cost<O: SupervisionOracle>(
    db: &DatabaseConnection,
    oracle: &O,
    caller_id: i64,
    reward_id: i64,
    cost: i64,
) -> Result<reward_request::Model> {
    let reward = RewardRequest::find()
        .filter(reward_request::Column::Id.eq(reward_id))
        .filter(reward_request::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?;

    if !oracle.supervises(caller_id, reward.account_id) {
        return Err(Error::Forbidden {
            caller_id,
            account_id: reward.account_id,
        });
    }

    if cost <= 0 {
        return Err(Error::InvalidAmount { amount: cost });
    }

    if RewardStatus::parse(&reward.status)? == RewardStatus::Redeemed {
        return Err(Error::InvalidState {
            status: reward.status,
        });
    }

    let mut model: reward_request::ActiveModel = reward.into();
    model.cost = Set(cost);
    model.status = Set(RewardStatus::Approved.as_str().to_string());
    model.update(db).await.map_err(Into::into)
}

/// Redeems an approved reward using the current time.
///
/// # Errors
/// See [`redeem_reward_at`].
pub async fn redeem_reward(
    db: &DatabaseConnection,
    account_id: i64,
    reward_id: i64,
) -> Result<RedemptionOutcome> {
    redeem_reward_at(db, account_id, reward_id, Utc::now()).await
}

/// Redeems an approved reward at an explicit instant. Owner only.
///
/// Debits the points balance and marks the request redeemed inside a single
/// transaction; any failure leaves both untouched.
///
/// # Errors
/// - [`Error::RewardNotFound`] if the request is missing, deleted, or owned by
///   another account
/// - [`Error::InvalidState`] unless the request is approved
/// - [`Error::InsufficientBalance`] if the points balance is below the cost
pub async fn redeem_reward_at(
    db: &DatabaseConnection,
    account_id: i64,
    reward_id: i64,
    now: DateTimeUtc,
) -> Result<RedemptionOutcome> {
    let txn = db.begin().await?;

    let reward = RewardRequest::find()
        .filter(reward_request::Column::Id.eq(reward_id))
        .filter(reward_request::Column::AccountId.eq(account_id))
        .filter(reward_request::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?;

    if RewardStatus::parse(&reward.status)? != RewardStatus::Approved {
        return Err(Error::InvalidState {
            status: reward.status,
        });
    }

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    if account.points < reward.cost {
        return Err(Error::InsufficientBalance {
            current: account.points,
            required: reward.cost,
        });
    }

    let remaining = account.points - reward.cost;
    let mut account_model: crate::entities::user_account::ActiveModel = account.into();
    account_model.points = Set(remaining);
    account_model.update(&txn).await?;

    let cost = reward.cost;
    let mut reward_model: reward_request::ActiveModel = reward.into();
    reward_model.status = Set(RewardStatus::Redeemed.as_str().to_string());
    reward_model.claimed_at = Set(Some(now));
    let redeemed = reward_model.update(&txn).await?;

    txn.commit().await?;

    info!(account_id, reward_id, cost, remaining, "reward redeemed");

    Ok(RedemptionOutcome {
        reward: redeemed,
        remaining_points: remaining,
    })
}

/// Soft-deletes a reward request. Owner only, any status; never touches points.
///
/// # Errors
/// Returns [`Error::RewardNotFound`] if the request is missing, already
/// deleted, or owned by another account.
pub async fn delete_reward(
    db: &DatabaseConnection,
    account_id: i64,
    reward_id: i64,
) -> Result<()> {
    let reward = RewardRequest::find()
        .filter(reward_request::Column::Id.eq(reward_id))
        .filter(reward_request::Column::AccountId.eq(account_id))
        .filter(reward_request::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?;

    let mut model: reward_request::ActiveModel = reward.into();
    model.is_deleted = Set(true);
    model.update(db).await?;
    Ok(())
}

/// Retrieves all active (non-deleted) reward requests for an account, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_active_rewards(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<reward_request::Model>> {
    RewardRequest::find()
        .filter(reward_request::Column::AccountId.eq(account_id))
        .filter(reward_request::Column::IsDeleted.eq(false))
        .order_by_desc(reward_request::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::account::get_account;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_request_starts_pending_with_zero_cost() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let reward = request_reward(
            &db,
            account.id,
            "Movie night".to_string(),
            "outing".to_string(),
        )
        .await?;

        assert_eq!(reward.status, "pending");
        assert_eq!(reward.cost, 0);
        assert!(reward.claimed_at.is_none());
        assert!(!reward.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_request_empty_title_rejected() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let result = request_reward(&db, account.id, "  ".to_string(), "x".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_spam_cap_at_twenty_active_requests() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        for i in 0..MAX_ACTIVE_REQUESTS {
            request_reward(&db, account.id, format!("Wish {i}"), "misc".to_string()).await?;
        }

        let result =
            request_reward(&db, account.id, "One more".to_string(), "misc".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TooManyActive { limit: MAX_ACTIVE_REQUESTS }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_capped_request_leaves_exactly_the_cap() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        for i in 0..MAX_ACTIVE_REQUESTS {
            request_reward(&db, account.id, format!("Wish {i}"), "misc".to_string()).await?;
        }

        // The refused request is all-or-nothing: no row may land past the cap.
        let result =
            request_reward(&db, account.id, "Too many".to_string(), "misc".to_string()).await;
        assert!(result.is_err());

        let active = get_active_rewards(&db, account.id).await?;
        assert_eq!(active.len() as u64, MAX_ACTIVE_REQUESTS);

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_requests_free_cap_slots() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let mut first_id = None;
        for i in 0..MAX_ACTIVE_REQUESTS {
            let reward =
                request_reward(&db, account.id, format!("Wish {i}"), "misc".to_string()).await?;
            first_id.get_or_insert(reward.id);
        }

        delete_reward(&db, account.id, first_id.unwrap()).await?;
        let reward =
            request_reward(&db, account.id, "Freed slot".to_string(), "misc".to_string()).await?;
        assert_eq!(reward.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_set_cost_requires_supervision() -> Result<()> {
        let db = setup_test_db().await?;
        let supervisor = create_test_account(&db, "Supervisor").await?;
        let child = create_test_account(&db, "Child").await?;
        let reward = request_reward(&db, child.id, "Ice cream".to_string(), "treat".to_string())
            .await?;

        // Even the owner cannot price their own request.
        let result = set_reward_cost(
            &db,
            &crate::core::supervision::SelfOnly,
            child.id,
            reward.id,
            50,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden {
                caller_id: _,
                account_id: _
            }
        ));

        let approved = set_reward_cost(&db, &Supervises, supervisor.id, reward.id, 50).await?;
        assert_eq!(approved.status, "approved");
        assert_eq!(approved.cost, 50);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_cost_rejects_non_positive_cost() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;

        for bad in [0, -5] {
            let result = set_reward_cost(&db, &Supervises, account.id, reward.id, bad).await;
            assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_happy_path() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 80).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, account.id, reward.id, 50).await?;

        let outcome = redeem_reward(&db, account.id, reward.id).await?;
        assert_eq!(outcome.reward.status, "redeemed");
        assert!(outcome.reward.claimed_at.is_some());
        assert_eq!(outcome.remaining_points, 30);
        assert_eq!(get_account(&db, account.id).await?.points, 30);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_insufficient_balance_mutates_nothing() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 30).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, account.id, reward.id, 50).await?;

        let result = redeem_reward(&db, account.id, reward.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientBalance {
                current: 30,
                required: 50
            }
        ));

        // All-or-nothing: balance and status are untouched.
        assert_eq!(get_account(&db, account.id).await?.points, 30);
        let reward = RewardRequest::find_by_id(reward.id).one(&db).await?.unwrap();
        assert_eq!(reward.status, "approved");
        assert!(reward.claimed_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_pending_is_invalid_state() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 100).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;

        let result = redeem_reward(&db, account.id, reward.id).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { status } if status == "pending"));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_twice_is_invalid_state() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 100).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, account.id, reward.id, 40).await?;

        redeem_reward(&db, account.id, reward.id).await?;
        let result = redeem_reward(&db, account.id, reward.id).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { status } if status == "redeemed"));

        // Redeemed exactly once: only one debit happened.
        assert_eq!(get_account(&db, account.id).await?.points, 60);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeemed_reward_cannot_be_repriced() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 100).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, account.id, reward.id, 40).await?;
        redeem_reward(&db, account.id, reward.id).await?;

        let result = set_reward_cost(&db, &Supervises, account.id, reward.id, 10).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { status } if status == "redeemed"));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_wrong_owner_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_account(&db, "Owner").await?;
        let other = create_test_account(&db, "Other").await?;
        let reward =
            request_reward(&db, owner.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, owner.id, reward.id, 10).await?;

        let result = redeem_reward(&db, other.id, reward.id).await;
        assert!(matches!(result.unwrap_err(), Error::RewardNotFound { id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_does_not_touch_points() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        grant_points(&db, account.id, 100).await?;
        let reward =
            request_reward(&db, account.id, "Wish".to_string(), "misc".to_string()).await?;
        set_reward_cost(&db, &Supervises, account.id, reward.id, 40).await?;

        delete_reward(&db, account.id, reward.id).await?;
        assert_eq!(get_account(&db, account.id).await?.points, 100);

        // Deleted rewards behave as missing from then on.
        let result = redeem_reward(&db, account.id, reward.id).await;
        assert!(matches!(result.unwrap_err(), Error::RewardNotFound { id: _ }));
        let result = delete_reward(&db, account.id, reward.id).await;
        assert!(matches!(result.unwrap_err(), Error::RewardNotFound { id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_active_rewards_filters_deleted() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let keep = request_reward(&db, account.id, "Keep".to_string(), "misc".to_string()).await?;
        let drop = request_reward(&db, account.id, "Drop".to_string(), "misc".to_string()).await?;
        delete_reward(&db, account.id, drop.id).await?;

        let active = get_active_rewards(&db, account.id).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);

        Ok(())
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            RewardStatus::Pending,
            RewardStatus::Approved,
            RewardStatus::Redeemed,
        ] {
            assert_eq!(RewardStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(RewardStatus::parse("cancelled").is_err());
    }
}
