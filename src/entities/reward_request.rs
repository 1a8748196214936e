//! Reward request entity - A points-redeemable wish moving through its lifecycle.
//!
//! Created pending with cost 0 by the account holder; a supervising role sets the
//! cost and approves it; the owner redeems it through the reward ledger, which
//! debits the points balance. Status transitions are one-directional:
//! pending → approved → redeemed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_requests")]
pub struct Model {
    /// Unique identifier for the reward request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning account
    pub account_id: i64,
    /// Human-readable title of the requested reward
    pub title: String,
    /// Free-form category for organization (e.g., "outing", "treat")
    pub category: String,
    /// Points cost, 0 while pending, set at approval
    pub cost: i64,
    /// Lifecycle status: `"pending"`, `"approved"`, or `"redeemed"`
    pub status: String,
    /// When the request was created
    pub created_at: DateTimeUtc,
    /// When the reward was redeemed, if it has been
    pub claimed_at: Option<DateTimeUtc>,
    /// Soft delete flag - if true, the request is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between `RewardRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reward request belongs to one account
    #[sea_orm(
        belongs_to = "super::user_account::Entity",
        from = "Column::AccountId",
        to = "super::user_account::Column::Id"
    )]
    UserAccount,
}

impl Related<super::user_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
