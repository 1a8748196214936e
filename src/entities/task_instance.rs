//! Task instance entity - One concrete dated occurrence of a task.
//!
//! Created by the recurrence generator (one row per expanded occurrence) or
//! directly for a one-off task. Reward amounts are fixed at creation time from
//! the priority and never change afterwards. Rows are soft-deleted so completed
//! history stays referenceable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task instance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_instances")]
pub struct Model {
    /// Unique identifier for the task instance
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning account
    pub account_id: i64,
    /// Human-readable title of the task
    pub title: String,
    /// Priority: `"low"`, `"medium"`, or `"high"` (parsed to [`crate::core::task::Priority`])
    pub priority: String,
    /// The calendar day this occurrence is due
    pub due_date: Date,
    /// Frequency tag the instance was expanded from (informational after expansion)
    pub frequency: String,
    /// Whether the task is currently completed
    pub completed: bool,
    /// When the task was completed, cleared when it is un-completed
    pub completed_at: Option<DateTimeUtc>,
    /// Experience awarded on completion, fixed at creation from the priority
    pub experience_reward: i64,
    /// Points awarded on completion, fixed at creation from the priority
    pub points_reward: i64,
    /// Soft delete flag - if true, the task is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between `TaskInstance` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each task instance belongs to one account
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
