//! User account entity - The one piece of truly shared, concurrently-mutated state.
//!
//! Holds the economy stats (experience, cached level, spendable points) plus the
//! counters and timestamps that feed badge evaluation and the cooldown gates.
//! `level` is a cache of `leveling::level_for(experience)` and is never updated
//! independently of `experience`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the account holder
    pub display_name: String,
    /// Accumulated experience points, never negative
    pub experience: i64,
    /// Cached level, always equal to `level_for(experience)`
    pub level: i64,
    /// Spendable points balance, never negative
    pub points: i64,
    /// Consecutive-day task completion counter
    pub streak: i64,
    /// Lifetime count of completed task instances
    pub completed_task_count: i64,
    /// Lifetime count of journal entries
    pub journal_entry_count: i64,
    /// Lifetime meditation minutes, accumulated whether or not a bonus was granted
    pub total_meditation_minutes: i64,
    /// Meditation sessions completed today, reset on the first session of a new day
    pub daily_meditation_count: i64,
    /// When the most recent meditation session completed
    pub last_meditation_at: Option<DateTimeUtc>,
    /// When mood-logging XP was last granted (drives the one-hour cooldown)
    pub last_mood_xp_at: Option<DateTimeUtc>,
    /// When task-completion XP was last granted (drives the reversal heuristic)
    pub last_task_xp_at: Option<DateTimeUtc>,
}

/// Defines relationships between `UserAccount` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many task instances
    #[sea_orm(has_many = "super::task_instance::Entity")]
    TaskInstances,
    /// One account has many reward requests
    #[sea_orm(has_many = "super::reward_request::Entity")]
    RewardRequests,
    /// One account has many badge unlocks
    #[sea_orm(has_many = "super::badge_unlock::Entity")]
    BadgeUnlocks,
    /// One account has many journal entries
    #[sea_orm(has_many = "super::journal_entry::Entity")]
    JournalEntries,
}

impl Related<super::task_instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskInstances.def()
    }
}

impl Related<super::reward_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardRequests.def()
    }
}

impl Related<super::badge_unlock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgeUnlocks.def()
    }
}

impl Related<super::journal_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
