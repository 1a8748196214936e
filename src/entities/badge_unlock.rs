//! Badge unlock entity - A derived, self-correcting relation.
//!
//! Each row records that an account currently satisfies a badge definition from
//! the static catalog. Rows are inserted by the badge unlock engine and may also
//! be deleted by its self-heal pass when a previously-met threshold is no longer
//! met after an out-of-band statistics correction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Badge unlock database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge_unlocks")]
pub struct Model {
    /// Unique identifier for the unlock row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the account holding the badge
    pub account_id: i64,
    /// Catalog ID of the unlocked badge
    pub badge_id: String,
    /// When the badge was unlocked
    pub unlocked_at: DateTimeUtc,
}

/// Defines relationships between `BadgeUnlock` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each badge unlock belongs to one account
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
