//! Journal entry entity - Free-form writing with an optional enrichment annotation.
//!
//! The annotation is produced by the best-effort text-analysis service and never
//! participates in reward computation; entries are stored unannotated when the
//! service is unavailable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Journal entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    /// Unique identifier for the journal entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning account
    pub account_id: i64,
    /// The journal text itself
    pub content: String,
    /// Optional annotation from the text-analysis enrichment service
    pub annotation: Option<String>,
    /// When the entry was written
    pub created_at: DateTimeUtc,
    /// Soft delete flag - if true, the entry is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between `JournalEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each journal entry belongs to one account
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
