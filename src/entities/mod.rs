//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod badge_unlock;
pub mod journal_entry;
pub mod reward_request;
pub mod task_instance;
pub mod user_account;

// Re-export specific types to avoid conflicts
pub use badge_unlock::{
    Column as BadgeUnlockColumn, Entity as BadgeUnlock, Model as BadgeUnlockModel,
};
pub use journal_entry::{
    Column as JournalEntryColumn, Entity as JournalEntry, Model as JournalEntryModel,
};
pub use reward_request::{
    Column as RewardRequestColumn, Entity as RewardRequest, Model as RewardRequestModel,
};
pub use task_instance::{
    Column as TaskInstanceColumn, Entity as TaskInstance, Model as TaskInstanceModel,
};
pub use user_account::{
    Column as UserAccountColumn, Entity as UserAccount, Model as UserAccountModel,
};
