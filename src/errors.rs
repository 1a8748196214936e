//! Unified error types for the gamification core.
//!
//! Every domain error is terminal for the single operation that raised it and
//! never leaves partial state behind; persistence failures are wrapped from
//! `SeaORM` and are safe to retry, since each operation re-evaluates its
//! preconditions from fresh state on every attempt.

use thiserror::Error;

/// All error kinds surfaced by the core's operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The account does not exist
    #[error("account {id} not found")]
    AccountNotFound {
        /// Account ID that was looked up
        id: i64,
    },

    /// The task does not exist, is deleted, or is owned by someone else
    #[error("task {id} not found")]
    TaskNotFound {
        /// Task ID that was looked up
        id: i64,
    },

    /// The reward request does not exist, is deleted, or is owned by someone else
    #[error("reward request {id} not found")]
    RewardNotFound {
        /// Reward request ID that was looked up
        id: i64,
    },

    /// The badge ID is not part of the configured catalog
    #[error("badge '{id}' is not in the catalog")]
    BadgeNotFound {
        /// Badge ID that was looked up
        id: String,
    },

    /// The caller lacks the supervising relationship required for this action
    #[error("caller {caller_id} may not act on account {account_id}")]
    Forbidden {
        /// Who attempted the action
        caller_id: i64,
        /// Whose data the action targeted
        account_id: i64,
    },

    /// The operation is not legal in the entity's current status
    #[error("operation not valid while status is '{status}'")]
    InvalidState {
        /// Status the entity was in when the operation was attempted
        status: String,
    },

    /// Points balance is below the redemption cost
    #[error("insufficient points: have {current}, need {required}")]
    InsufficientBalance {
        /// Current points balance
        current: i64,
        /// Points required by the operation
        required: i64,
    },

    /// A weekly/monthly recurrence request is missing or has out-of-range selectors
    #[error("invalid recurrence selector: {message}")]
    InvalidSelector {
        /// What was wrong with the selectors
        message: String,
    },

    /// The account already holds the maximum number of active reward requests
    #[error("account already has {limit} active reward requests")]
    TooManyActive {
        /// The configured cap
        limit: u64,
    },

    /// An amount that must be positive was zero or negative
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: i64,
    },

    /// Configuration loading or validation failure
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Underlying database error
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
