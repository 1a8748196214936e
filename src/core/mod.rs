//! Core business logic - framework-agnostic gamification economy operations.
//!
//! Every operation here is server-authoritative: it runs as a single atomic
//! read-modify-write against the store, keeps the cached level equal to
//! `level_for(experience)`, and triggers the badge unlock engine inside the
//! same transaction as the statistic change that warrants it.

/// Account creation, lookup, and out-of-band corrections
pub mod account;
/// Badge unlock engine with the self-healing reconciliation pass
pub mod badges;
/// Journaling with best-effort text enrichment
pub mod journal;
/// Pure experience-to-level mapping
pub mod leveling;
/// Client-side optimistic mirror of the economy rules
pub mod optimistic;
/// Schedule expansion into concrete occurrence dates
pub mod recurrence;
/// Reward request lifecycle and points ledger
pub mod rewards;
/// Supervision relationship oracle consumed from the authorization service
pub mod supervision;
/// Task creation with quotas and the completion state machine
pub mod task;
/// Meditation daily cap and mood check-in cooldown gates
pub mod wellness;
