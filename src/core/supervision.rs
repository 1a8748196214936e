//! Supervision relationship oracle.
//!
//! The core does not own the relationship data between accounts; it consults an
//! external authorization service as a boolean oracle. Reward cost approval and
//! cross-account task creation are the two operations gated on it.

/// Answers whether a caller holds a supervising relationship over an account.
pub trait SupervisionOracle {
    /// Returns true if `caller_id` supervises `account_id`.
    fn supervises(&self, caller_id: i64, account_id: i64) -> bool;
}

/// An oracle with no supervision relationships at all.
///
/// Useful as a default for deployments where every account manages itself;
/// cross-account actions are always refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfOnly;

impl SupervisionOracle for SelfOnly {
    fn supervises(&self, _caller_id: i64, _account_id: i64) -> bool {
        false
    }
}
