//! Optimistic client mirror - Local, instantly-updated copy of the economy stats.
//!
//! Front ends keep one of these per signed-in account for instant feedback: it
//! applies the same pure rules (leveling, fixed priority rewards, balance
//! floor) the server applies, but it is never a source of truth. Every
//! authoritative read overwrites it wholesale, last-write-wins.

use crate::{
    core::{leveling, task::Priority},
    entities::user_account,
};

/// In-memory mirror of an account's economy fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticStats {
    /// Mirrored experience
    pub experience: i64,
    /// Mirrored level, kept in sync with experience locally too
    pub level: i64,
    /// Mirrored points balance
    pub points: i64,
    /// Mirrored completed task count
    pub completed_tasks: i64,
}

impl Default for OptimisticStats {
    fn default() -> Self {
        Self {
            experience: 0,
            level: leveling::level_for(0),
            points: 0,
            completed_tasks: 0,
        }
    }
}

impl OptimisticStats {
    /// Seeds the mirror from an authoritative account row.
    #[must_use]
    pub fn from_account(account: &user_account::Model) -> Self {
        Self {
            experience: account.experience,
            level: leveling::level_for(account.experience),
            points: account.points,
            completed_tasks: account.completed_task_count,
        }
    }

    /// Locally applies a task completion's fixed rewards.
    pub fn apply_task_completion(&mut self, priority: Priority) {
        self.experience += priority.experience_reward();
        self.level = leveling::level_for(self.experience);
        self.points += priority.points_reward();
        self.completed_tasks += 1;
    }

    /// Locally applies a task reversal, flooring at zero like the server does.
    pub fn apply_task_reversal(&mut self, priority: Priority) {
        self.experience = (self.experience - priority.experience_reward()).max(0);
        self.level = leveling::level_for(self.experience);
        self.points = (self.points - priority.points_reward()).max(0);
        self.completed_tasks = (self.completed_tasks - 1).max(0);
    }

    /// Locally applies a redemption. Returns false (and changes nothing) when
    /// the mirrored balance cannot cover the cost.
    pub const fn apply_redeem(&mut self, cost: i64) -> bool {
        if cost < 0 || self.points < cost {
            return false;
        }
        self.points -= cost;
        true
    }

    /// Overwrites the mirror from a fresh authoritative read, last-write-wins.
    /// Any optimistic drift is discarded; the server row is the truth.
    pub fn reconcile(&mut self, account: &user_account::Model) {
        *self = Self::from_account(account);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_matches_server_rules() {
        let mut stats = OptimisticStats::default();
        stats.apply_task_completion(Priority::High);
        stats.apply_task_completion(Priority::High);
        stats.apply_task_completion(Priority::High);
        stats.apply_task_completion(Priority::Low);

        assert_eq!(stats.experience, 100);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.points, 130);
        assert_eq!(stats.completed_tasks, 4);
    }

    #[test]
    fn test_reversal_floors_at_zero() {
        let mut stats = OptimisticStats::default();
        stats.apply_task_completion(Priority::Low);
        stats.apply_task_reversal(Priority::High);

        assert_eq!(stats.experience, 0);
        assert_eq!(stats.points, 0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.completed_tasks, 0);
    }

    #[test]
    fn test_redeem_refuses_overdraft() {
        let mut stats = OptimisticStats {
            points: 30,
            ..OptimisticStats::default()
        };

        assert!(!stats.apply_redeem(50));
        assert_eq!(stats.points, 30);
        assert!(stats.apply_redeem(30));
        assert_eq!(stats.points, 0);
    }

    #[test]
    fn test_reconcile_is_last_write_wins() {
        let mut stats = OptimisticStats::default();
        stats.apply_task_completion(Priority::High);

        // The authoritative row disagrees (e.g., a quota skip or a heuristic
        // miss the mirror guessed wrong about); it simply wins.
        let authoritative = user_account::Model {
            id: 1,
            display_name: "Robin".to_string(),
            experience: 10,
            level: 1,
            points: 10,
            streak: 0,
            completed_task_count: 1,
            journal_entry_count: 0,
            total_meditation_minutes: 0,
            daily_meditation_count: 0,
            last_meditation_at: None,
            last_mood_xp_at: None,
            last_task_xp_at: None,
        };
        stats.reconcile(&authoritative);

        assert_eq!(stats, OptimisticStats::from_account(&authoritative));
        assert_eq!(stats.experience, 10);
        assert_eq!(stats.points, 10);
    }
}
