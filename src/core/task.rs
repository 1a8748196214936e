//! Task business logic - Creation with quota enforcement and the completion toggle.
//!
//! Task creation expands a schedule into dated instances, skipping (not failing)
//! occurrences that would exceed the per-day-per-priority quota; creation is
//! partial-success by design. The completion toggle awards or reverses the
//! fixed priority rewards, keeps the cached level in sync with experience, and
//! triggers the badge unlock engine inside the same database transaction.

use crate::{
    core::{
        badges::{self, BadgeCatalog},
        leveling, recurrence,
        recurrence::Schedule,
        supervision::SupervisionOracle,
    },
    entities::{TaskInstance, UserAccount, badge_unlock, task_instance},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// How close `last_task_xp_at` must be to a task's `completed_at` for an
/// un-complete to be treated as the completion that produced the last award.
///
/// This is a best-effort heuristic, not an exact ledger: a completion followed
/// by another task's completion will (intentionally) fail the proximity check
/// and reverse nothing. Concurrent completions or delayed writes can
/// mis-attribute the award; an exact per-award ledger would be a behavior
/// change and is deliberately not implemented.
pub const REVERSAL_WINDOW_SECONDS: i64 = 5;

/// Task priority, with the reward pair fixed per priority at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Low priority: 10 XP / 10 points
    Low,
    /// Medium priority: 20 XP / 20 points
    Medium,
    /// High priority: 30 XP / 40 points
    High,
}

impl Priority {
    /// The string form stored in the `priority` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a stored priority column value.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for values outside low/medium/high.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::Config {
                message: format!("unknown task priority '{other}'"),
            }),
        }
    }

    /// Experience awarded when a task of this priority is completed.
    #[must_use]
    pub const fn experience_reward(self) -> i64 {
        match self {
            Self::Low => 10,
            Self::Medium => 20,
            Self::High => 30,
        }
    }

    /// Points awarded when a task of this priority is completed.
    #[must_use]
    pub const fn points_reward(self) -> i64 {
        match self {
            Self::Low => 10,
            Self::Medium => 20,
            Self::High => 40,
        }
    }
}

/// Per-day caps on active task instances, by priority.
///
/// `None` means the priority is uncapped. Loaded from `config.toml`; the
/// defaults cap high at 2/day and medium at 5/day, mirroring how much
/// high-stakes work a day should realistically hold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyQuotas {
    /// Daily cap for high-priority tasks
    pub high: Option<u64>,
    /// Daily cap for medium-priority tasks
    pub medium: Option<u64>,
    /// Daily cap for low-priority tasks
    pub low: Option<u64>,
}

impl Default for DailyQuotas {
    fn default() -> Self {
        Self {
            high: Some(2),
            medium: Some(5),
            low: None,
        }
    }
}

impl DailyQuotas {
    /// The cap that applies to the given priority, if any.
    #[must_use]
    pub const fn for_priority(&self, priority: Priority) -> Option<u64> {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Pure quota check shared by the server path and the optimistic client mirror.
#[must_use]
pub fn quota_allows(quotas: &DailyQuotas, priority: Priority, existing: u64) -> bool {
    quotas
        .for_priority(priority)
        .is_none_or(|quota| existing < quota)
}

/// An occurrence the recurrence expansion produced but creation skipped.
///
/// Quota skips are informational, never errors: the rest of the batch is
/// still created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOccurrence {
    /// The date the occurrence would have fallen on
    pub date: NaiveDate,
    /// The quota that was already full on that date
    pub quota: u64,
}

/// Result of a (possibly partial-success) task creation batch.
#[derive(Debug, Clone)]
pub struct TaskBatch {
    /// Instances that were created
    pub created: Vec<task_instance::Model>,
    /// Occurrences skipped because their day's quota was already full
    pub skipped: Vec<SkippedOccurrence>,
}

/// Result of toggling a task's completion state.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The task's completion state after the toggle
    pub completed: bool,
    /// Net experience change from the task itself (negative on reversal)
    pub xp_delta: i64,
    /// Net points change from the task itself (negative on reversal)
    pub points_delta: i64,
    /// Whether the task's own award pushed the account over a level boundary
    pub leveled_up: bool,
    /// Whether an un-complete actually reversed the award (heuristic hit)
    pub reward_reversed: bool,
    /// Badges newly unlocked by the triggered badge check
    pub newly_unlocked: Vec<badge_unlock::Model>,
    /// One-time bonus XP granted by those badge unlocks
    pub badge_bonus_xp: i64,
}

/// Creates task instances for a schedule, skipping occurrences over quota.
///
/// A caller creating tasks on another account must hold the supervising
/// relationship. For each candidate date the count of active instances with the
/// same account/date/priority is checked against the configured quota; full
/// days are skipped and reported in the batch result rather than aborting.
///
/// # Errors
/// - [`Error::Forbidden`] for a cross-account creation without supervision
/// - [`Error::AccountNotFound`] if the target account does not exist
/// - [`Error::Config`] for an empty title
/// - [`Error::InvalidSelector`] from the schedule expansion
#[allow(clippy::too_many_arguments)]
pub async fn create_task<O: SupervisionOracle>(
    db: &DatabaseConnection,
    oracle: &O,
    quotas: &DailyQuotas,
    caller_id: i64,
    account_id: i64,
    title: String,
    priority: Priority,
    schedule: &Schedule,
    anchor: NaiveDate,
) -> Result<TaskBatch> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "task title cannot be empty".to_string(),
        });
    }

    if caller_id != account_id && !oracle.supervises(caller_id, account_id) {
        return Err(Error::Forbidden {
            caller_id,
            account_id,
        });
    }

    // Selector validation happens here, before anything is written.
    let dates = recurrence::expand(schedule, anchor)?;

    let txn = db.begin().await?;

    UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for date in dates {
        let existing = TaskInstance::find()
            .filter(task_instance::Column::AccountId.eq(account_id))
            .filter(task_instance::Column::DueDate.eq(date))
            .filter(task_instance::Column::Priority.eq(priority.as_str()))
            .filter(task_instance::Column::IsDeleted.eq(false))
            .count(&txn)
            .await?;

        if !quota_allows(quotas, priority, existing) {
            skipped.push(SkippedOccurrence {
                date,
                // for_priority is Some here, otherwise quota_allows would have passed
                quota: quotas.for_priority(priority).unwrap_or(0),
            });
            continue;
        }

        let instance = task_instance::ActiveModel {
            account_id: Set(account_id),
            title: Set(title.trim().to_string()),
            priority: Set(priority.as_str().to_string()),
            due_date: Set(date),
            frequency: Set(schedule.frequency_tag().to_string()),
            completed: Set(false),
            completed_at: Set(None),
            experience_reward: Set(priority.experience_reward()),
            points_reward: Set(priority.points_reward()),
            is_deleted: Set(false),
            ..Default::default()
        };
        created.push(instance.insert(&txn).await?);
    }

    txn.commit().await?;

    info!(
        account_id,
        created = created.len(),
        skipped = skipped.len(),
        frequency = schedule.frequency_tag(),
        "expanded task schedule"
    );

    Ok(TaskBatch { created, skipped })
}

/// Toggles a task between pending and completed, using the current time.
///
/// See [`toggle_completion_at`] for the full contract.
///
/// # Errors
/// See [`toggle_completion_at`].
pub async fn toggle_completion(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    task_id: i64,
) -> Result<CompletionOutcome> {
    toggle_completion_at(db, catalog, account_id, task_id, Utc::now()).await
}

/// Toggles a task between pending and completed at an explicit instant.
///
/// Completing a pending task awards its fixed experience/points, recomputes the
/// cached level, advances the consecutive-day streak, stamps `last_task_xp_at`,
/// and runs the badge check. Un-completing a completed task clears its
/// timestamp and reverses the award only when `last_task_xp_at` sits within
/// [`REVERSAL_WINDOW_SECONDS`] of the task's `completed_at`; a heuristic miss
/// reverses nothing and is still a successful call. Everything runs inside a
/// single database transaction.
///
/// # Errors
/// - [`Error::TaskNotFound`] if the task is missing, deleted, or owned by
///   another account
/// - [`Error::AccountNotFound`] if the owning account row is gone
pub async fn toggle_completion_at(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    task_id: i64,
    now: DateTimeUtc,
) -> Result<CompletionOutcome> {
    let txn = db.begin().await?;

    let task = TaskInstance::find()
        .filter(task_instance::Column::Id.eq(task_id))
        .filter(task_instance::Column::AccountId.eq(account_id))
        .filter(task_instance::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or(Error::TaskNotFound { id: task_id })?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let outcome = if task.completed {
        uncomplete(&txn, catalog, task, account, now).await?
    } else {
        complete(&txn, catalog, task, account, now).await?
    };

    txn.commit().await?;
    Ok(outcome)
}

async fn complete<C>(
    txn: &C,
    catalog: &BadgeCatalog,
    task: task_instance::Model,
    account: crate::entities::user_account::Model,
    now: DateTimeUtc,
) -> Result<CompletionOutcome>
where
    C: ConnectionTrait,
{
    let account_id = account.id;
    let xp_reward = task.experience_reward;
    let points_reward = task.points_reward;

    let old_level = leveling::level_for(account.experience);
    let new_experience = account.experience + xp_reward;
    let new_streak = next_streak(&account, now);

    let mut task_model: task_instance::ActiveModel = task.into();
    task_model.completed = Set(true);
    task_model.completed_at = Set(Some(now));
    task_model.update(txn).await?;

    let new_points = account.points + points_reward;
    let new_count = account.completed_task_count + 1;
    let mut account_model: crate::entities::user_account::ActiveModel = account.into();
    account_model.experience = Set(new_experience);
    account_model.level = Set(leveling::level_for(new_experience));
    account_model.points = Set(new_points);
    account_model.completed_task_count = Set(new_count);
    account_model.streak = Set(new_streak);
    account_model.last_task_xp_at = Set(Some(now));
    account_model.update(txn).await?;

    let report = badges::run_badge_check(txn, catalog, account_id, now).await?;

    Ok(CompletionOutcome {
        completed: true,
        xp_delta: xp_reward,
        points_delta: points_reward,
        leveled_up: leveling::level_for(new_experience) > old_level,
        reward_reversed: false,
        newly_unlocked: report.newly_unlocked,
        badge_bonus_xp: report.bonus_xp,
    })
}

async fn uncomplete<C>(
    txn: &C,
    catalog: &BadgeCatalog,
    task: task_instance::Model,
    account: crate::entities::user_account::Model,
    now: DateTimeUtc,
) -> Result<CompletionOutcome>
where
    C: ConnectionTrait,
{
    let account_id = account.id;

    // Proximity heuristic: only reverse when this completion looks like the
    // one that produced the last award. If another task was completed
    // afterwards, last_task_xp_at has moved on and nothing is reversed.
    let reverse = match (account.last_task_xp_at, task.completed_at) {
        (Some(last_award), Some(completed_at)) => {
            (last_award - completed_at).num_seconds().abs() <= REVERSAL_WINDOW_SECONDS
        }
        _ => false,
    };

    let xp_reward = task.experience_reward;
    let points_reward = task.points_reward;

    let mut task_model: task_instance::ActiveModel = task.into();
    task_model.completed = Set(false);
    task_model.completed_at = Set(None);
    task_model.update(txn).await?;

    let new_count = (account.completed_task_count - 1).max(0);
    let mut account_model: crate::entities::user_account::ActiveModel = account.clone().into();
    account_model.completed_task_count = Set(new_count);

    let (xp_delta, points_delta) = if reverse {
        let new_experience = (account.experience - xp_reward).max(0);
        let new_points = (account.points - points_reward).max(0);
        account_model.experience = Set(new_experience);
        account_model.level = Set(leveling::level_for(new_experience));
        account_model.points = Set(new_points);
        // Cleared so a future completion can earn again the same day.
        account_model.last_task_xp_at = Set(None);
        (
            new_experience - account.experience,
            new_points - account.points,
        )
    } else {
        (0, 0)
    };

    account_model.update(txn).await?;

    let report = badges::run_badge_check(txn, catalog, account_id, now).await?;

    Ok(CompletionOutcome {
        completed: false,
        xp_delta,
        points_delta,
        leveled_up: false,
        reward_reversed: reverse,
        newly_unlocked: report.newly_unlocked,
        badge_bonus_xp: report.bonus_xp,
    })
}

/// Consecutive-day streak rule, keyed off the previous XP-granting day.
fn next_streak(account: &crate::entities::user_account::Model, now: DateTimeUtc) -> i64 {
    let today = now.date_naive();
    match account.last_task_xp_at.map(|t| t.date_naive()) {
        Some(day) if day == today => account.streak.max(1),
        Some(day) if (today - day).num_days() == 1 => account.streak + 1,
        _ => 1,
    }
}

/// Soft-deletes a task instance. Owner only; history rows are preserved.
///
/// # Errors
/// Returns [`Error::TaskNotFound`] if the task is missing, already deleted, or
/// owned by another account.
pub async fn delete_task(
    db: &DatabaseConnection,
    account_id: i64,
    task_id: i64,
) -> Result<()> {
    let task = TaskInstance::find()
        .filter(task_instance::Column::Id.eq(task_id))
        .filter(task_instance::Column::AccountId.eq(account_id))
        .filter(task_instance::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(Error::TaskNotFound { id: task_id })?;

    let mut model: task_instance::ActiveModel = task.into();
    model.is_deleted = Set(true);
    model.update(db).await?;
    Ok(())
}

/// Retrieves all active (non-deleted) task instances for an account, ordered by due date.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_active_tasks(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<task_instance::Model>> {
    TaskInstance::find()
        .filter(task_instance::Column::AccountId.eq(account_id))
        .filter(task_instance::Column::IsDeleted.eq(false))
        .order_by_asc(task_instance::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}
