//! Badge unlock engine - Keeps the unlocked-badge set equal to what the stats justify.
//!
//! Badge definitions live in a static catalog, not the database; the
//! `badge_unlocks` table is a derived relation reconciled against a statistics
//! snapshot. The reconciliation both inserts newly-earned badges (granting
//! their one-time XP bonus) and deletes level-metric unlocks whose requirement
//! the account no longer meets after an out-of-band statistics correction.
//! Running the check twice with no intervening stat change is a no-op.

use crate::{
    core::leveling,
    entities::{BadgeUnlock, UserAccount, badge_unlock, user_account},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// The statistic a badge definition is evaluated against.
///
/// A closed enum rather than a stringly-typed lookup: adding a metric is a
/// compile-time-checked change everywhere a snapshot is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Cached level derived from experience
    Level,
    /// Raw accumulated experience
    Experience,
    /// Lifetime completed task count
    CompletedTasks,
    /// Lifetime meditation minutes
    MeditationMinutes,
    /// Lifetime journal entry count
    JournalEntries,
    /// Consecutive-day task streak
    Streak,
    /// Never unlocked by the reconciliation pass; requires an explicit trigger
    Auto,
}

impl Metric {
    /// Parses the metric name used in the badge catalog configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for names outside the closed set, so a typo in
    /// `config.toml` fails at load time instead of silently never unlocking.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "level" => Ok(Self::Level),
            "experience" => Ok(Self::Experience),
            "completed_tasks" => Ok(Self::CompletedTasks),
            "meditation_minutes" => Ok(Self::MeditationMinutes),
            "journal_entries" => Ok(Self::JournalEntries),
            "streak" => Ok(Self::Streak),
            "auto" => Ok(Self::Auto),
            other => Err(Error::Config {
                message: format!("unknown badge metric '{other}'"),
            }),
        }
    }

    /// The configuration name of this metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Experience => "experience",
            Self::CompletedTasks => "completed_tasks",
            Self::MeditationMinutes => "meditation_minutes",
            Self::JournalEntries => "journal_entries",
            Self::Streak => "streak",
            Self::Auto => "auto",
        }
    }
}

/// One immutable badge definition from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeDefinition {
    /// Stable identifier stored in `badge_unlocks.badge_id`
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Which statistic the requirement is compared against
    pub metric: Metric,
    /// Threshold the statistic must reach
    pub requirement: i64,
    /// One-time XP bonus granted at unlock
    pub xp_reward: i64,
}

/// The static badge catalog the engine evaluates against.
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    definitions: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    /// Builds a catalog from explicit definitions.
    #[must_use]
    pub const fn new(definitions: Vec<BadgeDefinition>) -> Self {
        Self { definitions }
    }

    /// Looks up a definition by badge ID.
    #[must_use]
    pub fn get(&self, badge_id: &str) -> Option<&BadgeDefinition> {
        self.definitions.iter().find(|def| def.id == badge_id)
    }

    /// Iterates over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions.iter()
    }

    /// Number of definitions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for BadgeCatalog {
    /// The compiled-in catalog used when `config.toml` defines no badges.
    fn default() -> Self {
        let badge = |id: &str, title: &str, metric: Metric, requirement: i64, xp_reward: i64| {
            BadgeDefinition {
                id: id.to_string(),
                title: title.to_string(),
                metric,
                requirement,
                xp_reward,
            }
        };

        Self::new(vec![
            badge("first-task", "First Steps", Metric::CompletedTasks, 1, 25),
            badge("task-25", "Getting Things Done", Metric::CompletedTasks, 25, 50),
            badge("task-100", "Taskmaster", Metric::CompletedTasks, 100, 150),
            badge("level-5", "Level 5", Metric::Level, 5, 50),
            badge("level-10", "Level 10", Metric::Level, 10, 100),
            badge("level-25", "Level 25", Metric::Level, 25, 250),
            badge("xp-1000", "Seasoned", Metric::Experience, 1_000, 100),
            badge("calm-hour", "Calm Hour", Metric::MeditationMinutes, 60, 50),
            badge("calm-ten-hours", "Deep Calm", Metric::MeditationMinutes, 600, 150),
            badge("dear-diary", "Dear Diary", Metric::JournalEntries, 10, 50),
            badge("week-streak", "Seven in a Row", Metric::Streak, 7, 75),
            badge("month-streak", "Thirty in a Row", Metric::Streak, 30, 200),
            badge("founding-member", "Founding Member", Metric::Auto, 0, 100),
        ])
    }
}

/// A point-in-time snapshot of the statistics badges are evaluated against.
///
/// Level is re-derived from experience here rather than read from the cached
/// column, so a drifted cache can never hold a level badge open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Accumulated experience
    pub experience: i64,
    /// Level derived from experience via the leveling module
    pub level: i64,
    /// Consecutive-day streak
    pub streak: i64,
    /// Lifetime completed tasks
    pub completed_tasks: i64,
    /// Lifetime meditation minutes
    pub meditation_minutes: i64,
    /// Lifetime journal entries
    pub journal_entries: i64,
}

impl StatsSnapshot {
    /// Snapshots an account row.
    #[must_use]
    pub fn of(account: &user_account::Model) -> Self {
        Self {
            experience: account.experience,
            level: leveling::level_for(account.experience),
            streak: account.streak,
            completed_tasks: account.completed_task_count,
            meditation_minutes: account.total_meditation_minutes,
            journal_entries: account.journal_entry_count,
        }
    }

    /// The snapshot value for a metric; `Auto` has no snapshot value.
    #[must_use]
    pub const fn value(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Level => Some(self.level),
            Metric::Experience => Some(self.experience),
            Metric::CompletedTasks => Some(self.completed_tasks),
            Metric::MeditationMinutes => Some(self.meditation_minutes),
            Metric::JournalEntries => Some(self.journal_entries),
            Metric::Streak => Some(self.streak),
            Metric::Auto => None,
        }
    }
}

/// The changes a reconciliation pass wants to apply to the unlock set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Unlock rows to delete (self-heal: no longer justified)
    pub to_delete: Vec<String>,
    /// Badges to insert (requirement newly met)
    pub to_insert: Vec<String>,
}

/// Result of one badge check on an account.
#[derive(Debug, Clone, Default)]
pub struct UnlockReport {
    /// Unlock rows inserted by this call
    pub newly_unlocked: Vec<badge_unlock::Model>,
    /// Badge IDs removed by the self-heal pass
    pub removed_badge_ids: Vec<String>,
    /// Total one-time bonus XP granted by this call
    pub bonus_xp: i64,
}

/// Pure reconciliation: compares the current unlock set against the snapshot.
///
/// Self-heal only applies to `level`-metric badges; other unlocks stay sticky
/// once earned. Evaluation is a single pass against the starting snapshot, so
/// bonus XP granted by one unlock cannot cascade into further unlocks within
/// the same call.
#[must_use]
pub fn reconcile(
    catalog: &BadgeCatalog,
    unlocked: &[String],
    snapshot: &StatsSnapshot,
) -> Reconciliation {
    let mut changes = Reconciliation::default();

    for def in catalog.iter() {
        let is_unlocked = unlocked.iter().any(|id| *id == def.id);

        if is_unlocked {
            if def.metric == Metric::Level && snapshot.level < def.requirement {
                changes.to_delete.push(def.id.clone());
            }
        } else if let Some(value) = snapshot.value(def.metric) {
            if value >= def.requirement {
                changes.to_insert.push(def.id.clone());
            }
        }
    }

    changes
}

/// Reconciles an account's badge unlocks against its current statistics.
///
/// Deletes level badges the stats no longer justify, inserts every
/// newly-earned badge, and grants the inserted badges' one-time XP bonuses
/// (recomputing the cached level in the same update). Removal never claws back
/// previously granted bonus XP. Idempotent when nothing changed. Runs in its
/// own transaction; operations that already hold one use the engine through
/// their transaction instead.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account does not exist; takes no
/// other caller input so no other domain error applies.
pub async fn check_and_unlock(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
) -> Result<UnlockReport> {
    let txn = db.begin().await?;
    let report = run_badge_check(&txn, catalog, account_id, Utc::now()).await?;
    txn.commit().await?;
    Ok(report)
}

/// The engine body, run inside the caller's transaction so the check always
/// sees the statistic change that triggered it.
pub(crate) async fn run_badge_check<C>(
    db: &C,
    catalog: &BadgeCatalog,
    account_id: i64,
    now: DateTimeUtc,
) -> Result<UnlockReport>
where
    C: ConnectionTrait,
{
    let account = UserAccount::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let unlocked: Vec<String> = BadgeUnlock::find()
        .filter(badge_unlock::Column::AccountId.eq(account_id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.badge_id)
        .collect();

    let snapshot = StatsSnapshot::of(&account);
    let changes = reconcile(catalog, &unlocked, &snapshot);

    let mut report = UnlockReport::default();

    for badge_id in &changes.to_delete {
        BadgeUnlock::delete_many()
            .filter(badge_unlock::Column::AccountId.eq(account_id))
            .filter(badge_unlock::Column::BadgeId.eq(badge_id.as_str()))
            .exec(db)
            .await?;
        info!(account_id, badge_id, "self-heal removed badge unlock");
        report.removed_badge_ids.push(badge_id.clone());
    }

    for badge_id in &changes.to_insert {
        let unlock = badge_unlock::ActiveModel {
            account_id: Set(account_id),
            badge_id: Set(badge_id.clone()),
            unlocked_at: Set(now),
            ..Default::default()
        };
        report.newly_unlocked.push(unlock.insert(db).await?);

        if let Some(def) = catalog.get(badge_id) {
            report.bonus_xp += def.xp_reward;
        }
    }

    if report.bonus_xp > 0 {
        let new_experience = account.experience + report.bonus_xp;
        let mut account_model: user_account::ActiveModel = account.into();
        account_model.experience = Set(new_experience);
        account_model.level = Set(leveling::level_for(new_experience));
        account_model.update(db).await?;
    }

    Ok(report)
}

/// Explicitly unlocks an `auto`-metric badge, which the reconciliation pass
/// never touches. Already-unlocked badges are a successful no-op.
///
/// # Errors
/// - [`Error::AccountNotFound`] if the account does not exist
/// - [`Error::BadgeNotFound`] if the badge ID is not in the catalog
/// - [`Error::InvalidState`] if the badge is not an `auto` badge
pub async fn unlock_auto_badge(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    badge_id: &str,
) -> Result<UnlockReport> {
    let def = catalog.get(badge_id).ok_or_else(|| Error::BadgeNotFound {
        id: badge_id.to_string(),
    })?;
    if def.metric != Metric::Auto {
        return Err(Error::InvalidState {
            status: def.metric.as_str().to_string(),
        });
    }
    let xp_reward = def.xp_reward;

    let txn = db.begin().await?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let already = BadgeUnlock::find()
        .filter(badge_unlock::Column::AccountId.eq(account_id))
        .filter(badge_unlock::Column::BadgeId.eq(badge_id))
        .one(&txn)
        .await?;
    if already.is_some() {
        txn.commit().await?;
        return Ok(UnlockReport::default());
    }

    let unlock = badge_unlock::ActiveModel {
        account_id: Set(account_id),
        badge_id: Set(badge_id.to_string()),
        unlocked_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = unlock.insert(&txn).await?;

    let new_experience = account.experience + xp_reward;
    let mut account_model: user_account::ActiveModel = account.into();
    account_model.experience = Set(new_experience);
    account_model.level = Set(leveling::level_for(new_experience));
    account_model.update(&txn).await?;

    txn.commit().await?;

    Ok(UnlockReport {
        newly_unlocked: vec![inserted],
        removed_badge_ids: Vec::new(),
        bonus_xp: xp_reward,
    })
}

/// Retrieves all badge unlocks for an account.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_unlocks(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<badge_unlock::Model>> {
    BadgeUnlock::find()
        .filter(badge_unlock::Column::AccountId.eq(account_id))
        .all(db)
        .await
        .map_err(Into::into)
}
