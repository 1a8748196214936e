//! Wellness bonus gates - Meditation daily cap and mood check-in cooldown.
//!
//! These are shared sub-rules used by the meditation and mood operations, not a
//! standalone service. A gated call is still a successful operation: the
//! session or mood is always recorded, only the bonus is withheld.

use crate::{
    core::badges::{self, BadgeCatalog},
    entities::{UserAccount, badge_unlock, user_account},
    errors::{Error, Result},
};
use crate::core::leveling;
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Bonus-granting meditation sessions allowed per calendar day.
pub const MEDITATION_DAILY_BONUS_LIMIT: i64 = 3;

/// Experience granted for a bonus-eligible meditation session.
pub const MEDITATION_XP_BONUS: i64 = 50;

/// Points granted for a bonus-eligible meditation session.
pub const MEDITATION_POINTS_BONUS: i64 = 30;

/// Experience granted for a cooldown-eligible mood check-in.
pub const MOOD_XP_BONUS: i64 = 20;

/// Minimum gap between XP-granting mood check-ins.
pub const MOOD_COOLDOWN_SECONDS: i64 = 3_600;

/// Result of completing a meditation session.
#[derive(Debug, Clone)]
pub struct MeditationOutcome {
    /// Whether the daily cap still allowed a bonus
    pub bonus_granted: bool,
    /// Experience awarded (0 when capped)
    pub xp_awarded: i64,
    /// Points awarded (0 when capped)
    pub points_awarded: i64,
    /// Sessions completed today including this one
    pub sessions_today: i64,
    /// Badges newly unlocked by the triggered badge check
    pub newly_unlocked: Vec<badge_unlock::Model>,
}

/// Result of logging a mood check-in.
#[derive(Debug, Clone)]
pub struct MoodOutcome {
    /// The mood label as submitted (recorded upstream, not stored here)
    pub mood: String,
    /// Whether the cooldown had elapsed and XP was granted
    pub bonus_granted: bool,
    /// Experience awarded (0 while cooling down)
    pub xp_awarded: i64,
    /// Badges newly unlocked by the triggered badge check
    pub newly_unlocked: Vec<badge_unlock::Model>,
}

/// Completes a meditation session using the current time.
///
/// # Errors
/// See [`complete_meditation_at`].
pub async fn complete_meditation(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    minutes: i64,
) -> Result<MeditationOutcome> {
    complete_meditation_at(db, catalog, account_id, minutes, Utc::now()).await
}

/// Completes a meditation session at an explicit instant.
///
/// Minutes always accumulate into the lifetime total; the fixed XP/points
/// bonus is granted only while fewer than [`MEDITATION_DAILY_BONUS_LIMIT`]
/// sessions have completed today. The daily counter resets on the first
/// session of a day later than `last_meditation_at`'s day.
///
/// # Errors
/// - [`Error::InvalidAmount`] for non-positive minutes
/// - [`Error::AccountNotFound`] if the account does not exist
pub async fn complete_meditation_at(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    minutes: i64,
    now: DateTimeUtc,
) -> Result<MeditationOutcome> {
    if minutes <= 0 {
        return Err(Error::InvalidAmount { amount: minutes });
    }

    let txn = db.begin().await?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let same_day = account
        .last_meditation_at
        .is_some_and(|t| t.date_naive() == now.date_naive());
    let sessions_before = if same_day {
        account.daily_meditation_count
    } else {
        0
    };
    let bonus_granted = sessions_before < MEDITATION_DAILY_BONUS_LIMIT;

    let new_experience = if bonus_granted {
        account.experience + MEDITATION_XP_BONUS
    } else {
        account.experience
    };
    let new_points = if bonus_granted {
        account.points + MEDITATION_POINTS_BONUS
    } else {
        account.points
    };

    let mut account_model: user_account::ActiveModel = account.clone().into();
    account_model.experience = Set(new_experience);
    account_model.level = Set(leveling::level_for(new_experience));
    account_model.points = Set(new_points);
    account_model.total_meditation_minutes = Set(account.total_meditation_minutes + minutes);
    account_model.daily_meditation_count = Set(sessions_before + 1);
    account_model.last_meditation_at = Set(Some(now));
    account_model.update(&txn).await?;

    let report = badges::run_badge_check(&txn, catalog, account_id, now).await?;

    txn.commit().await?;

    Ok(MeditationOutcome {
        bonus_granted,
        xp_awarded: if bonus_granted { MEDITATION_XP_BONUS } else { 0 },
        points_awarded: if bonus_granted {
            MEDITATION_POINTS_BONUS
        } else {
            0
        },
        sessions_today: sessions_before + 1,
        newly_unlocked: report.newly_unlocked,
    })
}

/// Logs a mood check-in using the current time.
///
/// # Errors
/// See [`log_mood_at`].
pub async fn log_mood(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    mood: String,
) -> Result<MoodOutcome> {
    log_mood_at(db, catalog, account_id, mood, Utc::now()).await
}

/// Logs a mood check-in at an explicit instant.
///
/// The mood is always accepted; the fixed XP bonus is granted only when at
/// least [`MOOD_COOLDOWN_SECONDS`] have passed since the last XP-granting
/// check-in (or none has ever happened).
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account does not exist.
pub async fn log_mood_at(
    db: &DatabaseConnection,
    catalog: &BadgeCatalog,
    account_id: i64,
    mood: String,
    now: DateTimeUtc,
) -> Result<MoodOutcome> {
    let txn = db.begin().await?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let bonus_granted = account
        .last_mood_xp_at
        .is_none_or(|t| (now - t).num_seconds() >= MOOD_COOLDOWN_SECONDS);

    if bonus_granted {
        let new_experience = account.experience + MOOD_XP_BONUS;
        let mut account_model: user_account::ActiveModel = account.into();
        account_model.experience = Set(new_experience);
        account_model.level = Set(leveling::level_for(new_experience));
        account_model.last_mood_xp_at = Set(Some(now));
        account_model.update(&txn).await?;
    }

    let report = badges::run_badge_check(&txn, catalog, account_id, now).await?;

    txn.commit().await?;

    Ok(MoodOutcome {
        mood,
        bonus_granted,
        xp_awarded: if bonus_granted { MOOD_XP_BONUS } else { 0 },
        newly_unlocked: report.newly_unlocked,
    })
}
