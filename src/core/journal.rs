//! Journaling business logic with best-effort text enrichment.
//!
//! The text-analysis service is decoupled from reward logic: its output is an
//! optional annotation on the stored entry, and its failure or latency must
//! never block or fail the journal mutation itself. The enrichment call
//! therefore happens before the database transaction opens.

use crate::{
    core::badges::{self, BadgeCatalog},
    entities::{JournalEntry, UserAccount, badge_unlock, journal_entry, user_account},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::warn;

/// Boxed error type the enrichment service is allowed to fail with.
pub type AnalysisError = Box<dyn std::error::Error + Send + Sync>;

/// The opaque text-in/text-out enrichment service.
///
/// Implementations may call out to anything; the core only requires that a
/// failure is an `Err`, which it logs and ignores.
pub trait TextAnalyzer {
    /// Produces an optional annotation for a journal entry's content.
    fn analyze(
        &self,
        content: &str,
    ) -> impl Future<Output = std::result::Result<Option<String>, AnalysisError>> + Send;
}

/// An analyzer that never annotates; used when no enrichment service is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnalysis;

impl TextAnalyzer for NoAnalysis {
    async fn analyze(
        &self,
        _content: &str,
    ) -> std::result::Result<Option<String>, AnalysisError> {
        Ok(None)
    }
}

/// Result of recording a journal entry.
#[derive(Debug, Clone)]
pub struct JournalOutcome {
    /// The stored entry, annotated when enrichment succeeded
    pub entry: journal_entry::Model,
    /// Badges newly unlocked by the triggered badge check
    pub newly_unlocked: Vec<badge_unlock::Model>,
}

/// Records a journal entry, attaching an enrichment annotation when available.
///
/// Bumps the account's journal entry count and runs the badge check in the
/// same transaction as the insert. Enrichment unavailability is logged and
/// the entry is stored unannotated.
///
/// # Errors
/// - [`Error::Config`] for empty content
/// - [`Error::AccountNotFound`] if the account does not exist
pub async fn record_journal_entry<A: TextAnalyzer>(
    db: &DatabaseConnection,
    analyzer: &A,
    catalog: &BadgeCatalog,
    account_id: i64,
    content: String,
) -> Result<JournalOutcome> {
    if content.trim().is_empty() {
        return Err(Error::Config {
            message: "journal entry cannot be empty".to_string(),
        });
    }

    // Best-effort enrichment, outside the transaction so a slow or broken
    // service cannot hold the store hostage.
    let annotation = match analyzer.analyze(&content).await {
        Ok(annotation) => annotation,
        Err(error) => {
            warn!(account_id, %error, "text analysis failed; storing entry without annotation");
            None
        }
    };

    let now = Utc::now();
    let txn = db.begin().await?;

    let account = UserAccount::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let entry = journal_entry::ActiveModel {
        account_id: Set(account_id),
        content: Set(content),
        annotation: Set(annotation),
        created_at: Set(now),
        is_deleted: Set(false),
        ..Default::default()
    };
    let entry = entry.insert(&txn).await?;

    let new_count = account.journal_entry_count + 1;
    let mut account_model: user_account::ActiveModel = account.into();
    account_model.journal_entry_count = Set(new_count);
    account_model.update(&txn).await?;

    let report = badges::run_badge_check(&txn, catalog, account_id, now).await?;

    txn.commit().await?;

    Ok(JournalOutcome {
        entry,
        newly_unlocked: report.newly_unlocked,
    })
}

/// Retrieves all active (non-deleted) journal entries for an account, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_entries(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<journal_entry::Model>> {
    use sea_orm::QueryOrder;

    JournalEntry::find()
        .filter(journal_entry::Column::AccountId.eq(account_id))
        .filter(journal_entry::Column::IsDeleted.eq(false))
        .order_by_desc(journal_entry::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
