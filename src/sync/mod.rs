/*!
 * Translation synchronizer.
 *
 * Merges a parsed batch of translations for one language into the store.
 * The whole batch is validated before the first write; afterwards items are
 * applied in chunks, each chunk in its own transaction, so a failure or a
 * cancellation never leaves a promotion half applied.
 */

pub mod models;

pub use models::{BatchItem, ImportReport, Outcome, ReviewOverride, Submitter, Tier};

use anyhow::Result;
use log::{debug, info, warn};
use rusqlite::Connection;
use std::sync::Arc;

use crate::database::models::{Approval, LanguageRecord, TranslationRecord};
use crate::database::Repository;
use crate::errors::{EngineError, EngineResult, ValidationError};
use crate::notify::{LogNotifier, ReviewNotice, ReviewNotifier, ReviewReason};
use crate::store::{Cancellation, TextSlots, TranslationStore};

/// Default number of items committed per transaction
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 50;

/// Tuning knobs of the synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Items applied per transaction; at least one
    pub checkpoint_interval: usize,
    /// Whether to notify reviewers when new rows await review
    pub notify_reviewers: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            notify_reviewers: true,
        }
    }
}

/// A batch item after validation
#[derive(Debug, Clone)]
enum PlannedItem {
    /// Recorded without touching the store
    Skip(Outcome),
    /// Merged into the store
    Apply { string_id: i64, texts: TextSlots },
}

/// Merges translation batches into the store
pub struct Synchronizer {
    store: TranslationStore,
    notifier: Arc<dyn ReviewNotifier>,
    options: SyncOptions,
}

impl Synchronizer {
    pub fn new(
        store: TranslationStore,
        notifier: Arc<dyn ReviewNotifier>,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            options,
        }
    }

    /// Synchronizer with default options that only logs review notices
    pub fn with_defaults(store: TranslationStore) -> Self {
        Self::new(store, Arc::new(LogNotifier), SyncOptions::default())
    }

    /// Import a batch of translations into one language
    ///
    /// Unknown strings and empty translations are counted, not rejected.
    /// Caller mistakes (unknown or source language, malformed slots) fail
    /// the whole batch before anything is written. On cancellation the
    /// chunk in flight is rolled back and `EngineError::Cancelled` carries
    /// the number of items already committed.
    pub async fn import(
        &self,
        language_id: &str,
        submitter: &Submitter,
        items: Vec<BatchItem>,
        cancel: &Cancellation,
    ) -> EngineResult<ImportReport> {
        let _guard = self.store.locks().shared(language_id).await;

        if submitter.review.is_some() && !submitter.is_administrator() {
            debug!("Ignoring review override from non-administrator");
        }

        let mut report = ImportReport::new(language_id);
        info!(
            "Import {} started: {} items into {} ({:?})",
            report.import_id,
            items.len(),
            language_id,
            submitter.tier
        );

        let plan = self.plan(language_id, items).await?;

        let interval = self.options.checkpoint_interval.max(1);
        let mut committed = 0;
        for chunk in plan.chunks(interval) {
            if cancel.is_cancelled() {
                warn!("Import {} cancelled after {} items", report.import_id, committed);
                return Err(EngineError::Cancelled { committed });
            }

            let chunk = chunk.to_vec();
            let chunk_len = chunk.len();
            let language = language_id.to_string();
            let submitter = submitter.clone();
            let cancel = cancel.clone();

            let result = self
                .store
                .repository()
                .connection()
                .transaction_async(move |tx| apply_chunk(tx, &language, &submitter, chunk, &cancel))
                .await;

            match result {
                Ok(chunk_report) => {
                    report.merge(&chunk_report);
                    committed += chunk_len;
                    debug!("Import checkpoint: {} items committed", committed);
                }
                Err(e) => {
                    return Err(match EngineError::from(e) {
                        EngineError::Cancelled { .. } => {
                            warn!("Import {} cancelled after {} items", report.import_id, committed);
                            EngineError::Cancelled { committed }
                        }
                        other => other,
                    });
                }
            }
        }

        info!("Import {} finished: {}", report.import_id, report);

        if report.new_approval_needed > 0 && self.options.notify_reviewers {
            let notice = ReviewNotice {
                language: language_id.to_string(),
                count: report.new_approval_needed,
                reason: ReviewReason::NewTranslations,
            };
            if let Err(e) = self.notifier.review_needed(notice).await {
                warn!("Failed to notify reviewers of {}: {}", language_id, e);
            }
        }

        Ok(report)
    }

    /// Validate the batch and resolve every fingerprint, without writing
    async fn plan(&self, language_id: &str, items: Vec<BatchItem>) -> EngineResult<Vec<PlannedItem>> {
        let language_id = language_id.to_string();
        let plan = self
            .store
            .repository()
            .connection()
            .execute_async(move |conn| {
                let language = Repository::get_language_sync(conn, &language_id)?
                    .ok_or_else(|| ValidationError::UnknownLanguage(language_id.clone()))?;
                if language.is_source {
                    return Err(ValidationError::SourceLanguage(language_id).into());
                }
                plan_items(conn, &language, items)
            })
            .await?;
        Ok(plan)
    }
}

fn plan_items(
    conn: &Connection,
    language: &LanguageRecord,
    items: Vec<BatchItem>,
) -> Result<Vec<PlannedItem>> {
    let mut plan = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let texts = TextSlots::from_texts(&item.texts).map_err(|e| match e {
            ValidationError::TooManySlots { count, max, .. } => {
                ValidationError::TooManySlots { index, count, max }
            }
            other => other,
        })?;

        let Some(string) = Repository::find_string_by_fingerprint_sync(conn, &item.fingerprint)?
        else {
            plan.push(PlannedItem::Skip(Outcome::UnknownString));
            continue;
        };

        if texts.is_blank() {
            plan.push(PlannedItem::Skip(Outcome::EmptyTranslation));
            continue;
        }

        let expected = string.slot_count(language.plural_count());
        if item.texts.len() != expected {
            return Err(ValidationError::PluralSlotMismatch {
                index,
                expected,
                actual: item.texts.len(),
            }
            .into());
        }

        plan.push(PlannedItem::Apply {
            string_id: string.id,
            texts,
        });
    }

    Ok(plan)
}

fn apply_chunk(
    conn: &Connection,
    language_id: &str,
    submitter: &Submitter,
    chunk: Vec<PlannedItem>,
    cancel: &Cancellation,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let now = chrono::Utc::now().to_rfc3339();

    for item in chunk {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled { committed: 0 }.into());
        }
        let outcome = match item {
            PlannedItem::Skip(outcome) => outcome,
            PlannedItem::Apply { string_id, texts } => {
                apply_pair(conn, language_id, submitter, string_id, texts, &now)?
            }
        };
        report.record(outcome);
    }

    Ok(report)
}

/// Merge one translation into its (language, string) pair
///
/// Demotion of the previous current row always happens before promotion,
/// inside the caller's transaction.
fn apply_pair(
    conn: &Connection,
    language_id: &str,
    submitter: &Submitter,
    string_id: i64,
    texts: TextSlots,
    now: &str,
) -> Result<Outcome> {
    let current = Repository::current_translation_sync(conn, language_id, string_id)?;

    if let Some(current) = current.as_ref().filter(|c| c.texts == texts) {
        let outcome = match submitter.effective_review() {
            Some(ReviewOverride::Approve) if current.approval != Approval::Approved => {
                Repository::set_approval_sync(conn, current.id, Approval::Approved)?;
                Outcome::ExistingCurrentApproved
            }
            Some(ReviewOverride::Unapprove) if current.approval == Approval::Approved => {
                Repository::set_approval_sync(conn, current.id, Approval::Pending)?;
                Outcome::ExistingCurrentUnapproved
            }
            _ => Outcome::ExistingCurrentUntouched,
        };
        debug!("String #{} in {}: {:?}", string_id, language_id, outcome);
        return Ok(outcome);
    }

    let approval = submitter.granted_approval();

    if let Some(candidate) = Repository::find_candidate_sync(conn, language_id, string_id, &texts)? {
        // Contributors never displace a current row, not even with a known candidate
        if current.is_some() && !submitter.is_administrator() {
            debug!(
                "String #{} in {}: translation #{} stays a candidate",
                string_id, language_id, candidate.id
            );
            return Ok(Outcome::ExistingNotCurrentUntouched);
        }
        if let Some(current) = &current {
            Repository::demote_sync(conn, current.id)?;
        }
        Repository::promote_sync(conn, candidate.id, approval, now)?;
        debug!(
            "String #{} in {}: reactivated translation #{}",
            string_id, language_id, candidate.id
        );
        return Ok(Outcome::ExistingActivated);
    }

    let mut row = TranslationRecord::new(
        language_id.to_string(),
        string_id,
        texts,
        Approval::Pending,
        submitter.author.clone(),
    );

    let outcome = if submitter.is_administrator() || current.is_none() {
        if let Some(current) = &current {
            Repository::demote_sync(conn, current.id)?;
        }
        row.is_current = true;
        row.approval = approval;
        row.current_since = Some(now.to_string());
        Outcome::AddedAsCurrent
    } else {
        Outcome::AddedNotAsCurrent
    };

    let id = Repository::insert_translation_sync(conn, &row)?;
    debug!(
        "String #{} in {}: {:?} as translation #{}",
        string_id, language_id, outcome, id
    );
    Ok(outcome)
}
