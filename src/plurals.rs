/*!
 * Plural schema migrator.
 *
 * When a language's plural category count changes, every stored translation
 * of a pluralizable string is reshaped to the new slot count and the
 * language's formula and category descriptors are replaced, all in one
 * transaction. Rows whose shape changed lose their approval: a reviewer
 * signed off on a different set of forms.
 */

use anyhow::Result;
use log::{debug, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::database::models::Approval;
use crate::database::Repository;
use crate::errors::{EngineError, EngineResult, ValidationError};
use crate::languages::PluralSchema;
use crate::notify::{LogNotifier, ReviewNotice, ReviewNotifier, ReviewReason};
use crate::store::{Cancellation, TextSlots, TranslationStore};

/// Outcome of a plural migration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub language: String,
    /// Category count before the migration
    pub from_count: usize,
    /// Category count after the migration
    pub to_count: usize,
    /// Rows whose slots were rewritten
    pub reshaped: usize,
    /// Reshaped rows that went from approved to pending review
    pub demoted: usize,
    /// Rows left alone because their slots did not meet the precondition
    pub skipped: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} plural forms, {} reshaped, {} demoted, {} skipped",
            self.language, self.from_count, self.to_count, self.reshaped, self.demoted, self.skipped
        )
    }
}

/// Reshape the slots of one translation from `from` to `to` categories
///
/// Growing copies the old last form into every new slot, provided all old
/// slots hold text. Shrinking moves the old last form into the new last
/// slot and blanks the rest, provided the kept slots and the old last slot
/// hold text. Returns `None` when the row must stay as it is.
pub fn reshape(texts: &TextSlots, from: usize, to: usize) -> Option<TextSlots> {
    if from == 0 || to == 0 || from == to {
        return None;
    }

    let last = texts.get(from - 1).to_string();
    let mut reshaped = texts.clone();

    if to > from {
        if !texts.filled_up_to(from) {
            return None;
        }
        for slot in from..to {
            reshaped.set(slot, last.clone());
        }
    } else {
        if !texts.filled_up_to(to) || last.is_empty() {
            return None;
        }
        reshaped.set(to - 1, last);
        reshaped.clear_from(to);
    }

    Some(reshaped)
}

/// Applies plural schema changes to a language and its translations
pub struct PluralMigrator {
    store: TranslationStore,
    notifier: Arc<dyn ReviewNotifier>,
}

impl PluralMigrator {
    pub fn new(store: TranslationStore, notifier: Arc<dyn ReviewNotifier>) -> Self {
        Self { store, notifier }
    }

    pub fn with_defaults(store: TranslationStore) -> Self {
        Self::new(store, Arc::new(LogNotifier))
    }

    /// Replace the plural schema of a language
    ///
    /// Holds the language's exclusive lock, so no import runs against the
    /// language meanwhile. Cancellation rolls the whole migration back.
    pub async fn migrate(
        &self,
        language_id: &str,
        schema: PluralSchema,
        cancel: &Cancellation,
    ) -> EngineResult<MigrationReport> {
        schema.validate()?;
        let _guard = self.store.locks().exclusive(language_id).await;

        let language = language_id.to_string();
        let cancel = cancel.clone();
        let report = self
            .store
            .repository()
            .connection()
            .transaction_async(move |tx| migrate_language(tx, &language, &schema, &cancel))
            .await
            .map_err(|e| match EngineError::from(e) {
                EngineError::Cancelled { .. } => {
                    warn!("Plural migration of {} cancelled and rolled back", language_id);
                    EngineError::Cancelled { committed: 0 }
                }
                other => other,
            })?;

        info!("Plural migration finished: {}", report);

        if report.demoted > 0 {
            let notice = ReviewNotice {
                language: language_id.to_string(),
                count: report.demoted,
                reason: ReviewReason::PluralSchemaChanged,
            };
            if let Err(e) = self.notifier.review_needed(notice).await {
                warn!("Failed to notify reviewers of {}: {}", language_id, e);
            }
        }

        Ok(report)
    }
}

fn migrate_language(
    conn: &Connection,
    language_id: &str,
    schema: &PluralSchema,
    cancel: &Cancellation,
) -> Result<MigrationReport> {
    let language = Repository::get_language_sync(conn, language_id)?
        .ok_or_else(|| ValidationError::UnknownLanguage(language_id.to_string()))?;

    let mut report = MigrationReport {
        language: language_id.to_string(),
        from_count: language.plural_count(),
        to_count: schema.count(),
        ..Default::default()
    };

    if report.from_count != report.to_count {
        for row in Repository::plural_translations_sync(conn, language_id)? {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled { committed: 0 }.into());
            }

            let Some(texts) = reshape(&row.texts, report.from_count, report.to_count) else {
                report.skipped += 1;
                continue;
            };

            let approval = if row.approval == Approval::Approved {
                report.demoted += 1;
                Approval::Pending
            } else {
                row.approval
            };
            Repository::update_texts_sync(conn, row.id, &texts, approval)?;
            report.reshaped += 1;
            debug!("Reshaped translation #{} ({})", row.id, approval);
        }
    } else {
        debug!("Plural count of {} unchanged; rows left as they are", language_id);
    }

    Repository::update_plural_schema_sync(conn, language_id, schema)?;
    Ok(report)
}
