/*!
 * Translation store.
 *
 * Per (language, string) history of submitted translations. Each pair is in
 * one of three observable states: untranslated, candidates only, or with a
 * current row whose approval is approved, rejected or pending. Only the
 * synchronizer and the plural migrator move a pair between states.
 */

pub mod locks;
pub mod slots;

pub use locks::{Cancellation, LanguageLocks};
pub use slots::{TextSlots, MAX_PLURAL_SLOTS};

use std::sync::Arc;

use crate::database::models::{Approval, TranslationRecord};
use crate::database::Repository;
use crate::errors::EngineResult;

/// Observable state of one (language, string) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    /// No translation rows
    Untranslated,
    /// Rows exist, none is current
    CandidatesOnly,
    /// A current row exists with the given approval
    HasCurrent(Approval),
}

/// Shared handle to the translation store
///
/// Cloning is cheap; clones share the connection and the language locks.
#[derive(Clone)]
pub struct TranslationStore {
    repo: Repository,
    locks: Arc<LanguageLocks>,
}

impl TranslationStore {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            locks: Arc::new(LanguageLocks::new()),
        }
    }

    /// Store backed by an in-memory database
    pub fn new_in_memory() -> EngineResult<Self> {
        Ok(Self::new(Repository::new_in_memory()?))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn locks(&self) -> &LanguageLocks {
        &self.locks
    }

    pub async fn pair_state(&self, language_id: &str, string_id: i64) -> EngineResult<PairState> {
        let history = self.repo.translation_history(language_id, string_id).await?;
        let state = match history.iter().find(|t| t.is_current) {
            Some(current) => PairState::HasCurrent(current.approval),
            None if history.is_empty() => PairState::Untranslated,
            None => PairState::CandidatesOnly,
        };
        Ok(state)
    }

    /// The current row of a pair, whatever its approval
    pub async fn current_translation(
        &self,
        language_id: &str,
        string_id: i64,
    ) -> EngineResult<Option<TranslationRecord>> {
        Ok(self.repo.current_translation(language_id, string_id).await?)
    }

    /// Every row of a pair, oldest first
    pub async fn translation_history(
        &self,
        language_id: &str,
        string_id: i64,
    ) -> EngineResult<Vec<TranslationRecord>> {
        Ok(self.repo.translation_history(language_id, string_id).await?)
    }

    pub async fn pending_review_count(&self, language_id: &str) -> EngineResult<i64> {
        Ok(self.repo.pending_review_count(language_id).await?)
    }

    /// String IDs of a language holding more than one current row
    ///
    /// Always empty while the schema's unique index is in place.
    pub async fn check_single_current(&self, language_id: &str) -> EngineResult<Vec<i64>> {
        Ok(self.repo.single_current_violations(language_id).await?)
    }
}
