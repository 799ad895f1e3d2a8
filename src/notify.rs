/*!
 * Review-needed notifications.
 *
 * After an import leaves new translations waiting for review, or a plural
 * migration withdraws approvals, reviewers of the language are told how
 * many rows need attention. Delivery (mail, chat, dashboards) lives behind
 * the `ReviewNotifier` trait.
 */

use async_trait::async_trait;
use log::info;
use serde::Serialize;
use std::fmt::{self, Debug};

use crate::errors::EngineResult;

/// Why reviewers are being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// An import added translations that could not become current
    NewTranslations,
    /// A plural schema change withdrew approvals
    PluralSchemaChanged,
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::NewTranslations => write!(f, "new translations"),
            ReviewReason::PluralSchemaChanged => write!(f, "plural schema changed"),
        }
    }
}

/// A request for reviewer attention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNotice {
    /// Language whose reviewers should act
    pub language: String,
    /// Number of rows waiting for review
    pub count: usize,
    pub reason: ReviewReason,
}

/// Delivers review notices
///
/// Called after the triggering transaction committed; a failure here is
/// logged by the caller and never undoes the committed work.
#[async_trait]
pub trait ReviewNotifier: Send + Sync + Debug {
    async fn review_needed(&self, notice: ReviewNotice) -> EngineResult<()>;
}

/// Notifier that only writes the notice to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl ReviewNotifier for LogNotifier {
    async fn review_needed(&self, notice: ReviewNotice) -> EngineResult<()> {
        info!(
            "{} translation(s) in {} need review ({})",
            notice.count, notice.language, notice.reason
        );
        Ok(())
    }
}
