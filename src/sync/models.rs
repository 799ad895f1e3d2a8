/*!
 * Synchronizer-specific models.
 *
 * Submitter description, batch items and the import report.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::models::Approval;

/// Permission tier of the submitter, decided by access control elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// May replace current translations and approve them
    Administrator,
    /// May only propose translations
    Contributor,
}

/// Explicit review decision attached to an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOverride {
    Approve,
    Unapprove,
}

/// Who is importing, and with which rights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub tier: Tier,
    /// Honoured for administrators only
    pub review: Option<ReviewOverride>,
    /// Recorded as the author of new rows
    pub author: Option<String>,
}

impl Submitter {
    pub fn administrator() -> Self {
        Self {
            tier: Tier::Administrator,
            review: None,
            author: None,
        }
    }

    pub fn contributor() -> Self {
        Self {
            tier: Tier::Contributor,
            review: None,
            author: None,
        }
    }

    pub fn with_review(mut self, review: ReviewOverride) -> Self {
        self.review = Some(review);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn is_administrator(&self) -> bool {
        self.tier == Tier::Administrator
    }

    /// The override that takes effect; contributors cannot override
    pub fn effective_review(&self) -> Option<ReviewOverride> {
        if self.is_administrator() { self.review } else { None }
    }

    /// Approval given to a row this submitter makes current
    pub fn granted_approval(&self) -> Approval {
        match (self.tier, self.effective_review()) {
            (Tier::Administrator, Some(ReviewOverride::Unapprove)) => Approval::Pending,
            (Tier::Administrator, _) => Approval::Approved,
            (Tier::Contributor, _) => Approval::Pending,
        }
    }
}

/// One parsed entry of a translation resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Fingerprint of the source string
    pub fingerprint: String,
    /// Translated texts, one per plural category (one for singular strings)
    pub texts: Vec<String>,
}

impl BatchItem {
    pub fn new<S: Into<String>>(fingerprint: impl Into<String>, texts: Vec<S>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }
}

/// What happened to one batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UnknownString,
    EmptyTranslation,
    ExistingCurrentUntouched,
    ExistingCurrentApproved,
    ExistingCurrentUnapproved,
    ExistingActivated,
    /// A matching candidate already waits for review behind the current row
    ExistingNotCurrentUntouched,
    AddedAsCurrent,
    AddedNotAsCurrent,
}

/// Counters returned by an import
///
/// Every batch item lands in exactly one outcome counter.
/// `new_approval_needed` is tallied on top of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Identifier of this import run, for log correlation
    pub import_id: String,
    pub language: String,
    pub unknown_strings: usize,
    pub empty_translations: usize,
    pub existing_current_untouched: usize,
    pub existing_current_approved: usize,
    pub existing_current_unapproved: usize,
    pub existing_activated: usize,
    pub existing_not_current_untouched: usize,
    pub added_as_current: usize,
    pub added_not_as_current: usize,
    pub new_approval_needed: usize,
}

impl ImportReport {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            import_id: uuid::Uuid::new_v4().to_string(),
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::UnknownString => self.unknown_strings += 1,
            Outcome::EmptyTranslation => self.empty_translations += 1,
            Outcome::ExistingCurrentUntouched => self.existing_current_untouched += 1,
            Outcome::ExistingCurrentApproved => self.existing_current_approved += 1,
            Outcome::ExistingCurrentUnapproved => self.existing_current_unapproved += 1,
            Outcome::ExistingActivated => self.existing_activated += 1,
            Outcome::ExistingNotCurrentUntouched => self.existing_not_current_untouched += 1,
            Outcome::AddedAsCurrent => self.added_as_current += 1,
            Outcome::AddedNotAsCurrent => {
                self.added_not_as_current += 1;
                self.new_approval_needed += 1;
            }
        }
    }

    /// Fold the counters of a committed chunk into this report
    pub fn merge(&mut self, other: &ImportReport) {
        self.unknown_strings += other.unknown_strings;
        self.empty_translations += other.empty_translations;
        self.existing_current_untouched += other.existing_current_untouched;
        self.existing_current_approved += other.existing_current_approved;
        self.existing_current_unapproved += other.existing_current_unapproved;
        self.existing_activated += other.existing_activated;
        self.existing_not_current_untouched += other.existing_not_current_untouched;
        self.added_as_current += other.added_as_current;
        self.added_not_as_current += other.added_not_as_current;
        self.new_approval_needed += other.new_approval_needed;
    }

    /// Sum of the outcome counters; equals the batch size
    pub fn total(&self) -> usize {
        self.unknown_strings
            + self.empty_translations
            + self.existing_current_untouched
            + self.existing_current_approved
            + self.existing_current_unapproved
            + self.existing_activated
            + self.existing_not_current_untouched
            + self.added_as_current
            + self.added_not_as_current
    }

    /// Whether the import changed any row
    pub fn is_noop(&self) -> bool {
        self.total()
            == self.unknown_strings
                + self.empty_translations
                + self.existing_current_untouched
                + self.existing_not_current_untouched
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items into {}: {} untouched, {} approved, {} unapproved, {} activated, \
             {} awaiting review, {} added as current, {} added for review, {} unknown, {} empty",
            self.total(),
            self.language,
            self.existing_current_untouched,
            self.existing_current_approved,
            self.existing_current_unapproved,
            self.existing_activated,
            self.existing_not_current_untouched,
            self.added_as_current,
            self.added_not_as_current,
            self.unknown_strings,
            self.empty_translations
        )
    }
}
