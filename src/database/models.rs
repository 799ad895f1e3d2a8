/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::languages::PluralForm;
use crate::store::TextSlots;

/// Review state of a translation
///
/// Stored as text; a translation is always in exactly one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    /// Signed off by a reviewer or submitted by an administrator
    Approved,
    /// Explicitly refused by a reviewer
    Rejected,
    /// Waiting for a reviewer
    Pending,
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approval::Approved => write!(f, "approved"),
            Approval::Rejected => write!(f, "rejected"),
            Approval::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for Approval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(Approval::Approved),
            "rejected" => Ok(Approval::Rejected),
            "pending" => Ok(Approval::Pending),
            _ => Err(anyhow::anyhow!("Invalid approval state: {}", s)),
        }
    }
}

/// Language record with its plural schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRecord {
    /// Language tag (e.g. `de`, `pt_BR`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Plural formula in gettext expression syntax
    pub plural_formula: String,
    /// Ordered plural category descriptors
    pub plural_forms: Vec<PluralForm>,
    /// Whether the language is open to the public
    pub is_approved: bool,
    /// Whether this is the language source strings are written in
    pub is_source: bool,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

impl LanguageRecord {
    /// Number of plural categories; always the number of descriptors
    pub fn plural_count(&self) -> usize {
        self.plural_forms.len()
    }
}

/// Translatable source string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRecord {
    /// Database ID
    pub id: i64,
    /// Content fingerprint of (context, singular, plural)
    pub fingerprint: String,
    /// Disambiguation context, empty if none
    pub context: String,
    /// Singular source text
    pub singular: String,
    /// Plural source text, empty if the string is not pluralizable
    pub plural: String,
    /// Creation timestamp
    pub created_at: String,
}

impl StringRecord {
    /// Whether translations of this string carry one slot per plural category
    pub fn is_plural(&self) -> bool {
        !self.plural.is_empty()
    }

    /// Number of meaningful slots for a language with `plural_count` categories
    pub fn slot_count(&self, plural_count: usize) -> usize {
        if self.is_plural() { plural_count } else { 1 }
    }
}

/// One submitted translation of a string into a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Database ID
    pub id: i64,
    /// Owning language
    pub language_id: String,
    /// Owning string
    pub string_id: i64,
    /// Whether this is the current translation of the pair
    pub is_current: bool,
    /// Review state
    pub approval: Approval,
    /// Translated texts
    pub texts: TextSlots,
    /// Submission timestamp
    pub created_at: String,
    /// Submitting user, if known
    pub created_by: Option<String>,
    /// When the row last became current
    pub current_since: Option<String>,
}

impl TranslationRecord {
    /// Create a new translation record (without database ID)
    pub fn new(
        language_id: String,
        string_id: i64,
        texts: TextSlots,
        approval: Approval,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: 0, // Will be assigned by database
            language_id,
            string_id,
            is_current: false,
            approval,
            texts,
            created_at: chrono::Utc::now().to_rfc3339(),
            created_by,
            current_since: None,
        }
    }

    /// Whether export and progress statistics may use this row
    pub fn is_exportable(&self) -> bool {
        self.is_current && self.approval == Approval::Approved
    }
}

/// Registered package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Database ID
    pub id: i64,
    /// Unique handle
    pub handle: String,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: String,
}

/// Registered version of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersionRecord {
    /// Database ID
    pub id: i64,
    /// Owning package
    pub package_id: i64,
    /// Raw version string (development versions carry the configured prefix)
    pub version: String,
    /// Display name
    pub display_name: String,
    /// Creation timestamp
    pub created_at: String,
}
