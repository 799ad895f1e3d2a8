/*!
 * Language registry.
 *
 * Holds each language's identity and plural schema. The plural category
 * count of a language is never stored on its own: it is always the number
 * of category descriptors, bounded by the number of text slots the store
 * reserves.
 */

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::database::models::LanguageRecord;
use crate::database::Repository;
use crate::errors::{EngineResult, ValidationError};
use crate::language_utils;
use crate::store::MAX_PLURAL_SLOTS;

/// CLDR plural category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for PluralCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(PluralCategory::Zero),
            "one" => Ok(PluralCategory::One),
            "two" => Ok(PluralCategory::Two),
            "few" => Ok(PluralCategory::Few),
            "many" => Ok(PluralCategory::Many),
            "other" => Ok(PluralCategory::Other),
            _ => Err(anyhow::anyhow!("Invalid plural category: {}", s)),
        }
    }
}

/// One plural category of a language with example numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralForm {
    /// Category name
    pub category: PluralCategory,
    /// Example numbers falling in this category (e.g. `"2~4, 22~24"`)
    pub examples: String,
}

impl PluralForm {
    pub fn new(category: PluralCategory, examples: impl Into<String>) -> Self {
        Self {
            category,
            examples: examples.into(),
        }
    }
}

/// Plural formula plus its ordered category descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralSchema {
    /// Gettext plural expression, e.g. `(n != 1)`
    pub formula: String,
    /// Ordered categories; slot `i` of a translation renders `forms[i]`
    pub forms: Vec<PluralForm>,
}

impl PluralSchema {
    pub fn new(formula: impl Into<String>, forms: Vec<PluralForm>) -> Self {
        Self {
            formula: formula.into(),
            forms,
        }
    }

    /// Number of plural categories
    pub fn count(&self) -> usize {
        self.forms.len()
    }

    /// Check the schema fits the store
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.forms.is_empty() || self.forms.len() > MAX_PLURAL_SLOTS {
            return Err(ValidationError::InvalidPluralSchema(format!(
                "expected 1 to {} plural categories, got {}",
                MAX_PLURAL_SLOTS,
                self.forms.len()
            )));
        }
        if self.formula.trim().is_empty() {
            return Err(ValidationError::InvalidPluralSchema(
                "plural formula is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for form in &self.forms {
            if !seen.insert(form.category) {
                return Err(ValidationError::InvalidPluralSchema(format!(
                    "category '{}' appears more than once",
                    form.category
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for registering a language
#[derive(Debug, Clone)]
pub struct NewLanguage {
    /// Language tag
    pub id: String,
    /// Display name; derived from the tag when absent
    pub name: Option<String>,
    /// Plural schema
    pub schema: PluralSchema,
    /// Whether the language is open to the public
    pub is_approved: bool,
    /// Whether this is the source language
    pub is_source: bool,
}

impl NewLanguage {
    /// An approved, non-source language
    pub fn new(id: impl Into<String>, schema: PluralSchema) -> Self {
        Self {
            id: id.into(),
            name: None,
            schema,
            is_approved: true,
            is_source: false,
        }
    }

    /// Mark the language as the source language
    pub fn source(mut self) -> Self {
        self.is_source = true;
        self
    }
}

/// Administrative access to languages
#[derive(Clone)]
pub struct LanguageRegistry {
    repo: Repository,
}

impl LanguageRegistry {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Register a language
    pub async fn register(&self, language: NewLanguage) -> EngineResult<LanguageRecord> {
        language_utils::validate_language_tag(&language.id)
            .map_err(|_| ValidationError::InvalidLanguageTag(language.id.clone()))?;
        language.schema.validate()?;

        if language.is_source {
            if let Some(existing) = self.repo.source_language().await? {
                return Err(ValidationError::DuplicateSourceLanguage(existing.id).into());
            }
        }

        let name = match language.name {
            Some(name) => name,
            None => language_utils::language_display_name(&language.id)?,
        };
        let now = chrono::Utc::now().to_rfc3339();
        let record = LanguageRecord {
            id: language.id,
            name,
            plural_formula: language.schema.formula,
            plural_forms: language.schema.forms,
            is_approved: language.is_approved,
            is_source: language.is_source,
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_language(&record).await?;
        info!(
            "Registered language {} ({} plural forms)",
            record.id,
            record.plural_count()
        );
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Option<LanguageRecord>> {
        Ok(self.repo.get_language(id).await?)
    }

    pub async fn list(&self) -> EngineResult<Vec<LanguageRecord>> {
        Ok(self.repo.list_languages().await?)
    }

    /// The single source language, if registered
    pub async fn source(&self) -> EngineResult<Option<LanguageRecord>> {
        Ok(self.repo.source_language().await?)
    }

    /// Open or close a language to the public
    pub async fn set_approved(&self, id: &str, approved: bool) -> EngineResult<()> {
        let updated = self.repo.set_language_approved(id, approved).await?;
        if !updated {
            return Err(ValidationError::UnknownLanguage(id.to_string()).into());
        }
        Ok(())
    }
}
