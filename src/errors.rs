/*!
 * Error types for the transync engine.
 *
 * Per-item data problems never surface here: they are counted in the
 * import report. What remains are caller mistakes detected before any
 * write (`ValidationError`), cooperative cancellation, and faults of the
 * persistence layer, which abort the enclosing transaction.
 */

use thiserror::Error;

/// Caller-side problems detected before the store is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No language with this identifier is registered
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// Translations cannot be imported into the source language
    #[error("Language {0} is the source language and cannot receive translations")]
    SourceLanguage(String),

    /// The tag does not start with an ISO 639 language code
    #[error("Invalid language tag: {0}")]
    InvalidLanguageTag(String),

    /// A source language is already registered
    #[error("A source language is already registered: {0}")]
    DuplicateSourceLanguage(String),

    /// A batch item carries more text slots than the store reserves
    #[error("Item {index} carries {count} text slots, at most {max} are supported")]
    TooManySlots {
        /// Position of the item in the batch
        index: usize,
        /// Number of slots supplied
        count: usize,
        /// Number of slots the store reserves
        max: usize,
    },

    /// A batch item does not match the plural schema of the target language
    #[error("Item {index} carries {actual} text slots but {expected} are expected")]
    PluralSlotMismatch {
        /// Position of the item in the batch
        index: usize,
        /// Slots expected for this string in this language
        expected: usize,
        /// Slots supplied
        actual: usize,
    },

    /// A plural schema is malformed
    #[error("Invalid plural schema: {0}")]
    InvalidPluralSchema(String),

    /// A version string cannot be parsed
    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    /// No package with this handle is registered
    #[error("Unknown package: {0}")]
    UnknownPackage(String),
}

/// Errors returned by engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request was rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation was cancelled; the in-flight transaction was rolled back
    #[error("Operation cancelled after {committed} committed items")]
    Cancelled {
        /// Items durably applied before the cancellation was observed
        committed: usize,
    },

    /// The storage engine reported a failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Any other infrastructure fault
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

/// Result alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

// The persistence layer speaks anyhow; recover the typed error when one was wrapped
impl From<anyhow::Error> for EngineError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<EngineError>() {
            Ok(engine) => return engine,
            Err(error) => error,
        };
        let error = match error.downcast::<ValidationError>() {
            Ok(validation) => return Self::Validation(validation),
            Err(error) => error,
        };
        match error.downcast::<rusqlite::Error>() {
            Ok(storage) => Self::Storage(storage),
            Err(error) => Self::Infrastructure(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        Self::Infrastructure(error.to_string())
    }
}

impl EngineError {
    /// Whether the error was raised before any mutation took place
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
