/*!
 * String catalog.
 *
 * Content-addressed store of translatable source strings. A string is
 * identified by the fingerprint of its context, singular and plural text;
 * rows are append-only and never change once stored.
 */

use log::debug;
use sha2::{Digest, Sha256};

use crate::database::models::StringRecord;
use crate::database::Repository;
use crate::errors::EngineResult;

/// Separates the context from the message, as in gettext message IDs
const CONTEXT_SEPARATOR: u8 = 0x04;

/// Separates the singular from the plural, as in gettext message IDs
const PLURAL_SEPARATOR: u8 = 0x00;

/// Compute the fingerprint of a source string
///
/// SHA-256 over `context \x04 singular \x00 plural`, hex encoded. Each part
/// is preceded by its byte length, so text containing the separators cannot
/// shift a boundary.
pub fn fingerprint(context: &str, singular: &str, plural: &str) -> String {
    let mut hasher = Sha256::new();
    hash_part(&mut hasher, context);
    hasher.update([CONTEXT_SEPARATOR]);
    hash_part(&mut hasher, singular);
    hasher.update([PLURAL_SEPARATOR]);
    hash_part(&mut hasher, plural);
    format!("{:x}", hasher.finalize())
}

fn hash_part(hasher: &mut Sha256, part: &str) {
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}

/// Access to the translatable strings
#[derive(Clone)]
pub struct StringCatalog {
    repo: Repository,
}

impl StringCatalog {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Add a string unless an identical one is already registered
    ///
    /// Returns the stored row either way.
    pub async fn register(
        &self,
        context: &str,
        singular: &str,
        plural: &str,
    ) -> EngineResult<StringRecord> {
        let fingerprint = fingerprint(context, singular, plural);
        let record = self
            .repo
            .insert_string(&fingerprint, context, singular, plural)
            .await?;
        debug!("Registered string {} as #{}", fingerprint, record.id);
        Ok(record)
    }

    pub async fn find_by_fingerprint(&self, fingerprint: &str) -> EngineResult<Option<StringRecord>> {
        Ok(self.repo.find_string_by_fingerprint(fingerprint).await?)
    }

    pub async fn get(&self, id: i64) -> EngineResult<Option<StringRecord>> {
        Ok(self.repo.get_string(id).await?)
    }
}
