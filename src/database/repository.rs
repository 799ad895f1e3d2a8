/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 *
 * Functions suffixed `_sync` take a borrowed connection so they can be
 * composed inside a caller-owned transaction; the async methods wrap a
 * single statement or query in its own blocking task.
 */

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::connection::DatabaseConnection;
use super::models::{
    Approval, LanguageRecord, PackageRecord, PackageVersionRecord, StringRecord,
    TranslationRecord,
};
use crate::languages::{PluralForm, PluralSchema};
use crate::store::TextSlots;

const LANGUAGE_COLUMNS: &str =
    "id, name, plural_formula, plural_forms, is_approved, is_source, created_at, updated_at";

const STRING_COLUMNS: &str = "id, fingerprint, context, singular, plural, created_at";

const TRANSLATION_COLUMNS: &str = "id, language_id, string_id, is_current, approval, \
     text0, text1, text2, text3, text4, text5, created_at, created_by, current_since";

const PACKAGE_VERSION_COLUMNS: &str = "id, package_id, version, display_name, created_at";

/// Storage form of the currency marker: 1 when current, NULL otherwise
fn currency_marker(is_current: bool) -> Option<i64> {
    if is_current { Some(1) } else { None }
}

fn language_from_row(row: &Row) -> rusqlite::Result<LanguageRecord> {
    let forms: String = row.get(3)?;
    let plural_forms: Vec<PluralForm> = serde_json::from_str(&forms).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(LanguageRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        plural_formula: row.get(2)?,
        plural_forms,
        is_approved: row.get::<_, i64>(4)? != 0,
        is_source: row.get::<_, Option<i64>>(5)?.is_some(),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn string_from_row(row: &Row) -> rusqlite::Result<StringRecord> {
    Ok(StringRecord {
        id: row.get(0)?,
        fingerprint: row.get(1)?,
        context: row.get(2)?,
        singular: row.get(3)?,
        plural: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Map translation columns starting at `offset`
fn translation_from_row_at(row: &Row, offset: usize) -> rusqlite::Result<TranslationRecord> {
    let col = |i: usize| offset + i;
    Ok(TranslationRecord {
        id: row.get(col(0))?,
        language_id: row.get(col(1))?,
        string_id: row.get(col(2))?,
        is_current: row.get::<_, Option<i64>>(col(3))?.is_some(),
        approval: row
            .get::<_, String>(col(4))?
            .parse()
            .unwrap_or(Approval::Pending),
        texts: TextSlots::from_array([
            row.get(col(5))?,
            row.get(col(6))?,
            row.get(col(7))?,
            row.get(col(8))?,
            row.get(col(9))?,
            row.get(col(10))?,
        ]),
        created_at: row.get(col(11))?,
        created_by: row.get(col(12))?,
        current_since: row.get(col(13))?,
    })
}

fn translation_from_row(row: &Row) -> rusqlite::Result<TranslationRecord> {
    translation_from_row_at(row, 0)
}

fn package_version_from_row(row: &Row) -> rusqlite::Result<PackageVersionRecord> {
    Ok(PackageVersionRecord {
        id: row.get(0)?,
        package_id: row.get(1)?,
        version: row.get(2)?,
        display_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// The underlying connection, for callers composing their own transactions
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Language Operations
    // =========================================================================

    /// Insert a language
    pub async fn insert_language(&self, language: &LanguageRecord) -> Result<()> {
        let language = language.clone();
        let forms = serde_json::to_string(&language.plural_forms)?;

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO languages (
                        id, name, plural_count, plural_formula, plural_forms,
                        is_approved, is_source, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        language.id,
                        language.name,
                        language.plural_count() as i64,
                        language.plural_formula,
                        forms,
                        language.is_approved as i64,
                        currency_marker(language.is_source),
                        language.created_at,
                        language.updated_at,
                    ],
                )
                .with_context(|| format!("Failed to insert language {}", language.id))?;
                Ok(())
            })
            .await
    }

    /// Get a language by ID
    pub async fn get_language(&self, id: &str) -> Result<Option<LanguageRecord>> {
        let id = id.to_string();
        self.db
            .execute_async(move |conn| Self::get_language_sync(conn, &id))
            .await
    }

    /// Get a language by ID (synchronous version for use within transactions)
    pub fn get_language_sync(conn: &Connection, id: &str) -> Result<Option<LanguageRecord>> {
        let sql = format!("SELECT {} FROM languages WHERE id = ?1", LANGUAGE_COLUMNS);
        Ok(conn.query_row(&sql, [id], language_from_row).optional()?)
    }

    /// List all languages ordered by ID
    pub async fn list_languages(&self) -> Result<Vec<LanguageRecord>> {
        self.db
            .execute_async(|conn| {
                let sql = format!("SELECT {} FROM languages ORDER BY id", LANGUAGE_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let languages = stmt
                    .query_map([], language_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(languages)
            })
            .await
    }

    /// Get the source language
    pub async fn source_language(&self) -> Result<Option<LanguageRecord>> {
        self.db
            .execute_async(|conn| {
                let sql = format!("SELECT {} FROM languages WHERE is_source = 1", LANGUAGE_COLUMNS);
                Ok(conn.query_row(&sql, [], language_from_row).optional()?)
            })
            .await
    }

    /// Set the approved flag of a language; returns whether the language exists
    pub async fn set_language_approved(&self, id: &str, approved: bool) -> Result<bool> {
        let id = id.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE languages SET is_approved = ?1, updated_at = ?2 WHERE id = ?3",
                    params![approved as i64, now, id],
                )?;
                Ok(updated > 0)
            })
            .await
    }

    /// Overwrite the plural formula and descriptors of a language
    pub fn update_plural_schema_sync(
        conn: &Connection,
        id: &str,
        schema: &PluralSchema,
    ) -> Result<()> {
        let forms = serde_json::to_string(&schema.forms)?;
        conn.execute(
            r#"
            UPDATE languages
            SET plural_count = ?1, plural_formula = ?2, plural_forms = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                schema.count() as i64,
                schema.formula,
                forms,
                chrono::Utc::now().to_rfc3339(),
                id
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // String Catalog Operations
    // =========================================================================

    /// Insert a string unless its fingerprint is already known; returns the stored row
    pub fn insert_string_sync(
        conn: &Connection,
        fingerprint: &str,
        context: &str,
        singular: &str,
        plural: &str,
    ) -> Result<StringRecord> {
        conn.execute(
            r#"
            INSERT INTO translatable_strings (fingerprint, context, singular, plural, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(fingerprint) DO NOTHING
            "#,
            params![
                fingerprint,
                context,
                singular,
                plural,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;

        Self::find_string_by_fingerprint_sync(conn, fingerprint)?
            .ok_or_else(|| anyhow::anyhow!("String {} vanished after insert", fingerprint))
    }

    /// Insert a string (async)
    pub async fn insert_string(
        &self,
        fingerprint: &str,
        context: &str,
        singular: &str,
        plural: &str,
    ) -> Result<StringRecord> {
        let fingerprint = fingerprint.to_string();
        let context = context.to_string();
        let singular = singular.to_string();
        let plural = plural.to_string();

        self.db
            .execute_async(move |conn| {
                Self::insert_string_sync(conn, &fingerprint, &context, &singular, &plural)
            })
            .await
    }

    /// Find a string by fingerprint (synchronous version for use within transactions)
    pub fn find_string_by_fingerprint_sync(
        conn: &Connection,
        fingerprint: &str,
    ) -> Result<Option<StringRecord>> {
        let sql = format!(
            "SELECT {} FROM translatable_strings WHERE fingerprint = ?1",
            STRING_COLUMNS
        );
        Ok(conn.query_row(&sql, [fingerprint], string_from_row).optional()?)
    }

    /// Find a string by fingerprint
    pub async fn find_string_by_fingerprint(&self, fingerprint: &str) -> Result<Option<StringRecord>> {
        let fingerprint = fingerprint.to_string();
        self.db
            .execute_async(move |conn| Self::find_string_by_fingerprint_sync(conn, &fingerprint))
            .await
    }

    /// Get a string by ID
    pub async fn get_string(&self, id: i64) -> Result<Option<StringRecord>> {
        self.db
            .execute_async(move |conn| {
                let sql = format!("SELECT {} FROM translatable_strings WHERE id = ?1", STRING_COLUMNS);
                Ok(conn.query_row(&sql, [id], string_from_row).optional()?)
            })
            .await
    }

    // =========================================================================
    // Translation Operations
    // =========================================================================

    /// Get the current translation of a pair
    pub fn current_translation_sync(
        conn: &Connection,
        language_id: &str,
        string_id: i64,
    ) -> Result<Option<TranslationRecord>> {
        let sql = format!(
            "SELECT {} FROM translations WHERE language_id = ?1 AND string_id = ?2 AND is_current = 1",
            TRANSLATION_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![language_id, string_id], translation_from_row)
            .optional()?)
    }

    /// Get the current translation of a pair (async)
    pub async fn current_translation(
        &self,
        language_id: &str,
        string_id: i64,
    ) -> Result<Option<TranslationRecord>> {
        let language_id = language_id.to_string();
        self.db
            .execute_async(move |conn| Self::current_translation_sync(conn, &language_id, string_id))
            .await
    }

    /// Find the newest non-current row of a pair whose texts equal `texts` exactly
    pub fn find_candidate_sync(
        conn: &Connection,
        language_id: &str,
        string_id: i64,
        texts: &TextSlots,
    ) -> Result<Option<TranslationRecord>> {
        let sql = format!(
            r#"
            SELECT {} FROM translations
            WHERE language_id = ?1 AND string_id = ?2 AND is_current IS NULL
              AND text0 = ?3 AND text1 = ?4 AND text2 = ?5
              AND text3 = ?6 AND text4 = ?7 AND text5 = ?8
            ORDER BY id DESC
            LIMIT 1
            "#,
            TRANSLATION_COLUMNS
        );
        let t = texts.as_slice();
        Ok(conn
            .query_row(
                &sql,
                params![language_id, string_id, t[0], t[1], t[2], t[3], t[4], t[5]],
                translation_from_row,
            )
            .optional()?)
    }

    /// Insert a translation row and return its ID
    pub fn insert_translation_sync(conn: &Connection, record: &TranslationRecord) -> Result<i64> {
        let t = record.texts.as_slice();
        conn.execute(
            r#"
            INSERT INTO translations (
                language_id, string_id, is_current, approval,
                text0, text1, text2, text3, text4, text5,
                created_at, created_by, current_since
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.language_id,
                record.string_id,
                currency_marker(record.is_current),
                record.approval.to_string(),
                t[0],
                t[1],
                t[2],
                t[3],
                t[4],
                t[5],
                record.created_at,
                record.created_by,
                record.current_since,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Change the approval of a row in place
    pub fn set_approval_sync(conn: &Connection, id: i64, approval: Approval) -> Result<()> {
        conn.execute(
            "UPDATE translations SET approval = ?1 WHERE id = ?2",
            params![approval.to_string(), id],
        )?;
        Ok(())
    }

    /// Clear the currency marker of a row
    pub fn demote_sync(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("UPDATE translations SET is_current = NULL WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Mark a row as current with the given approval
    ///
    /// The caller must have demoted the previous current row of the pair
    /// in the same transaction.
    pub fn promote_sync(conn: &Connection, id: i64, approval: Approval, now: &str) -> Result<()> {
        conn.execute(
            "UPDATE translations SET is_current = 1, approval = ?1, current_since = ?2 WHERE id = ?3",
            params![approval.to_string(), now, id],
        )?;
        Ok(())
    }

    /// Rewrite the texts and approval of a row
    pub fn update_texts_sync(
        conn: &Connection,
        id: i64,
        texts: &TextSlots,
        approval: Approval,
    ) -> Result<()> {
        let t = texts.as_slice();
        conn.execute(
            r#"
            UPDATE translations
            SET text0 = ?1, text1 = ?2, text2 = ?3, text3 = ?4, text4 = ?5, text5 = ?6, approval = ?7
            WHERE id = ?8
            "#,
            params![t[0], t[1], t[2], t[3], t[4], t[5], approval.to_string(), id],
        )?;
        Ok(())
    }

    /// All rows of a language whose string is pluralizable, oldest first
    pub fn plural_translations_sync(
        conn: &Connection,
        language_id: &str,
    ) -> Result<Vec<TranslationRecord>> {
        let columns = TRANSLATION_COLUMNS
            .split(", ")
            .map(|c| format!("t.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {} FROM translations t
            INNER JOIN translatable_strings s ON s.id = t.string_id
            WHERE t.language_id = ?1 AND s.plural <> ''
            ORDER BY t.id
            "#,
            columns
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([language_id], translation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every row of a pair, oldest first
    pub async fn translation_history(
        &self,
        language_id: &str,
        string_id: i64,
    ) -> Result<Vec<TranslationRecord>> {
        let language_id = language_id.to_string();
        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "SELECT {} FROM translations WHERE language_id = ?1 AND string_id = ?2 ORDER BY id",
                    TRANSLATION_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![language_id, string_id], translation_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Number of rows of a language waiting for review
    pub async fn pending_review_count(&self, language_id: &str) -> Result<i64> {
        let language_id = language_id.to_string();
        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM translations WHERE language_id = ?1 AND approval = 'pending'",
                    [language_id],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// String IDs of a language that have more than one current row
    pub async fn single_current_violations(&self, language_id: &str) -> Result<Vec<i64>> {
        let language_id = language_id.to_string();
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT string_id FROM translations
                    WHERE language_id = ?1 AND is_current = 1
                    GROUP BY string_id
                    HAVING COUNT(*) > 1
                    "#,
                )?;
                let ids = stmt
                    .query_map([language_id], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                Ok(ids)
            })
            .await
    }

    // =========================================================================
    // Package Operations
    // =========================================================================

    /// Insert a package
    pub async fn insert_package(&self, handle: &str, name: &str) -> Result<PackageRecord> {
        let record = PackageRecord {
            id: 0,
            handle: handle.to_string(),
            name: name.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO packages (handle, name, created_at) VALUES (?1, ?2, ?3)",
                    params![record.handle, record.name, record.created_at],
                )
                .with_context(|| format!("Failed to insert package {}", record.handle))?;
                Ok(PackageRecord {
                    id: conn.last_insert_rowid(),
                    ..record
                })
            })
            .await
    }

    /// Get a package by handle
    pub async fn get_package_by_handle(&self, handle: &str) -> Result<Option<PackageRecord>> {
        let handle = handle.to_string();
        self.db
            .execute_async(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, handle, name, created_at FROM packages WHERE handle = ?1",
                        [handle],
                        |row| {
                            Ok(PackageRecord {
                                id: row.get(0)?,
                                handle: row.get(1)?,
                                name: row.get(2)?,
                                created_at: row.get(3)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }

    /// Insert a package version
    pub async fn insert_package_version(
        &self,
        package_id: i64,
        version: &str,
        display_name: &str,
    ) -> Result<PackageVersionRecord> {
        let record = PackageVersionRecord {
            id: 0,
            package_id,
            version: version.to_string(),
            display_name: display_name.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO package_versions (package_id, version, display_name, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![
                        record.package_id,
                        record.version,
                        record.display_name,
                        record.created_at
                    ],
                )
                .with_context(|| format!("Failed to insert package version {}", record.version))?;
                Ok(PackageVersionRecord {
                    id: conn.last_insert_rowid(),
                    ..record
                })
            })
            .await
    }

    /// List the versions of a package in insertion order
    pub async fn list_package_versions(&self, package_id: i64) -> Result<Vec<PackageVersionRecord>> {
        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "SELECT {} FROM package_versions WHERE package_id = ?1 ORDER BY id",
                    PACKAGE_VERSION_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let versions = stmt
                    .query_map([package_id], package_version_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(versions)
            })
            .await
    }

    /// Attach strings to a package version; returns the number of new links
    pub async fn link_version_strings(&self, version_id: i64, string_ids: Vec<i64>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let mut linked = 0;
                for string_id in string_ids {
                    linked += tx.execute(
                        r#"
                        INSERT OR IGNORE INTO package_version_strings (package_version_id, string_id)
                        VALUES (?1, ?2)
                        "#,
                        params![version_id, string_id],
                    )?;
                }
                debug!("Linked {} strings to package version {}", linked, version_id);
                Ok(linked)
            })
            .await
    }

    /// Strings of a version paired with their exportable translation, if any
    pub async fn version_translations(
        &self,
        version_id: i64,
        language_id: &str,
    ) -> Result<Vec<(StringRecord, Option<TranslationRecord>)>> {
        let language_id = language_id.to_string();
        self.db
            .execute_async(move |conn| {
                let string_columns = STRING_COLUMNS
                    .split(", ")
                    .map(|c| format!("s.{}", c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let translation_columns = TRANSLATION_COLUMNS
                    .split(", ")
                    .map(|c| format!("t.{}", c.trim()))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    r#"
                    SELECT {}, {}
                    FROM package_version_strings vs
                    INNER JOIN translatable_strings s ON s.id = vs.string_id
                    LEFT JOIN translations t
                        ON t.string_id = s.id
                       AND t.language_id = ?2
                       AND t.is_current = 1
                       AND t.approval = 'approved'
                    WHERE vs.package_version_id = ?1
                    ORDER BY s.id
                    "#,
                    string_columns, translation_columns
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![version_id, language_id], |row| {
                        let string = string_from_row(row)?;
                        let translation_id: Option<i64> = row.get(6)?;
                        let translation = match translation_id {
                            Some(_) => Some(translation_from_row_at(row, 6)?),
                            None => None,
                        };
                        Ok((string, translation))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }
}
