/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for all database tables
 * and handles schema migrations for version upgrades.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Foreign keys are a per-connection setting
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    // Enable WAL mode for better concurrency and crash recovery
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    // is_source is 1 or NULL so the partial index only constrains the source row
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS languages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            plural_count INTEGER NOT NULL CHECK (plural_count BETWEEN 1 AND 6),
            plural_formula TEXT NOT NULL,
            plural_forms TEXT NOT NULL,
            is_approved INTEGER NOT NULL DEFAULT 0,
            is_source INTEGER CHECK (is_source IS NULL OR is_source = 1),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_languages_single_source
            ON languages(is_source) WHERE is_source = 1;
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS translatable_strings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT NOT NULL UNIQUE,
            context TEXT NOT NULL DEFAULT '',
            singular TEXT NOT NULL,
            plural TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    // is_current is 1 or NULL, never 0: the partial unique index only
    // restricts the single current row of each (language, string) pair
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            language_id TEXT NOT NULL REFERENCES languages(id),
            string_id INTEGER NOT NULL REFERENCES translatable_strings(id),
            is_current INTEGER CHECK (is_current IS NULL OR is_current = 1),
            approval TEXT NOT NULL DEFAULT 'pending'
                CHECK (approval IN ('approved', 'rejected', 'pending')),
            text0 TEXT NOT NULL DEFAULT '',
            text1 TEXT NOT NULL DEFAULT '',
            text2 TEXT NOT NULL DEFAULT '',
            text3 TEXT NOT NULL DEFAULT '',
            text4 TEXT NOT NULL DEFAULT '',
            text5 TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            created_by TEXT,
            current_since TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_translations_single_current
            ON translations(language_id, string_id) WHERE is_current = 1;
        CREATE INDEX IF NOT EXISTS idx_translations_pair ON translations(language_id, string_id);
        CREATE INDEX IF NOT EXISTS idx_translations_approval ON translations(language_id, approval);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            handle TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS package_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL REFERENCES packages(id) ON DELETE CASCADE,
            version TEXT NOT NULL,
            display_name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(package_id, version)
        );

        CREATE TABLE IF NOT EXISTS package_version_strings (
            package_version_id INTEGER NOT NULL REFERENCES package_versions(id) ON DELETE CASCADE,
            string_id INTEGER NOT NULL REFERENCES translatable_strings(id),
            PRIMARY KEY (package_version_id, string_id)
        );

        CREATE INDEX IF NOT EXISTS idx_package_versions_package ON package_versions(package_id);
        "#,
    )?;

    info!("Database schema created successfully");
    Ok(())
}

/// Migrate the schema from one version to another
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    let current = from_version;

    if current < SCHEMA_VERSION {
        // No migration steps exist yet; v1 is the first released schema
        return Err(anyhow::anyhow!(
            "Unknown schema version: {}. Cannot migrate.",
            current
        ));
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    info!("Schema migration completed to v{}", SCHEMA_VERSION);
    Ok(())
}
