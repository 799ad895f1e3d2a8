/*!
 * Database module for persistent storage of the translation store.
 *
 * This module provides SQLite-based persistence for:
 * - Languages and their plural schemas
 * - Translatable strings keyed by fingerprint
 * - Translation rows with their currency marker and approval state
 * - Packages, package versions and the strings they ship
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::Repository;
