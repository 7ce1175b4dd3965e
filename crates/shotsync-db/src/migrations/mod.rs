//! Embedded schema migrations.
//!
//! The schema version is kept in SQLite's `user_version` pragma. Each pending
//! migration runs in its own transaction together with the version bump.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {version} ({name}) failed: {reason}")]
    Failed {
        version: u32,
        name: &'static str,
        reason: String,
    },
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version; versions start at 1 and never repeat.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "entities",
    sql: include_str!("001_entities.sql"),
}];

/// Schema version stored in the database; 0 for a fresh file.
pub fn current_version(conn: &Connection) -> Result<u32, MigrationError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Highest version this build knows how to apply.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Apply every migration newer than the stored version.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    let from = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        let failed = |e: rusqlite::Error| MigrationError::Failed {
            version: migration.version,
            name: migration.name,
            reason: e.to_string(),
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        // PRAGMA does not accept bound parameters.
        tx.execute_batch(&format!("PRAGMA user_version = {}", migration.version))
            .map_err(failed)?;
        tx.commit().map_err(failed)?;

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applied migration"
        );
        applied += 1;
    }

    Ok(applied)
}
