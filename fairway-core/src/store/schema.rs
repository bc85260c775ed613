#![forbid(unsafe_code)]

use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

/// Version recorded in `harvest_schema_version` by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Initialise the harvest schema inside an open SQLite database.
///
/// Creates the `events` and `results` relations, their supporting index and
/// the schema version table in one transaction. Tables created by earlier
/// runs are left untouched. A database stamped with a different version is
/// rejected so migrations can be applied explicitly.
pub(crate) fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_core_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    Ok(())
}

fn create_core_tables(transaction: &rusqlite::Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create events",
        "CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            event_name TEXT,
            year INTEGER,
            scraped INTEGER DEFAULT 0
        )",
    )?;
    run_migration_step(
        transaction,
        "create results",
        "CREATE TABLE IF NOT EXISTS results (
            player_name TEXT,
            event_name TEXT,
            year INTEGER,
            score_to_par INTEGER,
            position TEXT,
            event_id TEXT,
            PRIMARY KEY (player_name, event_id)
        )",
    )
}

fn create_indexes(transaction: &rusqlite::Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "index results by event",
        "CREATE INDEX IF NOT EXISTS idx_results_event ON results(event_id)",
    )?;
    run_migration_step(
        transaction,
        "index results for export",
        "CREATE INDEX IF NOT EXISTS idx_results_export
            ON results(year, event_name, player_name)
            WHERE score_to_par IS NOT NULL",
    )
}

fn ensure_schema_version(transaction: &rusqlite::Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS harvest_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM harvest_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(SchemaError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        None => {
            transaction
                .execute(
                    "INSERT INTO harvest_schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(|source| SchemaError::Migration {
                    step: "record schema version",
                    source,
                })?;
        }
    }

    Ok(())
}

fn run_migration_step(
    transaction: &rusqlite::Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when initialising the harvest schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A DDL statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Short description of the failing step.
        step: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible build.
    #[error(
        "expected harvest schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}
