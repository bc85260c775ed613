//! SQLite-backed [`ResultStore`].

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use thiserror::Error;

use crate::{Event, EventRecord, ResultRow};

use super::ResultStore;
use super::schema::{SchemaError, initialise_schema};

const UPSERT_EVENT: &str = "INSERT OR REPLACE INTO events (event_id, event_name, year, scraped)
    VALUES (?1, ?2, ?3, ?4)";

const UPSERT_RESULT: &str = "INSERT OR REPLACE INTO results (
        player_name,
        event_name,
        year,
        score_to_par,
        position,
        event_id
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Errors raised by [`SqliteResultStore`].
#[derive(Debug, Error)]
pub enum SqliteResultStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating or validating the schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A read or write statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Short description of the failing operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

impl SqliteResultStoreError {
    fn sqlite(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Sqlite { operation, source }
    }
}

/// Result store persisted in a single-writer SQLite database.
pub struct SqliteResultStore {
    connection: Connection,
}

impl fmt::Debug for SqliteResultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteResultStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteResultStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteResultStoreError::Open`] when the file cannot be opened
    /// and [`SqliteResultStoreError::Schema`] when the schema cannot be
    /// created or was written by an incompatible version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteResultStoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|source| SqliteResultStoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory store, mainly useful for tests.
    ///
    /// # Errors
    ///
    /// Fails when SQLite cannot allocate the database or create the schema.
    pub fn open_in_memory() -> Result<Self, SqliteResultStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteResultStoreError::Open {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, SqliteResultStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Look up the stored record for `event_id`.
    ///
    /// # Errors
    ///
    /// Propagates SQLite read failures.
    pub fn event_record(
        &self,
        event_id: &str,
    ) -> Result<Option<EventRecord>, SqliteResultStoreError> {
        self.connection
            .query_row(
                "SELECT event_id, event_name, year, scraped FROM events WHERE event_id = ?1",
                [event_id],
                |row| {
                    Ok(EventRecord {
                        event_id: row.get(0)?,
                        event_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        year: row.get::<_, Option<i32>>(2)?.unwrap_or_default(),
                        scraped: row.get::<_, Option<i64>>(3)?.unwrap_or_default() != 0,
                    })
                },
            )
            .optional()
            .map_err(SqliteResultStoreError::sqlite("read event record"))
    }

    fn write_event(
        transaction: &Transaction<'_>,
        record: &EventRecord,
    ) -> Result<(), SqliteResultStoreError> {
        transaction
            .prepare_cached(UPSERT_EVENT)
            .map_err(SqliteResultStoreError::sqlite("prepare upsert event"))?
            .execute(params![
                record.event_id,
                record.event_name,
                record.year,
                i64::from(record.scraped)
            ])
            .map(|_| ())
            .map_err(SqliteResultStoreError::sqlite("upsert event"))
    }

    fn write_results(
        transaction: &Transaction<'_>,
        rows: &[ResultRow],
    ) -> Result<(), SqliteResultStoreError> {
        let mut statement = transaction
            .prepare_cached(UPSERT_RESULT)
            .map_err(SqliteResultStoreError::sqlite("prepare upsert result"))?;
        for row in rows {
            statement
                .execute(params![
                    row.player_name,
                    row.event_name,
                    row.year,
                    row.score_to_par,
                    row.position,
                    row.event_id
                ])
                .map_err(SqliteResultStoreError::sqlite("upsert result"))?;
        }
        Ok(())
    }

    fn in_transaction<F>(
        &mut self,
        operation: &'static str,
        body: F,
    ) -> Result<(), SqliteResultStoreError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<(), SqliteResultStoreError>,
    {
        let transaction = self
            .connection
            .transaction()
            .map_err(SqliteResultStoreError::sqlite("begin transaction"))?;
        body(&transaction)?;
        transaction
            .commit()
            .map_err(SqliteResultStoreError::sqlite(operation))
    }
}

impl ResultStore for SqliteResultStore {
    type Error = SqliteResultStoreError;

    fn upsert_event(&mut self, record: &EventRecord) -> Result<(), Self::Error> {
        self.in_transaction("commit event", |tx| Self::write_event(tx, record))
    }

    fn upsert_results(&mut self, rows: &[ResultRow]) -> Result<(), Self::Error> {
        if rows.is_empty() {
            return Ok(());
        }
        self.in_transaction("commit results", |tx| Self::write_results(tx, rows))
    }

    fn record_scraped(&mut self, event: &Event, rows: &[ResultRow]) -> Result<(), Self::Error> {
        let record = EventRecord::scraped(event, rows);
        self.in_transaction("commit scraped event", |tx| {
            Self::write_results(tx, rows)?;
            Self::write_event(tx, &record)
        })
    }

    fn scraped_event_ids(&self) -> Result<HashSet<String>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached("SELECT event_id FROM events WHERE scraped = 1")
            .map_err(SqliteResultStoreError::sqlite("prepare scraped ids query"))?;
        statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(SqliteResultStoreError::sqlite("query scraped ids"))?
            .collect::<Result<HashSet<_>, _>>()
            .map_err(SqliteResultStoreError::sqlite("read scraped ids"))
    }

    fn results(&self) -> Result<Vec<ResultRow>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT player_name, event_name, year, score_to_par, position, event_id
                 FROM results",
            )
            .map_err(SqliteResultStoreError::sqlite("prepare results query"))?;
        statement
            .query_map([], |row| {
                Ok(ResultRow {
                    player_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    event_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    year: row.get::<_, Option<i32>>(2)?.unwrap_or_default(),
                    score_to_par: row.get(3)?,
                    position: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    event_id: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })
            .map_err(SqliteResultStoreError::sqlite("query results"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(SqliteResultStoreError::sqlite("read results"))
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.in_transaction("commit reset", |tx| {
            tx.execute("DELETE FROM results", [])
                .map_err(SqliteResultStoreError::sqlite("delete results"))?;
            tx.execute("DELETE FROM events", [])
                .map_err(SqliteResultStoreError::sqlite("delete events"))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests;
