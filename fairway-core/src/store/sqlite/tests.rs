//! Unit tests for the SQLite result store.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

fn row(player: &str, event_id: &str, score: Option<i32>, position: &str) -> ResultRow {
    ResultRow {
        player_name: player.into(),
        event_name: "Masters Tournament".into(),
        year: 2024,
        score_to_par: score,
        position: position.into(),
        event_id: event_id.into(),
    }
}

fn masters() -> Event {
    Event::new("401580360", "Masters Tournament", "2024-04-11")
}

#[fixture]
fn store() -> SqliteResultStore {
    SqliteResultStore::open_in_memory().expect("open in-memory store")
}

#[rstest]
fn initialises_schema_records_version(store: SqliteResultStore) {
    let version: i64 = store
        .connection
        .query_row(
            "SELECT version FROM harvest_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .expect("schema version present");
    assert_eq!(version, crate::SCHEMA_VERSION);

    let table_count: i64 = store
        .connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('events', 'results')",
            [],
            |row| row.get(0),
        )
        .expect("query tables");
    assert_eq!(table_count, 2, "expected events and results tables");
}

#[rstest]
fn upserting_identical_row_twice_keeps_one(mut store: SqliteResultStore) {
    let rows = [row("A", "401580360", Some(2), "T12")];

    store.upsert_results(&rows).expect("first upsert");
    store.upsert_results(&rows).expect("second upsert");

    assert_eq!(store.results().expect("read rows"), rows.to_vec());
}

#[rstest]
fn upsert_overwrites_changed_values(mut store: SqliteResultStore) {
    store
        .upsert_results(&[row("A", "401580360", Some(2), "T12")])
        .expect("seed row");
    store
        .upsert_results(&[row("A", "401580360", None, "WD")])
        .expect("replace row");

    assert_eq!(
        store.results().expect("read rows"),
        vec![row("A", "401580360", None, "WD")]
    );
}

#[rstest]
fn same_player_in_two_events_is_two_rows(mut store: SqliteResultStore) {
    store
        .upsert_results(&[row("A", "1", Some(0), "1"), row("A", "2", Some(1), "2")])
        .expect("upsert rows");

    assert_eq!(store.results().expect("read rows").len(), 2);
}

#[rstest]
fn record_scraped_marks_event_with_rows(mut store: SqliteResultStore) {
    let event = masters();
    let rows = [
        row("B", "401580360", Some(-3), "T5"),
        row("A", "401580360", Some(2), "T12"),
    ];

    store.record_scraped(&event, &rows).expect("record event");

    let ids = store.scraped_event_ids().expect("scraped ids");
    assert!(ids.contains("401580360"));
    assert_eq!(store.results().expect("read rows").len(), 2);
    let record = store
        .event_record("401580360")
        .expect("read record")
        .expect("record present");
    assert_eq!(record.event_name, "Masters Tournament");
    assert_eq!(record.year, 2024);
    assert!(record.scraped);
}

#[rstest]
fn record_scraped_without_rows_still_marks_event(mut store: SqliteResultStore) {
    let event = Event::new("401000001", "Rained Out Classic", "2023-06-01");

    store.record_scraped(&event, &[]).expect("record empty event");

    assert!(
        store
            .scraped_event_ids()
            .expect("scraped ids")
            .contains("401000001")
    );
    assert!(store.results().expect("read rows").is_empty());
}

#[rstest]
fn unscraped_event_is_not_reported(mut store: SqliteResultStore) {
    store
        .upsert_event(&EventRecord {
            event_id: "42".into(),
            event_name: "Pending".into(),
            year: 2024,
            scraped: false,
        })
        .expect("upsert event");

    assert!(store.scraped_event_ids().expect("scraped ids").is_empty());
    let record = store
        .event_record("42")
        .expect("read record")
        .expect("record present");
    assert!(!record.scraped);
}

#[rstest]
fn clear_removes_events_and_rows(mut store: SqliteResultStore) {
    store
        .record_scraped(&masters(), &[row("A", "401580360", Some(2), "T12")])
        .expect("record event");

    store.clear().expect("clear store");

    assert!(store.scraped_event_ids().expect("scraped ids").is_empty());
    assert!(store.results().expect("read rows").is_empty());
}

#[rstest]
fn contents_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("golf_data.db");
    {
        let mut store = SqliteResultStore::open(&path).expect("open store");
        store
            .record_scraped(&masters(), &[row("A", "401580360", Some(2), "T12")])
            .expect("record event");
    }

    let reopened = SqliteResultStore::open(&path).expect("reopen store");

    assert!(
        reopened
            .scraped_event_ids()
            .expect("scraped ids")
            .contains("401580360")
    );
    assert_eq!(reopened.results().expect("read rows").len(), 1);
}

#[rstest]
fn rejects_mismatched_schema_version() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("golf_data.db");
    drop(SqliteResultStore::open(&path).expect("create store"));
    let connection = Connection::open(&path).expect("open raw connection");
    connection
        .execute("UPDATE harvest_schema_version SET version = 99", [])
        .expect("bump version");
    drop(connection);

    let err = SqliteResultStore::open(&path).expect_err("version mismatch should fail");
    match err {
        SqliteResultStoreError::Schema(SchemaError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, crate::SCHEMA_VERSION);
            assert_eq!(found, 99);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn reads_rows_with_null_columns_from_older_databases(store: SqliteResultStore) {
    store
        .connection
        .execute(
            "INSERT INTO results (player_name, event_name, year, score_to_par, position, event_id)
             VALUES ('A', NULL, NULL, NULL, NULL, '7')",
            [],
        )
        .expect("insert sparse row");

    let rows = store.results().expect("read rows");

    assert_eq!(
        rows,
        vec![ResultRow {
            player_name: "A".into(),
            event_name: String::new(),
            year: 0,
            score_to_par: None,
            position: String::new(),
            event_id: "7".into(),
        }]
    );
}
