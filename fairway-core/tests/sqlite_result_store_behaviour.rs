//! Behavioural tests for `SqliteResultStore` using rstest-bdd.

use std::{cell::RefCell, path::PathBuf};

use fairway_core::{Event, ResultRow, ResultStore, SqliteResultStore};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const MASTERS_ID: &str = "401580360";

/// Shared state for store scenarios.
struct StoreWorld {
    temp_dir: TempDir,
    store: RefCell<Option<SqliteResultStore>>,
}

impl StoreWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            store: RefCell::new(None),
        }
    }

    fn database_path(&self) -> PathBuf {
        self.temp_dir.path().join("golf_data.db")
    }

    fn open(&self) {
        let store = SqliteResultStore::open(self.database_path()).expect("open store");
        self.store.replace(Some(store));
    }

    fn with_store<T>(&self, action: impl FnOnce(&mut SqliteResultStore) -> T) -> T {
        let mut borrowed = self.store.borrow_mut();
        let store = borrowed
            .as_mut()
            .expect("store should be opened before use");
        action(store)
    }
}

#[fixture]
fn world() -> StoreWorld {
    StoreWorld::new()
}

fn masters() -> Event {
    Event::new(MASTERS_ID, "Masters Tournament", "2024-04-11")
}

fn masters_rows() -> Vec<ResultRow> {
    [("Scottie Scheffler", Some(-11), "1"), ("Tiger Woods", None, "WD")]
        .into_iter()
        .map(|(player, score, position)| ResultRow {
            player_name: player.into(),
            event_name: "Masters Tournament".into(),
            year: 2024,
            score_to_par: score,
            position: position.into(),
            event_id: MASTERS_ID.into(),
        })
        .collect()
}

fn record_masters(world: &StoreWorld) {
    world.with_store(|store| {
        store
            .record_scraped(&masters(), &masters_rows())
            .expect("record Masters");
    });
}

#[given("a SQLite result store on disk")]
fn given_store(world: &StoreWorld) {
    world.open();
}

#[given("the Masters leaderboard has been recorded")]
fn given_recorded(world: &StoreWorld) {
    record_masters(world);
}

#[when("the Masters leaderboard is recorded again")]
fn when_recorded_again(world: &StoreWorld) {
    record_masters(world);
}

#[when("the store is reset")]
fn when_reset(world: &StoreWorld) {
    world.with_store(|store| store.clear().expect("clear store"));
}

#[when("the store is reopened")]
fn when_reopened(world: &StoreWorld) {
    world.store.replace(None);
    world.open();
}

#[then("the store holds one row per player for the Masters")]
fn then_one_row_per_player(world: &StoreWorld) {
    let mut rows = world.with_store(|store| store.results().expect("read rows"));
    rows.sort_by(|left, right| left.player_name.cmp(&right.player_name));
    assert_eq!(rows, masters_rows());
}

#[then("the Masters is reported as scraped")]
fn then_scraped(world: &StoreWorld) {
    let ids = world.with_store(|store| store.scraped_event_ids().expect("scraped ids"));
    assert!(ids.contains(MASTERS_ID), "expected {MASTERS_ID} in {ids:?}");
}

#[then("no events are reported as scraped")]
fn then_none_scraped(world: &StoreWorld) {
    let ids = world.with_store(|store| store.scraped_event_ids().expect("scraped ids"));
    assert!(ids.is_empty(), "expected no scraped events, got {ids:?}");
}

#[then("no result rows remain")]
fn then_no_rows(world: &StoreWorld) {
    let rows = world.with_store(|store| store.results().expect("read rows"));
    assert!(rows.is_empty(), "expected no rows, got {rows:?}");
}

#[scenario(path = "tests/features/sqlite_result_store.feature", index = 0)]
fn rerecording_is_idempotent(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_result_store.feature", index = 1)]
fn reset_forgets_events(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_result_store.feature", index = 2)]
fn scraped_events_survive_reopen(world: StoreWorld) {
    let _ = world;
}
