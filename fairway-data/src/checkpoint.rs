//! Durable snapshot of discovered events.
//!
//! Discovery walks every week of every requested year, so its result is
//! cached between runs. The checkpoint is an ordered JSON array of
//! `{id, name, date}` objects; deleting it forces a fresh discovery.

use camino::{Utf8Path, Utf8PathBuf};
use fairway_core::Event;
use thiserror::Error;

/// Errors raised while loading or saving a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading the checkpoint file failed.
    #[error("failed to read checkpoint at {path}")]
    Read {
        /// Location of the checkpoint.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The checkpoint exists but is not a JSON array of events.
    #[error("checkpoint at {path} is not a valid event list")]
    Parse {
        /// Location of the checkpoint.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the event list failed.
    #[error("failed to encode checkpoint")]
    Encode(#[source] serde_json::Error),
    /// Writing the checkpoint file failed.
    #[error("failed to write checkpoint at {path}")]
    Write {
        /// Location of the checkpoint.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Loadable and saveable snapshot of the discovered event list.
pub trait EventCheckpoint {
    /// Return the saved events, or `None` when no checkpoint exists yet.
    ///
    /// # Errors
    ///
    /// Fails when a checkpoint exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<Vec<Event>>, CheckpointError>;

    /// Replace the checkpoint with `events`, preserving their order.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot cannot be encoded or written.
    fn save(&mut self, events: &[Event]) -> Result<(), CheckpointError>;
}

impl<C: EventCheckpoint + ?Sized> EventCheckpoint for &mut C {
    fn load(&self) -> Result<Option<Vec<Event>>, CheckpointError> {
        (**self).load()
    }

    fn save(&mut self, events: &[Event]) -> Result<(), CheckpointError> {
        (**self).save(events)
    }
}

/// Checkpoint stored as a pretty-printed JSON file.
///
/// Saves go through a temporary sibling file and a rename, so an interrupted
/// run leaves either the previous checkpoint or the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileCheckpoint {
    path: Utf8PathBuf,
}

impl JsonFileCheckpoint {
    /// Use the checkpoint file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl EventCheckpoint for JsonFileCheckpoint {
    fn load(&self) -> Result<Option<Vec<Event>>, CheckpointError> {
        let Some(contents) =
            fairway_fs::read_if_exists(&self.path).map_err(|source| CheckpointError::Read {
                path: self.path.clone(),
                source,
            })?
        else {
            return Ok(None);
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| CheckpointError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&mut self, events: &[Event]) -> Result<(), CheckpointError> {
        let mut encoded = serde_json::to_vec_pretty(events).map_err(CheckpointError::Encode)?;
        encoded.push(b'\n');
        fairway_fs::write_atomic(&self.path, &encoded).map_err(|source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory checkpoint for tests and dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCheckpoint {
    events: Option<Vec<Event>>,
    saves: usize,
}

impl MemoryCheckpoint {
    /// Start with an existing snapshot, as if a previous run had saved it.
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            saves: 0,
        }
    }

    /// Current snapshot, if any.
    #[must_use]
    pub fn events(&self) -> Option<&[Event]> {
        self.events.as_deref()
    }

    /// Number of times [`EventCheckpoint::save`] has been called.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl EventCheckpoint for MemoryCheckpoint {
    fn load(&self) -> Result<Option<Vec<Event>>, CheckpointError> {
        Ok(self.events.clone())
    }

    fn save(&mut self, events: &[Event]) -> Result<(), CheckpointError> {
        self.events = Some(events.to_vec());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct CheckpointFile {
        _dir: TempDir,
        checkpoint: JsonFileCheckpoint,
    }

    #[fixture]
    fn file() -> CheckpointFile {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("event_ids.json"))
            .expect("utf-8 temp path");
        CheckpointFile {
            _dir: dir,
            checkpoint: JsonFileCheckpoint::new(path),
        }
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new("401580360", "Masters Tournament", "2024-04-11"),
            Event::new("401580355", "", ""),
        ]
    }

    #[rstest]
    fn missing_file_loads_as_none(file: CheckpointFile) {
        assert_eq!(file.checkpoint.load().expect("load"), None);
    }

    #[rstest]
    fn saved_events_load_in_order(mut file: CheckpointFile) {
        file.checkpoint.save(&events()).expect("save");

        assert_eq!(file.checkpoint.load().expect("load"), Some(events()));
    }

    #[rstest]
    fn file_is_pretty_printed_array(mut file: CheckpointFile) {
        file.checkpoint
            .save(&events()[..1])
            .expect("save single event");

        let written = fs::read_to_string(file.checkpoint.path().as_std_path()).expect("read");
        assert_eq!(
            written,
            "[\n  {\n    \"id\": \"401580360\",\n    \"name\": \"Masters Tournament\",\n    \"date\": \"2024-04-11\"\n  }\n]\n"
        );
    }

    #[rstest]
    fn entries_without_name_or_date_are_accepted(file: CheckpointFile) {
        fs::write(
            file.checkpoint.path().as_std_path(),
            r#"[{"id": "401580360"}]"#,
        )
        .expect("seed checkpoint");

        assert_eq!(
            file.checkpoint.load().expect("load"),
            Some(vec![Event::new("401580360", "", "")])
        );
    }

    #[rstest]
    fn corrupt_file_is_a_parse_error(file: CheckpointFile) {
        fs::write(file.checkpoint.path().as_std_path(), "{ not json").expect("seed checkpoint");

        let err = file.checkpoint.load().expect_err("corrupt checkpoint");
        assert!(matches!(err, CheckpointError::Parse { .. }));
    }

    #[rstest]
    fn memory_checkpoint_counts_saves() {
        let mut checkpoint = MemoryCheckpoint::default();
        assert_eq!(checkpoint.load().expect("load"), None);

        checkpoint.save(&events()).expect("save");

        assert_eq!(checkpoint.saves(), 1);
        assert_eq!(checkpoint.events(), Some(events().as_slice()));
    }
}
