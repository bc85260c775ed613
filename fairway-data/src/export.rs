//! Flat CSV projection of the stored results.
//!
//! Only rows with a parsed score are exported. Output is ordered by year,
//! event name and player name so that unchanged store contents always
//! produce byte-identical files. Fields are written verbatim, without
//! quoting.

use std::io::{self, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use fairway_core::{ResultRow, ResultStore};
use thiserror::Error;

/// Header line of the export file.
pub const CSV_HEADER: &str = "player_name,event_name,year,score_to_par,position";

/// Errors raised while exporting results.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading rows from the store failed.
    #[error("failed to read results from the store")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Creating or writing the output file failed.
    #[error("failed to write export to {path}")]
    Write {
        /// Destination file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Export every scored row in `store` to `destination`, returning the row
/// count.
///
/// Parent directories are created and an existing file is replaced.
///
/// # Errors
///
/// Returns [`ExportError::Query`] when the store cannot be read and
/// [`ExportError::Write`] when the file cannot be written.
pub fn export_results<S>(store: &S, destination: &Utf8Path) -> Result<usize, ExportError>
where
    S: ResultStore + ?Sized,
{
    let rows = store
        .results()
        .map_err(|err| ExportError::Query(Box::new(err)))?;
    let write_error = |source| ExportError::Write {
        path: destination.to_path_buf(),
        source,
    };
    let file = fairway_fs::create_file(destination).map_err(write_error)?;
    let exported = write_results(&rows, file).map_err(write_error)?;
    log::info!("exported {exported} rows to {destination}");
    Ok(exported)
}

/// Write the scored subset of `rows` as CSV to `writer`.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
///
/// # Examples
/// ```
/// use fairway_core::ResultRow;
/// use fairway_data::export::write_results;
///
/// let row = |player: &str, score, position: &str| ResultRow {
///     player_name: player.into(),
///     event_name: "Masters".into(),
///     year: 2024,
///     score_to_par: score,
///     position: position.into(),
///     event_id: "401580360".into(),
/// };
/// let rows = [row("B", Some(-3), "T5"), row("A", Some(2), "T12"), row("C", None, "WD")];
///
/// let mut out = Vec::new();
/// assert_eq!(write_results(&rows, &mut out)?, 2);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "player_name,event_name,year,score_to_par,position\n\
///      A,Masters,2024,2,T12\n\
///      B,Masters,2024,-3,T5\n"
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_results<W: Write>(rows: &[ResultRow], writer: W) -> io::Result<usize> {
    let mut scored: Vec<(&ResultRow, i32)> = rows
        .iter()
        .filter_map(|row| row.score_to_par.map(|score| (row, score)))
        .collect();
    scored.sort_by(|(left, _), (right, _)| {
        (left.year, &left.event_name, &left.player_name, &left.event_id).cmp(&(
            right.year,
            &right.event_name,
            &right.player_name,
            &right.event_id,
        ))
    });

    let mut out = BufWriter::new(writer);
    writeln!(out, "{CSV_HEADER}")?;
    for (row, score) in &scored {
        writeln!(
            out,
            "{},{},{},{},{}",
            row.player_name, row.event_name, row.year, score, row.position
        )?;
    }
    out.flush()?;
    Ok(scored.len())
}
