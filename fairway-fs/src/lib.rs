//! Capability-based file helpers shared by the checkpoint and export writers.
//!
//! Every helper resolves the parent directory of a UTF-8 path through
//! `cap-std` ambient authority and then operates relative to that directory
//! handle, so callers never juggle raw `std::fs` paths.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};
use std::path::Component;

const TEMP_SUFFIX: &str = ".partial";

/// Open the parent directory of `path` and return it with the file name.
///
/// A bare file name such as `event_ids.json` resolves against the current
/// directory.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} should include a file name")))?
        .to_string();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Read `path` as UTF-8, returning `None` when the file does not exist.
pub fn read_if_exists(path: &Utf8Path) -> io::Result<Option<String>> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    match dir.read_to_string(&name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Create (or truncate) `path`, creating parent directories first.
pub fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(&name)
}

/// Replace `path` with `contents` so readers see either the old or new file.
///
/// The bytes are written and synced to a sibling temporary file which is then
/// renamed over the target. A failed write removes the temporary file.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let temp_name = format!(".{name}{TEMP_SUFFIX}");

    let written = dir.create(&temp_name).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|()| dir.rename(&temp_name, &dir, &name)) {
        // Best effort: report the write error, not the cleanup error.
        let _ = dir.remove_file(&temp_name);
        return Err(err);
    }
    Ok(())
}

/// Split an absolute or relative directory into an ambient base directory and
/// a relative suffix that `cap-std` can resolve beneath it.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
    }

    #[rstest]
    fn read_if_exists_reports_missing_file(temp_dir: TempDir) {
        let path = utf8_root(&temp_dir).join("event_ids.json");

        assert_eq!(read_if_exists(&path).expect("read"), None);
    }

    #[rstest]
    fn read_if_exists_reports_missing_directory(temp_dir: TempDir) {
        let path = utf8_root(&temp_dir).join("absent/event_ids.json");

        assert_eq!(read_if_exists(&path).expect("read"), None);
    }

    #[rstest]
    fn create_file_builds_parent_directories(temp_dir: TempDir) {
        let path = utf8_root(&temp_dir).join("golf/data/golf_results.csv");

        let mut file = create_file(&path).expect("create file");
        file.write_all(b"header\n").expect("write");
        drop(file);

        assert_eq!(
            fs::read_to_string(path.as_std_path()).expect("read back"),
            "header\n"
        );
    }

    #[rstest]
    fn write_atomic_replaces_contents_and_leaves_no_temp_file(temp_dir: TempDir) {
        let root = utf8_root(&temp_dir);
        let path = root.join("event_ids.json");
        fs::write(path.as_std_path(), "old").expect("seed file");

        write_atomic(&path, b"new").expect("atomic write");

        assert_eq!(read_if_exists(&path).expect("read"), Some("new".into()));
        let names: Vec<_> = fs::read_dir(root.as_std_path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("event_ids.json")]);
    }

    #[rstest]
    fn open_dir_and_file_rejects_paths_without_file_name() {
        let err = open_dir_and_file(Utf8Path::new("/")).expect_err("root has no file name");
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[rstest]
    fn base_dir_and_relative_splits_absolute_paths(temp_dir: TempDir) {
        let root = utf8_root(&temp_dir);

        let (_, relative) = base_dir_and_relative(&root).expect("split path");

        assert!(!relative.is_absolute());
        assert!(root.as_str().ends_with(relative.as_str()));
    }
}
