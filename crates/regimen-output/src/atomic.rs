//! Replace-if-exists writes through a sibling temp file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OutputError, Result};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `path` via a temp file and a rename.
///
/// Fails with [`OutputError::TargetExists`] before touching the filesystem
/// when the target exists and `replace` is false. A failed write removes the
/// temp file and leaves any previous target intact. Returns whether an existing
/// target was replaced.
pub(crate) fn write_atomic<F>(path: &Path, replace: bool, write: F) -> Result<bool>
where
    F: FnOnce(&mut File, &Path) -> Result<()>,
{
    let existed = path.exists();
    if existed && !replace {
        return Err(OutputError::TargetExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path).map_err(|source| OutputError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    let written = write(&mut file, path).and_then(|()| {
        file.sync_all().map_err(|source| OutputError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })
    });
    drop(file);
    if let Err(error) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(error);
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        OutputError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %path.display(), replaced = existed, "output written");
    Ok(existed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;

    fn write_text(text: &'static str) -> impl FnOnce(&mut File, &Path) -> Result<()> {
        move |file, path| {
            file.write_all(text.as_bytes()).map_err(|source| OutputError::Io {
                operation: "write",
                path: path.to_path_buf(),
                source,
            })
        }
    }

    #[test]
    fn replaces_existing_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(!write_atomic(&path, true, write_text("first")).unwrap());
        assert!(write_atomic(&path, true, write_text("second")).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn refuses_existing_target_without_replace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "keep").unwrap();
        let error = write_atomic(&path, false, write_text("lost")).unwrap_err();
        assert!(matches!(error, OutputError::TargetExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn failed_write_keeps_previous_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "previous").unwrap();
        let error = write_atomic(&path, true, |_, path| {
            Err(OutputError::TargetExists {
                path: path.to_path_buf(),
            })
        })
        .unwrap_err();
        assert!(matches!(error, OutputError::TargetExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, false, write_text("rows")).unwrap();
        assert!(path.exists());
    }
}
