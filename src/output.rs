//! Artifact writing.
//!
//! Contents are fully rendered before this is called; the target only ever
//! holds the old contents or the new ones (write-then-rename).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{EvalprepError, Result};

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = stage(path, contents)?;
    commit(&temp_path, path)?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}

/// Write several already-rendered artifacts.
///
/// Every temp file is written before the first rename, so a write failure
/// leaves all targets untouched.
pub fn write_all_atomic<'a, I>(artifacts: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a Path, &'a str)>,
{
    let mut staged: Vec<(PathBuf, &Path)> = Vec::new();
    for (path, contents) in artifacts {
        match stage(path, contents) {
            Ok(temp_path) => staged.push((temp_path, path)),
            Err(e) => {
                for (temp_path, _) in &staged {
                    let _ = fs::remove_file(temp_path);
                }
                return Err(e);
            }
        }
    }

    for (i, (temp_path, path)) in staged.iter().enumerate() {
        if let Err(e) = commit(temp_path, path) {
            for (rest, _) in &staged[i + 1..] {
                let _ = fs::remove_file(rest);
            }
            return Err(e);
        }
    }

    debug!(files = staged.len(), "Wrote artifacts");
    Ok(())
}

/// Write `contents` into the temp sibling of `path`.
fn stage(path: &Path, contents: &str) -> Result<PathBuf> {
    let temp_path = temp_sibling(path)?;

    let file = File::create(&temp_path).map_err(|e| {
        EvalprepError::io(format!("creating temp file {}", temp_path.display()), e)
    })?;
    let mut writer = BufWriter::new(file);
    let written = writer
        .write_all(contents.as_bytes())
        .and_then(|()| writer.flush());
    drop(writer);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(EvalprepError::io(format!("writing {}", temp_path.display()), e));
    }
    Ok(temp_path)
}

fn commit(temp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(temp_path, path).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        EvalprepError::io(format!("renaming into {}", path.display()), e)
    })
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        EvalprepError::InvalidState(format!("output path {} has no file name", path.display()))
    })?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipe.yml");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join(".recipe.yml.tmp").exists());
    }

    #[test]
    fn test_missing_parent_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("request.json");
        assert!(matches!(write_atomic(&path, "{}"), Err(EvalprepError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        assert!(matches!(
            write_atomic(Path::new("/"), "x"),
            Err(EvalprepError::InvalidState(_))
        ));
    }

    #[test]
    fn test_write_all_atomic() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yml");
        let b = dir.path().join("b.yml");
        write_all_atomic([(a.as_path(), "a: 1\n"), (b.as_path(), "b: 2\n")]).unwrap();
        assert_eq!(fs::read_to_string(&b).unwrap(), "b: 2\n");
    }

    #[test]
    fn test_failed_batch_leaves_earlier_targets_untouched() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yml");
        fs::write(&a, "old").unwrap();
        let b = dir.path().join("absent").join("b.yml");

        let result = write_all_atomic([(a.as_path(), "new"), (b.as_path(), "b: 2\n")]);

        assert!(matches!(result, Err(EvalprepError::Io { .. })));
        assert_eq!(fs::read_to_string(&a).unwrap(), "old");
        assert!(!dir.path().join(".a.yml.tmp").exists());
    }
}
