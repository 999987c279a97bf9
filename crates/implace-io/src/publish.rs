//! All-or-nothing output publication
//!
//! Tables are staged in memory and written to temporary siblings of their
//! destinations. Only once every temporary file exists are the destinations
//! swapped in: existing files are first moved aside to backups, and any
//! failure during the swap restores them. Either every destination holds the
//! new table or every destination is left as it was.

use std::fs;
use std::path::{Path, PathBuf};

use crate::reader::{IoError, IoResult};

/// A set of output files published together
#[derive(Debug, Default)]
pub struct Publication {
    staged: Vec<(PathBuf, Vec<u8>)>,
}

/// One destination during the swap
struct Swap<'a> {
    path: &'a Path,
    temp: PathBuf,
    backup: Option<PathBuf>,
    placed: bool,
}

impl Publication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `contents` for `path`, replacing anything staged there before
    pub fn add(&mut self, path: impl Into<PathBuf>, contents: Vec<u8>) -> &mut Self {
        let path = path.into();
        self.staged.retain(|(p, _)| *p != path);
        self.staged.push((path, contents));
        self
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write every staged file, returning the published paths
    pub fn commit(self) -> IoResult<Vec<PathBuf>> {
        for (path, _) in &self.staged {
            if path.is_dir() {
                return Err(IoError::Io(format!("{}: is a directory", path.display())));
            }
        }

        let mut swaps: Vec<Swap<'_>> = Vec::with_capacity(self.staged.len());
        for (path, contents) in &self.staged {
            let temp = temp_path(path);
            let result = create_parent(path).and_then(|_| {
                fs::write(&temp, contents)
                    .map_err(|e| IoError::Io(format!("{}: {}", temp.display(), e)))
            });
            if let Err(err) = result {
                let _ = fs::remove_file(&temp);
                roll_back(&swaps);
                return Err(err);
            }
            swaps.push(Swap {
                path,
                temp,
                backup: None,
                placed: false,
            });
        }

        for index in 0..swaps.len() {
            if let Err(err) = swap_in(&mut swaps[index]) {
                roll_back(&swaps);
                return Err(err);
            }
        }

        for swap in &swaps {
            if let Some(backup) = &swap.backup {
                let _ = fs::remove_file(backup);
            }
            tracing::debug!("Published {}", swap.path.display());
        }

        Ok(self.staged.into_iter().map(|(path, _)| path).collect())
    }
}

/// Move the current destination aside, then the temp file into place
fn swap_in(swap: &mut Swap<'_>) -> IoResult<()> {
    if swap.path.exists() {
        let backup = sibling(swap.path, "implace-bak");
        fs::rename(swap.path, &backup)
            .map_err(|e| IoError::Io(format!("{}: {}", swap.path.display(), e)))?;
        swap.backup = Some(backup);
    }
    fs::rename(&swap.temp, swap.path)
        .map_err(|e| IoError::Io(format!("{}: {}", swap.path.display(), e)))?;
    swap.placed = true;
    Ok(())
}

/// Undo every swap: drop new files and temps, restore backups
fn roll_back(swaps: &[Swap<'_>]) {
    for swap in swaps.iter().rev() {
        if swap.placed {
            let _ = fs::remove_file(swap.path);
        }
        let _ = fs::remove_file(&swap.temp);
        if let Some(backup) = &swap.backup {
            let _ = fs::rename(backup, swap.path);
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

fn temp_path(path: &Path) -> PathBuf {
    sibling(path, "implace-tmp")
}

fn create_parent(path: &Path) -> IoResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| IoError::Io(format!("{}: {}", parent.display(), e))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commit_creates_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out/nested/places.csv");

        let mut publication = Publication::new();
        publication.add(&target, b"Name\n".to_vec());
        let paths = publication.commit().unwrap();

        assert_eq!(paths, vec![target.clone()]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "Name\n");
        assert!(!temp_path(&target).exists());
    }

    #[test]
    fn test_failed_commit_leaves_nothing() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.csv");
        // A regular file where a directory is needed
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let bad = blocker.join("bad.csv");

        let mut publication = Publication::new();
        publication.add(&good, b"a".to_vec()).add(&bad, b"b".to_vec());
        assert!(publication.commit().is_err());

        assert!(!good.exists());
        assert!(!temp_path(&good).exists());
    }

    #[test]
    fn test_directory_destination_keeps_every_output_unchanged() {
        let dir = tempdir().unwrap();
        let canonical = dir.path().join("places.csv");
        let audit = dir.path().join("removed.csv");
        fs::write(&canonical, "old").unwrap();
        fs::create_dir(&audit).unwrap();
        fs::write(audit.join("inside"), "x").unwrap();

        let mut publication = Publication::new();
        publication
            .add(&canonical, b"new".to_vec())
            .add(&audit, b"new".to_vec());
        assert!(publication.commit().is_err());

        assert_eq!(fs::read_to_string(&canonical).unwrap(), "old");
        assert!(audit.is_dir());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_failed_swap_restores_replaced_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "old first").unwrap();
        fs::write(&second, "old second").unwrap();

        let mut swaps = vec![
            Swap {
                path: &first,
                temp: temp_path(&first),
                backup: None,
                placed: false,
            },
            Swap {
                path: &second,
                // Never written, so moving it into place fails
                temp: temp_path(&second),
                backup: None,
                placed: false,
            },
        ];
        fs::write(&swaps[0].temp, "new first").unwrap();

        swap_in(&mut swaps[0]).unwrap();
        assert_eq!(fs::read_to_string(&first).unwrap(), "new first");
        assert!(swap_in(&mut swaps[1]).is_err());
        roll_back(&swaps);

        assert_eq!(fs::read_to_string(&first).unwrap(), "old first");
        assert_eq!(fs::read_to_string(&second).unwrap(), "old second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_replacing_existing_leaves_no_backup() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("places.csv");
        fs::write(&target, "old").unwrap();

        let mut publication = Publication::new();
        publication.add(&target, b"new".to_vec());
        publication.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_restaging_replaces() {
        let mut publication = Publication::new();
        publication.add("a.csv", b"1".to_vec()).add("a.csv", b"2".to_vec());
        assert_eq!(publication.len(), 1);
    }
}
