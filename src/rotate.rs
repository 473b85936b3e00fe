//! File rotation engine.
//!
//! Only the writer task calls into this module. A rotation renames the
//! active file away, shifts the numbered backups beneath it, and republishes
//! a fresh handle through the logger's atomic file slot. Producers holding a
//! clone of the old handle keep a valid (renamed) file; it closes when the
//! last clone drops.

use crate::logger::Inner;
use crate::timestamp;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Insert a day into the file name, keeping the extension:
/// `app.log` becomes `app-2025-11-25.log`.
pub(crate) fn dated_path(path: &Path, day: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut name = format!("{stem}-{day}");
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        name.push('.');
        name.push_str(ext);
    }
    path.with_file_name(name)
}

/// `stem` plus a numeric backup suffix: `app.log` + 0 becomes `app.log.0`.
pub(crate) fn numbered_path(stem: &Path, index: usize) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Shift numbered backups one slot up, newest first.
///
/// Backups occupy suffixes `0 ..= max_backups - 1`; the rename of
/// `.(max_backups - 2)` onto `.(max_backups - 1)` overwrites the oldest, so
/// `.max_backups` is never created.
pub(crate) fn shift_backups(stem: &Path, max_backups: usize) {
    if max_backups == 0 {
        return;
    }
    for i in (0..max_backups - 1).rev() {
        let src = numbered_path(stem, i);
        if src.exists() {
            let dst = numbered_path(stem, i + 1);
            if let Err(err) = fs::rename(&src, &dst) {
                crate::internal(format_args!(
                    "backup shift {} -> {} failed: {err}",
                    src.display(),
                    dst.display()
                ));
            }
        }
    }
}

/// Rename the active file to `target` and recreate it at the original path.
///
/// Returns false when the rename itself fails: the active file and its
/// handle are left untouched, so the caller keeps its size accounting and
/// retries the rotation on a later flush. After a successful rename the
/// rotation is complete even if the reopen fails; the slot is emptied and
/// the writer keeps pending bytes in its scratch until a later open
/// succeeds or the logger closes.
pub(crate) fn rotate_to(inner: &Inner, target: &Path) -> bool {
    if let Err(err) = fs::rename(&inner.path, target) {
        crate::internal(format_args!(
            "rename {} -> {} failed: {err}",
            inner.path.display(),
            target.display()
        ));
        return false;
    }
    match OpenOptions::new().create(true).append(true).open(&inner.path) {
        Ok(file) => inner.file.store(Some(Arc::new(file))),
        Err(err) => {
            crate::internal(format_args!(
                "reopen {} failed: {err}",
                inner.path.display()
            ));
            inner.file.store(None);
        }
    }
    inner.counters.rotations.fetch_add(1, Ordering::Relaxed);
    true
}

/// Move the active file to its dated name for `day`.
///
/// False means the content never moved; the caller must not advance its day
/// bookkeeping, or the pending rotation would be skipped until the next
/// calendar boundary and the dated file would end up spanning days.
pub(crate) fn rotate_by_date(inner: &Inner, day: &str, max_backups: usize) -> bool {
    let dated = dated_path(&inner.path, day);
    shift_backups(&dated, max_backups);
    rotate_to(inner, &dated)
}

/// Move the active file to backup slot `.0` under the size-rotation stem.
///
/// False means the active file is still in place with its old size.
pub(crate) fn rotate_by_size(inner: &Inner, daily: bool, max_backups: usize) -> bool {
    let stem = if daily {
        dated_path(&inner.path, &timestamp::today())
    } else {
        inner.path.clone()
    };
    shift_backups(&stem, max_backups);
    rotate_to(inner, &numbered_path(&stem, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_path_with_extension() {
        let dated = dated_path(Path::new("/var/log/app.log"), "2025-11-25");
        assert_eq!(dated, Path::new("/var/log/app-2025-11-25.log"));
    }

    #[test]
    fn test_dated_path_without_extension() {
        let dated = dated_path(Path::new("/var/log/app"), "2025-11-25");
        assert_eq!(dated, Path::new("/var/log/app-2025-11-25"));
    }

    #[test]
    fn test_numbered_path() {
        let p = numbered_path(Path::new("/var/log/app.log"), 2);
        assert_eq!(p, Path::new("/var/log/app.log.2"));
        let dated = dated_path(Path::new("/var/log/app.log"), "2025-11-25");
        assert_eq!(
            numbered_path(&dated, 0),
            Path::new("/var/log/app-2025-11-25.log.0")
        );
    }

    #[test]
    fn test_shift_backups_overwrites_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("app.log");
        for i in 0..3 {
            fs::write(numbered_path(&stem, i), format!("backup {i}")).unwrap();
        }

        shift_backups(&stem, 3);

        assert!(!numbered_path(&stem, 0).exists());
        assert_eq!(fs::read_to_string(numbered_path(&stem, 1)).unwrap(), "backup 0");
        assert_eq!(fs::read_to_string(numbered_path(&stem, 2)).unwrap(), "backup 1");
        assert!(!numbered_path(&stem, 3).exists(), "oldest must be overwritten");
    }

    #[test]
    fn test_shift_backups_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("app.log");
        fs::write(numbered_path(&stem, 0), "only").unwrap();

        // one retained backup: .0 stays where it is and is overwritten later
        shift_backups(&stem, 1);
        assert!(numbered_path(&stem, 0).exists());
        assert!(!numbered_path(&stem, 1).exists());
    }
}
