//! Simulator output artifacts on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Delete the outputs of a previous run.
///
/// Missing files are fine. Any other failure is logged and skipped so that a
/// stuck file never blocks a new run. Returns how many files were removed.
pub fn clear_stale_artifacts<S: AsRef<str>>(outputs_dir: &Path, names: &[S]) -> usize {
    let mut removed = 0;
    for name in names {
        let path = outputs_dir.join(name.as_ref());
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed stale artifact");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not remove stale artifact, continuing");
            }
        }
    }
    removed
}

/// Paths of the configured artifacts that currently exist, in configured order.
pub fn list_artifacts<S: AsRef<str>>(outputs_dir: &Path, names: &[S]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| outputs_dir.join(name.as_ref()))
        .filter(|path| path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clear_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("V_M_max.csv"), "x").unwrap();

        let removed = clear_stale_artifacts(dir.path(), &["Q_M_max.csv", "V_M_max.csv"]);
        assert_eq!(removed, 1);
        assert!(!dir.path().join("V_M_max.csv").exists());
    }

    #[test]
    fn test_clear_skips_undeletable_entries() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be removed with remove_file
        fs::create_dir(dir.path().join("d_max.csv")).unwrap();
        fs::write(dir.path().join("V_M_max.csv"), "x").unwrap();

        let removed = clear_stale_artifacts(dir.path(), &["d_max.csv", "V_M_max.csv"]);
        assert_eq!(removed, 1);
        assert!(dir.path().join("d_max.csv").is_dir());
    }

    #[test]
    fn test_list_only_existing_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x").unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();

        let listed = list_artifacts(dir.path(), &["b.csv", "missing.csv", "a.csv"]);
        assert_eq!(listed, vec![dir.path().join("b.csv"), dir.path().join("a.csv")]);
    }
}
