use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `start` absolute against the process working directory and fold
/// `.` and `..` lexically. Symlinks are not resolved, so returned ancestors
/// stay under the path the caller gave us.
fn absolute(start: &Path) -> PathBuf {
    let abs = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Check one directory level for `marker`. Unreadable levels count as
/// "absent" so the walk can keep going upward.
fn has_marker(dir: &Path, marker: &str) -> bool {
    let candidate = dir.join(marker);
    match fs::symlink_metadata(&candidate) {
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::debug!(path = %candidate.display(), error = %e, "skipping unreadable level");
            false
        }
    }
}

/// Return the nearest ancestor of `start` (inclusive) containing `marker`.
///
/// Only the direct ancestor chain is inspected, never siblings. The result
/// is the containing directory, not the marker path.
pub fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    let start = absolute(start);
    let found = start
        .ancestors()
        .find(|dir| has_marker(dir, marker))
        .map(Path::to_path_buf);
    tracing::trace!(start = %start.display(), marker, found = ?found, "upward search");
    found
}
