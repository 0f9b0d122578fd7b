use crate::error::{WorkspaceError, WorkspaceResult};
use crate::finder::find_upward;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the file that records the active branch for a checkout.
pub const BRANCH_MARKER: &str = ".cfgctl_branch";

const MAX_SLUG_LEN: usize = 64;

/// True if `slug` is lowercase alphanumeric words joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// Local record of the active branch, anchored at the nearest
/// `.cfgctl_branch` above the working directory.
///
/// The working directory is injected so lookups never depend on the global
/// process cwd.
pub struct BranchStore {
    cwd: PathBuf,
}

impl BranchStore {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Whether `dir` itself holds a marker file. No upward search.
    pub fn has_active_branch_marker(&self, dir: &Path) -> bool {
        dir.join(BRANCH_MARKER).is_file()
    }

    /// Path of the nearest marker file above the working directory.
    pub fn marker_path(&self) -> Option<PathBuf> {
        find_upward(&self.cwd, BRANCH_MARKER).map(|dir| dir.join(BRANCH_MARKER))
    }

    /// Where a switch should write: the existing marker if there is one,
    /// otherwise a new one in the working directory.
    pub fn marker_path_or_default(&self) -> PathBuf {
        self.marker_path().unwrap_or_else(|| self.cwd.join(BRANCH_MARKER))
    }

    /// Slug of the active branch, or `None` when there is no marker or the
    /// marker is empty.
    pub fn current_branch_slug(&self) -> WorkspaceResult<Option<String>> {
        match self.marker_path() {
            Some(path) => read_slug(&path),
            None => Ok(None),
        }
    }

    /// Overwrite the marker with `slug`. The caller has already confirmed
    /// the branch exists remotely.
    pub fn set_branch(&self, marker_path: &Path, slug: &str) -> WorkspaceResult<()> {
        fs::write(marker_path, format!("{slug}\n"))
            .map_err(|e| WorkspaceError::io("writing", marker_path, e))?;
        tracing::debug!(path = %marker_path.display(), slug, "active branch set");
        Ok(())
    }

    /// Empty the marker so no branch is active. The file is kept as the
    /// anchor for the next switch; a missing file is already cleared.
    pub fn clear_branch(&self, marker_path: &Path) -> WorkspaceResult<()> {
        if !marker_path.exists() {
            return Ok(());
        }
        fs::write(marker_path, "").map_err(|e| WorkspaceError::io("clearing", marker_path, e))?;
        tracing::debug!(path = %marker_path.display(), "active branch cleared");
        Ok(())
    }

    /// Best-effort check that git ignores the marker. Returns `true` when
    /// the caller should warn: the marker is not ignored, or the question
    /// could not be answered (no repository, path outside the work tree,
    /// git error).
    pub fn warn_if_not_ignored(&self, marker_path: &Path) -> bool {
        match is_ignored_by_git(marker_path) {
            Ok(ignored) => !ignored,
            Err(e) => {
                tracing::debug!(path = %marker_path.display(), error = %e, "ignore check unavailable");
                true
            }
        }
    }
}

/// Read the first line of the marker, trimmed. Empty means no branch.
fn read_slug(path: &Path) -> WorkspaceResult<Option<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WorkspaceError::io("reading", path, e)),
    };
    let slug = contents.lines().next().unwrap_or("").trim();
    if slug.is_empty() {
        Ok(None)
    } else {
        Ok(Some(slug.to_string()))
    }
}

fn is_ignored_by_git(marker_path: &Path) -> Result<bool, git2::Error> {
    let dir = marker_path.parent().unwrap_or(Path::new("."));
    let name = marker_path.file_name().unwrap_or(OsStr::new(BRANCH_MARKER));
    let repo = git2::Repository::discover(dir)?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| git2::Error::from_str("bare repository"))?;

    // Compare canonical forms so symlinked temp dirs still line up.
    let canon = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    let dir = canon(dir);
    let workdir = canon(workdir);
    let relative = dir
        .strip_prefix(&workdir)
        .map_err(|_| git2::Error::from_str("marker outside the work tree"))?
        .join(name);
    repo.is_path_ignored(&relative)
}

#[cfg(test)]
mod tests;
