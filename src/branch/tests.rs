use super::*;
use std::fs;

/// Temp checkout with nested `src/deep` directories.
fn checkout() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("checkout");
    fs::create_dir_all(root.join("src/deep")).unwrap();
    (tmp, root)
}

fn git_init(dir: &Path) {
    git2::Repository::init(dir).unwrap();
}

// ===================================================================
// Slugs
// ===================================================================

#[test]
fn slug_validation() {
    assert!(is_valid_slug("my-feature"));
    assert!(is_valid_slug("release2"));
    assert!(!is_valid_slug(""));
    assert!(!is_valid_slug("My-Feature"));
    assert!(!is_valid_slug("-leading"));
    assert!(!is_valid_slug("double--hyphen"));
    assert!(!is_valid_slug("with space"));
    assert!(!is_valid_slug(&"a".repeat(65)));
}

// ===================================================================
// Marker lookup and round-trip
// ===================================================================

#[test]
fn no_marker_means_no_branch() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    assert_eq!(store.marker_path(), None);
    assert_eq!(store.current_branch_slug().unwrap(), None);
    assert_eq!(store.marker_path_or_default(), root.join(BRANCH_MARKER));
}

#[test]
fn marker_presence_checks_only_the_given_dir() {
    let (_tmp, root) = checkout();
    fs::write(root.join(BRANCH_MARKER), "feature\n").unwrap();
    let store = BranchStore::new(root.join("src"));

    assert!(store.has_active_branch_marker(&root));
    assert!(!store.has_active_branch_marker(&root.join("src")));
}

#[test]
fn set_then_read_from_any_descendant() {
    let (_tmp, root) = checkout();
    let marker = root.join(BRANCH_MARKER);
    BranchStore::new(&root).set_branch(&marker, "my-feature").unwrap();

    assert_eq!(fs::read_to_string(&marker).unwrap(), "my-feature\n");
    for dir in [root.clone(), root.join("src"), root.join("src/deep")] {
        let store = BranchStore::new(&dir);
        assert_eq!(store.current_branch_slug().unwrap().as_deref(), Some("my-feature"));
        assert_eq!(store.marker_path(), Some(marker.clone()));
    }
}

#[test]
fn set_overwrites_previous_slug() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    let marker = store.marker_path_or_default();
    store.set_branch(&marker, "first").unwrap();
    store.set_branch(&marker, "second").unwrap();
    assert_eq!(store.current_branch_slug().unwrap().as_deref(), Some("second"));
}

#[test]
fn only_first_line_is_read_and_trimmed() {
    let (_tmp, root) = checkout();
    fs::write(root.join(BRANCH_MARKER), "  my-feature  \nfuture: data\n").unwrap();
    let store = BranchStore::new(&root);
    assert_eq!(store.current_branch_slug().unwrap().as_deref(), Some("my-feature"));
}

#[test]
fn whitespace_only_marker_means_no_branch() {
    let (_tmp, root) = checkout();
    fs::write(root.join(BRANCH_MARKER), "   \nleftover\n").unwrap();
    assert_eq!(BranchStore::new(&root).current_branch_slug().unwrap(), None);
}

// ===================================================================
// Clearing
// ===================================================================

#[test]
fn clear_then_read_is_none_everywhere() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    let marker = store.marker_path_or_default();
    store.set_branch(&marker, "my-feature").unwrap();
    store.clear_branch(&marker).unwrap();

    assert!(marker.is_file(), "cleared marker stays as the anchor");
    for dir in [root.clone(), root.join("src"), root.join("src/deep")] {
        assert_eq!(BranchStore::new(&dir).current_branch_slug().unwrap(), None);
    }
}

#[test]
fn clear_is_idempotent_on_absent_marker() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    let marker = root.join(BRANCH_MARKER);
    store.clear_branch(&marker).unwrap();
    store.clear_branch(&marker).unwrap();
    assert!(!marker.exists());
}

#[test]
fn switching_from_subdirectory_reuses_existing_anchor() {
    let (_tmp, root) = checkout();
    BranchStore::new(&root)
        .set_branch(&root.join(BRANCH_MARKER), "first")
        .unwrap();

    let nested = BranchStore::new(root.join("src/deep"));
    assert_eq!(nested.marker_path_or_default(), root.join(BRANCH_MARKER));
}

#[test]
fn write_failure_is_typed_io_error() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    let bogus = root.join("missing-dir").join(BRANCH_MARKER);
    let err = store.set_branch(&bogus, "x").unwrap_err();
    assert!(matches!(err, WorkspaceError::Io { .. }), "got {err:?}");
    assert!(err.to_string().contains("missing-dir"));
}

#[test]
fn unreadable_marker_is_typed_io_error() {
    let (_tmp, root) = checkout();
    // A directory named like the marker is found but cannot be read as text.
    fs::create_dir(root.join(BRANCH_MARKER)).unwrap();
    let store = BranchStore::new(root.join("src"));

    let err = store.current_branch_slug().unwrap_err();
    assert!(matches!(err, WorkspaceError::Io { .. }), "got {err:?}");
    assert!(err.to_string().contains(BRANCH_MARKER), "got: {err}");
}

// ===================================================================
// Git ignore advisory
// ===================================================================

#[test]
fn warns_outside_a_git_repository() {
    let (_tmp, root) = checkout();
    let store = BranchStore::new(&root);
    // No repository may exist above a fresh temp dir; either way the
    // marker is not ignored.
    assert!(store.warn_if_not_ignored(&root.join(BRANCH_MARKER)));
}

#[test]
fn warns_when_repository_does_not_ignore_marker() {
    let (_tmp, root) = checkout();
    git_init(&root);
    let store = BranchStore::new(&root);
    assert!(store.warn_if_not_ignored(&root.join(BRANCH_MARKER)));
}

#[test]
fn silent_when_gitignore_covers_marker() {
    let (_tmp, root) = checkout();
    git_init(&root);
    fs::write(root.join(".gitignore"), format!("{BRANCH_MARKER}\n")).unwrap();
    let store = BranchStore::new(&root);
    assert!(!store.warn_if_not_ignored(&root.join(BRANCH_MARKER)));
}

#[test]
fn ignore_check_handles_marker_in_subdirectory() {
    let (_tmp, root) = checkout();
    git_init(&root);
    fs::write(root.join(".gitignore"), format!("{BRANCH_MARKER}\n")).unwrap();
    let marker = root.join("src").join(BRANCH_MARKER);
    assert!(!BranchStore::new(root.join("src")).warn_if_not_ignored(&marker));
}
