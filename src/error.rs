use crate::resource::ResourceType;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the workspace context subsystem.
///
/// A missing marker is not an error here: lookups return `Option` and the
/// command decides whether absence matters.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "cannot run a {target} command inside the {found} directory `{}`",
        .dir.display()
    )]
    WrongResourceType {
        found: ResourceType,
        target: ResourceType,
        dir: PathBuf,
    },

    #[error(
        "{resource_type} key `{command_key}` conflicts with the enclosing {resource_type} directory `{dir_key}`"
    )]
    KeyConflict {
        resource_type: ResourceType,
        command_key: String,
        dir_key: String,
    },

    #[error("internal error: command `{0}` has no directory context policy")]
    UnhandledCommand(String),

    #[error("not on any branch, nothing to exit")]
    NothingToExit,
}

impl WorkspaceError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        WorkspaceError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True for the conflict kinds produced by target validation.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WorkspaceError::WrongResourceType { .. } | WorkspaceError::KeyConflict { .. }
        )
    }
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
