use crate::finder::find_upward;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

// ===================================================================
// Resource kinds
// ===================================================================

/// Kinds of remote resource that can own a local directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Workflow,
    Layout,
}

impl ResourceType {
    /// Every kind, in lookup priority order.
    pub const ALL: [ResourceType; 2] = [ResourceType::Workflow, ResourceType::Layout];

    /// File whose presence marks `<key>/` as a directory of this kind.
    pub fn marker_filename(self) -> &'static str {
        match self {
            ResourceType::Workflow => "workflow.json",
            ResourceType::Layout => "layout.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Workflow => "workflow",
            ResourceType::Layout => "layout",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===================================================================
// Directory context
// ===================================================================

/// The resource directory enclosing some working directory.
///
/// Only ever constructed for a marker that was actually found; "not inside
/// a resource directory" is `None` at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDirContext {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub key: String,
    pub abspath: PathBuf,
}

impl ResourceDirContext {
    fn from_dir(resource_type: ResourceType, abspath: PathBuf) -> Option<Self> {
        let key = abspath.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            resource_type,
            key,
            abspath,
        })
    }
}

/// Resolve the resource directory that contains `start`, if any.
///
/// Each kind is searched upward independently. The nearest match wins;
/// when two kinds resolve to the same directory, `ResourceType::ALL` order
/// breaks the tie.
pub fn build_context(start: &Path) -> Option<ResourceDirContext> {
    let mut best: Option<(ResourceType, PathBuf)> = None;
    for resource_type in ResourceType::ALL {
        let Some(dir) = find_upward(start, resource_type.marker_filename()) else {
            continue;
        };
        let closer = best
            .as_ref()
            .is_none_or(|(_, current)| dir.as_os_str().len() > current.as_os_str().len());
        if closer {
            best = Some((resource_type, dir));
        }
    }

    let context = best.and_then(|(resource_type, dir)| ResourceDirContext::from_dir(resource_type, dir));
    tracing::debug!(start = %start.display(), context = ?context, "resource directory context");
    context
}
