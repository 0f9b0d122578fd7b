use crate::error::{WorkspaceError, WorkspaceResult};
use crate::resource::{ResourceDirContext, ResourceType};
use std::collections::HashMap;

// ===================================================================
// Input: what the command is about to operate on
// ===================================================================

/// The resource a command wants, before reconciling with the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget<'a> {
    pub command: &'a str,
    pub resource_type: ResourceType,
    /// Explicit key from the command line; `None` means infer it.
    pub key: Option<&'a str>,
}

// ===================================================================
// Policy table
// ===================================================================

/// How a command takes part in directory-context checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPolicy {
    /// Operates on one resource of the given kind and must agree with the
    /// enclosing resource directory.
    ResourceScoped(ResourceType),
}

/// Commands that participate in directory-context checks, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<&'static str, ContextPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table used by the built-in commands.
    pub fn builtin() -> Self {
        Self::new()
            .with("workflow resolve", ContextPolicy::ResourceScoped(ResourceType::Workflow))
            .with("layout resolve", ContextPolicy::ResourceScoped(ResourceType::Layout))
    }

    pub fn with(mut self, command: &'static str, policy: ContextPolicy) -> Self {
        self.register(command, policy);
        self
    }

    pub fn register(&mut self, command: &'static str, policy: ContextPolicy) {
        self.policies.insert(command, policy);
    }

    pub fn get(&self, command: &str) -> Option<ContextPolicy> {
        self.policies.get(command).copied()
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    /// Reconcile `target` with the directory the command runs in.
    ///
    /// Returns the key to operate on. `Ok(None)` only happens outside any
    /// resource directory with no explicit key; the command decides whether
    /// that is acceptable.
    pub fn resolve(
        &self,
        context: Option<&ResourceDirContext>,
        target: &ResourceTarget,
    ) -> WorkspaceResult<Option<String>> {
        let policy = self
            .get(target.command)
            .ok_or_else(|| WorkspaceError::UnhandledCommand(target.command.to_string()))?;

        let resolved = match policy {
            ContextPolicy::ResourceScoped(_) => resolve_scoped(context, target)?,
        };
        tracing::debug!(command = target.command, key = ?resolved, "resolved target key");
        Ok(resolved)
    }
}

fn resolve_scoped(
    context: Option<&ResourceDirContext>,
    target: &ResourceTarget,
) -> WorkspaceResult<Option<String>> {
    let Some(context) = context else {
        return Ok(target.key.map(str::to_string));
    };

    if context.resource_type != target.resource_type {
        return Err(WorkspaceError::WrongResourceType {
            found: context.resource_type,
            target: target.resource_type,
            dir: context.abspath.clone(),
        });
    }

    match target.key {
        None => Ok(Some(context.key.clone())),
        Some(key) if key == context.key => Ok(Some(key.to_string())),
        Some(key) => Err(WorkspaceError::KeyConflict {
            resource_type: target.resource_type,
            command_key: key.to_string(),
            dir_key: context.key.clone(),
        }),
    }
}
