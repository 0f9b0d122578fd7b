use crate::api::ManagementApi;
use crate::branch::{BRANCH_MARKER, BranchStore, is_valid_slug};
use crate::error::WorkspaceError;
use crate::prompt::Confirm;
use crate::resource::{ResourceDirContext, ResourceType, build_context};
use crate::target::{PolicyTable, ResourceTarget};
use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

/// What a handler wants shown: `stdout` for the result, `notes` for
/// advisories on stderr.
#[derive(Debug, Default, PartialEq)]
pub struct Report {
    pub stdout: Option<String>,
    pub notes: Vec<String>,
}

impl Report {
    fn out(message: impl Into<String>) -> Self {
        Self {
            stdout: Some(message.into()),
            ..Default::default()
        }
    }

    fn note(mut self, message: impl Into<String>) -> Self {
        self.notes.push(message.into());
        self
    }
}

/// Where branch-aware commands should act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// `--branch` on the command line.
    ExplicitBranch { slug: String },
    /// The branch recorded in the nearest marker file.
    ActiveBranch { slug: String, marker: PathBuf },
    Environment { name: String },
}

/// Per-invocation view of the working directory: branch state plus the
/// policy table for resource-scoped commands.
pub struct Workspace {
    cwd: PathBuf,
    branches: BranchStore,
    policies: PolicyTable,
    default_environment: String,
}

impl Workspace {
    pub fn open(cwd: impl Into<PathBuf>, default_environment: impl Into<String>) -> Self {
        let cwd = cwd.into();
        Self {
            branches: BranchStore::new(cwd.clone()),
            cwd,
            policies: PolicyTable::builtin(),
            default_environment: default_environment.into(),
        }
    }

    // ---------------------------------------------------------------
    // Scope and context
    // ---------------------------------------------------------------

    /// Explicit branch, else the active branch, else the environment flag,
    /// else the configured default environment.
    pub fn scope(&self, branch: Option<&str>, environment: Option<&str>) -> Result<Scope> {
        if let Some(slug) = branch {
            return Ok(Scope::ExplicitBranch {
                slug: slug.to_string(),
            });
        }
        if let (Some(slug), Some(marker)) = (
            self.branches.current_branch_slug()?,
            self.branches.marker_path(),
        ) {
            return Ok(Scope::ActiveBranch { slug, marker });
        }
        Ok(Scope::Environment {
            name: environment.unwrap_or(&self.default_environment).to_string(),
        })
    }

    pub fn resource_context(&self) -> Option<ResourceDirContext> {
        build_context(&self.cwd)
    }

    /// Key a resource-scoped command should operate on, reconciled with the
    /// enclosing resource directory.
    pub fn resolve_key(
        &self,
        command: &str,
        resource_type: ResourceType,
        key: Option<&str>,
    ) -> Result<String> {
        let context = self.resource_context();
        let target = ResourceTarget {
            command,
            resource_type,
            key,
        };
        match self.policies.resolve(context.as_ref(), &target)? {
            Some(key) => Ok(key),
            None => bail!(
                "not inside a {resource_type} directory; pass the {resource_type} key explicitly"
            ),
        }
    }

    // ---------------------------------------------------------------
    // Branch handlers
    // ---------------------------------------------------------------

    pub fn handle_branch_current(&self) -> Result<Report> {
        match self.branches.current_branch_slug()? {
            Some(slug) => Ok(Report::out(slug)),
            None => Ok(Report::default().note("not on any branch")),
        }
    }

    pub fn handle_branch_switch(
        &self,
        api: &dyn ManagementApi,
        confirm: &dyn Confirm,
        slug: &str,
        force: bool,
    ) -> Result<Report> {
        if !is_valid_slug(slug) {
            bail!(
                "invalid branch slug `{slug}`: use lowercase letters, digits and single hyphens"
            );
        }

        let marker = self.branches.marker_path_or_default();
        let current = self.branches.current_branch_slug()?;
        if current.as_deref() == Some(slug) {
            return Ok(Report::out(format!("already on branch `{slug}`")));
        }
        if let Some(current) = &current {
            if !force && !confirm.confirm(&format!("Switch from branch `{current}` to `{slug}`?"))? {
                return Ok(Report::out("switch cancelled"));
            }
        }

        // The marker is only written once the branch is known to exist.
        let Some(branch) = api.get_branch(slug)? else {
            bail!("branch `{slug}` does not exist");
        };
        if branch.slug != slug {
            tracing::warn!(requested = slug, returned = %branch.slug, "API returned a different slug");
        }
        let anchor = marker.parent().unwrap_or(self.cwd.as_path());
        let creating = !self.branches.has_active_branch_marker(anchor);
        self.branches.set_branch(&marker, slug)?;

        let mut report = Report::out(format!("switched to branch `{slug}`"));
        if creating {
            report = report.note(format!("created {}", marker.display()));
        }
        if self.branches.warn_if_not_ignored(&marker) {
            report = report.note(format!(
                "warning: {} is not ignored by git; add `{BRANCH_MARKER}` to your .gitignore",
                marker.display()
            ));
        }
        Ok(report)
    }

    pub fn handle_branch_exit(&self, confirm: &dyn Confirm, force: bool) -> Result<Report> {
        let (Some(marker), Some(current)) = (
            self.branches.marker_path(),
            self.branches.current_branch_slug()?,
        ) else {
            return Err(WorkspaceError::NothingToExit.into());
        };

        if !force && !confirm.confirm(&format!("Exit branch `{current}`?"))? {
            return Ok(Report::out("exit cancelled"));
        }
        self.branches.clear_branch(&marker)?;
        Ok(Report::out(format!("exited branch `{current}`")))
    }

    // ---------------------------------------------------------------
    // Resource and status handlers
    // ---------------------------------------------------------------

    pub fn handle_resolve(&self, resource_type: ResourceType, key: Option<&str>) -> Result<Report> {
        let command = match resource_type {
            ResourceType::Workflow => "workflow resolve",
            ResourceType::Layout => "layout resolve",
        };
        let key = self.resolve_key(command, resource_type, key)?;
        Ok(Report::out(key))
    }

    pub fn handle_status(
        &self,
        branch: Option<&str>,
        environment: Option<&str>,
        as_json: bool,
    ) -> Result<Report> {
        let scope = self.scope(branch, environment)?;
        let context = self.resource_context();

        if as_json {
            let value = json!({ "scope": scope, "resource": context });
            return Ok(Report::out(serde_json::to_string_pretty(&value)?));
        }

        let scope_row = match &scope {
            Scope::ExplicitBranch { slug } => row("branch", &format!("{slug} (from --branch)")),
            Scope::ActiveBranch { slug, marker } => {
                row("branch", &format!("{slug} (from {})", marker.display()))
            }
            Scope::Environment { name } => row("environment", name),
        };
        let resource_row = match &context {
            Some(ctx) => row(
                ctx.resource_type.as_str(),
                &format!("{} ({})", ctx.key, ctx.abspath.display()),
            ),
            None => row("resource", "none"),
        };
        let lines = [scope_row, resource_row];
        Ok(Report::out(lines.join("\n")))
    }
}

fn row(label: &str, value: &str) -> String {
    format!("{:<13}{value}", format!("{label}:"))
}
