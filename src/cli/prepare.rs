//! Shared setup for buf-invoking commands
//!
//! Every buf command resolves the same three things before running: the
//! project, the buf executable, and the directory buf executes in. In
//! staged mode that directory is the freshly materialized workspace; in
//! direct mode it is the project root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::exec::{self, Invocation, InvocationResult};
use crate::project::Project;
use crate::workspace::StagedWorkspace;

use super::output::Output;

/// Resolved execution context for one buf command.
pub struct RunContext {
    pub project: Project,
    pub executable: PathBuf,
    pub run_dir: PathBuf,
    pub staged: Option<StagedWorkspace>,
}

impl RunContext {
    /// Builds a buf invocation in the prepared directory, logging it in
    /// verbose mode.
    pub fn buf(&self, output: &Output, args: &[String]) -> Invocation {
        output.verbose_ctx(
            "exec",
            &format!(
                "Running buf in {}: buf {}",
                self.run_dir.display(),
                args.join(" ")
            ),
        );
        Invocation::new(&self.executable, &self.run_dir).args(args.iter().cloned())
    }
}

/// Locates the project, resolves buf, and stages the workspace when source
/// roots are configured.
pub fn prepare(output: &Output, buf_override: Option<&Path>) -> Result<RunContext> {
    let project = Project::locate()?;
    output.verbose_ctx(
        "project",
        &format!("Project root: {}", project.root().display()),
    );

    // Spawning with a changed working directory needs an unambiguous
    // executable path: flag and env values resolve against the caller's
    // directory, configured ones against the project root.
    let configured = match buf_override {
        Some(path) => Some(absolutize(path)?),
        None => project
            .config()
            .configured_executable()
            .map(|p| project.root().join(p)),
    };
    let executable = exec::resolve_executable(configured.as_deref())?;
    output.verbose_ctx("exec", &format!("Using buf at: {}", executable.display()));

    let (run_dir, staged) = if project.staged_mode() {
        let staged = project.materialize()?;
        output.verbose_ctx(
            "stage",
            &format!(
                "Staged {} modules into {}",
                staged.modules.len(),
                staged.staging_dir.display()
            ),
        );
        (staged.staging_dir.clone(), Some(staged))
    } else {
        output.verbose_ctx("stage", "No source roots configured; running in the project root");
        (project.root().to_path_buf(), None)
    };

    Ok(RunContext {
        project,
        executable,
        run_dir,
        staged,
    })
}

/// Surfaces anything buf wrote to stderr during a successful run.
pub fn report_warnings(output: &Output, result: &InvocationResult) {
    let stderr = result.stderr_text();
    let trimmed = stderr.trim_end();
    if !trimmed.is_empty() {
        output.warn(trimmed);
    }
}

/// Resolves a path argument given on the command line against the current
/// directory.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Ok(cwd.join(path))
    }
}
