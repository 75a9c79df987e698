//! Doctor command

use std::path::Path;

use anyhow::Result;

use crate::exec::{self, Invocation};
use crate::project::Project;

use super::output::Output;

/// Reports the resolved buf executable, its version, and how the project
/// will run. Staging is skipped; diagnosis has to work when staging is
/// the thing that is broken.
pub fn run(output: &Output, buf: Option<&Path>) -> Result<()> {
    let project = Project::locate()?;

    let configured = match buf {
        Some(path) => Some(super::prepare::absolutize(path)?),
        None => project
            .config()
            .configured_executable()
            .map(|p| project.root().join(p)),
    };
    let executable = exec::resolve_executable(configured.as_deref())?;

    let invocation = Invocation::new(&executable, project.root()).arg("--version");
    let result = exec::run_checked(&invocation)?;
    let version = result.stdout_text().trim().to_string();

    let mode = if project.staged_mode() {
        "staged"
    } else {
        "direct"
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "executable": executable,
            "version": version,
            "project_root": project.root(),
            "mode": mode,
            "source_roots": project.config().project.workspace.source_roots
        }));
    } else {
        println!("buf executable: {}", executable.display());
        println!("buf version:    {}", version);
        println!("project root:   {}", project.root().display());
        println!("mode:           {}", mode);
        for root in &project.config().project.workspace.source_roots {
            println!("source root:    {}", root.display());
        }
        output.blank();
        output.success("buf is ready to use");
    }

    Ok(())
}
