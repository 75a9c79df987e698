//! Stage command

use anyhow::Result;

use crate::project::Project;

use super::output::Output;

/// Materializes the staged workspace without running buf, mainly for
/// inspection and for build scripts that call buf themselves.
pub fn run(output: &Output) -> Result<()> {
    let project = Project::locate()?;

    if !project.staged_mode() {
        if output.is_json() {
            output.data(&serde_json::json!({
                "command": "stage",
                "staged": false
            }));
        } else {
            output.success("No source roots configured; buf runs directly in the project root");
        }
        return Ok(());
    }

    let staged = project.materialize()?;

    if output.is_json() {
        output.data(&staged);
    } else {
        output.success(&format!(
            "Staged {} module(s) into {}",
            staged.modules.len(),
            staged.staging_dir.display()
        ));
        output.blank();
        for module in &staged.modules {
            println!("  {:<32} -> {}", module.mangled, module.relative.display());
        }
        output.blank();
        println!("Manifest: {}", staged.manifest_path.display());
    }

    Ok(())
}
