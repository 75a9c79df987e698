//! Breaking-change check command

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::exec;
use crate::project::Project;

use super::output::Output;
use super::prepare;

pub fn run(output: &Output, buf: Option<&Path>, against: Option<&str>) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let against = against
        .map(str::to_string)
        .or_else(|| ctx.project.config().project.breaking.against.clone())
        .ok_or_else(|| {
            anyhow!("No baseline to check against. Pass --against or set breaking.against in bufstage.toml.")
        })?;
    let against = resolve_against(&ctx.project, &against);

    let args = vec![
        "breaking".to_string(),
        "--against".to_string(),
        against.clone(),
    ];

    let invocation = ctx.buf(output, &args);
    let result = exec::run_with_error_message(&invocation, |stdout| {
        format!("Some Protobuf files had breaking changes:\n{}", stdout)
    })?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "breaking",
            "passed": true,
            "against": against
        }));
    } else {
        output.success(&format!("No breaking changes against {}", against));
    }

    Ok(())
}

/// A baseline naming a file or directory in the project resolves against
/// the project root; anything else (git refs, remote inputs, archives)
/// passes through untouched.
fn resolve_against(project: &Project, against: &str) -> String {
    let candidate = project.root().join(against);
    if candidate.exists() {
        candidate.display().to_string()
    } else {
        against.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn path_baselines_resolve_against_the_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("previous.json"), "{}").unwrap();
        let project = Project::open(dir.path()).unwrap();

        let resolved = resolve_against(&project, "previous.json");
        assert_eq!(resolved, dir.path().join("previous.json").display().to_string());
    }

    #[test]
    fn non_path_baselines_pass_through() {
        let dir = TempDir::new().unwrap();
        let project = Project::open(dir.path()).unwrap();

        let git_input = "https://github.com/acme/protos.git#branch=main";
        assert_eq!(resolve_against(&project, git_input), git_input);
    }
}
