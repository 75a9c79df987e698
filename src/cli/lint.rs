//! Lint command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::exec;

use super::output::Output;
use super::prepare::{self, RunContext};

pub fn run(output: &Output, buf: Option<&Path>) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let mut args = vec!["lint".to_string()];
    if let Some(config) = inline_config(&ctx)? {
        args.push("--config".to_string());
        args.push(config);
    }

    let invocation = ctx.buf(output, &args);
    let result = exec::run_with_error_message(&invocation, |stdout| {
        format!("Some Protobuf files had lint violations:\n{}", stdout)
    })?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "lint",
            "passed": true
        }));
    } else {
        output.success("No lint violations found");
    }

    Ok(())
}

/// In direct mode a buf config at a non-default location has to travel as
/// an inline `--config` value; staged mode folds it into the generated
/// manifest instead.
fn inline_config(ctx: &RunContext) -> Result<Option<String>> {
    if ctx.staged.is_some() {
        return Ok(None);
    }

    let configured = match &ctx.project.config().project.tool.config_file {
        Some(path) => ctx.project.root().join(path),
        None => return Ok(None),
    };

    read_stripping_comments(&configured).map(Some)
}

/// Reads a buf config for inline passing. The inline form buf accepts on
/// the command line cannot contain comment lines, so those are dropped.
fn read_stripping_comments(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read buf config: {}", path.display()))?;

    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !is_comment_line(line))
        .collect();
    Ok(kept.join("\n"))
}

/// A comment line starts with `#`, allowing at most one leading space.
fn is_comment_line(line: &str) -> bool {
    line.strip_prefix(' ').unwrap_or(line).starts_with('#')
}
