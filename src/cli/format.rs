//! Format commands

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use crate::exec;

use super::output::Output;
use super::prepare;

#[derive(Subcommand)]
pub enum FormatCommands {
    /// Check formatting without changing any files
    Check,

    /// Rewrite Protobuf files in place
    Apply,
}

pub fn run(cmd: FormatCommands, output: &Output, buf: Option<&Path>) -> Result<()> {
    match cmd {
        FormatCommands::Check => check(output, buf),
        FormatCommands::Apply => apply(output, buf),
    }
}

/// Runs `buf format -d --exit-code` so violations both render as a diff
/// and fail the command.
pub fn check(output: &Output, buf: Option<&Path>) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let args: Vec<String> = ["format", "-d", "--exit-code"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let invocation = ctx.buf(output, &args);
    let result = exec::run_with_error_message(&invocation, |stdout| {
        format!(
            "Some Protobuf files had format violations:\n{}\nRun 'bufstage format apply' to fix these violations.",
            stdout
        )
    })?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "format check",
            "passed": true
        }));
    } else {
        output.success("All Protobuf files are formatted");
    }

    Ok(())
}

/// Runs `buf format -w`. In staged mode the rewrite flows through the
/// symlinks back into the real source files.
fn apply(output: &Output, buf: Option<&Path>) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let args: Vec<String> = ["format", "-w"].iter().map(|s| s.to_string()).collect();

    let invocation = ctx.buf(output, &args);
    let result = exec::run_checked(&invocation)?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "format apply",
            "applied": true
        }));
    } else {
        output.success("Formatted Protobuf files in place");
    }

    Ok(())
}
