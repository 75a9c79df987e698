//! Build command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::exec;

use super::output::Output;
use super::prepare;

pub fn run(output: &Output, buf: Option<&Path>, output_file: Option<&Path>) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let image = match output_file {
        Some(path) => prepare::absolutize(path)?,
        None => ctx.project.image_file(),
    };

    if let Some(parent) = image.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let args = vec![
        "build".to_string(),
        "--output".to_string(),
        image.display().to_string(),
    ];

    let invocation = ctx.buf(output, &args);
    let result = exec::run_checked(&invocation)?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "build",
            "image": image
        }));
    } else {
        output.success(&format!("Built Buf image at {}", image.display()));
    }

    Ok(())
}
