//! Code generation command

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::exec;
use crate::project::Project;

use super::output::Output;
use super::prepare;

pub fn run(
    output: &Output,
    buf: Option<&Path>,
    template: Option<&Path>,
    include_imports: bool,
    out_dir: Option<&Path>,
) -> Result<()> {
    let ctx = prepare::prepare(output, buf)?;

    let out_dir = match out_dir {
        Some(path) => prepare::absolutize(path)?,
        None => ctx.project.generated_dir(),
    };
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let template = resolve_template(&ctx.project, template)?;
    let include_imports =
        include_imports || ctx.project.config().project.generate.include_imports;

    let mut args = vec![
        "generate".to_string(),
        "--output".to_string(),
        out_dir.display().to_string(),
        "--template".to_string(),
        template.display().to_string(),
    ];
    if include_imports {
        args.push("--include-imports".to_string());
    }

    let invocation = ctx.buf(output, &args);
    let result = exec::run_checked(&invocation)?;

    prepare::report_warnings(output, &result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": "generate",
            "template": template,
            "output": out_dir
        }));
    } else {
        output.success(&format!("Generated code into {}", out_dir.display()));
    }

    Ok(())
}

/// Resolves the buf.gen.yaml template.
///
/// An explicit location (flag or configuration, relative to the project
/// root) must exist and must not compete with a `buf.gen.yaml` sitting in
/// the project root; with nothing specified the project root template is
/// required. The resolved path is passed to buf as an absolute
/// `--template`, since buf cannot discover a root template from the
/// staging directory.
fn resolve_template(project: &Project, flag: Option<&Path>) -> Result<PathBuf> {
    let specified = flag
        .map(Path::to_path_buf)
        .or_else(|| project.config().project.generate.template_file.clone());

    let default = project.root().join("buf.gen.yaml");
    let default = default.is_file().then_some(default);

    match specified {
        Some(path) => {
            let path = project.root().join(path);
            if !path.is_file() {
                bail!("Specified template file does not exist: {}", path.display());
            }
            if let Some(default) = default {
                if default != path {
                    bail!("Buf gen template file found in the project root as well as specified; pick one.");
                }
            }
            Ok(path)
        }
        None => {
            default.ok_or_else(|| anyhow!("No buf.gen.yaml file found in the project root."))
        }
    }
}
