//! Buf invocation and failure translation
//!
//! Wraps the raw runner with buf-specific concerns: locating the
//! executable, and turning a non-zero exit into an error whose leading
//! message fits the command that ran. Lint failures should read like lint
//! failures, not like a generic process dump.

use std::env;
use std::path::{Path, PathBuf};

use super::runner::{ExecError, Invocation, InvocationDetail, InvocationResult};

#[cfg(not(windows))]
const BUF_BINARY: &str = "buf";
#[cfg(windows)]
const BUF_BINARY: &str = "buf.exe";

/// Runs buf and treats any non-zero exit as an error carrying the full
/// diagnostic dump as its message.
pub fn run_checked(invocation: &Invocation) -> Result<InvocationResult, ExecError> {
    translate(invocation.run()?, None::<fn(&str) -> String>)
}

/// Runs buf with a command-specific failure message built from captured
/// stdout. The full dump stays attached as the error's source so nothing
/// is lost, it just stops leading.
pub fn run_with_error_message<F>(
    invocation: &Invocation,
    format_error: F,
) -> Result<InvocationResult, ExecError>
where
    F: FnOnce(&str) -> String,
{
    translate(invocation.run()?, Some(format_error))
}

/// Selects the failure message for a non-zero exit. Three cases:
///
/// - formatter given and stdout non-empty: the formatted message leads,
///   the raw dump rides along as the source;
/// - formatter given but stdout empty: the formatter would have nothing
///   to say, so the raw dump is the message;
/// - no formatter: the raw dump is the message.
fn translate<F>(
    result: InvocationResult,
    format_error: Option<F>,
) -> Result<InvocationResult, ExecError>
where
    F: FnOnce(&str) -> String,
{
    if result.success() {
        return Ok(result);
    }

    match format_error {
        Some(format) if !result.stdout().is_empty() => {
            let message = format(&result.stdout_text());
            Err(ExecError::Failed {
                message,
                detail: Some(InvocationDetail(result)),
            })
        }
        _ => Err(ExecError::Failed {
            message: result.to_string(),
            detail: None,
        }),
    }
}

/// Locates the buf executable. An explicitly configured path wins and must
/// be runnable; otherwise PATH is searched for the first `buf` binary.
pub fn resolve_executable(configured: Option<&Path>) -> Result<PathBuf, ExecError> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        return Err(ExecError::NotExecutable(path.to_path_buf()));
    }

    let path_var = env::var_os("PATH").unwrap_or_default();
    search_path(env::split_paths(&path_var))
}

fn search_path(dirs: impl Iterator<Item = PathBuf>) -> Result<PathBuf, ExecError> {
    for dir in dirs {
        let candidate = dir.join(BUF_BINARY);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
    }
    Err(ExecError::ExecutableNotFound)
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return path.is_file() && (ext == "exe" || ext == "bat" || ext == "cmd");
        }
    }

    false
}
