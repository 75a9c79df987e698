//! Subprocess execution with full output capture
//!
//! Running buf means spawning one child process per command and capturing
//! everything it writes. Both stdout and stderr are drained on their own
//! threads while the parent waits for exit; reading one stream to
//! completion before touching the other would let the child fill the
//! untouched pipe buffer and block forever.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Working directory does not exist: {0}")]
    MissingWorkingDir(PathBuf),

    #[error("Failed to launch {executable}: {source}")]
    Launch {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to capture output of {executable}: {source}")]
    Capture {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not find the buf executable on PATH; install buf or set tool.executable in bufstage.toml")]
    ExecutableNotFound,

    #[error("Configured buf executable is not runnable: {0}")]
    NotExecutable(PathBuf),

    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        detail: Option<InvocationDetail>,
    },
}

/// Full diagnostic dump attached as the source of a failure whose primary
/// message was tailored by the command that ran buf.
#[derive(Debug)]
pub struct InvocationDetail(pub InvocationResult);

impl fmt::Display for InvocationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvocationDetail {}

/// One pending invocation of an external tool: executable, arguments and
/// the directory it runs in.
#[derive(Debug, Clone)]
pub struct Invocation {
    executable: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl Invocation {
    pub fn new(executable: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Runs the command to completion and captures both output streams in
    /// full, without a size limit or timeout. The child's stdin is closed.
    pub fn run(&self) -> Result<InvocationResult, ExecError> {
        if !self.working_dir.is_dir() {
            return Err(ExecError::MissingWorkingDir(self.working_dir.clone()));
        }

        let mut child = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Launch {
                executable: self.executable.display().to_string(),
                source,
            })?;

        let mut stdout_pipe = child.stdout.take().expect("Failed to open stdout");
        let mut stderr_pipe = child.stderr.take().expect("Failed to open stderr");

        // Each stream gets its own drain thread while the parent waits for
        // exit. The scope joins both before returning.
        let (status, stdout, stderr) = thread::scope(|scope| {
            let stdout_drain = scope.spawn(move || drain(&mut stdout_pipe));
            let stderr_drain = scope.spawn(move || drain(&mut stderr_pipe));

            let status = child.wait();
            let stdout = stdout_drain.join().expect("stdout drain panicked");
            let stderr = stderr_drain.join().expect("stderr drain panicked");
            (status, stdout, stderr)
        });

        let status = status.map_err(|source| self.capture_error(source))?;
        let stdout = stdout.map_err(|source| self.capture_error(source))?;
        let stderr = stderr.map_err(|source| self.capture_error(source))?;

        let mut args = vec![self.executable.display().to_string()];
        args.extend(self.args.iter().cloned());

        Ok(InvocationResult {
            args,
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }

    fn capture_error(&self, source: io::Error) -> ExecError {
        ExecError::Capture {
            executable: self.executable.display().to_string(),
            source,
        }
    }
}

fn drain(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// The immutable record of a completed subprocess: the full argument
/// vector, the exit code, and both captured streams as raw bytes.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    args: Vec<String>,
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl InvocationResult {
    /// Assembles a result directly, bypassing process execution. Used by
    /// failure-translation tests.
    pub(crate) fn assemble(
        args: Vec<String>,
        exit_code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Self {
        Self {
            args,
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Exit code of the child, or -1 when it was killed by a signal.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured stdout bytes, exactly as the child wrote them.
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Captured stderr bytes, exactly as the child wrote them.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Captured stdout decoded as UTF-8, lossily.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr decoded as UTF-8, lossily.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl fmt::Display for InvocationResult {
    /// Renders the full diagnostic dump: arguments, exit code, then each
    /// stream as `(empty)`, a single inline line, or an indented block.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> arguments: {}", self.args.join(" "))?;
        writeln!(f, "> exit code: {}", self.exit_code)?;
        write_stream(f, "   stdout", &self.stdout)?;
        write_stream(f, "   stderr", &self.stderr)
    }
}

fn write_stream(f: &mut fmt::Formatter<'_>, name: &str, content: &[u8]) -> fmt::Result {
    let text = String::from_utf8_lossy(content).replace('\r', "");
    if text.is_empty() {
        return writeln!(f, "> {}: (empty)", name);
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() == 1 {
        writeln!(f, "> {}: {}", name, lines[0])
    } else {
        writeln!(f, "> {}: (below)", name)?;
        for line in &lines {
            writeln!(f, "> {}", line)?;
        }
        Ok(())
    }
}
