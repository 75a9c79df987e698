//! # Buf Execution
//!
//! Spawns the buf CLI and turns its outcomes into useful results or
//! errors.
//!
//! ## Layers
//!
//! | Layer | Responsibility |
//! |-------|----------------|
//! | [`Invocation`] | One subprocess run with deadlock-free output capture |
//! | [`run_checked`] / [`run_with_error_message`] | Non-zero exit translation |
//! | [`resolve_executable`] | Configured path or PATH lookup of `buf` |
//!
//! ## Failure Rendering
//!
//! Every failed invocation can be rendered as a diagnostic dump:
//!
//! ```text
//! > arguments: buf lint
//! > exit code: 100
//! >    stdout: (below)
//! > acme/v1/thing.proto:3:1:Import "a.proto" is unused.
//! > acme/v1/thing.proto:9:9:Field name "VALUE" should be lower_snake_case.
//! >    stderr: (empty)
//! ```
//!
//! Commands that know better supply a message built from stdout instead,
//! and the dump moves into the error's source chain.

mod invoke;
mod runner;

pub use invoke::{resolve_executable, run_checked, run_with_error_message};
pub use runner::{ExecError, Invocation, InvocationDetail, InvocationResult};
