//! bufstage - Run buf against Protobuf sources scattered across build layouts
//!
//! Build tools keep `.proto` files wherever their conventions dictate, which
//! rarely matches the single-workspace layout the buf CLI wants. bufstage
//! flattens the proto-bearing directories into a staged workspace of
//! symlinks plus a generated manifest, then delegates linting, formatting,
//! image builds, breaking-change checks and code generation to buf.

pub mod cli;
pub mod exec;
pub mod project;
pub mod workspace;

pub use exec::{ExecError, Invocation, InvocationResult};
pub use project::{Config, Project};
pub use workspace::{mangle, ManifestVersion, ProtoModule, StagedWorkspace};
