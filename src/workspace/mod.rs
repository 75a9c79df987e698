//! # Workspace Staging
//!
//! Builds the synthetic Buf workspace that buf commands run against. Build
//! tools scatter `.proto` files across many directories; staging flattens
//! the proto-bearing ones into a single directory of symlinks plus a
//! generated manifest, which buf accepts as an ordinary workspace.
//!
//! ## Staged Layout
//!
//! ```text
//! .bufstage/
//! ├── src-main-proto -> ../src/main/proto     # one link per module
//! ├── build-extracted -> ../build/extracted
//! ├── buf.yaml                                 # generated manifest (v2)
//! └── .gitignore                               # ignores everything staged
//! ```
//!
//! Link names are the mangled relative paths of their targets, so the
//! layout is flat, readable, and stable across runs. Targets are relative;
//! the project can be moved without restaging.
//!
//! ## Manifest Formats
//!
//! | Version | File | Contents |
//! |---------|------|----------|
//! | v1 | `buf.work.yaml` | `directories` list; user `buf.yaml` copied alongside |
//! | v2 | `buf.yaml` | `modules` list merged over the user's buf config |
//!
//! ## Key Operations
//!
//! - [`discover_modules`] - Filter candidate roots to proto-bearing ones
//! - [`materialize`] - Create links and manifest in one idempotent pass
//! - [`mangle`] - Flatten a relative path into a staged module name

mod mangle;
mod manifest;
mod scan;
mod stage;

pub use mangle::mangle;
pub use manifest::{render_buf_yaml, render_work_yaml, ManifestVersion};
pub use scan::contains_protos;
pub use stage::{discover_modules, materialize, ProtoModule, StagedWorkspace, WorkspaceError};
