//! # Project Layer
//!
//! Locates the project, loads its configuration, and knows where staged
//! and generated files live.
//!
//! ## Configuration Files
//!
//! | File | Format | Scope |
//! |------|--------|-------|
//! | `bufstage.toml` | TOML | Project root; also marks the root |
//! | `~/.config/bufstage/config.toml` | TOML | Global user defaults |
//! | `buf.yaml` | YAML | Buf's own config, merged into staging |
//!
//! ## Project Structure
//!
//! ```text
//! project/
//! ├── bufstage.toml        # source roots, tool and command settings
//! ├── buf.yaml             # optional buf config (lint rules, ignores)
//! ├── src/main/proto/      # proto sources, wherever the build keeps them
//! └── .bufstage/           # staged workspace and outputs (git-ignored)
//!     ├── src-main-proto -> ../src/main/proto
//!     ├── buf.yaml         # generated manifest
//!     ├── image.json       # default `build` output
//!     └── generated/       # default `generate` output
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point; resolves all project paths
//! - [`Config`] - Merged project and global configuration

mod config;
mod layout;

pub use config::{
    BreakingConfig, BuildConfig, Config, ConfigError, FormatConfig, GenerateConfig, GlobalConfig,
    OutputFormat, ProjectConfig, ToolConfig, WorkspaceConfig, CONFIG_FILE_NAME,
};
pub use layout::{Project, STAGING_DIR_NAME};
