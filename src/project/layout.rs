//! Project discovery and filesystem layout
//!
//! A bufstage project is any directory holding a `bufstage.toml`; commands
//! work from anywhere underneath it. Without a config file the current
//! directory itself is treated as the project root with default settings,
//! which means buf runs directly against whatever layout is already there.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::workspace::{self, StagedWorkspace};

use super::config::{Config, CONFIG_FILE_NAME};

/// Directory under the project root that receives the staged workspace,
/// built images and generated code.
pub const STAGING_DIR_NAME: &str = ".bufstage";

/// A bufstage project: a root directory plus its configuration.
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the project at the given root. A missing `bufstage.toml` is
    /// not an error; defaults apply and buf runs in direct mode.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project containing the current directory, falling back to
    /// the current directory itself when no `bufstage.toml` is found.
    pub fn locate() -> Result<Self> {
        let root = match Config::find_project_root() {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        Self::open(root)
    }

    /// Initializes a project by writing a default `bufstage.toml`. An
    /// existing config file is kept as is.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create project directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the staging directory path (not necessarily created yet)
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    /// True when source roots are configured, so buf commands run against
    /// the staged workspace. False means direct mode: buf runs in the
    /// project root and picks up whatever config sits there.
    pub fn staged_mode(&self) -> bool {
        !self.config.project.workspace.source_roots.is_empty()
    }

    /// The buf.yaml to apply: the configured location if set, otherwise
    /// one in the project root when present.
    pub fn buf_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.project.tool.config_file {
            return Some(self.root.join(path));
        }

        let default = self.root.join("buf.yaml");
        default.is_file().then_some(default)
    }

    /// Where `bufstage build` writes the image by default
    pub fn image_file(&self) -> PathBuf {
        match &self.config.project.build.output_file {
            Some(path) => self.root.join(path),
            None => self.staging_dir().join("image.json"),
        }
    }

    /// Where `bufstage generate` writes code by default
    pub fn generated_dir(&self) -> PathBuf {
        self.staging_dir().join("generated")
    }

    /// Stages the workspace for this project's source roots.
    pub fn materialize(&self) -> Result<StagedWorkspace> {
        let staging = self.staging_dir();
        let buf_config = self.buf_config_file();

        workspace::materialize(
            &self.root,
            &staging,
            &self.config.project.workspace.source_roots,
            self.config.project.workspace.manifest_version,
            buf_config.as_deref(),
        )
        .context("Failed to stage the Buf workspace")
    }
}

const DEFAULT_CONFIG: &str = r#"# bufstage configuration
# Commands run against a staged Buf workspace when source_roots is set,
# or directly in this directory when it is empty.

[workspace]
# Directories that may contain .proto files, relative to this file
source_roots = []

# Workspace manifest format: "v2" writes buf.yaml, "v1" writes buf.work.yaml
manifest_version = "v2"

[tool]
# Explicit buf binary; PATH is searched when unset
# executable = "/usr/local/bin/buf"

# buf.yaml to merge into the staged workspace manifest
# config_file = "buf.yaml"

[format]
# Include format checking in `bufstage check`
enforce = true

[generate]
# Pass --include-imports to buf generate
include_imports = false

# Template location; defaults to buf.gen.yaml in the project root
# template_file = "buf.gen.yaml"
"#;
