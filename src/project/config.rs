//! Configuration handling for bufstage
//!
//! Configuration is stored in `bufstage.toml` (project root) and
//! `~/.config/bufstage/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workspace::ManifestVersion;

/// Name of the project configuration file, also the project root marker.
pub const CONFIG_FILE_NAME: &str = "bufstage.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Candidate proto directories and staging behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directories that may contain .proto files, relative to the project
    /// root. Leave empty to run buf directly in the project root.
    pub source_roots: Vec<PathBuf>,

    /// Workspace manifest format written during staging
    pub manifest_version: ManifestVersion,
}

/// Buf binary and config file locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ToolConfig {
    /// Explicit path to the buf executable (otherwise PATH is searched)
    pub executable: Option<PathBuf>,

    /// Location of the buf.yaml to use (otherwise the project root is
    /// checked for one)
    pub config_file: Option<PathBuf>,
}

/// Image build settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BuildConfig {
    /// Where `bufstage build` writes the image (default: .bufstage/image.json)
    pub output_file: Option<PathBuf>,
}

/// Breaking-change check settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BreakingConfig {
    /// Default input for --against: a previous image file or a git ref
    pub against: Option<String>,
}

/// Format checking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Include `format check` when running `bufstage check`
    pub enforce: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { enforce: true }
    }
}

/// Code generation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerateConfig {
    /// Pass --include-imports to buf generate
    pub include_imports: bool,

    /// Location of the buf.gen.yaml template (otherwise the project root
    /// is checked for one)
    pub template_file: Option<PathBuf>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Staging settings
    pub workspace: WorkspaceConfig,

    /// Buf tool settings
    pub tool: ToolConfig,

    /// Image build settings
    pub build: BuildConfig,

    /// Breaking-change check settings
    pub breaking: BreakingConfig,

    /// Format settings
    pub format: FormatConfig,

    /// Code generation settings
    pub generate: GenerateConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Fallback buf executable when the project does not set one
    pub executable: Option<PathBuf>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific project root
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self { project, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("build", "buf", "bufstage").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Rejects configurations that can never stage correctly
    fn validate(config: &ProjectConfig) -> Result<()> {
        for root in &config.workspace.source_roots {
            let escapes = root
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
            if escapes {
                return Err(ConfigError::Invalid(format!(
                    "source root may not leave the project: {}",
                    root.display()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Finds the project root by looking for `bufstage.toml`
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(CONFIG_FILE_NAME).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Resolution order for the buf binary: project setting, then global
    pub fn configured_executable(&self) -> Option<&Path> {
        self.project
            .tool
            .executable
            .as_deref()
            .or(self.global.executable.as_deref())
    }
}
