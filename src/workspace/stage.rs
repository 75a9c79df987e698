//! Staged workspace assembly
//!
//! Staging builds a synthetic workspace under one directory: a relative
//! symlink per proto-bearing source root, named by the mangled relative
//! path, plus a generated manifest describing the set. The operation is
//! idempotent; existing links are left alone so repeated runs converge on
//! the same layout.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::mangle::mangle;
use super::manifest::{self, ManifestVersion};
use super::scan::contains_protos;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Source root is not inside the project: {0}")]
    OutsideProject(PathBuf),

    #[error("Failed to create staging directory {path}: {source}")]
    CreateStaging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create symlink {link}: {source}")]
    CreateSymlink {
        link: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read buf config {path}: {source}")]
    ReadBufConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse buf config {path}: {source}")]
    ParseBufConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to render workspace manifest: {0}")]
    RenderManifest(#[source] serde_yaml::Error),

    #[error("Failed to write {path}: {source}")]
    WriteStaging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A source directory retained for staging: it sits under the project root
/// and its subtree contains at least one `.proto` file.
#[derive(Debug, Clone, Serialize)]
pub struct ProtoModule {
    /// Directory path relative to the project root.
    pub relative: PathBuf,
    /// Flattened name the directory is staged under.
    pub mangled: String,
}

/// The staged workspace layout after materialization.
#[derive(Debug, Serialize)]
pub struct StagedWorkspace {
    /// Directory holding the symlinks and the manifest.
    pub staging_dir: PathBuf,
    /// Path of the written manifest file.
    pub manifest_path: PathBuf,
    /// Modules included in the workspace, in configuration order.
    pub modules: Vec<ProtoModule>,
}

/// Filters candidate source roots down to those that contain proto files.
///
/// Candidates may be given relative to the project root or as absolute
/// paths under it; anything pointing outside the project is an error.
/// Configuration order is preserved and duplicates are dropped. Candidates
/// that are missing, empty, or proto-free are skipped silently.
pub fn discover_modules(
    project_root: &Path,
    source_roots: &[PathBuf],
) -> Result<Vec<ProtoModule>, WorkspaceError> {
    let mut modules: Vec<ProtoModule> = Vec::new();

    for root in source_roots {
        let relative = if root.is_absolute() {
            root.strip_prefix(project_root)
                .map_err(|_| WorkspaceError::OutsideProject(root.clone()))?
                .to_path_buf()
        } else {
            root.clone()
        };

        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(WorkspaceError::OutsideProject(root.clone()));
        }

        if modules.iter().any(|m| m.relative == relative) {
            continue;
        }

        if !contains_protos(&project_root.join(&relative)) {
            continue;
        }

        let mangled = mangle(&relative);
        modules.push(ProtoModule { relative, mangled });
    }

    Ok(modules)
}

/// Creates the staging layout for a set of source roots.
///
/// Discovers proto-bearing modules, links them into `staging_dir`, and
/// writes the workspace manifest. In v2 mode the user's buf config, when
/// given, is merged into the generated `buf.yaml`; in v1 mode it is copied
/// next to `buf.work.yaml` instead, because the legacy format keeps
/// workspace layout and buf settings in separate files.
pub fn materialize(
    project_root: &Path,
    staging_dir: &Path,
    source_roots: &[PathBuf],
    version: ManifestVersion,
    buf_config: Option<&Path>,
) -> Result<StagedWorkspace, WorkspaceError> {
    let modules = discover_modules(project_root, source_roots)?;

    ensure_staging_dir(staging_dir)?;
    link_modules(project_root, staging_dir, &modules)?;
    let manifest_path = write_manifest(staging_dir, &modules, version, buf_config)?;

    Ok(StagedWorkspace {
        staging_dir: staging_dir.to_path_buf(),
        manifest_path,
        modules,
    })
}

fn ensure_staging_dir(staging_dir: &Path) -> Result<(), WorkspaceError> {
    fs::create_dir_all(staging_dir).map_err(|source| WorkspaceError::CreateStaging {
        path: staging_dir.to_path_buf(),
        source,
    })?;

    let gitignore = staging_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, "*\n").map_err(|source| WorkspaceError::WriteStaging {
            path: gitignore.clone(),
            source,
        })?;
    }

    Ok(())
}

fn link_modules(
    project_root: &Path,
    staging_dir: &Path,
    modules: &[ProtoModule],
) -> Result<(), WorkspaceError> {
    for module in modules {
        let link = staging_dir.join(&module.mangled);

        // symlink_metadata never follows the link, so an existing entry is
        // detected even when its target has gone away. Such links are left
        // untouched.
        if link.symlink_metadata().is_ok() {
            continue;
        }

        let target = relative_target(project_root, staging_dir, &module.relative);
        create_dir_symlink(&target, &link).map_err(|source| WorkspaceError::CreateSymlink {
            link: link.clone(),
            source,
        })?;
    }

    Ok(())
}

/// Computes the link target relative to the staging directory, so the whole
/// project stays relocatable. The staging directory is expected to live
/// under the project root; one `..` per level walks back up to it.
fn relative_target(project_root: &Path, staging_dir: &Path, module_relative: &Path) -> PathBuf {
    let depth = staging_dir
        .strip_prefix(project_root)
        .map(|p| p.components().count())
        .unwrap_or(1);

    let mut target = PathBuf::new();
    for _ in 0..depth {
        target.push("..");
    }
    target.join(module_relative)
}

#[cfg(unix)]
fn create_dir_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

fn write_manifest(
    staging_dir: &Path,
    modules: &[ProtoModule],
    version: ManifestVersion,
    buf_config: Option<&Path>,
) -> Result<PathBuf, WorkspaceError> {
    let dirs: Vec<String> = modules.iter().map(|m| m.mangled.clone()).collect();

    let contents = match version {
        ManifestVersion::V1 => {
            if let Some(config) = buf_config {
                copy_buf_config(config, staging_dir)?;
            }
            manifest::render_work_yaml(&dirs)
        }
        ManifestVersion::V2 => {
            let base = match buf_config {
                Some(path) => Some(load_buf_config(path)?),
                None => None,
            };
            manifest::render_buf_yaml(base, &dirs).map_err(WorkspaceError::RenderManifest)?
        }
    };

    let path = staging_dir.join(version.file_name());
    fs::write(&path, contents).map_err(|source| WorkspaceError::WriteStaging {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

fn load_buf_config(path: &Path) -> Result<serde_yaml::Mapping, WorkspaceError> {
    let text = fs::read_to_string(path).map_err(|source| WorkspaceError::ReadBufConfig {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| WorkspaceError::ParseBufConfig {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_buf_config(config: &Path, staging_dir: &Path) -> Result<(), WorkspaceError> {
    let dest = staging_dir.join("buf.yaml");
    fs::copy(config, &dest)
        .map_err(|source| WorkspaceError::ReadBufConfig {
            path: config.to_path_buf(),
            source,
        })
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch_proto(root: &Path, dir: &str) {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.proto"), "syntax = \"proto3\";").unwrap();
    }

    // ==================== discovery ====================

    #[test]
    fn discovery_keeps_only_proto_bearing_roots() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "src/main/proto");
        fs::create_dir_all(project.path().join("empty")).unwrap();

        let roots = vec![
            PathBuf::from("src/main/proto"),
            PathBuf::from("empty"),
            PathBuf::from("missing"),
        ];
        let modules = discover_modules(project.path(), &roots).unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].relative, PathBuf::from("src/main/proto"));
        assert_eq!(modules[0].mangled, "src-main-proto");
    }

    #[test]
    fn discovery_preserves_order_and_drops_duplicates() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "b");
        touch_proto(project.path(), "a");

        let roots = vec![
            PathBuf::from("b"),
            PathBuf::from("a"),
            PathBuf::from("b"),
        ];
        let modules = discover_modules(project.path(), &roots).unwrap();

        let names: Vec<&str> = modules.iter().map(|m| m.mangled.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn discovery_accepts_absolute_roots_under_the_project() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");

        let roots = vec![project.path().join("protos")];
        let modules = discover_modules(project.path(), &roots).unwrap();

        assert_eq!(modules[0].relative, PathBuf::from("protos"));
    }

    #[test]
    fn discovery_rejects_roots_outside_the_project() {
        let project = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        touch_proto(elsewhere.path(), "protos");

        let roots = vec![elsewhere.path().join("protos")];
        let err = discover_modules(project.path(), &roots).unwrap_err();

        assert!(matches!(err, WorkspaceError::OutsideProject(_)));
    }

    #[test]
    fn discovery_rejects_parent_traversal() {
        let project = TempDir::new().unwrap();
        let roots = vec![PathBuf::from("../outside")];
        let err = discover_modules(project.path(), &roots).unwrap_err();

        assert!(matches!(err, WorkspaceError::OutsideProject(_)));
    }

    // ==================== materialization ====================

    #[cfg(unix)]
    #[test]
    fn materialize_creates_relative_symlinks() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "src/main/proto");
        let staging = project.path().join(".stage");

        let roots = vec![PathBuf::from("src/main/proto")];
        let staged =
            materialize(project.path(), &staging, &roots, ManifestVersion::V2, None).unwrap();

        let link = staging.join("src-main-proto");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("../src/main/proto"));
        assert!(link.join("a.proto").is_file());
        assert_eq!(staged.modules.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn materialize_is_idempotent() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let staging = project.path().join(".stage");
        let roots = vec![PathBuf::from("protos")];

        materialize(project.path(), &staging, &roots, ManifestVersion::V2, None).unwrap();
        let before = fs::read_link(staging.join("protos")).unwrap();

        materialize(project.path(), &staging, &roots, ManifestVersion::V2, None).unwrap();
        let after = fs::read_link(staging.join("protos")).unwrap();

        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[test]
    fn materialize_leaves_dangling_links_untouched() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let staging = project.path().join(".stage");
        fs::create_dir_all(&staging).unwrap();

        // Pre-plant a link whose target does not exist.
        std::os::unix::fs::symlink("../gone", staging.join("protos")).unwrap();

        let roots = vec![PathBuf::from("protos")];
        materialize(project.path(), &staging, &roots, ManifestVersion::V2, None).unwrap();

        assert_eq!(
            fs::read_link(staging.join("protos")).unwrap(),
            PathBuf::from("../gone")
        );
    }

    #[test]
    fn materialize_writes_a_gitignore() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let staging = project.path().join(".stage");

        materialize(
            project.path(),
            &staging,
            &[PathBuf::from("protos")],
            ManifestVersion::V2,
            None,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(staging.join(".gitignore")).unwrap(), "*\n");
    }

    #[test]
    fn materialize_v1_writes_work_yaml_and_copies_config() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let config = project.path().join("buf.yaml");
        fs::write(&config, "version: v1\nlint:\n  use:\n    - STANDARD\n").unwrap();
        let staging = project.path().join(".stage");

        let staged = materialize(
            project.path(),
            &staging,
            &[PathBuf::from("protos")],
            ManifestVersion::V1,
            Some(&config),
        )
        .unwrap();

        assert_eq!(staged.manifest_path, staging.join("buf.work.yaml"));
        let manifest = fs::read_to_string(&staged.manifest_path).unwrap();
        assert_eq!(manifest, "version: v1\ndirectories:\n  - protos\n");

        let copied = fs::read_to_string(staging.join("buf.yaml")).unwrap();
        assert!(copied.contains("STANDARD"));
    }

    #[test]
    fn materialize_v2_merges_config_into_manifest() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let config = project.path().join("buf.yaml");
        fs::write(
            &config,
            "version: v2\nbreaking:\n  ignore:\n    - legacy.proto\n",
        )
        .unwrap();
        let staging = project.path().join(".stage");

        let staged = materialize(
            project.path(),
            &staging,
            &[PathBuf::from("protos")],
            ManifestVersion::V2,
            Some(&config),
        )
        .unwrap();

        assert_eq!(staged.manifest_path, staging.join("buf.yaml"));
        let manifest = fs::read_to_string(&staged.manifest_path).unwrap();
        assert!(manifest.contains("protos/legacy.proto"));
    }

    #[test]
    fn materialize_reports_malformed_config() {
        let project = TempDir::new().unwrap();
        touch_proto(project.path(), "protos");
        let config = project.path().join("buf.yaml");
        fs::write(&config, ": not yaml: [").unwrap();
        let staging = project.path().join(".stage");

        let err = materialize(
            project.path(),
            &staging,
            &[PathBuf::from("protos")],
            ManifestVersion::V2,
            Some(&config),
        )
        .unwrap_err();

        assert!(matches!(err, WorkspaceError::ParseBufConfig { .. }));
    }

    #[test]
    fn relative_target_walks_up_one_level_per_component() {
        let root = Path::new("/proj");
        assert_eq!(
            relative_target(root, &root.join(".stage"), Path::new("src/main/proto")),
            PathBuf::from("../src/main/proto")
        );
        assert_eq!(
            relative_target(root, &root.join("out/stage"), Path::new("protos")),
            PathBuf::from("../../protos")
        );
    }
}
