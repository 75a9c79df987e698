//! Workspace manifest rendering
//!
//! The staging root needs a manifest telling buf which staged directories
//! form the workspace. Two formats exist: the legacy `buf.work.yaml` with a
//! flat `directories` list, and the current `buf.yaml` whose `modules` list
//! is merged over the user's own buf configuration. Both take the mangled
//! module names produced during staging.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Which workspace manifest format the staging step writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestVersion {
    /// Legacy `buf.work.yaml` listing workspace directories.
    V1,
    /// `buf.yaml` with one module entry per staged directory.
    #[default]
    V2,
}

impl ManifestVersion {
    /// File name the manifest is written under inside the staging root.
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestVersion::V1 => "buf.work.yaml",
            ManifestVersion::V2 => "buf.yaml",
        }
    }
}

/// Renders the legacy `buf.work.yaml` for a list of mangled module names.
pub fn render_work_yaml(dirs: &[String]) -> String {
    let mut out = String::from("version: v1\ndirectories:\n");
    for dir in dirs {
        out.push_str("  - ");
        out.push_str(dir);
        out.push('\n');
    }
    out
}

/// Renders a v2 `buf.yaml` for the staged workspace.
///
/// The user's own buf configuration, when given, is taken as the base
/// document so lint rules and other settings carry over. The `version` key
/// is forced to `v2` and a `modules` list is added with one entry per
/// staged directory. Any top-level `breaking.ignore` rules are additionally
/// re-rooted into each module, prefixed with the module's path, because buf
/// resolves per-module ignores relative to the module rather than the
/// workspace.
pub fn render_buf_yaml(base: Option<Mapping>, dirs: &[String]) -> Result<String, serde_yaml::Error> {
    let mut doc = base.unwrap_or_default();

    doc.insert(Value::from("version"), Value::from("v2"));

    let ignores = breaking_ignores(&doc);

    let modules: Vec<Value> = dirs
        .iter()
        .map(|dir| {
            let mut module = Mapping::new();
            module.insert(Value::from("path"), Value::from(dir.as_str()));
            if !ignores.is_empty() {
                let prefixed: Vec<Value> = ignores
                    .iter()
                    .map(|rule| Value::from(format!("{}/{}", dir, rule)))
                    .collect();
                let mut breaking = Mapping::new();
                breaking.insert(Value::from("ignore"), Value::Sequence(prefixed));
                module.insert(Value::from("breaking"), Value::Mapping(breaking));
            }
            Value::Mapping(module)
        })
        .collect();

    doc.insert(Value::from("modules"), Value::Sequence(modules));

    serde_yaml::to_string(&doc)
}

/// Extracts `breaking.ignore` entries from the base document, coercing
/// scalars to their string form and skipping anything non-scalar.
fn breaking_ignores(doc: &Mapping) -> Vec<String> {
    doc.get("breaking")
        .and_then(Value::as_mapping)
        .and_then(|breaking| breaking.get("ignore"))
        .and_then(Value::as_sequence)
        .map(|rules| rules.iter().filter_map(scalar_string).collect())
        .unwrap_or_default()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    // ==================== v1 ====================

    #[test]
    fn work_yaml_lists_directories_in_order() {
        let dirs = vec!["src-main-proto".to_string(), "build-extracted".to_string()];
        assert_eq!(
            render_work_yaml(&dirs),
            "version: v1\ndirectories:\n  - src-main-proto\n  - build-extracted\n"
        );
    }

    #[test]
    fn work_yaml_with_no_directories() {
        assert_eq!(render_work_yaml(&[]), "version: v1\ndirectories:\n");
    }

    // ==================== v2 ====================

    #[test]
    fn buf_yaml_without_base_is_minimal() {
        let yaml = render_buf_yaml(None, &["src-main-proto".to_string()]).unwrap();
        let doc = parse(&yaml);

        assert_eq!(doc.get("version").unwrap().as_str(), Some("v2"));
        let modules = doc.get("modules").unwrap().as_sequence().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(
            modules[0].get("path").unwrap().as_str(),
            Some("src-main-proto")
        );
        assert!(modules[0].get("breaking").is_none());
    }

    #[test]
    fn buf_yaml_forces_version_v2() {
        let base = parse("version: v1\nlint:\n  use:\n    - STANDARD\n");
        let yaml = render_buf_yaml(Some(base), &["protos".to_string()]).unwrap();
        let doc = parse(&yaml);

        assert_eq!(doc.get("version").unwrap().as_str(), Some("v2"));
    }

    #[test]
    fn buf_yaml_preserves_unrelated_base_keys() {
        let base = parse("version: v2\nlint:\n  use:\n    - STANDARD\ndeps:\n  - buf.build/acme/common\n");
        let yaml = render_buf_yaml(Some(base), &["protos".to_string()]).unwrap();
        let doc = parse(&yaml);

        assert!(doc.get("lint").is_some());
        let deps = doc.get("deps").unwrap().as_sequence().unwrap();
        assert_eq!(deps[0].as_str(), Some("buf.build/acme/common"));
    }

    #[test]
    fn buf_yaml_prefixes_breaking_ignores_per_module() {
        let base = parse("version: v2\nbreaking:\n  ignore:\n    - foo/bar.proto\n");
        let dirs = vec!["src-main-proto".to_string(), "gen--protos".to_string()];
        let yaml = render_buf_yaml(Some(base), &dirs).unwrap();
        let doc = parse(&yaml);

        let modules = doc.get("modules").unwrap().as_sequence().unwrap();
        for (module, dir) in modules.iter().zip(&dirs) {
            let ignore = module
                .get("breaking")
                .unwrap()
                .get("ignore")
                .unwrap()
                .as_sequence()
                .unwrap();
            assert_eq!(
                ignore[0].as_str(),
                Some(format!("{}/foo/bar.proto", dir).as_str())
            );
        }
    }

    #[test]
    fn buf_yaml_coerces_scalar_ignores_to_strings() {
        // YAML happily parses unquoted entries like `1.0` or `true` as
        // non-string scalars; they still have to land in the module list.
        let base = parse("breaking:\n  ignore:\n    - 42\n    - true\n    - plain.proto\n");
        let yaml = render_buf_yaml(Some(base), &["m".to_string()]).unwrap();
        let doc = parse(&yaml);

        let modules = doc.get("modules").unwrap().as_sequence().unwrap();
        let ignore = modules[0]
            .get("breaking")
            .unwrap()
            .get("ignore")
            .unwrap()
            .as_sequence()
            .unwrap();
        let entries: Vec<&str> = ignore.iter().filter_map(Value::as_str).collect();
        assert_eq!(entries, vec!["m/42", "m/true", "m/plain.proto"]);
    }

    #[test]
    fn buf_yaml_without_ignores_adds_plain_modules() {
        let base = parse("version: v2\nbreaking:\n  use:\n    - FILE\n");
        let yaml = render_buf_yaml(Some(base), &["a".to_string(), "b".to_string()]).unwrap();
        let doc = parse(&yaml);

        let modules = doc.get("modules").unwrap().as_sequence().unwrap();
        assert_eq!(modules.len(), 2);
        assert!(modules.iter().all(|m| m.get("breaking").is_none()));
    }
}
