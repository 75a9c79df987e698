//! Path mangling for staged module names
//!
//! Staged modules live flat inside the staging root, so each source
//! directory's project-relative path is flattened into a single name:
//! hyphens are escaped to double hyphens, then path separators become
//! single hyphens. `src/main/proto` becomes `src-main-proto` and
//! `gen-protos/v1` becomes `gen--protos-v1`.

use std::path::Path;

/// Flattens a project-relative directory path into a staged module name.
///
/// The transform is a pure function of the path and never consults the
/// filesystem or environment, so re-running it over the same roots always
/// produces the same staging layout. Humans can read the original path back
/// out of the result; the scheme is a best-effort identifier, not a
/// collision-proof encoding for adversarial inputs.
pub fn mangle(path: &Path) -> String {
    path.to_string_lossy()
        .replace('-', "--")
        .replace(std::path::MAIN_SEPARATOR, "-")
}
