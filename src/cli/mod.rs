//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | buf invocation | Purpose |
//! |---------|----------------|---------|
//! | `lint` | `buf lint` | Check sources against lint rules |
//! | `format check` | `buf format -d --exit-code` | Detect formatting drift |
//! | `format apply` | `buf format -w` | Rewrite files in place |
//! | `build` | `buf build --output ...` | Build a Buf image |
//! | `breaking` | `buf breaking --against ...` | Compare against a baseline |
//! | `generate` | `buf generate --template ...` | Run code generation |
//! | `check` | several | Lint plus the configured checks |
//! | `stage` | none | Materialize the staged workspace |
//! | `doctor` | `buf --version` | Show resolved tool and project setup |
//!
//! Commands run buf inside the staged workspace when the project has
//! source roots configured, and directly in the project root otherwise.
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) to trace staging and the exact buf
//! invocations:
//! ```bash
//! bufstage --verbose lint
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod prepare;
mod lint;
mod format;
mod build;
mod breaking;
mod generate;
mod stage_cmd;
mod doctor;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
