//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{breaking, build, doctor, format, generate, lint, stage_cmd};
use crate::project::{Config, Project};

#[derive(Parser)]
#[command(name = "bufstage")]
#[command(author, version, about = "Stage Protobuf sources into a Buf workspace and run buf")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config setting, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to the buf executable (overrides configuration)
    #[arg(long, global = true, env = "BUFSTAGE_BUF")]
    pub buf: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a bufstage.toml in a project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Check Protobuf sources against the configured lint rules
    Lint,

    /// Check or fix Protobuf formatting
    #[command(subcommand)]
    Format(format::FormatCommands),

    /// Build a Buf image from the Protobuf schema
    Build {
        /// Where to write the image (defaults to .bufstage/image.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check the schema for breaking changes against a baseline
    Breaking {
        /// Image file, directory or git input to compare against
        #[arg(long)]
        against: Option<String>,
    },

    /// Generate code from the Protobuf schema
    Generate {
        /// Template file, relative to the project root (defaults to buf.gen.yaml)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Also generate code for imported dependencies
        #[arg(long)]
        include_imports: bool,

        /// Directory for generated files (defaults to .bufstage/generated)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run lint plus whatever checks the configuration asks for
    Check,

    /// Create the staged workspace without running buf
    Stage,

    /// Show the resolved buf executable and project setup
    Doctor,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("bufstage starting");

    let buf = cli.buf.as_deref();

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized bufstage project at {}",
                project.root().display()
            ));
        }

        Commands::Lint => lint::run(&output, buf)?,

        Commands::Format(cmd) => format::run(cmd, &output, buf)?,

        Commands::Build { output: image } => build::run(&output, buf, image.as_deref())?,

        Commands::Breaking { against } => breaking::run(&output, buf, against.as_deref())?,

        Commands::Generate {
            template,
            include_imports,
            output: out_dir,
        } => generate::run(
            &output,
            buf,
            template.as_deref(),
            include_imports,
            out_dir.as_deref(),
        )?,

        Commands::Check => check(&output, buf)?,

        Commands::Stage => stage_cmd::run(&output)?,

        Commands::Doctor => doctor::run(&output, buf)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Runs every check the configuration asks for: lint always, format when
/// enforced, breaking when a baseline is configured.
fn check(output: &Output, buf: Option<&Path>) -> Result<()> {
    let project = Project::locate()?;
    let config = project.config().project.clone();

    lint::run(output, buf)?;

    if config.format.enforce {
        format::check(output, buf)?;
    } else {
        output.verbose_ctx("check", "Format enforcement disabled; skipping format check");
    }

    if config.breaking.against.is_some() {
        breaking::run(output, buf, None)?;
    }

    Ok(())
}
