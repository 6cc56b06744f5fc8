//! Compile command - compile every shader stage under a directory
//!
//! Walks the input tree, compiles each recognised source with the configured
//! compiler, and mirrors the directory layout in the output tree. One broken
//! file does not stop the others; the exit status reports whether any failed.

use anyhow::{Context, Result};
use clap::Args;
use shader_build::config::{self, Overrides};
use shader_build::walk::{self, WalkOptions};
use shader_build::{Scanner, SlangCompiler, Strategy};
use std::path::PathBuf;
use std::process::ExitCode;

use super::CatalogArgs;

/// Arguments for the compile command
#[derive(Args)]
pub struct CompileArgs {
    /// Directory containing shader sources
    pub input: PathBuf,

    /// Directory to write .spv artifacts to
    pub output: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Shader compiler executable (default: slangc)
    #[arg(long)]
    pub compiler: Option<String>,

    /// One compiler process per file (batched) or per stage
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Number of files to compile in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extra argument passed to every compiler call (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub extra_args: Vec<String>,
}

/// Execute the compile command
pub fn execute(args: CompileArgs) -> Result<ExitCode> {
    walk::check_input_root(&args.input)?;

    if args.jobs == Some(0) {
        anyhow::bail!("--jobs must be at least 1");
    }

    let settings = args.catalog.settings_with(Overrides {
        compiler: args.compiler.clone(),
        strategy: args.strategy,
        jobs: args.jobs,
        extra_args: args.extra_args.clone(),
        ..Overrides::default()
    })?;

    let program = config::resolve_compiler(&settings.compiler)?;
    let compiler =
        SlangCompiler::new(program, settings.strategy).with_extra_args(settings.extra_args);
    let scanner = Scanner::new(settings.catalog).context("Failed to build entry point scanner")?;
    tracing::debug!(
        "Using compiler {} ({:?}) for {} stages",
        compiler.program().display(),
        compiler.strategy(),
        scanner.catalog().len()
    );

    let options = WalkOptions {
        input_root: args.input,
        output_root: args.output,
        extensions: settings.extensions,
        jobs: settings.jobs,
    };
    let summary = walk::run(&options, &scanner, &compiler)?;

    println!();
    println!(
        "Done! {} succeeded, {} skipped, {} failed",
        summary.succeeded,
        summary.skipped,
        summary.failed.len()
    );

    if summary.has_failures() {
        println!("Failed shaders:");
        for source in &summary.failed {
            println!("  {}", source.display());
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
