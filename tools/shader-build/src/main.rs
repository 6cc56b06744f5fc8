//! shader-build - Slang to SPIR-V build tool
//!
//! # Commands
//!
//! - `shader-build compile <input-dir> <output-dir>` - Compile every shader stage under a tree
//! - `shader-build scan <path>` - Show which stages a file or tree defines, without compiling
//! - `shader-build stages` - Print the active stage catalog
//!
//! # Usage
//!
//! ```bash
//! # Compile shaders/ into build/spv/, mirroring subdirectories
//! shader-build compile shaders build/spv
//!
//! # Vertex + fragment only, one slangc process per stage
//! shader-build compile shaders build/spv --preset basic --strategy per-stage
//!
//! # Check what would be compiled
//! shader-build scan shaders
//! ```
//!
//! Each `<name>.slang` yields `<name>.<suffix>.spv` per stage found, e.g.
//! `lit.vert.spv` and `lit.frag.spv`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// shader-build - Slang to SPIR-V build tool
#[derive(Parser)]
#[command(name = "shader-build")]
#[command(about = "Compile Slang shader entry points to SPIR-V")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every shader under <input-dir> into <output-dir>
    Compile(commands::compile::CompileArgs),

    /// List the stages found in a shader file or directory
    Scan(commands::scan::ScanArgs),

    /// Print the stage catalog in use
    Stages(commands::stages::StagesArgs),
}

fn main() -> Result<ExitCode> {
    // Reports go to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile(args) => commands::compile::execute(args),
        Commands::Scan(args) => {
            commands::scan::execute(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stages(args) => {
            commands::stages::execute(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
