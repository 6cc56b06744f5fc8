//! Scan command - report discovered stages without compiling

use anyhow::{Context, Result};
use clap::Args;
use shader_build::plan::output_path;
use shader_build::{walk, Scanner};
use std::path::{Path, PathBuf};

use super::CatalogArgs;

/// Arguments for the scan command
#[derive(Args)]
pub struct ScanArgs {
    /// Shader file or directory to scan
    pub path: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Execute the scan command
pub fn execute(args: ScanArgs) -> Result<()> {
    let settings = args.catalog.settings()?;
    let scanner = Scanner::new(settings.catalog)?;

    let files: Vec<PathBuf> = if args.path.is_file() {
        vec![args.path.clone()]
    } else if args.path.is_dir() {
        walk::discover(&args.path, Path::new(""), &settings.extensions)
            .into_iter()
            .map(|source| source.path)
            .collect()
    } else {
        anyhow::bail!("Path not found: {}", args.path.display());
    };

    for file in &files {
        let source = std::fs::read(file)
            .with_context(|| format!("Failed to read shader: {}", file.display()))?;
        let source = String::from_utf8_lossy(&source);
        let result = scanner.scan(&source);

        println!("{}", file.display());
        if result.is_empty() {
            println!("  (nothing to compile)");
            continue;
        }
        for descriptor in &result.matched {
            println!(
                "  {:<24} {:<8} -> {}",
                descriptor.stage.to_string(),
                descriptor.entry_point,
                output_path(Path::new(""), file, descriptor).display()
            );
        }
    }

    println!();
    println!("Scanned {} file(s)", files.len());

    Ok(())
}
