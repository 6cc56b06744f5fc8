//! Per-file pipeline
//!
//! Drives one source file through
//! `Discovered → Scanned → { NothingToCompile | Planned → Invoked → { Succeeded | Failed } }`.
//! Every line meant for the console is buffered in the report's transcript so
//! callers running files in parallel can print each file in one piece.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CompileError;
use crate::invoke::ShaderCompiler;
use crate::plan::{plan_file, CompilationRequest};
use crate::scanner::Scanner;

/// Terminal state of one source file.
#[derive(Debug)]
pub enum FileStatus {
    /// No catalog entry point was found; not an error
    NothingToCompile,
    /// Every requested stage compiled
    Succeeded { artifacts: Vec<PathBuf> },
    /// Compilation or filesystem failure; artifacts of this file are not valid
    Failed { error: CompileError },
}

/// What happened to one source file.
#[derive(Debug)]
pub struct FileReport {
    pub source_file: PathBuf,
    pub status: FileStatus,
    /// Console lines, in the order they were produced
    pub transcript: Vec<String>,
}

impl FileReport {
    /// A file that fails before it is read.
    pub fn rejected(source_file: &Path, error: CompileError) -> Self {
        Self {
            source_file: source_file.to_path_buf(),
            transcript: vec![
                format!("Compiling shader: {}", source_file.display()),
                format!("  ✗ {}", error),
            ],
            status: FileStatus::Failed { error },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Scan, plan and compile one source file into `out_dir`.
pub fn compile_file(
    source_file: &Path,
    out_dir: &Path,
    scanner: &Scanner,
    compiler: &dyn ShaderCompiler,
) -> FileReport {
    let mut transcript = Vec::new();
    let status = run_stages(source_file, out_dir, scanner, compiler, &mut transcript);

    match &status {
        FileStatus::Failed { error } => transcript.push(format!("  ✗ {}", error)),
        FileStatus::Succeeded { .. } | FileStatus::NothingToCompile => {}
    }

    FileReport {
        source_file: source_file.to_path_buf(),
        status,
        transcript,
    }
}

fn run_stages(
    source_file: &Path,
    out_dir: &Path,
    scanner: &Scanner,
    compiler: &dyn ShaderCompiler,
    transcript: &mut Vec<String>,
) -> FileStatus {
    transcript.push(format!("Compiling shader: {}", source_file.display()));

    let source = match fs::read(source_file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            return FileStatus::Failed {
                error: CompileError::filesystem(source_file, e),
            }
        }
    };

    let scan = scanner.scan(&source);
    for descriptor in &scan.missing {
        transcript.push(format!(
            "Skipping missing entry '{}' in {}",
            descriptor.entry_point,
            source_file.display()
        ));
    }

    if scan.is_empty() {
        transcript.push(format!(
            "No known entry points found in {}. Nothing to compile.",
            source_file.display()
        ));
        return FileStatus::NothingToCompile;
    }

    let requests = match plan_file(source_file, out_dir, &scan.matched) {
        Ok(requests) => requests,
        Err(error) => return FileStatus::Failed { error },
    };

    for line in compiler.command_lines(source_file, &requests) {
        transcript.push(format!("Running: {}", line));
    }

    let outcome = match compiler.invoke(source_file, &requests) {
        Ok(outcome) => outcome,
        Err(error) => {
            discard_outputs(&requests);
            return FileStatus::Failed { error };
        }
    };

    if !outcome.succeeded {
        discard_outputs(&requests);
        return FileStatus::Failed {
            error: CompileError::CompilationFailed {
                source_file: outcome.source_file,
                entry_points: outcome
                    .requested_stages
                    .iter()
                    .filter_map(|stage| scanner.catalog().by_stage(*stage))
                    .map(|d| d.entry_point.to_string())
                    .collect(),
                diagnostics: outcome.diagnostic_text,
            },
        };
    }

    if !outcome.diagnostic_text.trim().is_empty() {
        tracing::warn!(
            "{} compiled with diagnostics:\n{}",
            source_file.display(),
            outcome.diagnostic_text.trim_end()
        );
    }

    let mut artifacts = Vec::with_capacity(requests.len());
    for request in requests {
        transcript.push(format!(
            "  ✓ {} -> {}",
            request.descriptor.entry_point,
            request.output_file.display()
        ));
        artifacts.push(request.output_file);
    }

    FileStatus::Succeeded { artifacts }
}

/// Remove whatever a failed invocation left at the planned artifact paths.
fn discard_outputs(requests: &[CompilationRequest]) {
    for request in requests {
        let path = &request.output_file;
        if path.exists() {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!("Discarded output {}", path.display()),
                Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}
