//! Compilation planner
//!
//! Turns the stages found in a source file into one request per stage, each
//! with its artifact path, and makes sure the output directory exists.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::StageDescriptor;
use crate::error::CompileError;

/// Extension appended to every artifact.
pub const ARTIFACT_EXT: &str = "spv";

/// One stage of one source file, ready for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    pub source_file: PathBuf,
    pub descriptor: StageDescriptor,
    pub output_file: PathBuf,
}

/// Artifact path: `<out_dir>/<stem>.<suffix>.spv`
pub fn output_path(out_dir: &Path, source_file: &Path, descriptor: &StageDescriptor) -> PathBuf {
    let stem = source_file
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    out_dir.join(format!("{}.{}.{}", stem, descriptor.suffix, ARTIFACT_EXT))
}

/// Plan the compilation of `source_file` into `out_dir`.
///
/// Creates `out_dir` (and parents) if needed. Requests follow the order of
/// `matched`, which the scanner returns in catalog order.
pub fn plan_file(
    source_file: &Path,
    out_dir: &Path,
    matched: &[&StageDescriptor],
) -> Result<Vec<CompilationRequest>, CompileError> {
    fs::create_dir_all(out_dir).map_err(|e| CompileError::filesystem(out_dir, e))?;

    Ok(matched
        .iter()
        .map(|descriptor| CompilationRequest {
            source_file: source_file.to_path_buf(),
            descriptor: (*descriptor).clone(),
            output_file: output_path(out_dir, source_file, descriptor),
        })
        .collect())
}
