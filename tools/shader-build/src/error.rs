//! Error types for shader discovery and compilation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::Stage;

/// Catalog construction errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Stage catalog is empty")]
    Empty,

    #[error("Entry point for {0} stage is empty")]
    EmptyEntryPoint(Stage),

    #[error("Artifact suffix '{0}' must be non-empty and contain no path separators")]
    InvalidSuffix(String),

    #[error("Entry point '{0}' appears more than once in the stage catalog")]
    DuplicateEntryPoint(String),

    #[error("Stage '{0}' appears more than once in the stage catalog")]
    DuplicateStage(Stage),
}

/// Errors produced while setting up or running a compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Bad command line or environment; nothing is compiled.
    #[error("{0}")]
    InvalidInvocation(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "Failed to compile one or more entries [{}] from {}{}",
        entry_points.join(", "),
        source_file.display(),
        format_diagnostics(diagnostics)
    )]
    CompilationFailed {
        source_file: PathBuf,
        entry_points: Vec<String>,
        diagnostics: String,
    },

    /// Two sources would write the same artifact paths.
    #[error(
        "{} and {} share the output name '{}'; rename one of them",
        source_file.display(),
        other.display(),
        output_dir.join(stem).display()
    )]
    OutputCollision {
        source_file: PathBuf,
        other: PathBuf,
        output_dir: PathBuf,
        stem: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid entry point pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl CompileError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompileError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

fn format_diagnostics(diagnostics: &str) -> String {
    let trimmed = diagnostics.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{}", trimmed)
    }
}
