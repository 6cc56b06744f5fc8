//! Compiler invocation
//!
//! The external compiler sits behind [`ShaderCompiler`] so the scanner and
//! planner never see binary names or argument shapes. [`SlangCompiler`] is
//! the real implementation; tests substitute fakes that record calls.

use serde::Deserialize;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::catalog::Stage;
use crate::error::CompileError;
use crate::plan::CompilationRequest;

/// Default compiler front-end.
pub const DEFAULT_COMPILER: &str = "slangc";

/// Result of compiling one source file.
#[derive(Debug, Clone)]
pub struct CompilationOutcome {
    pub source_file: PathBuf,
    pub requested_stages: Vec<Stage>,
    /// True only if every process exited with status zero
    pub succeeded: bool,
    /// Raw compiler output (stderr, then stdout)
    pub diagnostic_text: String,
}

/// Something that can compile a planned source file.
pub trait ShaderCompiler: Sync {
    /// Command lines that [`invoke`](Self::invoke) will run, for display.
    fn command_lines(&self, source_file: &Path, requests: &[CompilationRequest]) -> Vec<String>;

    /// Compile every request for `source_file`.
    ///
    /// A compiler that ran and failed is an `Ok` outcome with
    /// `succeeded == false`; `Err` means it could not be run at all.
    fn invoke(
        &self,
        source_file: &Path,
        requests: &[CompilationRequest],
    ) -> Result<CompilationOutcome, CompileError>;
}

/// How stages of one file are spread over compiler processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One process per file with a `-target` group per stage
    #[default]
    Batched,
    /// One process per stage
    PerStage,
}

/// `slangc` driven through `std::process::Command`.
#[derive(Debug, Clone)]
pub struct SlangCompiler {
    program: PathBuf,
    strategy: Strategy,
    extra_args: Vec<String>,
}

impl SlangCompiler {
    pub fn new(program: impl Into<PathBuf>, strategy: Strategy) -> Self {
        Self {
            program: program.into(),
            strategy,
            extra_args: Vec::new(),
        }
    }

    /// Arguments inserted after the source path on every invocation.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Argument lists, one per process to spawn.
    pub fn argument_sets(
        &self,
        source_file: &Path,
        requests: &[CompilationRequest],
    ) -> Vec<Vec<OsString>> {
        match self.strategy {
            Strategy::Batched => {
                let mut args = self.leading_args(source_file);
                for request in requests {
                    // Distinct target names keep slangc from merging profiles
                    // and outputs of different stages.
                    let target = format!("spirv-{}", request.descriptor.suffix);
                    push_stage_group(&mut args, &target, request);
                }
                vec![args]
            }
            Strategy::PerStage => requests
                .iter()
                .map(|request| {
                    let mut args = self.leading_args(source_file);
                    push_stage_group(&mut args, "spirv", request);
                    args
                })
                .collect(),
        }
    }

    fn leading_args(&self, source_file: &Path) -> Vec<OsString> {
        let mut args = vec![source_file.as_os_str().to_os_string()];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn run(&self, args: &[OsString]) -> Result<Output, CompileError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }
}

fn push_stage_group(args: &mut Vec<OsString>, target: &str, request: &CompilationRequest) {
    let descriptor = &request.descriptor;
    args.extend(
        [
            "-target",
            target,
            "-entry",
            &*descriptor.entry_point,
            "-stage",
            descriptor.stage.compiler_name(),
            "-profile",
            &*descriptor.profile,
            "-o",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(request.output_file.as_os_str().to_os_string());
}

fn render_command(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_diagnostics(output: &Output, into: &mut String) {
    for stream in [&output.stderr, &output.stdout] {
        let text = String::from_utf8_lossy(stream);
        let text = text.trim_end();
        if !text.is_empty() {
            into.push_str(text);
            into.push('\n');
        }
    }
}

impl ShaderCompiler for SlangCompiler {
    fn command_lines(&self, source_file: &Path, requests: &[CompilationRequest]) -> Vec<String> {
        self.argument_sets(source_file, requests)
            .iter()
            .map(|args| render_command(self.program.as_os_str(), args))
            .collect()
    }

    fn invoke(
        &self,
        source_file: &Path,
        requests: &[CompilationRequest],
    ) -> Result<CompilationOutcome, CompileError> {
        let mut succeeded = true;
        let mut diagnostic_text = String::new();

        // Per-stage mode keeps going after a failure so every broken stage
        // shows up in the diagnostics.
        for args in self.argument_sets(source_file, requests) {
            let output = self.run(&args)?;
            if !output.status.success() {
                succeeded = false;
                tracing::debug!(
                    "{} exited with {} for {}",
                    self.program.display(),
                    output.status,
                    source_file.display()
                );
            }
            collect_diagnostics(&output, &mut diagnostic_text);
        }

        Ok(CompilationOutcome {
            source_file: source_file.to_path_buf(),
            requested_stages: requests.iter().map(|r| r.descriptor.stage).collect(),
            succeeded,
            diagnostic_text,
        })
    }
}
