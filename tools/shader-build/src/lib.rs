//! shader-build library
//!
//! Finds the pipeline stages a Slang shader defines and compiles each one to
//! SPIR-V with an external compiler. The `shader-build` binary wraps this for
//! whole directory trees.

pub mod catalog;
pub mod config;
pub mod error;
pub mod invoke;
pub mod pipeline;
pub mod plan;
pub mod scanner;
pub mod walk;

pub use catalog::{Catalog, Preset, Stage, StageDescriptor};
pub use error::{CatalogError, CompileError};
pub use invoke::{CompilationOutcome, ShaderCompiler, SlangCompiler, Strategy};
pub use pipeline::{compile_file, FileReport, FileStatus};
pub use plan::{plan_file, CompilationRequest};
pub use scanner::{ScanResult, Scanner};
pub use walk::{WalkOptions, WalkSummary};
