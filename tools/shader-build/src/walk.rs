//! Directory walker
//!
//! Finds shader sources under an input root, mirrors their relative
//! directories under an output root, and runs the per-file pipeline for each.
//! Files are independent, so they can be compiled on a rayon pool; each
//! file's transcript is printed in one piece.

use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::CompileError;
use crate::invoke::ShaderCompiler;
use crate::pipeline::{compile_file, FileReport, FileStatus};
use crate::scanner::Scanner;

/// Extensions recognised as shader sources when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["slang"];

/// A discovered source and the directory its artifacts go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub output_dir: PathBuf,
}

/// Inputs for a full walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub extensions: Vec<String>,
    /// Worker threads; `None` uses rayon's default, `Some(1)` runs inline
    pub jobs: Option<usize>,
}

impl WalkOptions {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            jobs: None,
        }
    }
}

/// Aggregate result of a walk.
#[derive(Debug, Default)]
pub struct WalkSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
    pub artifacts: Vec<PathBuf>,
}

impl WalkSummary {
    fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::NothingToCompile => self.skipped += 1,
            FileStatus::Succeeded { artifacts } => {
                self.succeeded += 1;
                self.artifacts.extend(artifacts);
            }
            FileStatus::Failed { .. } => self.failed.push(report.source_file),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed.len()
    }
}

/// Fail early when the input root is not a directory.
pub fn check_input_root(input_root: &Path) -> Result<(), CompileError> {
    if input_root.is_dir() {
        Ok(())
    } else {
        Err(CompileError::InvalidInvocation(format!(
            "Input directory '{}' does not exist.",
            input_root.display()
        )))
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Recursively collect shader sources under `input_root`.
///
/// Entries are visited in file-name order so output is stable between runs.
/// Unreadable entries are logged and skipped.
pub fn discover(
    input_root: &Path,
    output_root: &Path,
    extensions: &[String],
) -> Vec<ShaderSource> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(input_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, extensions) {
            continue;
        }

        let relative_dir = path
            .parent()
            .and_then(|parent| parent.strip_prefix(input_root).ok())
            .unwrap_or_else(|| Path::new(""));

        sources.push(ShaderSource {
            path: path.to_path_buf(),
            output_dir: output_root.join(relative_dir),
        });
    }

    sources
}

/// Print a file's transcript without interleaving with other workers.
fn emit(report: &FileReport) {
    let mut text = report.transcript.join("\n");
    text.push('\n');
    print!("{}", text);
}

/// Sources whose artifacts would land on another source's paths, mapped to
/// the source they clash with.
///
/// Artifact names depend only on the output directory and the file stem, so
/// `x.hlsl` and `x.slang` (or `x.SLANG` and `x.slang`) side by side collide.
pub fn output_collisions(sources: &[ShaderSource]) -> HashMap<&Path, &Path> {
    let mut owners: HashMap<(&Path, &OsStr), &Path> = HashMap::new();
    let mut collisions = HashMap::new();

    for source in sources {
        let Some(stem) = source.path.file_stem() else {
            continue;
        };
        match owners.entry((source.output_dir.as_path(), stem)) {
            Entry::Occupied(owner) => {
                let owner = *owner.get();
                collisions.insert(source.path.as_path(), owner);
                collisions.entry(owner).or_insert(source.path.as_path());
            }
            Entry::Vacant(slot) => {
                slot.insert(source.path.as_path());
            }
        }
    }

    collisions
}

/// Compile every shader source under `options.input_root`.
///
/// A failing file never stops the walk; check
/// [`WalkSummary::has_failures`] for the overall result.
pub fn run(
    options: &WalkOptions,
    scanner: &Scanner,
    compiler: &dyn ShaderCompiler,
) -> Result<WalkSummary, CompileError> {
    check_input_root(&options.input_root)?;

    println!(
        "Compiling shaders from directory: {} to {}",
        options.input_root.display(),
        options.output_root.display()
    );

    let sources = discover(&options.input_root, &options.output_root, &options.extensions);
    tracing::debug!("Found {} shader sources", sources.len());

    // Colliding sources are rejected before they are read.
    let collisions = output_collisions(&sources);
    if !collisions.is_empty() {
        tracing::warn!("{} sources share artifact names", collisions.len());
    }

    let process = |source: &ShaderSource| {
        let report = match collisions.get(source.path.as_path()) {
            Some(other) => FileReport::rejected(
                &source.path,
                CompileError::OutputCollision {
                    source_file: source.path.clone(),
                    other: other.to_path_buf(),
                    output_dir: source.output_dir.clone(),
                    stem: source
                        .path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                },
            ),
            None => compile_file(&source.path, &source.output_dir, scanner, compiler),
        };
        emit(&report);
        report
    };

    let reports: Vec<FileReport> = match options.jobs {
        Some(1) => sources.iter().map(process).collect(),
        jobs => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.unwrap_or(0))
                .build()
                .map_err(|e| {
                    CompileError::InvalidInvocation(format!("Failed to start worker pool: {}", e))
                })?;
            tracing::debug!("Compiling on {} threads", pool.current_num_threads());
            pool.install(|| sources.par_iter().map(process).collect())
        }
    };

    let mut summary = WalkSummary::default();
    for report in reports {
        summary.record(report);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Preset};
    use crate::invoke::CompilationOutcome;
    use crate::plan::CompilationRequest;
    use std::fs;
    use tempfile::tempdir;

    /// Writes `<suffix>:<source contents>` per artifact; fails sources containing `BROKEN`.
    struct FakeCompiler;

    impl ShaderCompiler for FakeCompiler {
        fn command_lines(&self, source_file: &Path, _: &[CompilationRequest]) -> Vec<String> {
            vec![format!("fake {}", source_file.display())]
        }

        fn invoke(
            &self,
            source_file: &Path,
            requests: &[CompilationRequest],
        ) -> Result<CompilationOutcome, CompileError> {
            let text = fs::read_to_string(source_file).unwrap();
            let succeeded = !text.contains("BROKEN");
            if succeeded {
                for request in requests {
                    let payload = format!("{}:{}", request.descriptor.suffix, text);
                    fs::write(&request.output_file, payload).unwrap();
                }
            }
            Ok(CompilationOutcome {
                source_file: source_file.to_path_buf(),
                requested_stages: requests.iter().map(|r| r.descriptor.stage).collect(),
                succeeded,
                diagnostic_text: String::new(),
            })
        }
    }

    fn scanner() -> Scanner {
        Scanner::new(Catalog::from_preset(Preset::Extended)).unwrap()
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn list_files(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_discover_mirrors_directories() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("shaders");
        write(&input.join("a/b/x.slang"), "");
        write(&input.join("top.SLANG"), "");
        write(&input.join("a/readme.md"), "");
        write(&input.join("a/b/x.hlsl"), "");

        let out = dir.path().join("spv");
        let sources = discover(&input, &out, &["slang".to_string()]);

        assert_eq!(
            sources,
            [
                ShaderSource {
                    path: input.join("a/b/x.slang"),
                    output_dir: out.join("a/b"),
                },
                ShaderSource {
                    path: input.join("top.SLANG"),
                    output_dir: out.clone(),
                },
            ]
        );
    }

    #[test]
    fn test_discover_custom_extensions() {
        let dir = tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("a.hlsl"), "");
        write(&dir.path().join("b.slang"), "");
        write(&dir.path().join("c.txt"), "");

        let exts = vec!["hlsl".to_string(), "slang".to_string()];
        let sources = discover(dir.path(), Path::new("out"), &exts);
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_run_rejects_missing_input() {
        let dir = tempdir().expect("Failed to create temp dir");
        let options = WalkOptions::new(dir.path().join("nope"), dir.path().join("out"));
        let result = run(&options, &scanner(), &FakeCompiler);
        assert!(matches!(result, Err(CompileError::InvalidInvocation(_))));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_failure_does_not_stop_walk() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        write(&input.join("a.slang"), "// BROKEN\nvoid vsMain() {}");
        write(&input.join("b.slang"), "void vsMain() {}\nvoid psMain() {}");

        let mut options = WalkOptions::new(&input, &out);
        options.jobs = Some(1);
        let summary = run(&options, &scanner(), &FakeCompiler).unwrap();

        assert!(summary.has_failures());
        assert_eq!(summary.failed, [input.join("a.slang")]);
        assert_eq!(summary.succeeded, 1);
        assert!(out.join("b.vert.spv").is_file());
        assert!(out.join("b.frag.spv").is_file());
        assert!(!out.join("a.vert.spv").exists());
    }

    #[test]
    fn test_output_collisions_same_stem() {
        let out = Path::new("out");
        let source = |path: &str, dir: &str| ShaderSource {
            path: PathBuf::from(path),
            output_dir: out.join(dir),
        };
        let sources = [
            source("in/a/x.slang", "a"),
            source("in/b/x.slang", "b"),
            source("in/x.hlsl", ""),
            source("in/x.slang", ""),
            source("in/y.slang", ""),
        ];

        let collisions = output_collisions(&sources);

        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[Path::new("in/x.hlsl")], Path::new("in/x.slang"));
        assert_eq!(collisions[Path::new("in/x.slang")], Path::new("in/x.hlsl"));
    }

    #[test]
    fn test_same_stem_sources_fail_without_touching_artifacts() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        write(&input.join("x.hlsl"), "void vsMain() {}");
        write(&input.join("x.slang"), "// BROKEN\nvoid vsMain() {}");
        write(&input.join("y.slang"), "void vsMain() {}");

        let mut options = WalkOptions::new(&input, &out);
        options.extensions = vec!["hlsl".to_string(), "slang".to_string()];
        options.jobs = Some(1);
        let summary = run(&options, &scanner(), &FakeCompiler).unwrap();

        assert_eq!(summary.failed, [input.join("x.hlsl"), input.join("x.slang")]);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.artifacts, [out.join("y.vert.spv")]);
        for artifact in &summary.artifacts {
            assert!(artifact.is_file());
        }
        assert!(!out.join("x.vert.spv").exists());
    }

    #[test]
    fn test_nothing_to_compile_is_not_a_failure() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        write(&input.join("include/common.slang"), "float3 srgb(float3 c) { return c; }");

        let summary = run(&WalkOptions::new(&input, &out), &scanner(), &FakeCompiler).unwrap();

        assert!(!summary.has_failures());
        assert_eq!(summary.skipped, 1);
        assert!(summary.artifacts.is_empty());
        assert!(list_files(&out).is_empty());
    }

    #[test]
    fn test_parallel_run_is_idempotent() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        write(&input.join("pbr/lit.slang"), "void vsMain() {}\nvoid psMain() {}");
        write(&input.join("post/blur.slang"), "void csMain(uint3 id) {}");
        write(&input.join("mesh/meshlet.slang"), "void asMain() {}\nvoid msMain() {}");

        let mut options = WalkOptions::new(&input, &out);
        options.jobs = Some(4);

        let first = run(&options, &scanner(), &FakeCompiler).unwrap();
        let first_files = list_files(&out);
        let second = run(&options, &scanner(), &FakeCompiler).unwrap();
        let second_files = list_files(&out);

        assert_eq!(first.total(), 3);
        assert_eq!(first.artifacts.len(), 5);
        assert_eq!(second.artifacts.len(), 5);
        assert_eq!(first_files, second_files);

        let names: Vec<_> = first_files.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            names,
            [
                PathBuf::from("mesh/meshlet.mesh.spv"),
                PathBuf::from("mesh/meshlet.task.spv"),
                PathBuf::from("pbr/lit.frag.spv"),
                PathBuf::from("pbr/lit.vert.spv"),
                PathBuf::from("post/blur.comp.spv"),
            ]
        );
    }
}
