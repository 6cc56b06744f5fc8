//! shader-build.toml configuration
//!
//! Every field is optional. Command-line flags override the file, and the
//! file overrides the built-in defaults.
//!
//! ```toml
//! compiler = "slangc"
//! strategy = "batched"
//! preset = "extended"
//! extensions = ["slang"]
//! extra_args = ["-I", "shaders/include"]
//! jobs = 4
//!
//! [[stages]]
//! entry = "vertMain"
//! stage = "vertex"
//! profile = "vs_6_0"
//! suffix = "vert"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, Preset, Stage, StageDescriptor};
use crate::error::CompileError;
use crate::invoke::{Strategy, DEFAULT_COMPILER};
use crate::walk::DEFAULT_EXTENSIONS;

/// Parsed configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub compiler: Option<String>,
    pub strategy: Option<Strategy>,
    pub preset: Option<Preset>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    pub jobs: Option<usize>,
    /// Custom catalog; replaces the preset when non-empty
    #[serde(default)]
    pub stages: Vec<StageEntry>,
}

/// One `[[stages]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageEntry {
    pub entry: String,
    pub stage: Stage,
    pub profile: String,
    pub suffix: String,
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CompileError::filesystem(path, e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, CompileError> {
        let config: Self = toml::from_str(content).map_err(|e| CompileError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if config.jobs == Some(0) {
            return Err(CompileError::Config {
                path: path.to_path_buf(),
                message: "jobs must be at least 1".into(),
            });
        }
        if config.extensions.as_ref().is_some_and(|e| e.is_empty()) {
            return Err(CompileError::Config {
                path: path.to_path_buf(),
                message: "extensions must not be empty".into(),
            });
        }

        Ok(config)
    }
}

/// Values given on the command line; `None` defers to the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub compiler: Option<String>,
    pub strategy: Option<Strategy>,
    pub preset: Option<Preset>,
    pub extensions: Vec<String>,
    pub extra_args: Vec<String>,
    pub jobs: Option<usize>,
}

/// Fully resolved settings for a run.
#[derive(Debug)]
pub struct Settings {
    pub catalog: Catalog,
    pub compiler: String,
    pub strategy: Strategy,
    pub extensions: Vec<String>,
    pub extra_args: Vec<String>,
    pub jobs: Option<usize>,
}

impl Settings {
    /// Merge CLI overrides over an optional config file.
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self, CompileError> {
        let config = match config_path {
            Some(path) => BuildConfig::load(path)?,
            None => BuildConfig::default(),
        };
        Self::merge(config, overrides)
    }

    pub fn merge(config: BuildConfig, overrides: Overrides) -> Result<Self, CompileError> {
        // An explicit --preset wins over a custom catalog from the file.
        let catalog = match overrides.preset {
            Some(preset) => Catalog::from_preset(preset),
            None if !config.stages.is_empty() => Catalog::new(
                config
                    .stages
                    .into_iter()
                    .map(|s| StageDescriptor::owned(s.entry, s.stage, s.profile, s.suffix))
                    .collect(),
            )?,
            None => Catalog::from_preset(config.preset.unwrap_or_default()),
        };

        let extensions = if !overrides.extensions.is_empty() {
            overrides.extensions
        } else {
            config
                .extensions
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
        };
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();

        let mut extra_args = config.extra_args;
        extra_args.extend(overrides.extra_args);

        Ok(Self {
            catalog,
            compiler: overrides
                .compiler
                .or(config.compiler)
                .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
            strategy: overrides.strategy.or(config.strategy).unwrap_or_default(),
            extensions,
            extra_args,
            jobs: overrides.jobs.or(config.jobs),
        })
    }
}

/// Resolve the compiler program to an executable path.
pub fn resolve_compiler(program: &str) -> Result<PathBuf, CompileError> {
    which::which(program).map_err(|_| {
        CompileError::InvalidInvocation(format!(
            "Shader compiler '{}' not found. Install the Slang SDK or pass --compiler.",
            program
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn parse(content: &str) -> Result<BuildConfig, CompileError> {
        BuildConfig::parse(content, Path::new("shader-build.toml"))
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = Settings::merge(parse("").unwrap(), Overrides::default()).unwrap();
        assert_eq!(settings.compiler, "slangc");
        assert_eq!(settings.strategy, Strategy::Batched);
        assert_eq!(settings.catalog.len(), 8);
        assert_eq!(settings.extensions, ["slang"]);
        assert!(settings.extra_args.is_empty());
        assert_eq!(settings.jobs, None);
    }

    #[test]
    fn test_config_values_apply() {
        let config = parse(
            r#"
compiler = "/opt/slang/bin/slangc"
strategy = "per-stage"
preset = "basic"
extensions = [".slang", "hlsl"]
extra_args = ["-I", "include"]
jobs = 2
"#,
        )
        .unwrap();
        let settings = Settings::merge(config, Overrides::default()).unwrap();
        assert_eq!(settings.compiler, "/opt/slang/bin/slangc");
        assert_eq!(settings.strategy, Strategy::PerStage);
        assert_eq!(settings.catalog.len(), 2);
        assert_eq!(settings.extensions, ["slang", "hlsl"]);
        assert_eq!(settings.extra_args, ["-I", "include"]);
        assert_eq!(settings.jobs, Some(2));
    }

    #[test]
    fn test_overrides_win() {
        let config = parse("compiler = \"a\"\nstrategy = \"per-stage\"\njobs = 2\nextra_args = [\"-g\"]").unwrap();
        let overrides = Overrides {
            compiler: Some("b".into()),
            strategy: Some(Strategy::Batched),
            preset: Some(Preset::Basic),
            extensions: vec!["hlsl".into()],
            extra_args: vec!["-O3".into()],
            jobs: Some(8),
        };
        let settings = Settings::merge(config, overrides).unwrap();
        assert_eq!(settings.compiler, "b");
        assert_eq!(settings.strategy, Strategy::Batched);
        assert_eq!(settings.catalog.len(), 2);
        assert_eq!(settings.extensions, ["hlsl"]);
        assert_eq!(settings.extra_args, ["-g", "-O3"]);
        assert_eq!(settings.jobs, Some(8));
    }

    #[test]
    fn test_custom_stages() {
        let config = parse(
            r#"
[[stages]]
entry = "vertMain"
stage = "vertex"
profile = "vs_6_6"
suffix = "vert"

[[stages]]
entry = "hullMain"
stage = "hull"
profile = "hs_6_6"
suffix = "tesc"
"#,
        )
        .unwrap();
        let settings = Settings::merge(config, Overrides::default()).unwrap();
        let entries: Vec<_> = settings.catalog.iter().map(|d| d.entry_point.to_string()).collect();
        assert_eq!(entries, ["vertMain", "hullMain"]);
        let hull = settings.catalog.find("hullMain").unwrap();
        assert_eq!(hull.stage, Stage::TessellationControl);
        assert_eq!(hull.profile, "hs_6_6");
    }

    #[test]
    fn test_custom_stages_validated() {
        let config = parse(
            r#"
[[stages]]
entry = "main"
stage = "vertex"
profile = "vs_6_0"
suffix = "vert"

[[stages]]
entry = "main"
stage = "fragment"
profile = "ps_6_0"
suffix = "frag"
"#,
        )
        .unwrap();
        let result = Settings::merge(config, Overrides::default());
        assert!(matches!(
            result,
            Err(CompileError::Catalog(CatalogError::DuplicateEntryPoint(_)))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = parse("compilr = \"slangc\"");
        assert!(matches!(result, Err(CompileError::Config { .. })));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let err = parse("jobs = 0").unwrap_err();
        assert!(err.to_string().contains("jobs must be at least 1"));
    }

    #[test]
    fn test_missing_compiler_is_invalid_invocation() {
        let result = resolve_compiler("definitely-not-a-real-slangc-binary");
        assert!(matches!(result, Err(CompileError::InvalidInvocation(_))));
    }
}
