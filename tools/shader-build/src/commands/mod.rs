//! Subcommands and the options they share

pub mod compile;
pub mod scan;
pub mod stages;

use anyhow::Result;
use clap::Args;
use shader_build::config::{Overrides, Settings};
use shader_build::Preset;
use std::path::PathBuf;

/// Options that pick the catalog and the files to look at
#[derive(Args)]
pub struct CatalogArgs {
    /// Path to a shader-build.toml config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stage catalog preset (overrides the config file)
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Shader source extension to pick up (repeatable, default: slang)
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,
}

impl CatalogArgs {
    /// Resolve settings using only the catalog options.
    pub fn settings(&self) -> Result<Settings> {
        self.settings_with(Overrides::default())
    }

    /// Resolve settings, layering these options over `overrides`.
    pub fn settings_with(&self, mut overrides: Overrides) -> Result<Settings> {
        overrides.preset = self.preset;
        overrides.extensions = self.extensions.clone();
        Ok(Settings::resolve(self.config.as_deref(), overrides)?)
    }
}
