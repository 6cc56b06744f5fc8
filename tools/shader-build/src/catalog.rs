//! Stage catalog
//!
//! Ordered table mapping a recognised entry-point name to the pipeline stage
//! it starts, the compiler profile for that stage, and the artifact suffix.
//! Catalog order only decides the order stages are reported and compiled in.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::error::CatalogError;

/// A pipeline stage a shader entry point can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Vertex,
    Fragment,
    Compute,
    Geometry,
    #[serde(alias = "hull")]
    TessellationControl,
    #[serde(alias = "domain")]
    TessellationEvaluation,
    #[serde(alias = "task")]
    Amplification,
    Mesh,
}

impl Stage {
    /// Name passed to the compiler's `-stage` flag.
    pub fn compiler_name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
            Stage::Geometry => "geometry",
            Stage::TessellationControl => "hull",
            Stage::TessellationEvaluation => "domain",
            Stage::Amplification => "amplification",
            Stage::Mesh => "mesh",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
            Stage::Geometry => "geometry",
            Stage::TessellationControl => "tessellation-control",
            Stage::TessellationEvaluation => "tessellation-evaluation",
            Stage::Amplification => "amplification",
            Stage::Mesh => "mesh",
        };
        f.write_str(name)
    }
}

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Function name that marks the stage's entry point (e.g. `vsMain`)
    pub entry_point: Cow<'static, str>,
    pub stage: Stage,
    /// Compiler target profile (e.g. `vs_6_0`)
    pub profile: Cow<'static, str>,
    /// Artifact suffix, the `vert` in `name.vert.spv`
    pub suffix: Cow<'static, str>,
}

impl StageDescriptor {
    pub const fn new(
        entry_point: &'static str,
        stage: Stage,
        profile: &'static str,
        suffix: &'static str,
    ) -> Self {
        Self {
            entry_point: Cow::Borrowed(entry_point),
            stage,
            profile: Cow::Borrowed(profile),
            suffix: Cow::Borrowed(suffix),
        }
    }

    /// Build a descriptor from runtime strings (config file entries).
    pub fn owned(entry_point: String, stage: Stage, profile: String, suffix: String) -> Self {
        Self {
            entry_point: Cow::Owned(entry_point),
            stage,
            profile: Cow::Owned(profile),
            suffix: Cow::Owned(suffix),
        }
    }
}

/// Every stage Slang can emit, one batched `slangc` call per file.
pub const EXTENDED_STAGES: &[StageDescriptor] = &[
    StageDescriptor::new("vsMain", Stage::Vertex, "vs_6_0", "vert"),
    StageDescriptor::new("psMain", Stage::Fragment, "ps_6_0", "frag"),
    StageDescriptor::new("csMain", Stage::Compute, "cs_6_0", "comp"),
    StageDescriptor::new("gsMain", Stage::Geometry, "gs_6_0", "geom"),
    StageDescriptor::new("hsMain", Stage::TessellationControl, "hs_6_0", "tesc"),
    StageDescriptor::new("dsMain", Stage::TessellationEvaluation, "ds_6_0", "tese"),
    StageDescriptor::new("asMain", Stage::Amplification, "as_6_5", "task"),
    StageDescriptor::new("msMain", Stage::Mesh, "ms_6_5", "mesh"),
];

/// Raster-only subset (vertex + fragment).
pub const BASIC_STAGES: &[StageDescriptor] = &[
    StageDescriptor::new("vsMain", Stage::Vertex, "vs_6_0", "vert"),
    StageDescriptor::new("psMain", Stage::Fragment, "ps_6_0", "frag"),
];

/// Built-in catalogs selectable from the command line or config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// All eight stages (vertex through mesh)
    #[default]
    Extended,
    /// Vertex and fragment only
    Basic,
}

impl Preset {
    pub fn descriptors(self) -> &'static [StageDescriptor] {
        match self {
            Preset::Extended => EXTENDED_STAGES,
            Preset::Basic => BASIC_STAGES,
        }
    }
}

/// Validated, ordered set of stage descriptors.
#[derive(Debug, Clone)]
pub struct Catalog {
    stages: Vec<StageDescriptor>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate entry points or stages.
    pub fn new(stages: Vec<StageDescriptor>) -> Result<Self, CatalogError> {
        if stages.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut entries = HashSet::new();
        let mut kinds = HashSet::new();
        for descriptor in &stages {
            if descriptor.entry_point.is_empty() {
                return Err(CatalogError::EmptyEntryPoint(descriptor.stage));
            }
            if descriptor.suffix.is_empty() || descriptor.suffix.contains(['/', '\\']) {
                return Err(CatalogError::InvalidSuffix(descriptor.suffix.to_string()));
            }
            if !entries.insert(&*descriptor.entry_point) {
                return Err(CatalogError::DuplicateEntryPoint(
                    descriptor.entry_point.to_string(),
                ));
            }
            if !kinds.insert(descriptor.stage) {
                return Err(CatalogError::DuplicateStage(descriptor.stage));
            }
        }

        Ok(Self { stages })
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self {
            stages: preset.descriptors().to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDescriptor> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn find(&self, entry_point: &str) -> Option<&StageDescriptor> {
        self.stages.iter().find(|d| d.entry_point == entry_point)
    }

    pub fn by_stage(&self, stage: Stage) -> Option<&StageDescriptor> {
        self.stages.iter().find(|d| d.stage == stage)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}
