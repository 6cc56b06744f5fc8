//! Stages command - print the active stage catalog

use anyhow::Result;
use clap::Args;
use shader_build::plan::ARTIFACT_EXT;

use super::CatalogArgs;

/// Arguments for the stages command
#[derive(Args)]
pub struct StagesArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Execute the stages command
pub fn execute(args: StagesArgs) -> Result<()> {
    let settings = args.catalog.settings()?;

    println!(
        "{:<10} {:<24} {:<8} {}",
        "ENTRY", "STAGE", "PROFILE", "OUTPUT"
    );
    for descriptor in settings.catalog.iter() {
        println!(
            "{:<10} {:<24} {:<8} *.{}.{}",
            descriptor.entry_point,
            descriptor.stage.to_string(),
            descriptor.profile,
            descriptor.suffix,
            ARTIFACT_EXT
        );
    }

    Ok(())
}
