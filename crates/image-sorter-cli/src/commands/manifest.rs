//! Manifest generation command.

use std::path::Path;

use anyhow::{Context, Result};
use image_sorter::SorterConfig;
use image_sorter::manifest::{MANIFEST_FILE_NAME, Manifest};

pub fn run(
    dir: &Path,
    output: Option<&Path>,
    extensions: Vec<String>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("Scanning for images in: {}", dir.display());
    }

    let mut config = SorterConfig::builder();
    if !extensions.is_empty() {
        config = config.extensions(extensions);
    }
    let config = config.build();
    config.validate()?;

    let manifest = Manifest::generate_with_extensions(dir, &config.extension_refs())
        .with_context(|| format!("Failed to list images in {}", dir.display()))?;

    let output_path = output.map_or_else(|| dir.join(MANIFEST_FILE_NAME), Path::to_path_buf);
    manifest
        .save(&output_path)
        .with_context(|| format!("Failed to write manifest to {}", output_path.display()))?;

    println!(
        "Generated manifest with {} files at {}",
        manifest.len(),
        output_path.display()
    );

    if verbose {
        for name in &manifest.files {
            eprintln!("  {name}");
        }
    }

    Ok(())
}
