//! Results summary command.

use std::path::Path;

use anyhow::{Context, Result};
use image_sorter::SessionReport;

pub fn run(input: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading results from: {}", input.display());
    }

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let report = SessionReport::from_json(&content)
        .with_context(|| format!("Failed to parse results in {}", input.display()))?;

    println!("Reviewed at: {}", report.timestamp.to_rfc3339());
    println!("{:-<60}", "");
    println!("  Images:   {} of {} expected", report.total_images, report.total_expected);
    println!("  Liked:    {}", report.total_liked);
    println!("  Disliked: {}", report.total_disliked);

    let undecided = report.total_images.saturating_sub(report.total_decided());
    if undecided > 0 {
        println!("  Undecided: {undecided}");
    }

    if !report.liked_images.is_empty() {
        println!();
        println!("Liked:");
        for name in &report.liked_images {
            println!("  {name}");
        }
    }

    if verbose && !report.disliked_images.is_empty() {
        println!();
        println!("Disliked:");
        for name in &report.disliked_images {
            println!("  {name}");
        }
    }

    Ok(())
}
