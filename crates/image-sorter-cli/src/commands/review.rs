//! Interactive review command.
//!
//! Reads one key token per line from stdin. Arrow keys typed at a terminal
//! arrive as escape sequences and are understood directly.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image_sorter::display::probe;
use image_sorter::{
    Action, DirectoryExporter, DisplayStatus, Error, Manifest, ReviewSession, SorterConfig,
    Transition,
};
use tracing::warn;

use crate::ReviewArgs;

pub fn run(args: ReviewArgs, verbose: bool) -> Result<()> {
    let config = SorterConfig::builder()
        .output_dir(args.output_dir.clone())
        .export_on_complete(!args.no_export)
        .write_csv(!args.no_csv)
        .build();
    config.validate()?;

    let (items, manifest_count) = match &args.manifest {
        Some(path) => resolve_manifest(path, args.base.as_deref(), verbose),
        None => (Vec::new(), 0),
    };

    let mut builder = ReviewSession::builder()
        .items(items)
        .total_expected(args.total_expected.unwrap_or(manifest_count));
    for path in &args.upload {
        builder = builder
            .upload_file(path)
            .with_context(|| format!("Failed to read upload {}", path.display()))?;
    }

    let session = match builder.build() {
        Ok(session) => session,
        Err(Error::NothingToReview) => {
            println!("No images to review. Pass --manifest or --upload to add files.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let session = run_loop(session, &config, stdin.lock(), stdout.lock())?;

    let (released, log) = session.teardown();
    if verbose && released > 0 {
        if let Some(line) = log.lines().last() {
            eprintln!("{line}");
        }
    }

    Ok(())
}

/// Load manifest items; a manifest that cannot be read yields no items.
fn resolve_manifest(
    path: &Path,
    base: Option<&Path>,
    verbose: bool,
) -> (Vec<image_sorter::Item>, usize) {
    let manifest = match Manifest::load(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(error = %e, "error loading manifest");
            eprintln!("No images available from manifest: {e}");
            return (Vec::new(), 0);
        }
    };

    let base: PathBuf = base
        .map(Path::to_path_buf)
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    if verbose {
        eprintln!(
            "Loaded {} images from manifest {}",
            manifest.len(),
            path.display()
        );
    }

    let items = manifest.resolve(&base.to_string_lossy());
    let count = manifest.len();
    (items, count)
}

/// Drive a session from line-based input until quit or end of input.
///
/// Returns the session so the caller can tear it down.
pub fn run_loop<R: BufRead, W: Write>(
    mut session: ReviewSession,
    config: &SorterConfig,
    input: R,
    mut out: W,
) -> Result<ReviewSession> {
    let exporter = DirectoryExporter::from_config(config);

    print_help(config, &mut out)?;
    render(&mut session, &mut out)?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let token = line.trim_matches(|c: char| c == '\r' || c == '\n' || c == ' ');
        if token.is_empty() {
            continue;
        }

        let action = match config.key_map.action_for_token(token) {
            Ok(Some(action)) => action,
            Ok(None) | Err(_) => {
                writeln!(out, "Unknown key {token:?}. Press ? for help.")?;
                continue;
            }
        };

        if action.is_review() && session.is_completed() {
            writeln!(out, "Review finished. Press s to export again or q to quit.")?;
            continue;
        }

        match action {
            Action::Reject | Action::Accept => {
                let transition = if action == Action::Accept {
                    session.like()
                } else {
                    session.dislike()
                };
                if let Transition::Completed(report) = transition {
                    writeln!(out)?;
                    writeln!(out, "All Done!")?;
                    writeln!(
                        out,
                        "You liked {} images and disliked {} out of {}.",
                        report.total_liked, report.total_disliked, report.total_images
                    )?;
                    if report.is_partial() {
                        writeln!(
                            out,
                            "Note: Only {} of the expected {} images were loaded.",
                            report.total_images, report.total_expected
                        )?;
                    } else {
                        writeln!(
                            out,
                            "All {} expected images were loaded.",
                            report.total_expected
                        )?;
                    }
                    if config.export_on_complete {
                        export(&mut session, &exporter, &mut out)?;
                    }
                    continue;
                }
            }
            Action::Undo => {
                if session.undo().is_none() {
                    writeln!(out, "Nothing to undo.")?;
                    continue;
                }
            }
            Action::Export => {
                export(&mut session, &exporter, &mut out)?;
                continue;
            }
            Action::ShowLog => {
                writeln!(out, "Activity Log")?;
                for line in session.activity().lines() {
                    writeln!(out, "  {line}")?;
                }
                continue;
            }
            Action::ShowLiked => {
                let liked = session.report().liked_images;
                writeln!(out, "Liked Images ({})", liked.len())?;
                if liked.is_empty() {
                    writeln!(out, "  No images liked yet")?;
                }
                for name in liked {
                    writeln!(out, "  {name}")?;
                }
                continue;
            }
            Action::Help => {
                print_help(config, &mut out)?;
                continue;
            }
            Action::Quit => break,
        }

        render(&mut session, &mut out)?;
    }

    out.flush()?;
    Ok(session)
}

fn export<W: Write>(
    session: &mut ReviewSession,
    exporter: &DirectoryExporter,
    out: &mut W,
) -> Result<()> {
    match session.export_with(exporter) {
        Ok(paths) => {
            for path in paths {
                writeln!(out, "Saved {}", path.display())?;
            }
        }
        Err(e) => writeln!(out, "Export failed: {e}. Press s to retry.")?,
    }
    Ok(())
}

/// Probe the current item if needed and print the review status.
fn render<W: Write>(session: &mut ReviewSession, out: &mut W) -> Result<()> {
    let index = session.current_index();
    let Some(item) = session.current_item().cloned() else {
        return Ok(());
    };

    if *session.display_status() == DisplayStatus::Loading {
        let result = probe(&item, session.blobs()).map_err(|e| e.to_string());
        session.report_display(index, result);
    }

    let progress = session.progress();
    writeln!(out)?;
    writeln!(
        out,
        "Image {} of {} ({}% complete)",
        index + 1,
        progress.total,
        progress.percent()
    )?;
    writeln!(
        out,
        "Loaded: {} of {} images",
        session.items().len(),
        session.total_expected()
    )?;

    match session.display_status() {
        DisplayStatus::Loaded(info) if info.width > 0 => {
            writeln!(
                out,
                "{} [{} {}x{}]",
                item.name(),
                info.format,
                info.width,
                info.height
            )?;
        }
        DisplayStatus::Loaded(info) => writeln!(out, "{} [{}]", item.name(), info.format)?,
        DisplayStatus::Failed(message) => writeln!(out, "{}\n  {message}", item.name())?,
        DisplayStatus::Loading => writeln!(out, "{}", item.name())?,
    }

    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

fn print_help<W: Write>(config: &SorterConfig, out: &mut W) -> Result<()> {
    let keys = |action: Action| {
        config
            .key_map
            .keys_for(action)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    };

    writeln!(out, "Image Sorter")?;
    writeln!(out, "  NO    {}", keys(Action::Reject))?;
    writeln!(out, "  YES   {}", keys(Action::Accept))?;
    writeln!(out, "  UNDO  {}", keys(Action::Undo))?;
    writeln!(
        out,
        "  export {}, log {}, liked {}, quit {}",
        keys(Action::Export),
        keys(Action::ShowLog),
        keys(Action::ShowLiked),
        keys(Action::Quit),
    )?;
    writeln!(out, "Type a key (or left/right/backspace) and press Enter.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_sorter::{Item, Outcome};

    fn session(names: &[&str]) -> ReviewSession {
        let items = names.iter().map(|n| Item::url(format!("/missing/{n}"))).collect();
        ReviewSession::new(items, None).unwrap()
    }

    fn drive(
        session: ReviewSession,
        config: &SorterConfig,
        input: &str,
    ) -> (ReviewSession, String) {
        let mut out = Vec::new();
        let session = run_loop(session, config, input.as_bytes(), &mut out).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_arrow_escape_sequences_drive_review() {
        let config = SorterConfig::builder().export_on_complete(false).build();
        let input = "\u{1b}[C\n\u{1b}[D\n\u{7f}\nn\ny\n";
        let (session, out) = drive(session(&["a.png", "b.png", "c.png"]), &config, input);

        assert!(session.is_completed());
        let outcomes: Vec<Outcome> = session.decisions().iter().map(|d| d.outcome).collect();
        assert_eq!(outcomes, vec![Outcome::Liked, Outcome::Disliked, Outcome::Liked]);
        assert!(out.contains("All Done!"));
        assert!(out.contains("Error loading image at path: /missing/a.png"));
    }

    #[test]
    fn test_input_after_completion_is_ignored() {
        let config = SorterConfig::builder().export_on_complete(false).build();
        let (session, out) = drive(session(&["a.png"]), &config, "y\ny\nu\n");

        assert_eq!(session.decisions().len(), 1);
        assert!(out.contains("Review finished."));
    }

    #[test]
    fn test_unknown_key_and_quit() {
        let config = SorterConfig::builder().export_on_complete(false).build();
        let (session, out) = drive(session(&["a.png", "b.png"]), &config, "jump\nq\ny\n");

        assert!(session.decisions().is_empty());
        assert!(out.contains("Unknown key"));
    }

    #[test]
    fn test_completion_exports() {
        let dir = tempfile::tempdir().unwrap();
        let config = SorterConfig::builder().output_dir(dir.path()).build();
        let (_session, out) = drive(session(&["a.png"]), &config, "right\n");

        assert!(out.contains("Saved "));
        assert!(out.contains("image-results-"));
        assert!(std::fs::read_dir(dir.path()).unwrap().count() >= 4);
    }
}
