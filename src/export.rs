//! Export of session results.
//!
//! The session never performs I/O itself. It hands an [`ExportBundle`] to an
//! [`Exporter`], which turns it into named artifacts. [`DirectoryExporter`]
//! writes them into a directory:
//!
//! - `image-results-<date>.json`: the [`SessionReport`] as JSON
//! - `liked-images-<date>.txt`: liked names, one per line
//! - `disliked-images-<date>.txt`: disliked names, one per line
//! - `image-logs-<date>.txt`: the activity log
//! - `image-decisions-<date>.csv`: every decision, optional

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::activity::ActivityLog;
use crate::config::SorterConfig;
use crate::error::{Error, Result};
use crate::report::SessionReport;
use crate::session::Decision;

/// Everything an exporter may serialize.
#[derive(Debug, Clone, Copy)]
pub struct ExportBundle<'a> {
    /// The report, consumed verbatim.
    pub report: &'a SessionReport,
    /// Decisions in the order they were made.
    pub decisions: &'a [Decision],
    /// The activity log.
    pub activity: &'a ActivityLog,
}

/// Persists a session's results somewhere.
pub trait Exporter {
    /// Write the bundle and return the paths of the written artifacts.
    fn export(&self, bundle: &ExportBundle<'_>) -> Result<Vec<PathBuf>>;
}

/// Writes export artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    dir: PathBuf,
    write_csv: bool,
}

impl DirectoryExporter {
    /// Export into `dir`, creating it if needed.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_csv: true,
        }
    }

    /// Build an exporter from configuration.
    #[must_use]
    pub fn from_config(config: &SorterConfig) -> Self {
        Self::new(config.output_dir.clone()).with_csv(config.write_csv)
    }

    /// Enable or disable the CSV artifact.
    #[must_use]
    pub fn with_csv(mut self, enabled: bool) -> Self {
        self.write_csv = enabled;
        self
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_text(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, lines.join("\n"))?;
        Ok(path)
    }

    /// Write the per-decision CSV.
    fn write_decisions_csv(&self, path: &Path, decisions: &[Decision]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["position", "name", "reference", "outcome"])?;
        for decision in decisions {
            wtr.write_record([
                decision.position.to_string().as_str(),
                decision.name.as_str(),
                decision.reference.as_str(),
                decision.outcome.code(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl Exporter for DirectoryExporter {
    fn export(&self, bundle: &ExportBundle<'_>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Export(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let date = bundle.report.date_stamp();
        let mut written = Vec::new();

        let json_path = self.dir.join(format!("image-results-{date}.json"));
        fs::write(&json_path, bundle.report.to_json()?)?;
        written.push(json_path);

        written.push(self.write_text(
            &format!("liked-images-{date}.txt"),
            &bundle.report.liked_images,
        )?);
        written.push(self.write_text(
            &format!("disliked-images-{date}.txt"),
            &bundle.report.disliked_images,
        )?);
        let log_name = format!("image-logs-{date}.txt");
        written.push(self.write_text(&log_name, &bundle.activity.lines())?);

        if self.write_csv {
            let csv_path = self.dir.join(format!("image-decisions-{date}.csv"));
            self.write_decisions_csv(&csv_path, bundle.decisions)?;
            written.push(csv_path);
        }

        info!(dir = %self.dir.display(), files = written.len(), "exported results");
        Ok(written)
    }
}
