//! Configuration for review sessions and exports.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::input::KeyMap;
use crate::manifest::IMAGE_EXTENSIONS;

/// Configuration shared by the CLI and the exporter.
#[derive(Debug, Clone)]
pub struct SorterConfig {
    /// Directory export artifacts are written to.
    pub output_dir: PathBuf,

    /// Key bindings for the review prompt.
    pub key_map: KeyMap,

    /// Extensions accepted when generating manifests.
    pub extensions: Vec<String>,

    /// Export automatically when the session completes.
    pub export_on_complete: bool,

    /// Also write the per-decision CSV.
    pub write_csv: bool,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SorterConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SorterConfigBuilder {
        SorterConfigBuilder::default()
    }

    /// Extensions as string slices, for
    /// [`crate::manifest::Manifest::generate_with_extensions`].
    #[must_use]
    pub fn extension_refs(&self) -> Vec<&str> {
        self.extensions.iter().map(String::as_str).collect()
    }

    /// Check the configuration before a command uses it.
    ///
    /// Rejects an empty extension list, extensions that are not plain
    /// alphanumeric suffixes, and an empty output directory.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(Error::Config("No image extensions configured".to_string()));
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || !e.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(Error::Config(format!("Invalid image extension: {bad:?}")));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("Output directory is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`SorterConfig`].
#[derive(Debug, Default)]
pub struct SorterConfigBuilder {
    output_dir: Option<PathBuf>,
    key_map: Option<KeyMap>,
    extensions: Option<Vec<String>>,
    export_on_complete: Option<bool>,
    write_csv: Option<bool>,
}

impl SorterConfigBuilder {
    /// Set the export directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the key bindings.
    #[must_use]
    pub fn key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = Some(key_map);
        self
    }

    /// Set the accepted image extensions (without dots).
    #[must_use]
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    /// Enable or disable exporting on completion.
    #[must_use]
    pub fn export_on_complete(mut self, enabled: bool) -> Self {
        self.export_on_complete = Some(enabled);
        self
    }

    /// Enable or disable the CSV artifact.
    #[must_use]
    pub fn write_csv(mut self, enabled: bool) -> Self {
        self.write_csv = Some(enabled);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SorterConfig {
        SorterConfig {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            key_map: self.key_map.unwrap_or_default(),
            extensions: self.extensions.unwrap_or_else(|| {
                IMAGE_EXTENSIONS.iter().map(|e| (*e).to_string()).collect()
            }),
            export_on_complete: self.export_on_complete.unwrap_or(true),
            write_csv: self.write_csv.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SorterConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.export_on_complete);
        assert!(config.write_csv);
        assert!(config.extension_refs().contains(&"png"));
    }

    #[test]
    fn test_builder() {
        let config = SorterConfig::builder()
            .output_dir("/tmp/results")
            .extensions(vec![".PNG".to_string(), "jpg".to_string()])
            .export_on_complete(false)
            .write_csv(false)
            .build();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/results"));
        assert_eq!(config.extensions, vec!["png", "jpg"]);
        assert!(!config.export_on_complete);
        assert!(!config.write_csv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_extensions() {
        let empty = SorterConfig::builder().extensions(Vec::new()).build();
        assert!(matches!(empty.validate(), Err(Error::Config(_))));

        let dotted = SorterConfig::builder()
            .extensions(vec!["png".to_string(), "tar.gz".to_string()])
            .build();
        let err = dotted.validate().unwrap_err();
        assert_eq!(err.to_string(), "Config error: Invalid image extension: \"tar.gz\"");

        let no_dir = SorterConfig::builder().output_dir("").build();
        assert!(matches!(no_dir.validate(), Err(Error::Config(_))));

        assert!(SorterConfig::default().validate().is_ok());
    }
}
