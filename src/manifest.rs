//! Image manifests: the ordered list of images available for review.
//!
//! A manifest is a JSON file of the form `{"files": ["a.png", "b.png"]}`
//! listing image file names that live next to it. This module generates
//! manifests from a directory, loads them back, and resolves them into
//! review [`Item`]s.
//!
//! ## Example
//!
//! ```rust,ignore
//! use image_sorter::manifest::Manifest;
//!
//! let manifest = Manifest::generate("./renamed_images")?;
//! manifest.save("./renamed_images/manifest.json")?;
//!
//! let items = Manifest::load("./renamed_images/manifest.json")?
//!     .resolve("/renamed_images");
//! ```

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::item::Item;

/// File name of a generated manifest inside its image directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Extensions recognised as images, lowercase and without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "svg", "png", "jpg", "jpeg", "webp", "gif", "bmp", "avif", "tif", "tiff", "ico",
];

/// Ordered list of image file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Image file names, in review order.
    #[serde(default, deserialize_with = "files_or_empty")]
    pub files: Vec<String>,
}

impl Manifest {
    /// Create a manifest from file names, keeping their order.
    #[must_use]
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    /// List images directly inside `dir` in natural filename order.
    pub fn generate(dir: impl AsRef<Path>) -> Result<Self> {
        Self::generate_with_extensions(dir, IMAGE_EXTENSIONS)
    }

    /// Like [`Manifest::generate`] with a custom extension set.
    pub fn generate_with_extensions(dir: impl AsRef<Path>, extensions: &[&str]) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_error = |reason: String| Error::Manifest {
            path: dir.to_path_buf(),
            reason,
        };

        if !dir.is_dir() {
            return Err(manifest_error("Path is not a directory".to_string()));
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| manifest_error(format!("Failed to read directory: {e}")))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| manifest_error(format!("Failed to read entry: {e}")))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if has_image_extension(&path, extensions) {
                files.push(name.to_string());
            }
        }

        files.sort_by(|a, b| natural_cmp(a, b));
        info!(count = files.len(), dir = %dir.display(), "generated manifest");

        Ok(Self { files })
    }

    /// Load a manifest from a JSON file.
    ///
    /// A missing or malformed `files` key yields an empty manifest; an
    /// unreadable or unparsable file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(count = manifest.files.len(), path = %path.display(), "loaded manifest");
        Ok(manifest)
    }

    /// Save the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Resolve file names into items whose references are `base/<name>`.
    #[must_use]
    pub fn resolve(&self, base: &str) -> Vec<Item> {
        let base = base.trim_end_matches('/');
        self.files
            .iter()
            .map(|name| {
                if base.is_empty() {
                    Item::url(name.clone())
                } else {
                    Item::url(format!("{base}/{name}"))
                }
            })
            .collect()
    }

    /// Number of files listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the manifest lists no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn files_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

fn has_image_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Numeric-aware, case-insensitive comparison of file names.
///
/// Runs of ASCII digits compare by value, so `img2.png` sorts before
/// `img10.png`. Ties fall back to a plain byte comparison.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_digits = take_digits(&mut left);
                let r_digits = take_digits(&mut right);
                let l_trimmed = l_digits.trim_start_matches('0');
                let r_trimmed = r_digits.trim_start_matches('0');
                let ord = l_trimmed
                    .len()
                    .cmp(&r_trimmed.len())
                    .then_with(|| l_trimmed.cmp(r_trimmed));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}
