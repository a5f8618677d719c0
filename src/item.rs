//! Review items and display-name derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blob::BlobHandle;

/// Suffix some asset pipelines append to image URLs.
const TRANSPORT_SUFFIX: &str = "?url";

/// Reference to the content of one image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// URL or filesystem path.
    Url(String),
    /// Uploaded in-memory bytes owned by a [`crate::blob::BlobRegistry`].
    Blob(BlobHandle),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Blob(handle) => write!(f, "{handle}"),
        }
    }
}

/// One image to classify.
///
/// Identity is positional within a session; the name is only for display
/// and may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    reference: ItemRef,
    name: String,
}

impl Item {
    /// Create an item from a URL or path string.
    #[must_use]
    pub fn url(reference: impl Into<String>) -> Self {
        Self::new(ItemRef::Url(reference.into()))
    }

    /// Create an item backed by an uploaded blob.
    #[must_use]
    pub fn blob(handle: BlobHandle) -> Self {
        Self::new(ItemRef::Blob(handle))
    }

    /// Create an item, deriving its display name from the reference.
    #[must_use]
    pub fn new(reference: ItemRef) -> Self {
        let name = display_name(&reference.to_string());
        Self { reference, name }
    }

    /// The underlying reference.
    #[must_use]
    pub fn reference(&self) -> &ItemRef {
        &self.reference
    }

    /// Display name: last path segment without the transport suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the item is backed by uploaded bytes.
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        matches!(self.reference, ItemRef::Blob(_))
    }
}

/// Derive the display name of a reference string.
///
/// Takes everything after the last `/` and removes a `?url` suffix.
#[must_use]
pub fn display_name(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    last.replacen(TRANSPORT_SUFFIX, "", 1)
}

/// Outcome of a single decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Operator accepted the image.
    Liked,
    /// Operator rejected the image.
    Disliked,
}

impl Outcome {
    /// Short code used in CSV output.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Disliked => "disliked",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_path() {
        assert_eq!(display_name("/renamed_images/cat_01.png"), "cat_01.png");
        assert_eq!(display_name("plain.jpg"), "plain.jpg");
    }

    #[test]
    fn test_display_name_strips_transport_suffix() {
        assert_eq!(display_name("/assets/dog.svg?url"), "dog.svg");
    }

    #[test]
    fn test_display_name_trailing_slash() {
        assert_eq!(display_name("/images/"), "");
    }

    #[test]
    fn test_item_url() {
        let item = Item::url("/renamed_images/a.png");
        assert_eq!(item.name(), "a.png");
        assert!(!item.is_uploaded());
        assert_eq!(item.reference().to_string(), "/renamed_images/a.png");
    }

    #[test]
    fn test_outcome_code() {
        assert_eq!(Outcome::Liked.code(), "liked");
        assert_eq!(Outcome::Disliked.to_string(), "disliked");
    }
}
