//! Display collaborator contract.
//!
//! Whoever renders the current item reports back whether it worked. The
//! session records the outcome as a [`DisplayStatus`] but never lets a
//! failure block classification.
//!
//! [`probe`] is a lightweight renderer stand-in: it reads an item's bytes
//! and sniffs the header to confirm it is a recognisable image.

use std::fs;
use std::path::Path;

use crate::blob::BlobRegistry;
use crate::error::{Error, Result};
use crate::item::{Item, ItemRef};

/// Rendering state of the current item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayStatus {
    /// Waiting for the display collaborator.
    #[default]
    Loading,
    /// Rendered successfully.
    Loaded(ImageInfo),
    /// Rendering failed; the message is shown to the operator.
    Failed(String),
}

impl DisplayStatus {
    /// Whether the item failed to render.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Detected format.
    pub format: &'static str,
    /// Width in pixels, 0 when the header does not say.
    pub width: u32,
    /// Height in pixels, 0 when the header does not say.
    pub height: u32,
}

/// Load an item's bytes and check that they look like an image.
pub fn probe(item: &Item, blobs: &BlobRegistry) -> Result<ImageInfo> {
    let reference = item.reference().to_string();
    let display_error = |reason: String| Error::Display {
        reference: reference.clone(),
        reason,
    };

    let data = match item.reference() {
        ItemRef::Blob(handle) => blobs
            .resolve(handle)
            .ok_or_else(|| display_error("Uploaded file was released".to_string()))?
            .to_vec(),
        ItemRef::Url(url) => {
            if url.contains("://") {
                return Err(display_error("Remote references are not supported".to_string()));
            }
            fs::read(Path::new(url)).map_err(|e| display_error(e.to_string()))?
        }
    };

    probe_bytes(&data).ok_or_else(|| display_error("Unrecognised image data".to_string()))
}

/// Identify an image from its leading bytes.
#[must_use]
pub fn probe_bytes(data: &[u8]) -> Option<ImageInfo> {
    // PNG: check signature and read IHDR
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        if data.len() >= 24 {
            let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
            let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
            return Some(info("png", width, height));
        }
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        let (width, height) = parse_jpeg_dimensions(data).unwrap_or((0, 0));
        return Some(info("jpeg", width, height));
    }

    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        let (width, height) = parse_webp_dimensions(data).unwrap_or((0, 0));
        return Some(info("webp", width, height));
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        if data.len() >= 10 {
            let width = u32::from(u16::from_le_bytes([data[6], data[7]]));
            let height = u32::from(u16::from_le_bytes([data[8], data[9]]));
            return Some(info("gif", width, height));
        }
        return None;
    }

    if data.starts_with(b"BM") && data.len() >= 26 {
        let width = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
        let height = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
        return Some(info("bmp", width.unsigned_abs(), height.unsigned_abs()));
    }

    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some(info("tiff", 0, 0));
    }

    if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some(info("ico", 0, 0));
    }

    if data.len() >= 12
        && &data[4..8] == b"ftyp"
        && (&data[8..12] == b"avif" || &data[8..12] == b"avis")
    {
        return Some(info("avif", 0, 0));
    }

    let head = String::from_utf8_lossy(&data[..data.len().min(512)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some(info("svg", 0, 0));
    }

    None
}

fn info(format: &'static str, width: u32, height: u32) -> ImageInfo {
    ImageInfo { format, width, height }
}

fn parse_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF markers (Start Of Frame)
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            let height = u32::from(data[i + 5]) << 8 | u32::from(data[i + 6]);
            let width = u32::from(data[i + 7]) << 8 | u32::from(data[i + 8]);
            return Some((width, height));
        }

        let length = u16::from(data[i + 2]) << 8 | u16::from(data[i + 3]);
        i += 2 + length as usize;
    }

    None
}

fn parse_webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 16 {
        return None;
    }

    match &data[12..16] {
        b"VP8 " if data.len() >= 30 => {
            let width = u32::from(data[26]) | (u32::from(data[27] & 0x3F) << 8);
            let height = u32::from(data[28]) | (u32::from(data[29] & 0x3F) << 8);
            Some((width, height))
        }
        b"VP8L" if data.len() >= 25 => {
            let bits = u32::from_le_bytes([data[21], data[22], data[23], data[24]]);
            let width = (bits & 0x3FFF) + 1;
            let height = ((bits >> 14) & 0x3FFF) + 1;
            Some((width, height))
        }
        b"VP8X" if data.len() >= 30 => {
            let width = u32::from_le_bytes([data[24], data[25], data[26], 0]);
            let height = u32::from_le_bytes([data[27], data[28], data[29], 0]);
            Some((width + 1, height + 1))
        }
        _ => None,
    }
}
