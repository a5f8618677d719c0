//! # image-sorter
//!
//! Manual like/dislike review of an ordered list of images.
//!
//! An operator walks through the images one at a time, accepting or
//! rejecting each, with single-step undo. When the last image is decided
//! the session produces a [`SessionReport`] that an [`Exporter`] turns into
//! result files.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use image_sorter::{DirectoryExporter, Manifest, ReviewSession, Transition};
//!
//! let items = Manifest::load("./renamed_images/manifest.json")?.resolve("./renamed_images");
//! let mut session = ReviewSession::builder().items(items).build()?;
//!
//! while let Some(item) = session.current_item() {
//!     println!("reviewing {}", item.name());
//!     if let Transition::Completed(_) = session.like() {
//!         session.export_with(&DirectoryExporter::new("./results"))?;
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`item`]: Review items and outcomes
//! - [`blob`]: Uploaded image bytes and their handles
//! - [`manifest`]: Manifest generation and item resolution
//! - [`session`]: The review session engine
//! - [`report`]: The exportable session report
//! - [`activity`]: Operator-facing activity log
//! - [`display`]: Display status and image header probing
//! - [`input`]: Key bindings for review actions
//! - [`export`]: Writing reports to disk
//! - [`config`]: Session and export configuration

pub mod activity;
pub mod blob;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod input;
pub mod item;
pub mod manifest;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use activity::{ActivityEntry, ActivityLog};
pub use blob::{BlobHandle, BlobRegistry};
pub use config::{SorterConfig, SorterConfigBuilder};
pub use display::{DisplayStatus, ImageInfo};
pub use error::{Error, Result};
pub use export::{DirectoryExporter, ExportBundle, Exporter};
pub use input::{Action, Key, KeyMap};
pub use item::{Item, ItemRef, Outcome};
pub use manifest::Manifest;
pub use report::SessionReport;
pub use session::{Decision, Progress, ReviewSession, SessionBuilder, SessionState, Transition};
