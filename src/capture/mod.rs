//! Screen capture and export
//!
//! This module consolidates:
//! - Canvas stitching from per-display captures (image.rs)
//! - Selection export and file encoding (export.rs)
//! - Desktop backends for the collaborator ports (backend.rs)

pub mod backend;
pub mod export;
pub mod image;

pub use export::{ImageKind, SaveTarget};
pub use image::{CanvasImage, Display, stitch};
