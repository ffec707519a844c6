//! Annotation and frame rendering
//!
//! This module contains:
//! - Geometry calculations shared between preview and export rendering
//! - Step rendering onto RGBA images using tiny-skia
//! - Glyph rendering for the text tool
//! - The full-frame composer for the interactive session

pub mod compose;
pub mod geometry;
pub mod image;
pub mod text;
