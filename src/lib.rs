//! markshot — interactive region screenshot and annotation
//!
//! The library exposes the session core: canvas stitching from per-display
//! captures, the region-selection and annotation state machine, frame
//! composition, and selection export. The desktop surfaces (window,
//! toolbar, style panel, text input) stay outside and talk to the core
//! through `session::SessionEvent`s in and `render::compose::Frame`s out.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod render;
pub mod session;

pub use config::Config;
pub use session::{Session, take_screenshot};
