//! 2D level editor
//!
//! Editable polygon graph plus placeable entities, an interactive
//! select/cut/rotate editor on top of it, and a build step that bakes the
//! graph into collision polygons for the runtime.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod editor;
pub mod math;
pub mod storage;
pub mod world;
