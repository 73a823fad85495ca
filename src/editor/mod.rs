//! Level Editor
//!
//! Interactive editing of the level graph and entities:
//! - Selection of vertices, edges and entities (click, chain, box)
//! - Select / Cut / Rotate interaction modes
//! - Named commands for saving, loading and baking

mod actions;
mod camera;
mod commands;
mod draw;
pub mod drag;
mod input;
mod params;
mod selection;
mod state;

pub use actions::*;
pub use camera::*;
pub use commands::*;
pub use draw::*;
pub use input::*;
pub use params::*;
pub use selection::*;
pub use state::*;
