//! World module - editable 2D level data
//!
//! - `edges`: the editable polygon graph
//! - `entity`: placeable oriented-box entities
//! - `level`: the editable `.editor` file format
//! - `bake`: the build step and the runtime `.level` format

mod bake;
mod edges;
mod entity;
mod level;

pub use bake::*;
pub use edges::*;
pub use entity::*;
pub use level::*;

/// Default entity capacity of a level
pub const MAX_ENTITIES: usize = 16;

/// Everything a level file holds: geometry graph plus entities
#[derive(Debug, Clone)]
pub struct EditLevel {
    pub edges: EdgeGraph,
    pub entities: EntityStore,
}

impl EditLevel {
    pub fn new(entity_capacity: usize) -> Self {
        Self {
            edges: EdgeGraph::new(),
            entities: EntityStore::with_capacity(entity_capacity),
        }
    }
}

impl Default for EditLevel {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}
