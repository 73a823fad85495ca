//! Placeable entities
//!
//! Entities are oriented boxes with a gameplay type. They carry no references to
//! each other, so removal is a plain unordered swap.

use crate::math::{Obb, Vec2};

/// Gameplay type of an entity. The discriminant is the on-disk byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityKind {
    Player = 0,
    PropPhysics = 1,
    RayEmitter = 2,
    RayHarvester = 3,
    Mirror = 4,
    Glass = 5,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::PropPhysics,
        EntityKind::RayEmitter,
        EntityKind::RayHarvester,
        EntityKind::Mirror,
        EntityKind::Glass,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Name used by the placement command and the context menu
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::PropPhysics => "prop_physics",
            EntityKind::RayEmitter => "ray_emitter",
            EntityKind::RayHarvester => "ray_harvester",
            EntityKind::Mirror => "mirror",
            EntityKind::Glass => "glass",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Box size used when placing a fresh entity of this kind
    pub fn default_dimensions(self) -> Vec2 {
        match self {
            EntityKind::Player => Vec2::new(0.8, 1.4),
            EntityKind::Mirror | EntityKind::Glass => Vec2::new(0.2, 2.0),
            _ => Vec2::new(1.0, 1.0),
        }
    }
}

/// Per-entity flag bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityFlags(u8);

impl EntityFlags {
    pub const SELECTED: EntityFlags = EntityFlags(1 << 0);
    /// Tombstone, swept by `EntityStore::sweep_removed`
    pub const REMOVED: EntityFlags = EntityFlags(1 << 1);

    pub fn contains(self, other: EntityFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: EntityFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: EntityFlags) {
        self.0 &= !other.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub bound_box: Obb,
    pub flags: EntityFlags,
}

impl Entity {
    pub fn new(kind: EntityKind, bound_box: Obb) -> Self {
        Self {
            kind,
            bound_box,
            flags: EntityFlags::default(),
        }
    }

    /// Entity of `kind` at `center` with the kind's default size
    pub fn placed(kind: EntityKind, center: Vec2) -> Self {
        let dim = kind.default_dimensions();
        Self::new(kind, Obb::new(center, dim.x, dim.y, 0.0))
    }
}

/// Fixed-capacity entity array
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    capacity: usize,
}

impl EntityStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.capacity
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    /// Add an entity, returning its index, or `None` when the store is full
    pub fn add(&mut self, entity: Entity) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.entities.push(entity);
        Some(self.entities.len() - 1)
    }

    /// Unordered removal: the last entity takes the removed one's slot
    pub fn remove(&mut self, index: usize) -> Option<Entity> {
        if index >= self.entities.len() {
            return None;
        }
        Some(self.entities.swap_remove(index))
    }

    /// Drop every entity flagged `REMOVED`. Returns how many were dropped.
    pub fn sweep_removed(&mut self) -> usize {
        let before = self.entities.len();
        let mut i = 0;
        while i < self.entities.len() {
            if self.entities[i].flags.contains(EntityFlags::REMOVED) {
                self.entities.swap_remove(i);
            } else {
                i += 1;
            }
        }
        before - self.entities.len()
    }

    /// First entity whose box contains `p`
    pub fn hit_test(&self, p: Vec2) -> Option<usize> {
        self.entities.iter().position(|e| e.bound_box.contains(p))
    }
}
