//! Rotate Tracker
//!
//! Rotates selected entities about the centroid of their centers. The angle
//! between the reference vector (anchor -> cursor at mode entry or last commit)
//! and the current cursor vector is snapped to `ROTATION_SNAP` steps.

use crate::math::{signed_angle, snap_angle, Vec2, ROTATION_SNAP};
use crate::world::EditLevel;

#[derive(Debug, Clone)]
pub struct RotateTracker {
    /// Centroid of the rotated entities' centers
    pub anchor: Vec2,
    /// Cursor position the angle is measured from
    pub reference: Vec2,
    /// Snapped angle offset in radians
    pub offset: f32,
    pub entity_indices: Vec<usize>,
}

impl RotateTracker {
    /// Returns `None` when none of `entities` exist
    pub fn new(level: &EditLevel, entities: Vec<usize>, mouse: Vec2) -> Option<Self> {
        let centers: Vec<Vec2> = entities
            .iter()
            .filter_map(|&i| level.entities.get(i).map(|e| e.bound_box.center))
            .collect();
        if centers.is_empty() {
            return None;
        }
        let anchor = centers.iter().copied().sum::<Vec2>() / centers.len() as f32;
        Some(Self {
            anchor,
            reference: mouse,
            offset: 0.0,
            entity_indices: entities,
        })
    }

    pub fn update(&mut self, mouse: Vec2) {
        let angle = signed_angle(self.reference - self.anchor, mouse - self.anchor);
        self.offset = snap_angle(angle, ROTATION_SNAP);
    }

    /// Add the offset to every entity's rotation and restart from `mouse`
    pub fn commit(&mut self, level: &mut EditLevel, mouse: Vec2) -> bool {
        let offset = self.offset;
        self.reference = mouse;
        self.offset = 0.0;
        if offset == 0.0 {
            return false;
        }
        for &i in &self.entity_indices {
            if let Some(entity) = level.entities.get_mut(i) {
                entity.bound_box.rotation += offset;
            }
        }
        true
    }
}
