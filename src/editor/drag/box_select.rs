//! Box Select Drag Tracker
//!
//! Rectangular selection in world space, corners snapped to the grid.

use crate::math::{Aabb, Vec2};

#[derive(Debug, Clone)]
pub struct BoxSelectTracker {
    /// Corner where the drag started
    pub start: Vec2,
    /// Opposite corner
    pub current: Vec2,
}

impl BoxSelectTracker {
    pub fn new(start: Vec2) -> Self {
        Self { start, current: start }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_corners(self.start, self.current)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds().contains(p)
    }
}
