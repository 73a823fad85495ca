//! Move Drag Tracker
//!
//! Translates selected vertices and entities by the snapped cursor offset.
//! Vertex indices are only trusted while the graph generation is unchanged.

use crate::math::Vec2;
use crate::world::EditLevel;

#[derive(Debug, Clone)]
pub struct MoveTracker {
    /// Snapped click origin
    pub start: Vec2,
    /// Snapped cursor
    pub current: Vec2,
    /// Initial vertex positions (edge index, position)
    pub initial_vertices: Vec<(usize, Vec2)>,
    /// Initial entity centers (entity index, center)
    pub initial_entities: Vec<(usize, Vec2)>,
    /// Graph generation the vertex indices belong to
    pub generation: u64,
}

impl MoveTracker {
    /// Snapshot the current positions of `vertices` and `entities`
    pub fn new(start: Vec2, level: &EditLevel, vertices: &[usize], entities: &[usize]) -> Self {
        let initial_vertices = vertices
            .iter()
            .filter_map(|&i| level.edges.get(i).map(|e| (i, e.vertex)))
            .collect();
        let initial_entities = entities
            .iter()
            .filter_map(|&i| level.entities.get(i).map(|e| (i, e.bound_box.center)))
            .collect();
        Self {
            start,
            current: start,
            initial_vertices,
            initial_entities,
            generation: level.edges.generation(),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.current - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.initial_vertices.is_empty() && self.initial_entities.is_empty()
    }

    /// Preview positions of the moved vertices
    pub fn compute_new_positions(&self) -> Vec<(usize, Vec2)> {
        let offset = self.offset();
        self.initial_vertices
            .iter()
            .map(|&(idx, pos)| (idx, pos + offset))
            .collect()
    }

    /// Apply the offset. Returns false when nothing moved or the graph changed
    /// structure since the drag started.
    pub fn commit(&self, level: &mut EditLevel) -> bool {
        let offset = self.offset();
        if offset == Vec2::ZERO || self.is_empty() {
            return false;
        }
        if level.edges.generation() != self.generation {
            return false;
        }
        for (idx, pos) in self.compute_new_positions() {
            if let Some(edge) = level.edges.get_mut(idx) {
                edge.vertex = pos;
            }
        }
        for &(idx, center) in &self.initial_entities {
            if let Some(entity) = level.entities.get_mut(idx) {
                entity.bound_box.center = center + offset;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Entity, EntityKind};

    #[test]
    fn test_commit_moves_vertices_and_entities() {
        let mut level = EditLevel::new(2);
        level.edges.add_quad(Vec2::ZERO);
        level.entities.add(Entity::placed(EntityKind::Player, Vec2::new(3.0, 3.0)));

        let mut tracker = MoveTracker::new(Vec2::new(1.0, 1.0), &level, &[2, 3], &[0]);
        tracker.current = Vec2::new(2.0, 3.0);
        assert!(tracker.commit(&mut level));

        assert_eq!(level.edges.get(2).unwrap().vertex, Vec2::new(2.0, 3.0));
        assert_eq!(level.edges.get(3).unwrap().vertex, Vec2::new(0.0, 3.0));
        assert_eq!(level.edges.get(0).unwrap().vertex, Vec2::new(-1.0, -1.0));
        assert_eq!(level.entities.get(0).unwrap().bound_box.center, Vec2::new(4.0, 5.0));
    }

    #[test]
    fn test_zero_offset_is_noop() {
        let mut level = EditLevel::new(2);
        level.edges.add_quad(Vec2::ZERO);
        let tracker = MoveTracker::new(Vec2::ZERO, &level, &[0], &[]);
        assert!(!tracker.commit(&mut level));
    }

    #[test]
    fn test_stale_indices_not_committed() {
        let mut level = EditLevel::new(2);
        level.edges.add_quad(Vec2::ZERO);
        let mut tracker = MoveTracker::new(Vec2::ZERO, &level, &[0], &[]);
        tracker.current = Vec2::new(1.0, 0.0);

        level.edges.delete_vertices(&[0]);
        let before: Vec<Vec2> = level.edges.edges().iter().map(|e| e.vertex).collect();
        assert!(!tracker.commit(&mut level));
        let after: Vec<Vec2> = level.edges.edges().iter().map(|e| e.vertex).collect();
        assert_eq!(before, after);
    }
}
