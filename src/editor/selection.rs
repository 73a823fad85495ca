//! Selection manager
//!
//! Holds the list of selected graph/entity references and mirrors every entry
//! into the matching flag on the level (`VERTEX_SELECTED`, `SELECTED`). All
//! changes go through this type so the list and the flags never disagree.

use crate::math::{point_segment_distance, Aabb, Vec2};
use crate::world::{EdgeFlags, EditLevel, EntityFlags};

/// A selected element. Indices are handles into the level arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selected {
    Vertex(usize),
    /// The segment from this node to its successor
    Edge(usize),
    Entity(usize),
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    entries: Vec<Selected>,
}

fn set_flag(level: &mut EditLevel, item: Selected, on: bool) -> bool {
    match item {
        Selected::Vertex(i) | Selected::Edge(i) => {
            let flag = if matches!(item, Selected::Vertex(_)) {
                EdgeFlags::VERTEX_SELECTED
            } else {
                EdgeFlags::SELECTED
            };
            let Some(edge) = level.edges.get_mut(i) else {
                return false;
            };
            if on {
                edge.flags.insert(flag);
            } else {
                edge.flags.remove(flag);
            }
            true
        }
        Selected::Entity(i) => {
            let Some(entity) = level.entities.get_mut(i) else {
                return false;
            };
            if on {
                entity.flags.insert(EntityFlags::SELECTED);
            } else {
                entity.flags.remove(EntityFlags::SELECTED);
            }
            true
        }
    }
}

fn has_flag(level: &EditLevel, item: Selected) -> bool {
    match item {
        Selected::Vertex(i) => level
            .edges
            .get(i)
            .is_some_and(|e| e.flags.contains(EdgeFlags::VERTEX_SELECTED)),
        Selected::Edge(i) => level
            .edges
            .get(i)
            .is_some_and(|e| e.flags.contains(EdgeFlags::SELECTED)),
        Selected::Entity(i) => level
            .entities
            .get(i)
            .is_some_and(|e| e.flags.contains(EntityFlags::SELECTED)),
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Selected] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: Selected) -> bool {
        self.entries.contains(&item)
    }

    /// Add `item` and set its flag. Returns false if it was already selected or
    /// the index is out of range.
    pub fn select(&mut self, level: &mut EditLevel, item: Selected) -> bool {
        if self.contains(item) || !set_flag(level, item, true) {
            return false;
        }
        self.entries.push(item);
        true
    }

    /// Clear every entry's flag and empty the list
    pub fn clear(&mut self, level: &mut EditLevel) {
        for item in self.entries.drain(..) {
            set_flag(level, item, false);
        }
    }

    /// Drop the list without touching flags. Only for use after the level
    /// itself was replaced or its flags reset.
    pub fn forget(&mut self) {
        self.entries.clear();
    }

    fn retain(&mut self, level: &mut EditLevel, keep: impl Fn(&Selected) -> bool) {
        let (kept, dropped): (Vec<Selected>, Vec<Selected>) = self.entries.drain(..).partition(|e| keep(e));
        for item in dropped {
            set_flag(level, item, false);
        }
        self.entries = kept;
    }

    /// Keep only edge entries
    pub fn retain_edges(&mut self, level: &mut EditLevel) {
        self.retain(level, |e| matches!(e, Selected::Edge(_)));
    }

    /// Keep only entity entries
    pub fn retain_entities(&mut self, level: &mut EditLevel) {
        self.retain(level, |e| matches!(e, Selected::Entity(_)));
    }

    pub fn edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Selected::Edge(i) => Some(*i),
            _ => None,
        })
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Selected::Vertex(i) => Some(*i),
            _ => None,
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Selected::Entity(i) => Some(*i),
            _ => None,
        })
    }

    /// Vertex indices touched by the selection: selected vertices plus both
    /// endpoints of every selected edge, without duplicates, in first-seen order
    pub fn affected_vertices(&self, level: &EditLevel) -> Vec<usize> {
        let mut out = Vec::new();
        let mut push = |i: usize| {
            if !out.contains(&i) {
                out.push(i);
            }
        };
        for item in &self.entries {
            match *item {
                Selected::Vertex(i) => push(i),
                Selected::Edge(i) => {
                    push(i);
                    if let Some(next) = level.edges.get(i).and_then(|e| e.next) {
                        push(next);
                    }
                }
                Selected::Entity(_) => {}
            }
        }
        out
    }

    /// Select forward along the chain from `start`: each vertex visited and the
    /// edge to its successor. Stops on returning to `start` or at a chain end.
    pub fn chain_select(&mut self, level: &mut EditLevel, start: usize) {
        for index in level.edges.walk(start) {
            self.select(level, Selected::Vertex(index));
            if level.edges.edges()[index].next.is_some() {
                self.select(level, Selected::Edge(index));
            }
        }
    }

    /// Select every vertex inside `area`, every edge whose endpoints are both
    /// inside, and every entity whose center is inside
    pub fn box_select(&mut self, level: &mut EditLevel, area: Aabb) {
        for i in 0..level.edges.len() {
            let edge = level.edges.edges()[i];
            if !area.contains(edge.vertex) {
                continue;
            }
            self.select(level, Selected::Vertex(i));
            let next_inside = edge
                .next
                .and_then(|n| level.edges.get(n))
                .is_some_and(|n| area.contains(n.vertex));
            if next_inside {
                self.select(level, Selected::Edge(i));
            }
        }
        for i in 0..level.entities.len() {
            if area.contains(level.entities.entities()[i].bound_box.center) {
                self.select(level, Selected::Entity(i));
            }
        }
    }

    /// True when list and flags agree and the list has no duplicates
    pub fn is_consistent(&self, level: &EditLevel) -> bool {
        for (i, item) in self.entries.iter().enumerate() {
            if self.entries[..i].contains(item) || !has_flag(level, *item) {
                return false;
            }
        }
        let flagged_edges = level.edges.edges().iter().enumerate().flat_map(|(i, e)| {
            let vertex = e.flags.contains(EdgeFlags::VERTEX_SELECTED).then_some(Selected::Vertex(i));
            let edge = e.flags.contains(EdgeFlags::SELECTED).then_some(Selected::Edge(i));
            vertex.into_iter().chain(edge)
        });
        let flagged_entities = level
            .entities
            .entities()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.flags.contains(EntityFlags::SELECTED))
            .map(|(i, _)| Selected::Entity(i));
        flagged_edges
            .chain(flagged_entities)
            .all(|item| self.contains(item))
    }
}

/// Element under `p`: vertices first, then edges, then entities.
/// Vertices and edges hit within `radius`; the first in array order wins.
pub fn hit_test(level: &EditLevel, p: Vec2, radius: f32) -> Option<Selected> {
    let edges = level.edges.edges();
    if let Some(i) = edges.iter().position(|e| e.vertex.distance(p) < radius) {
        return Some(Selected::Vertex(i));
    }
    let edge_hit = (0..edges.len()).find(|&i| {
        level
            .edges
            .segment(i)
            .is_some_and(|(a, b)| point_segment_distance(p, a, b) < radius)
    });
    if let Some(i) = edge_hit {
        return Some(Selected::Edge(i));
    }
    level.entities.hit_test(p).map(Selected::Entity)
}
