//! Editable edge graph
//!
//! Level geometry is an array of nodes ("edges"). Each node stores one vertex and
//! links to its previous/next neighbour, so node `i` together with its successor
//! describes the directed segment `i -> next`. Nodes form closed loops or open
//! chains (a `None` link marks a chain end).
//!
//! Indices are handles into the backing array and are invalidated by any
//! structural change (`cut`, `delete_vertices`, `add_loop`); `generation()` is
//! bumped on each of those so holders can tell.

use crate::math::{edge_normal, Vec2};

/// Per-node flag bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags(u8);

impl EdgeFlags {
    /// The segment from this node to its successor is selected
    pub const SELECTED: EdgeFlags = EdgeFlags(1 << 0);
    /// This node's vertex is selected
    pub const VERTEX_SELECTED: EdgeFlags = EdgeFlags(1 << 1);
    /// Visited by the current build pass
    pub const BUILT: EdgeFlags = EdgeFlags(1 << 2);

    pub fn contains(self, other: EdgeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: EdgeFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: EdgeFlags) {
        self.0 &= !other.0;
    }
}

/// One node of the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub vertex: Vec2,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub flipped_normal: bool,
    pub flags: EdgeFlags,
}

impl Edge {
    pub fn new(vertex: Vec2) -> Self {
        Self {
            vertex,
            previous: None,
            next: None,
            flipped_normal: false,
            flags: EdgeFlags::default(),
        }
    }
}

/// Link integrity violation found by `EdgeGraph::check_links`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("edge {index} links to out-of-range index {link}")]
    OutOfRange { index: usize, link: usize },
    #[error("edge {index} and edge {link} do not link back to each other")]
    Asymmetric { index: usize, link: usize },
}

/// Array-backed doubly linked edge graph
#[derive(Debug, Clone, Default)]
pub struct EdgeGraph {
    edges: Vec<Edge>,
    generation: u64,
}

impl EdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw nodes (from a file). Links are checked before the graph is returned.
    pub fn from_edges(edges: Vec<Edge>) -> Result<Self, LinkError> {
        let graph = Self { edges, generation: 0 };
        graph.check_links()?;
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Edge> {
        self.edges.get_mut(index)
    }

    /// Structural change counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append a closed loop through `vertices` in order. Returns the base index.
    pub fn add_loop(&mut self, vertices: &[Vec2]) -> usize {
        let base = self.edges.len();
        let n = vertices.len();
        for (i, &vertex) in vertices.iter().enumerate() {
            self.edges.push(Edge {
                previous: Some(base + (i + n - 1) % n),
                next: Some(base + (i + 1) % n),
                ..Edge::new(vertex)
            });
        }
        self.generation += 1;
        base
    }

    /// Append a 2x2 quad loop centered at `origin` (counter-clockwise)
    pub fn add_quad(&mut self, origin: Vec2) -> usize {
        self.add_loop(&[
            origin + Vec2::new(-1.0, -1.0),
            origin + Vec2::new(1.0, -1.0),
            origin + Vec2::new(1.0, 1.0),
            origin + Vec2::new(-1.0, 1.0),
        ])
    }

    pub fn flip_normal(&mut self, index: usize) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.flipped_normal = !edge.flipped_normal;
        }
    }

    /// Segment from node `index` to its successor, if it has one
    pub fn segment(&self, index: usize) -> Option<(Vec2, Vec2)> {
        let edge = self.edges.get(index)?;
        let next = self.edges.get(edge.next?)?;
        Some((edge.vertex, next.vertex))
    }

    /// Outward normal of the segment starting at `index`
    pub fn normal(&self, index: usize) -> Option<Vec2> {
        let (v0, v1) = self.segment(index)?;
        Some(edge_normal(v0, v1, self.edges[index].flipped_normal))
    }

    /// Split the segment `index -> next` at `point`.
    ///
    /// The new node inherits the flip state, is marked selected, and its index is
    /// returned. Open ends cannot be cut.
    pub fn cut(&mut self, index: usize, point: Vec2) -> Option<usize> {
        let edge = *self.edges.get(index)?;
        let next = edge.next?;
        let new_index = self.edges.len();

        let mut inserted = Edge {
            previous: Some(index),
            next: Some(next),
            flipped_normal: edge.flipped_normal,
            ..Edge::new(point)
        };
        inserted.flags.insert(EdgeFlags::SELECTED);
        self.edges.push(inserted);

        self.edges[index].next = Some(new_index);
        self.edges[next].previous = Some(new_index);
        self.generation += 1;
        Some(new_index)
    }

    /// Break the segment `index -> next`, opening the loop or splitting the chain
    pub fn unlink_segment(&mut self, index: usize) {
        let Some(next) = self.edges.get(index).and_then(|e| e.next) else {
            return;
        };
        self.edges[index].next = None;
        self.edges[next].previous = None;
        self.generation += 1;
    }

    /// Remove a set of vertices.
    ///
    /// Phase one unlinks every target while all slots are still in place. Phase
    /// two compacts the array in strictly descending index order, swapping the
    /// tail into each hole and re-patching the moved node's neighbours.
    pub fn delete_vertices(&mut self, indices: &[usize]) {
        let mut pending: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.edges.len())
            .collect();
        if pending.is_empty() {
            return;
        }
        pending.sort_unstable_by(|a, b| b.cmp(a));
        pending.dedup();

        for &index in &pending {
            self.unlink_vertex(index);
        }

        // Every pending index above `hole` is gone by the time we reach it, so the
        // tail is either `hole` itself or a live node.
        for &hole in &pending {
            let last = self.edges.len() - 1;
            if hole == last {
                self.edges.pop();
                continue;
            }
            self.edges.swap_remove(hole);
            self.repoint(last, hole);
        }
        self.generation += 1;
    }

    /// Detach a single vertex from its neighbours, leaving the slot isolated
    fn unlink_vertex(&mut self, index: usize) {
        let Edge { previous, next, .. } = self.edges[index];
        match (previous, next) {
            (Some(p), Some(n)) if p == n => {
                // Two-node loop collapses into one isolated vertex
                self.edges[p].next = None;
                self.edges[p].previous = None;
            }
            (Some(p), Some(n)) if self.edges[n].next == Some(p) => {
                // Three-node loop: keep the n -> p segment as a dangling edge
                self.edges[p].next = None;
                self.edges[n].previous = None;
            }
            (Some(p), Some(n)) => {
                self.edges[p].next = Some(n);
                self.edges[n].previous = Some(p);
            }
            (Some(p), None) => self.edges[p].next = None,
            (None, Some(n)) => self.edges[n].previous = None,
            (None, None) => {}
        }
        self.edges[index].previous = None;
        self.edges[index].next = None;
    }

    /// A node that used to live at `from` now lives at `to`; fix its neighbours
    fn repoint(&mut self, from: usize, to: usize) {
        let Edge { previous, next, .. } = self.edges[to];
        match previous {
            Some(p) if p == from => self.edges[to].previous = Some(to),
            Some(p) => self.edges[p].next = Some(to),
            None => {}
        }
        match next {
            Some(n) if n == from => self.edges[to].next = Some(to),
            Some(n) => self.edges[n].previous = Some(to),
            None => {}
        }
    }

    /// Node indices reached by walking `next` from `start`, including `start`.
    /// Stops at a chain end or on returning to `start`.
    pub fn walk(&self, start: usize) -> Vec<usize> {
        let mut visited = Vec::new();
        if start >= self.edges.len() {
            return visited;
        }
        let mut current = start;
        loop {
            visited.push(current);
            match self.edges[current].next {
                Some(next) if next != start && visited.len() <= self.edges.len() => current = next,
                _ => break,
            }
        }
        visited
    }

    /// True if walking forward from `start` returns to it
    pub fn is_closed_loop(&self, start: usize) -> bool {
        let walked = self.walk(start);
        walked
            .last()
            .and_then(|&last| self.edges[last].next)
            .is_some_and(|next| next == start)
    }

    /// First node of the open chain containing `index` (or `index` itself for loops)
    pub fn chain_head(&self, index: usize) -> usize {
        let mut current = index;
        for _ in 0..self.edges.len() {
            match self.edges[current].previous {
                Some(p) if p != index => current = p,
                Some(_) => return index,
                None => return current,
            }
        }
        current
    }

    /// Clear a flag on every node
    pub fn clear_flag(&mut self, flag: EdgeFlags) {
        for edge in &mut self.edges {
            edge.flags.remove(flag);
        }
    }

    /// Verify every link is in range and mirrored by its neighbour
    pub fn check_links(&self) -> Result<(), LinkError> {
        let len = self.edges.len();
        for (index, edge) in self.edges.iter().enumerate() {
            if let Some(next) = edge.next {
                if next >= len {
                    return Err(LinkError::OutOfRange { index, link: next });
                }
                if self.edges[next].previous != Some(index) {
                    return Err(LinkError::Asymmetric { index, link: next });
                }
            }
            if let Some(previous) = edge.previous {
                if previous >= len {
                    return Err(LinkError::OutOfRange { index, link: previous });
                }
                if self.edges[previous].next != Some(index) {
                    return Err(LinkError::Asymmetric { index, link: previous });
                }
            }
        }
        Ok(())
    }
}
