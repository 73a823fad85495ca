//! Cut Tracker
//!
//! Previews where a cut would land: the candidate edge closest to the cursor and
//! the cursor projected onto it.

use crate::math::{point_segment_distance, project_onto_segment, Vec2};
use crate::world::EdgeGraph;

/// Projected cut point on a candidate edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPreview {
    pub edge: usize,
    pub point: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct CutTracker {
    /// Edges eligible for cutting, fixed at mode entry
    pub candidates: Vec<usize>,
    pub preview: Option<CutPreview>,
}

impl CutTracker {
    pub fn new(candidates: Vec<usize>) -> Self {
        Self {
            candidates,
            preview: None,
        }
    }

    /// Pick the closest candidate to `mouse` and project onto it
    pub fn update(&mut self, graph: &EdgeGraph, mouse: Vec2) {
        self.preview = self
            .candidates
            .iter()
            .filter_map(|&edge| graph.segment(edge).map(|(a, b)| (edge, a, b)))
            .map(|(edge, a, b)| (edge, a, b, point_segment_distance(mouse, a, b)))
            .min_by(|x, y| x.3.total_cmp(&y.3))
            .map(|(edge, a, b, _)| CutPreview {
                edge,
                point: project_onto_segment(mouse, a, b),
            });
    }

    /// Split the previewed edge. The new edge becomes the only candidate.
    pub fn commit(&mut self, graph: &mut EdgeGraph) -> Option<usize> {
        let preview = self.preview.take()?;
        let new_index = graph.cut(preview.edge, preview.point)?;
        self.candidates = vec![new_index];
        Some(new_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_closest_candidate() {
        let mut graph = EdgeGraph::new();
        graph.add_quad(Vec2::ZERO);
        let mut tracker = CutTracker::new(vec![0, 2]);

        tracker.update(&graph, Vec2::new(0.5, 0.75));
        assert_eq!(
            tracker.preview,
            Some(CutPreview {
                edge: 2,
                point: Vec2::new(0.5, 1.0)
            })
        );

        // Beyond the end of the segment the projection clamps
        tracker.update(&graph, Vec2::new(5.0, -1.5));
        assert_eq!(tracker.preview.unwrap().point, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_commit_narrows_candidates() {
        let mut graph = EdgeGraph::new();
        graph.add_quad(Vec2::ZERO);
        let mut tracker = CutTracker::new(vec![0]);
        tracker.update(&graph, Vec2::new(0.0, -1.2));

        let new_index = tracker.commit(&mut graph).unwrap();
        assert_eq!(new_index, 4);
        assert_eq!(tracker.candidates, vec![4]);
        assert_eq!(graph.walk(0), vec![0, 4, 1, 2, 3]);
        assert!(graph.check_links().is_ok());
    }

    #[test]
    fn test_open_end_has_no_preview() {
        let mut graph = EdgeGraph::new();
        graph.add_quad(Vec2::ZERO);
        graph.unlink_segment(1);
        let mut tracker = CutTracker::new(vec![1]);
        tracker.update(&graph, Vec2::ZERO);
        assert_eq!(tracker.preview, None);
        assert_eq!(tracker.commit(&mut graph), None);
    }
}
