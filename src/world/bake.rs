//! Build step: editable graph -> runtime collision polygons (`.level`)
//!
//! Every loop or open chain of the edge graph becomes one polygon. Each polygon
//! entry is a vertex plus the outward normal of the edge leaving it; the last
//! entry of an open chain has a zero normal, telling the collision builder the
//! vertex has no successor.
//!
//! ```text
//! u32 magic ('levl')
//! u32 total_edge_count
//! repeated { u32 polygon_edge_count, polygon_edge_count x { f32 vx, f32 vy, f32 nx, f32 ny } }
//! u32 entity_count
//! entity_count x { u8 type, f32 cx, f32 cy, f32 dim_x, f32 dim_y, f32 rotation }
//! ```

use std::fs;
use std::path::Path;

use tracing::warn;

use super::level::{read_entities, write_entities, write_file, ByteReader, ByteWriter, ENTITY_RECORD_SIZE};
use super::{EditLevel, EdgeFlags, Entity, LevelError};
use crate::math::Vec2;

/// 'levl' in ASCII
pub const LEVEL_FORMAT_MAGIC: u32 = 0x6c65_766c;

/// Entity limit accepted when reading a baked level
pub const MAX_BAKED_ENTITIES: usize = 4096;

const PHYS_EDGE_RECORD_SIZE: usize = 4 * 4;

/// One baked polygon entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysEdge {
    pub vertex: Vec2,
    pub normal: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub edges: Vec<PhysEdge>,
}

impl Polygon {
    /// Open chains end with a zero normal
    pub fn is_open(&self) -> bool {
        self.edges.last().is_some_and(|e| e.normal == Vec2::ZERO)
    }
}

/// Runtime level: collision polygons plus entities
#[derive(Debug, Clone, Default)]
pub struct BakedLevel {
    pub polygons: Vec<Polygon>,
    pub entities: Vec<Entity>,
}

impl BakedLevel {
    pub fn total_edge_count(&self) -> usize {
        self.polygons.iter().map(|p| p.edges.len()).sum()
    }
}

/// Group the edge graph into polygons.
///
/// Uses the `BUILT` flag to visit each node once and clears it on every node
/// before returning. Loops shorter than three nodes and lone vertices are skipped.
pub fn build_level(level: &mut EditLevel) -> BakedLevel {
    let graph = &mut level.edges;
    let mut polygons = Vec::new();

    for i in 0..graph.len() {
        if graph.edges()[i].flags.contains(EdgeFlags::BUILT) {
            continue;
        }

        let start = graph.chain_head(i);
        let run = graph.walk(start);
        for &index in &run {
            if let Some(edge) = graph.get_mut(index) {
                edge.flags.insert(EdgeFlags::BUILT);
            }
        }

        let closed = graph.is_closed_loop(start);
        if !closed {
            warn!("Open chain at edge {} ({} vertices), baking with a terminator.", start, run.len());
        }

        // A zero-length segment would bake a zero normal, which marks a chain end.
        // Dropping its start vertex leaves the outline unchanged.
        let before = run.len();
        let run: Vec<usize> = run
            .into_iter()
            .filter(|&index| graph.normal(index) != Some(Vec2::ZERO))
            .collect();
        if run.len() < before {
            warn!(
                "Dropped {} coincident vertices from the polygon at edge {}.",
                before - run.len(),
                start
            );
        }
        if closed && run.len() < 3 {
            warn!("Skipping degenerate loop at edge {} ({} edges).", start, run.len());
            continue;
        }
        if !closed && run.len() < 2 {
            warn!("Skipping isolated vertex {}.", start);
            continue;
        }

        let edges = run
            .iter()
            .map(|&index| PhysEdge {
                vertex: graph.edges()[index].vertex,
                normal: graph.normal(index).unwrap_or(Vec2::ZERO),
            })
            .collect();
        polygons.push(Polygon { edges });
    }

    graph.clear_flag(EdgeFlags::BUILT);

    BakedLevel {
        polygons,
        entities: level.entities.entities().to_vec(),
    }
}

/// Serialize a baked level to the runtime format
pub fn encode_baked(baked: &BakedLevel) -> Vec<u8> {
    let mut w = ByteWriter::default();
    w.u32(LEVEL_FORMAT_MAGIC);
    w.u32(baked.total_edge_count() as u32);
    for polygon in &baked.polygons {
        w.u32(polygon.edges.len() as u32);
        for edge in &polygon.edges {
            w.vec2(edge.vertex);
            w.vec2(edge.normal);
        }
    }
    write_entities(&mut w, &baked.entities);
    w.finish()
}

/// Parse a runtime-format buffer
pub fn decode_baked(bytes: &[u8]) -> Result<BakedLevel, LevelError> {
    let mut r = ByteReader::new(bytes);
    r.magic(LEVEL_FORMAT_MAGIC)?;

    let total = r.count(PHYS_EDGE_RECORD_SIZE, super::limits::MAX_EDGES, "edges")?;
    let mut polygons = Vec::new();
    let mut consumed = 0;
    while consumed < total {
        let count = r.count(PHYS_EDGE_RECORD_SIZE, total - consumed, "polygon edges")?;
        if count == 0 {
            return Err(LevelError::Validation("empty polygon".to_string()));
        }
        let mut edges = Vec::with_capacity(count);
        for _ in 0..count {
            let vertex = r.vec2()?;
            let normal = r.vec2()?;
            edges.push(PhysEdge { vertex, normal });
        }
        consumed += count;
        polygons.push(Polygon { edges });
    }

    let entities = read_entities(&mut r, MAX_BAKED_ENTITIES)?;
    Ok(BakedLevel {
        polygons,
        entities: entities.entities().to_vec(),
    })
}

/// Write a baked level to `path`. Returns bytes written.
pub fn save_baked<P: AsRef<Path>>(baked: &BakedLevel, path: P) -> Result<usize, LevelError> {
    let bytes = encode_baked(baked);
    write_file(path.as_ref(), &bytes)?;
    Ok(bytes.len())
}

pub fn load_baked<P: AsRef<Path>>(path: P) -> Result<BakedLevel, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| LevelError::io(path, e))?;
    decode_baked(&bytes)
}

/// Expected size of an encoded baked level (used by tooling output)
pub fn baked_size(baked: &BakedLevel) -> usize {
    4 + 4
        + baked.polygons.len() * 4
        + baked.total_edge_count() * PHYS_EDGE_RECORD_SIZE
        + 4
        + baked.entities.len() * ENTITY_RECORD_SIZE
}
