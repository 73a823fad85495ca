//! Editable level file format (`.editor`)
//!
//! Little-endian binary, written verbatim from the in-memory arrays:
//!
//! ```text
//! u32 magic ('edit')
//! u32 edge_count
//! edge_count x { f32 x, f32 y, u32 previous, u32 next, u8 flipped_normal }
//! u32 entity_count
//! entity_count x { u8 type, f32 cx, f32 cy, f32 dim_x, f32 dim_y, f32 rotation }
//! ```
//!
//! Chain ends are stored as `INVALID_INDEX`. Transient flags (selection, build
//! marks) are not persisted. Decoding builds a fresh level and only hands it back
//! once the whole buffer parsed and validated.

use std::fs;
use std::path::{Path, PathBuf};

use super::{EditLevel, Edge, EdgeGraph, Entity, EntityKind, EntityStore};
use crate::math::{Obb, Vec2};

/// 'edit' in ASCII
pub const EDITOR_FORMAT_MAGIC: u32 = 0x6564_6974;

/// On-disk marker for a missing link
pub const INVALID_INDEX: u32 = 0xffff_ffff;

/// Validation limits to reject corrupt or hostile files before allocating
pub mod limits {
    /// Maximum number of edges in a level
    pub const MAX_EDGES: usize = 1 << 20;
    /// Maximum coordinate magnitude
    pub const MAX_COORD: f32 = 1_000_000.0;
}

/// Error type for level reading and writing
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("couldn't open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected end of data at byte {offset} ({needed} more bytes needed)")]
    Truncated { offset: usize, needed: usize },
    #[error("header mismatch: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },
    #[error("unknown entity type {0}")]
    UnknownEntityKind(u8),
    #[error("validation error: {0}")]
    Validation(String),
}

impl LevelError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LevelError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

/// Little-endian cursor over a byte buffer
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], LevelError> {
        let end = self.offset + N;
        let slice = self.bytes.get(self.offset..end).ok_or(LevelError::Truncated {
            offset: self.offset,
            needed: end - self.bytes.len().min(end),
        })?;
        self.offset = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, LevelError> {
        Ok(self.take::<1>()?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, LevelError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub(crate) fn f32(&mut self) -> Result<f32, LevelError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    pub(crate) fn vec2(&mut self) -> Result<Vec2, LevelError> {
        Ok(Vec2::new(self.f32()?, self.f32()?))
    }

    /// Read and check a format header
    pub(crate) fn magic(&mut self, expected: u32) -> Result<(), LevelError> {
        let found = self.u32()?;
        if found != expected {
            return Err(LevelError::BadMagic { expected, found });
        }
        Ok(())
    }

    /// Read a count and make sure the remaining buffer can hold that many records
    pub(crate) fn count(&mut self, record_size: usize, max: usize, what: &str) -> Result<usize, LevelError> {
        let count = self.u32()? as usize;
        if count > max {
            return Err(LevelError::Validation(format!("too many {} ({} > {})", what, count, max)));
        }
        let needed = count * record_size;
        let remaining = self.bytes.len() - self.offset;
        if needed > remaining {
            return Err(LevelError::Truncated {
                offset: self.offset,
                needed: needed - remaining,
            });
        }
        Ok(count)
    }
}

/// Append-only little-endian writer
#[derive(Default)]
pub(crate) struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, v: f32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn vec2(&mut self, v: Vec2) {
        self.f32(v.x);
        self.f32(v.y);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

const EDGE_RECORD_SIZE: usize = 4 * 4 + 1;
pub(crate) const ENTITY_RECORD_SIZE: usize = 1 + 5 * 4;

fn encode_link(link: Option<usize>) -> u32 {
    link.map_or(INVALID_INDEX, |i| i as u32)
}

fn decode_link(raw: u32) -> Option<usize> {
    (raw != INVALID_INDEX).then_some(raw as usize)
}

pub(crate) fn write_entities(w: &mut ByteWriter, entities: &[Entity]) {
    w.u32(entities.len() as u32);
    for entity in entities {
        w.u8(entity.kind.as_byte());
        w.vec2(entity.bound_box.center);
        w.vec2(entity.bound_box.dimensions);
        w.f32(entity.bound_box.rotation);
    }
}

pub(crate) fn read_entities(r: &mut ByteReader, capacity: usize) -> Result<EntityStore, LevelError> {
    let count = r.count(ENTITY_RECORD_SIZE, capacity, "entities")?;
    let mut store = EntityStore::with_capacity(capacity);
    for i in 0..count {
        let byte = r.u8()?;
        let kind = EntityKind::from_byte(byte).ok_or(LevelError::UnknownEntityKind(byte))?;
        let center = r.vec2()?;
        let dimensions = r.vec2()?;
        let rotation = r.f32()?;
        if ![center.x, center.y, dimensions.x, dimensions.y, rotation].into_iter().all(is_valid_float) {
            return Err(LevelError::Validation(format!("entity {}: invalid coordinates", i)));
        }
        store.add(Entity::new(kind, Obb { center, dimensions, rotation }));
    }
    Ok(store)
}

/// Serialize a level to the editable format
pub fn encode_editor(level: &EditLevel) -> Vec<u8> {
    let mut w = ByteWriter::default();
    w.u32(EDITOR_FORMAT_MAGIC);
    w.u32(level.edges.len() as u32);
    for edge in level.edges.edges() {
        w.vec2(edge.vertex);
        w.u32(encode_link(edge.previous));
        w.u32(encode_link(edge.next));
        w.u8(edge.flipped_normal as u8);
    }
    write_entities(&mut w, level.entities.entities());
    w.finish()
}

/// Parse an editable-format buffer into a new level
pub fn decode_editor(bytes: &[u8], entity_capacity: usize) -> Result<EditLevel, LevelError> {
    let mut r = ByteReader::new(bytes);
    r.magic(EDITOR_FORMAT_MAGIC)?;

    let edge_count = r.count(EDGE_RECORD_SIZE, limits::MAX_EDGES, "edges")?;
    let mut edges = Vec::with_capacity(edge_count);
    for i in 0..edge_count {
        let vertex = r.vec2()?;
        if !is_valid_float(vertex.x) || !is_valid_float(vertex.y) {
            return Err(LevelError::Validation(format!("edge {}: invalid vertex", i)));
        }
        let previous = decode_link(r.u32()?);
        let next = decode_link(r.u32()?);
        let flipped_normal = r.u8()? != 0;
        edges.push(Edge {
            previous,
            next,
            flipped_normal,
            ..Edge::new(vertex)
        });
    }
    let edges = EdgeGraph::from_edges(edges).map_err(|e| LevelError::Validation(e.to_string()))?;
    let entities = read_entities(&mut r, entity_capacity)?;

    Ok(EditLevel { edges, entities })
}

/// Write a level to `path`, creating parent directories. Returns bytes written.
pub fn save_editor<P: AsRef<Path>>(level: &EditLevel, path: P) -> Result<usize, LevelError> {
    let bytes = encode_editor(level);
    write_file(path.as_ref(), &bytes)?;
    Ok(bytes.len())
}

/// Read a level from `path`
pub fn load_editor<P: AsRef<Path>>(path: P, entity_capacity: usize) -> Result<EditLevel, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| LevelError::io(path, e))?;
    decode_editor(&bytes, entity_capacity)
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), LevelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LevelError::io(path, e))?;
    }
    fs::write(path, bytes).map_err(|e| LevelError::io(path, e))
}
