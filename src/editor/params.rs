//! Editor tuning parameters
//!
//! Stored as RON next to the editable levels (`res/editor/params.ron`). Missing
//! fields fall back to their defaults, so an old file keeps working after a field
//! is added.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::world::MAX_BAKED_ENTITIES;

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("failed to read params: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse params: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize params: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorParams {
    /// Pick distance for vertices and edges, in world units
    pub selection_radius: f32,
    /// Grid cells per world unit at startup
    pub grid_scale: f32,
    pub grid_scale_min: f32,
    pub grid_scale_max: f32,

    /// Pan speed in world units per second
    pub camera_speed: f32,
    pub camera_move_lerp_t: f32,
    /// Pixels per world unit at the zoom limits
    pub camera_zoom_min: f32,
    pub camera_zoom_max: f32,
    pub camera_zoom_speed: f32,
    pub camera_zoom_lerp_t: f32,

    /// Entity store capacity for new and loaded levels
    pub max_entities: usize,

    // Context menu geometry, in screen pixels
    pub menu_width: f32,
    pub menu_element_height: f32,
    pub menu_padding: f32,
}

impl Default for EditorParams {
    fn default() -> Self {
        Self {
            selection_radius: 0.1,
            grid_scale: 1.0,
            grid_scale_min: 1.0 / 64.0,
            grid_scale_max: 64.0,
            camera_speed: 10.0,
            camera_move_lerp_t: 0.2,
            camera_zoom_min: 16.0,
            camera_zoom_max: 256.0,
            camera_zoom_speed: 4.0,
            camera_zoom_lerp_t: 0.2,
            max_entities: crate::world::MAX_ENTITIES,
            menu_width: 160.0,
            menu_element_height: 20.0,
            menu_padding: 4.0,
        }
    }
}

impl EditorParams {
    pub fn from_ron(contents: &str) -> Result<Self, ParamsError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn to_ron(&self) -> Result<String, ParamsError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load params from `path`. A missing file gives the defaults silently, a
    /// broken one gives the defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        match Self::from_ron(&contents) {
            Ok(params) => {
                info!("Loaded editor params from '{}'.", path.display());
                params.sanitized()
            }
            Err(e) => {
                warn!("Ignoring editor params '{}': {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ParamsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Clamp values that would break the editor (non-positive radius, inverted
    /// ranges, entity capacities no level file could hold)
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.selection_radius > 0.0) {
            self.selection_radius = defaults.selection_radius;
        }
        if !(self.grid_scale_min > 0.0) || self.grid_scale_max < self.grid_scale_min {
            self.grid_scale_min = defaults.grid_scale_min;
            self.grid_scale_max = defaults.grid_scale_max;
        }
        if !(self.grid_scale > 0.0) {
            self.grid_scale = defaults.grid_scale;
        }
        self.grid_scale = self.grid_scale.clamp(self.grid_scale_min, self.grid_scale_max);
        if !(self.camera_zoom_min > 0.0) || self.camera_zoom_max < self.camera_zoom_min {
            self.camera_zoom_min = defaults.camera_zoom_min;
            self.camera_zoom_max = defaults.camera_zoom_max;
        }
        self.max_entities = self.max_entities.min(MAX_BAKED_ENTITIES);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("res/editor/params.ron");
        let params = EditorParams {
            selection_radius: 0.25,
            max_entities: 32,
            ..Default::default()
        };
        params.save(&path).unwrap();
        assert_eq!(EditorParams::load_or_default(&path), params);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let params = EditorParams::from_ron("(selection_radius: 0.5)").unwrap();
        assert_eq!(params.selection_radius, 0.5);
        assert_eq!(params.grid_scale, 1.0);
        assert_eq!(params.max_entities, 16);
    }

    #[test]
    fn test_missing_or_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.ron");
        assert_eq!(EditorParams::load_or_default(&path), EditorParams::default());

        std::fs::write(&path, "(selection_radius: ").unwrap();
        assert!(EditorParams::from_ron("(selection_radius: ").is_err());
        assert_eq!(EditorParams::load_or_default(&path), EditorParams::default());
    }

    #[test]
    fn test_sanitized() {
        let params = EditorParams {
            selection_radius: -1.0,
            grid_scale: 1000.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.selection_radius, 0.1);
        assert_eq!(params.grid_scale, 64.0);
    }

    #[test]
    fn test_huge_entity_capacity_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.ron");
        std::fs::write(&path, "(max_entities: 18446744073709551615)").unwrap();
        let params = EditorParams::load_or_default(&path);
        assert_eq!(params.max_entities, MAX_BAKED_ENTITIES);
    }
}
