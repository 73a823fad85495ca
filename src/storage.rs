//! Resource directory layout
//!
//! Level files live under a base directory (usually the working directory):
//! editable levels in `res/editor/`, baked levels in `res/level/`.

use std::path::{Path, PathBuf};

pub const EDITOR_DIR: &str = "res/editor";
pub const LEVEL_DIR: &str = "res/level";
pub const EDITOR_EXTENSION: &str = "editor";
pub const LEVEL_EXTENSION: &str = "level";
pub const PARAMS_FILE: &str = "params.ron";

/// Path resolution for editor resources
#[derive(Debug, Clone)]
pub struct ResourceDir {
    /// Base directory for relative paths
    base_dir: PathBuf,
}

impl Default for ResourceDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDir {
    /// Resources rooted at the current directory
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, dir: &str, name: &str, extension: &str) -> PathBuf {
        self.base_dir.join(dir).join(format!("{}.{}", name, extension))
    }

    /// `res/editor/<name>.editor`
    pub fn editor_path(&self, name: &str) -> PathBuf {
        self.resolve(EDITOR_DIR, name, EDITOR_EXTENSION)
    }

    /// `res/level/<name>.level`
    pub fn level_path(&self, name: &str) -> PathBuf {
        self.resolve(LEVEL_DIR, name, LEVEL_EXTENSION)
    }

    /// `res/editor/params.ron`
    pub fn params_path(&self) -> PathBuf {
        self.base_dir.join(EDITOR_DIR).join(PARAMS_FILE)
    }

    /// Names (without extension) of the editable levels on disk, sorted
    pub fn list_editor_levels(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.base_dir.join(EDITOR_DIR)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == EDITOR_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

/// Level names are plain file stems; reject anything that would escape the resource dir
pub fn is_valid_level_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
