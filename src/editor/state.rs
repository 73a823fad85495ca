//! Editor session state and the interaction state machine
//!
//! One `EditorSession` owns the level being edited, the selection, and the
//! current mode. The application loop calls `update` once per frame with that
//! frame's input; everything happens synchronously inside that call.

use tracing::{debug, info, warn};

use super::drag::{ActiveDrag, BoxSelectTracker, CutTracker, MoveTracker, RotateTracker};
use super::input::{EditorAction, FrameInput, MenuItem};
use super::params::EditorParams;
use super::selection::{hit_test, Selected, Selection};
use crate::math::{snap_to_grid, Vec2};
use crate::storage::ResourceDir;
use crate::world::{
    build_level, load_editor, save_baked, save_editor, EditLevel, Entity, EntityFlags, EntityKind, LevelError,
};

/// How long status messages stay visible (seconds)
const STATUS_DURATION: f64 = 3.0;

/// Select-mode transient state
#[derive(Debug, Clone, Default)]
pub struct SelectState {
    pub drag: ActiveDrag,
}

/// Top-level interaction mode. Each arm carries only its own transient state.
#[derive(Debug, Clone)]
pub enum EditorMode {
    Select(SelectState),
    Cut(CutTracker),
    Rotate(RotateTracker),
}

impl Default for EditorMode {
    fn default() -> Self {
        EditorMode::Select(SelectState::default())
    }
}

impl EditorMode {
    pub fn name(&self) -> &'static str {
        match self {
            EditorMode::Select(_) => "Select",
            EditorMode::Cut(_) => "Cut",
            EditorMode::Rotate(_) => "Rotate",
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, EditorMode::Select(_))
    }
}

/// Right-click menu, anchored at the snapped cursor position
#[derive(Debug, Clone)]
pub struct ContextMenu {
    pub anchor: Vec2,
    pub items: Vec<MenuItem>,
}

impl ContextMenu {
    pub fn new(anchor: Vec2) -> Self {
        Self {
            anchor,
            items: MenuItem::all(),
        }
    }
}

pub struct EditorSession {
    pub level: EditLevel,
    pub selection: Selection,
    pub params: EditorParams,
    pub resources: ResourceDir,
    mode: EditorMode,
    /// Grid cells per world unit
    pub grid_scale: f32,
    /// Cursor in world units
    pub mouse: Vec2,
    /// Cursor snapped to the grid
    pub snapped_mouse: Vec2,
    /// Snapped position of the last left press
    pub click_origin: Vec2,
    pub context_menu: Option<ContextMenu>,
    /// Unsaved changes
    pub dirty: bool,
    clock: f64,
    status_message: Option<(String, f64)>, // (message, expiry_time)
}

impl EditorSession {
    pub fn new(params: EditorParams, resources: ResourceDir) -> Self {
        let params = params.sanitized();
        Self {
            level: EditLevel::new(params.max_entities),
            selection: Selection::new(),
            grid_scale: params.grid_scale,
            params,
            resources,
            mode: EditorMode::default(),
            mouse: Vec2::ZERO,
            snapped_mouse: Vec2::ZERO,
            click_origin: Vec2::ZERO,
            context_menu: None,
            dirty: false,
            clock: 0.0,
            status_message: None,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    fn set_mode(&mut self, mode: EditorMode) {
        debug!("Editor mode {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some((message.to_string(), self.clock + STATUS_DURATION));
    }

    /// Current status message if not expired
    pub fn status(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, expiry)) if self.clock < *expiry => Some(msg),
            _ => None,
        }
    }

    /// One-line summary for the HUD
    pub fn status_line(&self) -> String {
        format!(
            "{}{} | {} selected | {} vertices | {} entities | grid 1/{} | mouse ({:.2}, {:.2}) snap ({:.2}, {:.2})",
            self.mode.name(),
            if self.dirty { " *" } else { "" },
            self.selection.len(),
            self.level.edges.len(),
            self.level.entities.len(),
            self.grid_scale,
            self.mouse.x,
            self.mouse.y,
            self.snapped_mouse.x,
            self.snapped_mouse.y,
        )
    }

    /// Advance the state machine by one frame
    pub fn update(&mut self, input: &FrameInput) {
        self.clock = input.time;
        self.mouse = input.mouse_world;
        self.snapped_mouse = snap_to_grid(self.mouse, self.grid_scale);

        if let Some(choice) = input.menu_choice {
            self.apply_menu_choice(choice);
            return;
        }

        for &action in &input.actions {
            self.handle_action(action);
        }

        match self.mode {
            EditorMode::Select(_) => self.update_select(input),
            EditorMode::Cut(_) => self.update_cut(input),
            EditorMode::Rotate(_) => self.update_rotate(input),
        }
    }

    fn handle_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::Cancel => {
                self.context_menu = None;
                if self.mode.is_select() {
                    self.cancel_drag();
                } else {
                    self.set_mode(EditorMode::default());
                }
            }
            EditorAction::GridFiner => self.set_grid_scale(self.grid_scale * 2.0),
            EditorAction::GridCoarser => self.set_grid_scale(self.grid_scale * 0.5),
            // Everything else is a Select-mode command
            _ if !self.mode.is_select() => {}
            EditorAction::EnterCut => self.enter_cut(),
            EditorAction::EnterRotate => self.enter_rotate(),
            EditorAction::FlipNormals => self.flip_selected(),
            EditorAction::DeleteSelection => self.delete_selected(),
        }
    }

    pub fn set_grid_scale(&mut self, scale: f32) {
        self.grid_scale = scale.clamp(self.params.grid_scale_min, self.params.grid_scale_max);
        self.snapped_mouse = snap_to_grid(self.mouse, self.grid_scale);
        self.set_status(&format!("Grid 1/{}", self.grid_scale));
    }

    fn enter_cut(&mut self) {
        if self.selection.edges().next().is_none() {
            info!("Cut needs at least one selected edge.");
            self.set_status("Select an edge to cut");
            return;
        }
        self.selection.retain_edges(&mut self.level);
        self.context_menu = None;
        let mut tracker = CutTracker::new(self.selection.edges().collect());
        tracker.update(&self.level.edges, self.snapped_mouse);
        self.set_mode(EditorMode::Cut(tracker));
    }

    fn enter_rotate(&mut self) {
        let entities: Vec<usize> = self.selection.entities().collect();
        let Some(tracker) = RotateTracker::new(&self.level, entities, self.mouse) else {
            info!("Rotate needs at least one selected entity.");
            self.set_status("Select an entity to rotate");
            return;
        };
        self.selection.retain_entities(&mut self.level);
        self.context_menu = None;
        self.set_mode(EditorMode::Rotate(tracker));
    }

    fn update_select(&mut self, input: &FrameInput) {
        if input.right_pressed {
            self.context_menu = match self.context_menu {
                Some(_) => None,
                None => Some(ContextMenu::new(self.snapped_mouse)),
            };
            return;
        }
        if input.left_pressed && self.context_menu.take().is_some() {
            // Click outside the menu only closes it
            return;
        }

        if input.left_pressed {
            self.begin_drag(input);
        } else if input.left_down {
            if let EditorMode::Select(state) = &mut self.mode {
                state.drag.update(self.snapped_mouse);
            }
        }

        if input.left_released {
            self.end_drag();
        }
    }

    fn begin_drag(&mut self, input: &FrameInput) {
        self.click_origin = self.snapped_mouse;
        if !input.additive {
            self.selection.clear(&mut self.level);
        }

        match hit_test(&self.level, self.mouse, self.params.selection_radius) {
            Some(Selected::Vertex(i) | Selected::Edge(i)) if input.chain => {
                self.selection.chain_select(&mut self.level, i);
            }
            Some(hit) => {
                self.selection.select(&mut self.level, hit);
            }
            None => {}
        }

        let drag = if self.selection.is_empty() {
            ActiveDrag::BoxSelect(BoxSelectTracker::new(self.click_origin))
        } else {
            let vertices = self.selection.affected_vertices(&self.level);
            let entities: Vec<usize> = self.selection.entities().collect();
            ActiveDrag::Move(MoveTracker::new(self.click_origin, &self.level, &vertices, &entities))
        };
        if let EditorMode::Select(state) = &mut self.mode {
            state.drag = drag;
        }
    }

    fn end_drag(&mut self) {
        let EditorMode::Select(state) = &mut self.mode else {
            return;
        };
        let mut drag = std::mem::take(&mut state.drag);
        drag.update(self.snapped_mouse);
        match drag {
            ActiveDrag::None => {}
            ActiveDrag::Move(tracker) => {
                if tracker.commit(&mut self.level) {
                    self.dirty = true;
                }
            }
            ActiveDrag::BoxSelect(tracker) => {
                self.selection.box_select(&mut self.level, tracker.bounds());
            }
        }
    }

    fn cancel_drag(&mut self) {
        if let EditorMode::Select(state) = &mut self.mode {
            state.drag = ActiveDrag::None;
        }
    }

    fn update_cut(&mut self, input: &FrameInput) {
        let EditorMode::Cut(tracker) = &mut self.mode else {
            return;
        };
        tracker.update(&self.level.edges, self.snapped_mouse);
        if !input.left_pressed {
            return;
        }
        if let Some(new_index) = tracker.commit(&mut self.level.edges) {
            tracker.update(&self.level.edges, self.snapped_mouse);
            self.selection.select(&mut self.level, Selected::Edge(new_index));
            self.dirty = true;
            debug!("Cut inserted edge {}", new_index);
        }
    }

    fn update_rotate(&mut self, input: &FrameInput) {
        let EditorMode::Rotate(tracker) = &mut self.mode else {
            return;
        };
        tracker.update(self.mouse);
        if input.left_pressed && tracker.commit(&mut self.level, self.mouse) {
            self.dirty = true;
        }
    }

    fn apply_menu_choice(&mut self, choice: MenuItem) {
        let anchor = self
            .context_menu
            .take()
            .map_or(self.snapped_mouse, |menu| menu.anchor);
        match choice {
            MenuItem::AddQuad => {
                self.add_quad_at(anchor);
            }
            MenuItem::Place(kind) => {
                self.place_entity(kind, anchor);
            }
        }
    }

    /// Flip the normal of every selected edge
    pub fn flip_selected(&mut self) {
        let edges: Vec<usize> = self.selection.edges().collect();
        if edges.is_empty() {
            return;
        }
        for &i in &edges {
            self.level.edges.flip_normal(i);
        }
        self.dirty = true;
        self.set_status(&format!("Flipped {} normals", edges.len()));
    }

    /// Remove everything selected.
    ///
    /// Selected edges are unlinked (opening their loop), selected vertices are
    /// deleted, selected entities are swept. The selection is empty afterwards
    /// and every index held before this call is stale.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        // A held drag refers to indices that are about to move
        self.cancel_drag();
        let edges: Vec<usize> = self.selection.edges().collect();
        let vertices: Vec<usize> = self.selection.vertices().collect();
        let entities: Vec<usize> = self.selection.entities().collect();
        self.selection.clear(&mut self.level);

        for &i in &edges {
            self.level.edges.unlink_segment(i);
        }
        self.level.edges.delete_vertices(&vertices);
        for &i in &entities {
            if let Some(entity) = self.level.entities.get_mut(i) {
                entity.flags.insert(EntityFlags::REMOVED);
            }
        }
        let removed = self.level.entities.sweep_removed();

        debug!(
            "Deleted {} vertices, unlinked {} edges, removed {} entities",
            vertices.len(),
            edges.len(),
            removed
        );
        self.dirty = true;
    }

    /// Append a 2x2 quad centered at `origin`. Returns its first edge index.
    pub fn add_quad_at(&mut self, origin: Vec2) -> usize {
        let base = self.level.edges.add_quad(origin);
        self.dirty = true;
        base
    }

    /// Place an entity of `kind` centered at `center`
    pub fn place_entity(&mut self, kind: EntityKind, center: Vec2) -> Option<usize> {
        match self.level.entities.add(Entity::placed(kind, center)) {
            Some(index) => {
                self.dirty = true;
                Some(index)
            }
            None => {
                warn!("Entity limit reached ({}), can't place {}.", self.level.entities.capacity(), kind.label());
                self.set_status("Entity limit reached");
                None
            }
        }
    }

    /// Reset to an empty level
    pub fn new_level(&mut self) {
        self.selection.forget();
        self.level = EditLevel::new(self.params.max_entities);
        self.set_mode(EditorMode::default());
        self.context_menu = None;
        self.dirty = false;
    }

    /// Save the level to `res/editor/<name>.editor`. Returns bytes written.
    pub fn write(&mut self, name: &str) -> Result<usize, LevelError> {
        let path = self.resources.editor_path(name);
        match save_editor(&self.level, &path) {
            Ok(written) => {
                info!("Written {} bytes to editor file '{}'.", written, path.display());
                self.dirty = false;
                self.set_status(&format!("Saved {}", name));
                Ok(written)
            }
            Err(e) => {
                warn!("Couldn't open editor file '{}'.", path.display());
                Err(e)
            }
        }
    }

    /// Replace the level with `res/editor/<name>.editor`. On any failure the
    /// current level is left as it was.
    pub fn read(&mut self, name: &str) -> Result<(), LevelError> {
        let path = self.resources.editor_path(name);
        let level = match load_editor(&path, self.params.max_entities) {
            Ok(level) => level,
            Err(e) => {
                match &e {
                    LevelError::Io { .. } => warn!("Couldn't open editor file '{}'.", path.display()),
                    other => warn!("Couldn't read editor file '{}': {}", path.display(), other),
                }
                return Err(e);
            }
        };

        info!(
            "Read {} edges and {} entities from editor file '{}'.",
            level.edges.len(),
            level.entities.len(),
            path.display()
        );
        // Loaded levels carry no selection flags
        self.selection.forget();
        self.level = level;
        self.set_mode(EditorMode::default());
        self.context_menu = None;
        self.dirty = false;
        self.set_status(&format!("Loaded {}", name));
        Ok(())
    }

    /// Bake the level to `res/level/<name>.level`. Returns bytes written.
    pub fn build(&mut self, name: &str) -> Result<usize, LevelError> {
        let baked = build_level(&mut self.level);
        let path = self.resources.level_path(name);
        match save_baked(&baked, &path) {
            Ok(written) => {
                info!(
                    "Written {} bytes to level file '{}' ({} polygons).",
                    written,
                    path.display(),
                    baked.polygons.len()
                );
                self.set_status(&format!("Built {}", name));
                Ok(written)
            }
            Err(e) => {
                warn!("Couldn't open level file '{}'.", path.display());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::CommandRegistry;
    use crate::world::{load_baked, EdgeFlags};
    use tempfile::TempDir;

    fn session() -> EditorSession {
        EditorSession::new(EditorParams::default(), ResourceDir::new())
    }

    fn session_with_quad() -> EditorSession {
        let mut s = session();
        s.add_quad_at(Vec2::ZERO);
        s.dirty = false;
        s
    }

    fn click(s: &mut EditorSession, p: Vec2) {
        s.update(&FrameInput::at(p).press());
        s.update(&FrameInput::at(p).release());
    }

    fn act(s: &mut EditorSession, action: EditorAction) {
        let mouse = s.mouse;
        s.update(&FrameInput::at(mouse).with_action(action));
    }

    #[test]
    fn test_click_selects_vertex() {
        let mut s = session_with_quad();
        click(&mut s, Vec2::new(1.02, 1.0));
        assert_eq!(s.selection.entries(), &[Selected::Vertex(2)]);
        assert!(s.selection.is_consistent(&s.level));

        // A plain click elsewhere replaces the selection
        click(&mut s, Vec2::new(-1.0, 0.0));
        assert_eq!(s.selection.entries(), &[Selected::Edge(3)]);
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_additive_click() {
        let mut s = session_with_quad();
        click(&mut s, Vec2::new(-1.0, -1.0));
        let mut input = FrameInput::at(Vec2::new(1.0, -1.0)).press();
        input.additive = true;
        s.update(&input);
        s.update(&FrameInput::at(Vec2::new(1.0, -1.0)).release());
        assert_eq!(s.selection.len(), 2);
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_chain_click_selects_loop() {
        let mut s = session_with_quad();
        let mut input = FrameInput::at(Vec2::new(0.0, -1.0)).press();
        input.chain = true;
        s.update(&input);
        s.update(&FrameInput::at(Vec2::new(0.0, -1.0)).release());
        assert_eq!(s.selection.vertices().count(), 4);
        assert_eq!(s.selection.edges().count(), 4);
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_drag_moves_selection_on_grid() {
        let mut s = session_with_quad();
        // Grab the bottom edge: both its endpoints move
        s.update(&FrameInput::at(Vec2::new(0.0, -1.0)).press());
        s.update(&FrameInput::at(Vec2::new(0.4, -2.1)).hold());
        // Nothing moves until release
        assert_eq!(s.level.edges.get(0).unwrap().vertex, Vec2::new(-1.0, -1.0));
        s.update(&FrameInput::at(Vec2::new(0.4, -2.1)).release());

        assert_eq!(s.level.edges.get(0).unwrap().vertex, Vec2::new(-1.0, -2.0));
        assert_eq!(s.level.edges.get(1).unwrap().vertex, Vec2::new(1.0, -2.0));
        assert_eq!(s.level.edges.get(2).unwrap().vertex, Vec2::new(1.0, 1.0));
        assert!(s.dirty);
    }

    #[test]
    fn test_box_select_from_empty_click() {
        let mut s = session_with_quad();
        s.update(&FrameInput::at(Vec2::new(-3.0, -3.0)).press());
        s.update(&FrameInput::at(Vec2::new(0.0, 3.0)).hold());
        s.update(&FrameInput::at(Vec2::new(0.0, 3.0)).release());
        // Left column: vertices 0 and 3, plus the edge 3 -> 0
        assert_eq!(s.selection.vertices().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(s.selection.edges().collect::<Vec<_>>(), vec![3]);
        assert!(s.selection.is_consistent(&s.level));
        assert!(!s.dirty);
    }

    #[test]
    fn test_enter_cut_requires_edge() {
        let mut s = session_with_quad();
        click(&mut s, Vec2::new(-1.0, -1.0));
        act(&mut s, EditorAction::EnterCut);
        assert!(s.mode().is_select());
        // Selection left as it was
        assert_eq!(s.selection.entries(), &[Selected::Vertex(0)]);
    }

    #[test]
    fn test_cut_mode() {
        let mut s = session_with_quad();
        let mut input = FrameInput::at(Vec2::new(0.0, -1.0)).press();
        input.chain = true;
        s.update(&input);
        s.update(&FrameInput::at(Vec2::new(0.0, -1.0)).release());

        act(&mut s, EditorAction::EnterCut);
        assert_eq!(s.mode().name(), "Cut");
        // Vertices were filtered out of the selection
        assert_eq!(s.selection.vertices().count(), 0);
        assert_eq!(s.selection.edges().count(), 4);

        s.update(&FrameInput::at(Vec2::new(0.1, -1.3)).press());
        assert_eq!(s.level.edges.len(), 5);
        assert_eq!(s.level.edges.walk(0), vec![0, 4, 1, 2, 3]);
        assert_eq!(s.level.edges.get(4).unwrap().vertex, Vec2::new(0.0, -1.0));
        assert!(s.selection.contains(Selected::Edge(4)));
        assert!(s.selection.is_consistent(&s.level));
        assert!(s.level.edges.check_links().is_ok());
        let EditorMode::Cut(tracker) = s.mode() else {
            panic!("expected cut mode");
        };
        assert_eq!(tracker.candidates, vec![4]);

        act(&mut s, EditorAction::Cancel);
        assert!(s.mode().is_select());
        assert_eq!(s.selection.edges().count(), 5);
    }

    #[test]
    fn test_rotate_mode() {
        let mut s = session();
        s.place_entity(EntityKind::Mirror, Vec2::new(-1.0, 0.0));
        s.place_entity(EntityKind::Mirror, Vec2::new(1.0, 0.0));
        s.update(&FrameInput::at(Vec2::new(-3.0, -3.0)).press());
        s.update(&FrameInput::at(Vec2::new(3.0, 3.0)).release());
        assert_eq!(s.selection.entities().count(), 2);

        s.update(&FrameInput::at(Vec2::new(2.0, 0.0)).with_action(EditorAction::EnterRotate));
        assert_eq!(s.mode().name(), "Rotate");

        // Quarter turn counter-clockwise
        s.update(&FrameInput::at(Vec2::new(0.0, 2.0)).press());
        for entity in s.level.entities.entities() {
            assert!((entity.bound_box.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        }
        act(&mut s, EditorAction::Cancel);
        assert!(s.mode().is_select());
    }

    #[test]
    fn test_enter_rotate_requires_entity() {
        let mut s = session_with_quad();
        act(&mut s, EditorAction::EnterRotate);
        assert!(s.mode().is_select());
    }

    #[test]
    fn test_flip_selected() {
        let mut s = session_with_quad();
        click(&mut s, Vec2::new(0.0, -1.0));
        act(&mut s, EditorAction::FlipNormals);
        assert!(s.level.edges.get(0).unwrap().flipped_normal);
        assert!(!s.level.edges.get(1).unwrap().flipped_normal);
    }

    #[test]
    fn test_delete_vertices() {
        let mut s = session_with_quad();
        s.add_quad_at(Vec2::new(5.0, 0.0));
        click(&mut s, Vec2::new(1.0, 1.0));
        let mut input = FrameInput::at(Vec2::new(4.0, -1.0)).press();
        input.additive = true;
        s.update(&input);
        s.update(&FrameInput::at(Vec2::new(4.0, -1.0)).release());

        act(&mut s, EditorAction::DeleteSelection);
        assert_eq!(s.level.edges.len(), 6);
        assert!(s.level.edges.check_links().is_ok());
        assert!(s.selection.is_empty());
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_delete_edge_opens_loop() {
        let mut s = session_with_quad();
        click(&mut s, Vec2::new(0.0, -1.0));
        act(&mut s, EditorAction::DeleteSelection);
        assert_eq!(s.level.edges.len(), 4);
        assert_eq!(s.level.edges.get(0).unwrap().next, None);
        assert_eq!(s.level.edges.chain_head(0), 1);
    }

    #[test]
    fn test_delete_entities() {
        let mut s = session();
        s.place_entity(EntityKind::Player, Vec2::ZERO);
        s.place_entity(EntityKind::Glass, Vec2::new(4.0, 0.0));
        click(&mut s, Vec2::new(0.1, 0.1));
        act(&mut s, EditorAction::DeleteSelection);
        assert_eq!(s.level.entities.len(), 1);
        assert_eq!(s.level.entities.get(0).unwrap().kind, EntityKind::Glass);
    }

    #[test]
    fn test_grid_scale_keys_clamp() {
        let mut s = session();
        act(&mut s, EditorAction::GridFiner);
        assert_eq!(s.grid_scale, 2.0);
        for _ in 0..20 {
            act(&mut s, EditorAction::GridFiner);
        }
        assert_eq!(s.grid_scale, 64.0);
        for _ in 0..40 {
            act(&mut s, EditorAction::GridCoarser);
        }
        assert_eq!(s.grid_scale, 1.0 / 64.0);
    }

    #[test]
    fn test_context_menu_add_quad() {
        let mut s = session();
        let mut input = FrameInput::at(Vec2::new(3.2, 4.9));
        input.right_pressed = true;
        s.update(&input);
        assert_eq!(s.context_menu.as_ref().unwrap().anchor, Vec2::new(3.0, 5.0));

        let mut input = FrameInput::at(Vec2::new(3.5, 5.5));
        input.menu_choice = Some(MenuItem::AddQuad);
        s.update(&input);
        assert!(s.context_menu.is_none());
        assert_eq!(s.level.edges.len(), 4);
        assert_eq!(s.level.edges.get(0).unwrap().vertex, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_entity_capacity() {
        let params = EditorParams {
            max_entities: 1,
            ..Default::default()
        };
        let mut s = EditorSession::new(params, ResourceDir::new());
        assert_eq!(s.place_entity(EntityKind::Player, Vec2::ZERO), Some(0));
        assert_eq!(s.place_entity(EntityKind::Player, Vec2::ONE), None);
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut s = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        s.add_quad_at(Vec2::ZERO);
        s.place_entity(EntityKind::RayEmitter, Vec2::new(2.0, 2.0));
        click(&mut s, Vec2::new(0.0, -1.0));
        act(&mut s, EditorAction::FlipNormals);

        let written = s.write("test").unwrap();
        assert!(dir.path().join("res/editor/test.editor").exists());
        assert!(written > 0);
        assert!(!s.dirty);

        let mut other = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        other.read("test").unwrap();
        assert_eq!(other.level.edges.len(), 4);
        assert_eq!(other.level.entities.len(), 1);
        assert!(other.level.edges.get(0).unwrap().flipped_normal);
        // Selection flags are not persisted
        assert!(other
            .level
            .edges
            .edges()
            .iter()
            .all(|e| !e.flags.contains(EdgeFlags::SELECTED)));
        assert!(other.selection.is_consistent(&other.level));
    }

    #[test]
    fn test_failed_read_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut s = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        s.add_quad_at(Vec2::ZERO);
        click(&mut s, Vec2::new(1.0, 1.0));

        assert!(matches!(s.read("missing"), Err(LevelError::Io { .. })));
        let path = dir.path().join("res/editor/junk.editor");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"nope").unwrap();
        assert!(s.read("junk").is_err());

        assert_eq!(s.level.edges.len(), 4);
        assert_eq!(s.selection.entries(), &[Selected::Vertex(2)]);
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_build_writes_level() {
        let dir = TempDir::new().unwrap();
        let mut s = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        s.add_quad_at(Vec2::ZERO);
        s.add_quad_at(Vec2::new(5.0, 5.0));
        s.build("test").unwrap();

        let baked = load_baked(dir.path().join("res/level/test.level")).unwrap();
        assert_eq!(baked.polygons.len(), 2);
        assert!(s
            .level
            .edges
            .edges()
            .iter()
            .all(|e| !e.flags.contains(EdgeFlags::BUILT)));
    }

    fn chain_click(s: &mut EditorSession, p: Vec2) {
        let mut input = FrameInput::at(p).press();
        input.chain = true;
        s.update(&input);
        s.update(&FrameInput::at(p).release());
    }

    fn vertices(s: &EditorSession) -> Vec<Vec2> {
        s.level.edges.edges().iter().map(|e| e.vertex).collect()
    }

    fn assert_intact(s: &EditorSession) {
        assert!(s.level.edges.check_links().is_ok());
        assert!(s.selection.is_consistent(&s.level));
    }

    #[test]
    fn test_delete_during_move_drag() {
        let mut s = session_with_quad();
        s.update(&FrameInput::at(Vec2::new(-1.0, -1.0)).press());
        s.update(&FrameInput::at(Vec2::new(0.0, -1.0)).hold());
        s.update(
            &FrameInput::at(Vec2::new(0.0, -1.0))
                .hold()
                .with_action(EditorAction::DeleteSelection),
        );
        let after_delete = vertices(&s);
        assert_eq!(after_delete.len(), 3);

        s.update(&FrameInput::at(Vec2::new(0.0, -1.0)).release());
        assert_eq!(vertices(&s), after_delete);
        assert!(s.selection.is_empty());
        assert_intact(&s);
    }

    #[test]
    fn test_delete_entity_during_move_drag() {
        let mut s = session();
        s.place_entity(EntityKind::Player, Vec2::ZERO);
        s.place_entity(EntityKind::Glass, Vec2::new(4.0, 0.0));
        s.update(&FrameInput::at(Vec2::ZERO).press());
        s.update(
            &FrameInput::at(Vec2::new(1.0, 0.0))
                .hold()
                .with_action(EditorAction::DeleteSelection),
        );
        s.update(&FrameInput::at(Vec2::new(1.0, 0.0)).release());

        assert_eq!(s.level.entities.len(), 1);
        let glass = s.level.entities.get(0).unwrap();
        assert_eq!(glass.kind, EntityKind::Glass);
        assert_eq!(glass.bound_box.center, Vec2::new(4.0, 0.0));
        assert_intact(&s);
    }

    #[test]
    fn test_console_add_quad_during_move_drag() {
        let commands = CommandRegistry::default();
        let mut s = session_with_quad();
        s.update(&FrameInput::at(Vec2::new(-1.0, -1.0)).press());
        commands.execute(&mut s, "editor_add_quad 5 5").unwrap();
        s.update(&FrameInput::at(Vec2::new(-1.0, -2.0)).release());

        // The structural change dropped the move
        assert_eq!(s.level.edges.get(0).unwrap().vertex, Vec2::new(-1.0, -1.0));
        assert_eq!(s.level.edges.get(4).unwrap().vertex, Vec2::new(4.0, 4.0));
        assert_eq!(s.level.edges.walk(4), vec![4, 5, 6, 7]);
        assert_intact(&s);
    }

    #[test]
    fn test_console_add_quad_during_cut() {
        let commands = CommandRegistry::default();
        let mut s = session_with_quad();
        chain_click(&mut s, Vec2::new(0.0, -1.0));
        act(&mut s, EditorAction::EnterCut);
        commands.execute(&mut s, "editor_add_quad 5 5").unwrap();

        s.update(&FrameInput::at(Vec2::new(0.1, -1.3)).press());
        assert_eq!(s.mode().name(), "Cut");
        assert_eq!(s.level.edges.len(), 9);
        assert_eq!(s.level.edges.walk(0), vec![0, 8, 1, 2, 3]);
        assert_eq!(s.level.edges.walk(4), vec![4, 5, 6, 7]);
        assert!(s.selection.contains(Selected::Edge(8)));
        assert_intact(&s);
    }

    #[test]
    fn test_console_new_during_cut() {
        let commands = CommandRegistry::default();
        let mut s = session_with_quad();
        chain_click(&mut s, Vec2::new(0.0, -1.0));
        act(&mut s, EditorAction::EnterCut);
        commands.execute(&mut s, "editor_new").unwrap();

        assert!(s.mode().is_select());
        assert!(s.selection.is_empty());
        s.update(&FrameInput::at(Vec2::new(0.1, -1.3)).press());
        s.update(&FrameInput::at(Vec2::new(0.1, -1.3)).release());
        assert!(s.level.edges.is_empty());
        assert_intact(&s);
    }

    #[test]
    fn test_console_read_during_rotate() {
        let dir = TempDir::new().unwrap();
        let commands = CommandRegistry::default();
        let mut s = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        s.add_quad_at(Vec2::ZERO);
        s.write("saved").unwrap();

        s.place_entity(EntityKind::Mirror, Vec2::new(9.0, 0.0));
        s.place_entity(EntityKind::Mirror, Vec2::new(11.0, 0.0));
        s.update(&FrameInput::at(Vec2::new(7.0, -3.0)).press());
        s.update(&FrameInput::at(Vec2::new(13.0, 3.0)).release());
        s.update(&FrameInput::at(Vec2::new(12.0, 0.0)).with_action(EditorAction::EnterRotate));
        assert_eq!(s.mode().name(), "Rotate");

        commands.execute(&mut s, "editor_read saved").unwrap();
        assert!(s.mode().is_select());
        assert!(s.selection.is_empty());
        assert!(s.level.entities.is_empty());

        s.update(&FrameInput::at(Vec2::new(10.0, 2.0)).press());
        s.update(&FrameInput::at(Vec2::new(10.0, 2.0)).release());
        assert_eq!(s.level.edges.len(), 4);
        assert!(s.level.entities.is_empty());
        assert_intact(&s);
    }

    #[test]
    fn test_status_expires() {
        let mut s = session();
        s.update(&FrameInput {
            time: 10.0,
            ..FrameInput::at(Vec2::ZERO).with_action(EditorAction::GridFiner)
        });
        assert_eq!(s.status(), Some("Grid 1/2"));
        s.update(&FrameInput {
            time: 20.0,
            ..Default::default()
        });
        assert_eq!(s.status(), None);
        assert!(s.status_line().starts_with("Select"));
    }
}
