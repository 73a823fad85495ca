//! Per-frame editor input
//!
//! The session never polls devices itself. The application loop samples mouse
//! and keyboard once per frame, converts the cursor into world space and hands
//! the result to `EditorSession::update` as a `FrameInput`.

use crate::math::Vec2;
use crate::world::EntityKind;

/// Discrete commands bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    /// Select -> Cut (needs at least one selected edge)
    EnterCut,
    /// Select -> Rotate (needs at least one selected entity)
    EnterRotate,
    /// Back to Select, dropping uncommitted state
    Cancel,
    FlipNormals,
    DeleteSelection,
    /// Double the grid scale (smaller cells)
    GridFiner,
    /// Halve the grid scale (larger cells)
    GridCoarser,
}

/// Context menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddQuad,
    Place(EntityKind),
}

impl MenuItem {
    /// Every menu entry in display order
    pub fn all() -> Vec<MenuItem> {
        std::iter::once(MenuItem::AddQuad)
            .chain(EntityKind::ALL.into_iter().map(MenuItem::Place))
            .collect()
    }

    pub fn label(self) -> String {
        match self {
            MenuItem::AddQuad => "Add quad".to_string(),
            MenuItem::Place(kind) => format!("Place {}", kind.label()),
        }
    }
}

/// Mouse and key state for one frame, already in world space
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Cursor position in world units
    pub mouse_world: Vec2,
    pub left_pressed: bool,
    pub left_down: bool,
    pub left_released: bool,
    pub right_pressed: bool,
    /// Shift held: clicks add to the selection instead of replacing it
    pub additive: bool,
    /// Alt held: clicking a vertex or edge selects forward along its chain
    pub chain: bool,
    /// Key actions triggered this frame, in order
    pub actions: Vec<EditorAction>,
    /// Context menu entry clicked this frame
    pub menu_choice: Option<MenuItem>,
    /// Seconds since startup, used to expire status messages
    pub time: f64,
}

impl FrameInput {
    /// Idle frame with the cursor at `mouse_world`
    pub fn at(mouse_world: Vec2) -> Self {
        Self {
            mouse_world,
            ..Default::default()
        }
    }

    pub fn press(mut self) -> Self {
        self.left_pressed = true;
        self.left_down = true;
        self
    }

    pub fn hold(mut self) -> Self {
        self.left_down = true;
        self
    }

    pub fn release(mut self) -> Self {
        self.left_released = true;
        self
    }

    pub fn with_action(mut self, action: EditorAction) -> Self {
        self.actions.push(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_items() {
        let items = MenuItem::all();
        assert_eq!(items.len(), 1 + EntityKind::ALL.len());
        assert_eq!(items[0].label(), "Add quad");
        assert_eq!(MenuItem::Place(EntityKind::Mirror).label(), "Place mirror");
    }

    #[test]
    fn test_builders() {
        let input = FrameInput::at(Vec2::ONE).press().with_action(EditorAction::Cancel);
        assert!(input.left_pressed && input.left_down && !input.left_released);
        assert_eq!(input.actions, vec![EditorAction::Cancel]);
    }
}
