//! Editor keymap
//!
//! Maps keyboard shortcuts to `EditorAction`s. Bindings can be changed at runtime;
//! rebinding a shortcut that is already taken moves it to the new action.

use std::collections::HashMap;

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

use super::input::EditorAction;

/// A keyboard shortcut (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key: KeyCode,
    pub ctrl: bool, // Cmd on Mac
    pub shift: bool,
}

impl Shortcut {
    pub fn key(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self {
            ctrl: true,
            ..Self::key(key)
        }
    }

    /// Format for display ("Ctrl+C", "Del")
    pub fn display(&self) -> String {
        let mut out = String::new();
        if self.ctrl {
            out.push_str("Ctrl+");
        }
        if self.shift {
            out.push_str("Shift+");
        }
        out.push_str(key_name(self.key));
        out
    }
}

fn key_name(key: KeyCode) -> &'static str {
    match key {
        KeyCode::C => "C",
        KeyCode::F => "F",
        KeyCode::R => "R",
        KeyCode::Escape => "Esc",
        KeyCode::Delete => "Del",
        KeyCode::Backspace => "Backspace",
        KeyCode::Minus => "-",
        KeyCode::Equal => "=",
        KeyCode::LeftBracket => "[",
        KeyCode::RightBracket => "]",
        _ => "?",
    }
}

/// Shortcut table for the editor
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Shortcut, EditorAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.bind(Shortcut::key(KeyCode::C), EditorAction::EnterCut);
        keymap.bind(Shortcut::key(KeyCode::R), EditorAction::EnterRotate);
        keymap.bind(Shortcut::key(KeyCode::Escape), EditorAction::Cancel);
        keymap.bind(Shortcut::key(KeyCode::F), EditorAction::FlipNormals);
        keymap.bind(Shortcut::key(KeyCode::Delete), EditorAction::DeleteSelection);
        keymap.bind(Shortcut::key(KeyCode::Backspace), EditorAction::DeleteSelection);
        keymap.bind(Shortcut::key(KeyCode::Equal), EditorAction::GridFiner);
        keymap.bind(Shortcut::key(KeyCode::RightBracket), EditorAction::GridFiner);
        keymap.bind(Shortcut::key(KeyCode::Minus), EditorAction::GridCoarser);
        keymap.bind(Shortcut::key(KeyCode::LeftBracket), EditorAction::GridCoarser);
        keymap
    }
}

impl Keymap {
    /// Bind `shortcut` to `action`, returning the action it was bound to before
    pub fn bind(&mut self, shortcut: Shortcut, action: EditorAction) -> Option<EditorAction> {
        self.bindings.insert(shortcut, action)
    }

    pub fn unbind(&mut self, shortcut: &Shortcut) -> Option<EditorAction> {
        self.bindings.remove(shortcut)
    }

    pub fn action_for(&self, shortcut: &Shortcut) -> Option<EditorAction> {
        self.bindings.get(shortcut).copied()
    }

    /// Shortcuts bound to `action`, sorted by display name
    pub fn shortcuts_for(&self, action: EditorAction) -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(s, _)| *s)
            .collect();
        shortcuts.sort_by_key(|s| s.display());
        shortcuts
    }

    /// Actions whose shortcut was pressed this frame
    pub fn poll(&self) -> Vec<EditorAction> {
        let ctrl = is_key_down(KeyCode::LeftControl)
            || is_key_down(KeyCode::RightControl)
            || is_key_down(KeyCode::LeftSuper)
            || is_key_down(KeyCode::RightSuper);
        let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);

        let mut actions: Vec<EditorAction> = self
            .bindings
            .iter()
            .filter(|(s, _)| s.ctrl == ctrl && s.shift == shift && is_key_pressed(s.key))
            .map(|(_, a)| *a)
            .collect();
        actions.dedup();
        actions
    }
}
