//! Debug drawing for the editor binary
//!
//! Everything is drawn in screen space through `EditorCamera::world_to_screen`.

use macroquad::prelude::*;

use super::camera::EditorCamera;
use super::drag::ActiveDrag;
use super::input::MenuItem;
use super::params::EditorParams;
use super::state::{ContextMenu, EditorMode, EditorSession};
use crate::world::{EdgeFlags, EntityFlags};

const BG_COLOR: Color = Color::new(0.11, 0.11, 0.13, 1.0);
const GRID_COLOR: Color = Color::new(0.2, 0.2, 0.23, 1.0);
const AXIS_COLOR: Color = Color::new(0.3, 0.3, 0.36, 1.0);
const EDGE_COLOR: Color = Color::new(0.8, 0.8, 0.85, 1.0);
const NORMAL_COLOR: Color = Color::new(0.35, 0.6, 0.9, 1.0);
const SELECTED_COLOR: Color = Color::new(1.0, 0.6, 0.2, 1.0);
const ENTITY_COLOR: Color = Color::new(0.4, 0.8, 0.4, 1.0);
const PREVIEW_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.4);
const TEXT_COLOR: Color = Color::new(0.8, 0.8, 0.85, 1.0);
const MENU_BG: Color = Color::new(0.176, 0.176, 0.196, 1.0);
const MENU_BORDER: Color = Color::new(0.314, 0.314, 0.314, 1.0);
const MENU_HOVER: Color = Color::new(0.235, 0.314, 0.392, 1.0);

const FONT_SIZE: f32 = 16.0;
/// Length of drawn normals in world units
const NORMAL_LENGTH: f32 = 0.25;
/// Skip grid lines closer than this many pixels
const MIN_GRID_SPACING: f32 = 6.0;

/// Screen rectangle of menu entry `index` (x, y, w, h)
pub fn menu_item_rect(anchor: Vec2, index: usize, params: &EditorParams) -> (f32, f32, f32, f32) {
    (
        anchor.x,
        anchor.y + params.menu_padding + index as f32 * params.menu_element_height,
        params.menu_width,
        params.menu_element_height,
    )
}

/// Menu entry under the cursor, given the menu's screen anchor
pub fn menu_item_at(menu: &ContextMenu, anchor: Vec2, mouse: Vec2, params: &EditorParams) -> Option<MenuItem> {
    menu.items.iter().enumerate().find_map(|(i, item)| {
        let (x, y, w, h) = menu_item_rect(anchor, i, params);
        let inside = mouse.x >= x && mouse.x < x + w && mouse.y >= y && mouse.y < y + h;
        inside.then_some(*item)
    })
}

pub fn draw_session(session: &EditorSession, camera: &EditorCamera) {
    let size = vec2(screen_width(), screen_height());
    clear_background(BG_COLOR);
    draw_grid(session, camera, size);

    let to_screen = |p: Vec2| camera.world_to_screen(p, size);
    let moving = match session.mode() {
        EditorMode::Select(state) => match &state.drag {
            ActiveDrag::Move(tracker) => Some(tracker),
            _ => None,
        },
        _ => None,
    };

    // Edges with their normals
    let graph = &session.level.edges;
    for (i, edge) in graph.edges().iter().enumerate() {
        let Some((a, b)) = graph.segment(i) else {
            continue;
        };
        let color = if edge.flags.contains(EdgeFlags::SELECTED) {
            SELECTED_COLOR
        } else {
            EDGE_COLOR
        };
        let (sa, sb) = (to_screen(a), to_screen(b));
        draw_line(sa.x, sa.y, sb.x, sb.y, 2.0, color);

        if let Some(normal) = graph.normal(i) {
            let mid = (a + b) * 0.5;
            let (m0, m1) = (to_screen(mid), to_screen(mid + normal * NORMAL_LENGTH));
            draw_line(m0.x, m0.y, m1.x, m1.y, 1.0, NORMAL_COLOR);
        }
    }

    for edge in graph.edges() {
        let p = to_screen(edge.vertex);
        let color = if edge.flags.contains(EdgeFlags::VERTEX_SELECTED) {
            SELECTED_COLOR
        } else {
            EDGE_COLOR
        };
        draw_rectangle(p.x - 3.0, p.y - 3.0, 6.0, 6.0, color);
    }

    for entity in session.level.entities.entities() {
        let corners = entity.bound_box.corners().map(to_screen);
        let color = if entity.flags.contains(EntityFlags::SELECTED) {
            SELECTED_COLOR
        } else {
            ENTITY_COLOR
        };
        for k in 0..4 {
            let (p0, p1) = (corners[k], corners[(k + 1) % 4]);
            draw_line(p0.x, p0.y, p1.x, p1.y, 1.5, color);
        }
        let c = to_screen(entity.bound_box.center);
        draw_text(entity.kind.label(), c.x + 4.0, c.y - 4.0, FONT_SIZE, color);
    }

    // Move preview
    if let Some(tracker) = moving {
        for (_, pos) in tracker.compute_new_positions() {
            let p = to_screen(pos);
            draw_rectangle_lines(p.x - 4.0, p.y - 4.0, 8.0, 8.0, 1.0, PREVIEW_COLOR);
        }
        for &(_, center) in &tracker.initial_entities {
            let p = to_screen(center + tracker.offset());
            draw_circle_lines(p.x, p.y, 5.0, 1.0, PREVIEW_COLOR);
        }
    }

    match session.mode() {
        EditorMode::Select(state) => {
            if let ActiveDrag::BoxSelect(tracker) = &state.drag {
                let bounds = tracker.bounds();
                let (p0, p1) = (to_screen(bounds.min), to_screen(bounds.max));
                let (x, y) = (p0.x.min(p1.x), p0.y.min(p1.y));
                draw_rectangle_lines(x, y, (p1.x - p0.x).abs(), (p1.y - p0.y).abs(), 1.0, PREVIEW_COLOR);
            }
        }
        EditorMode::Cut(tracker) => {
            if let Some(preview) = tracker.preview {
                let p = to_screen(preview.point);
                draw_circle(p.x, p.y, 4.0, SELECTED_COLOR);
            }
        }
        EditorMode::Rotate(tracker) => {
            let anchor = to_screen(tracker.anchor);
            let mouse = to_screen(session.mouse);
            draw_line(anchor.x, anchor.y, mouse.x, mouse.y, 1.0, PREVIEW_COLOR);
            draw_text(
                &format!("{:.1} deg", tracker.offset.to_degrees()),
                mouse.x + 8.0,
                mouse.y,
                FONT_SIZE,
                TEXT_COLOR,
            );
        }
    }

    if let Some(menu) = &session.context_menu {
        let mouse: Vec2 = mouse_position().into();
        draw_menu(menu, to_screen(menu.anchor), mouse, &session.params);
    }

    draw_text(&session.status_line(), 8.0, size.y - 8.0, FONT_SIZE, TEXT_COLOR);
    if let Some(status) = session.status() {
        draw_text(status, 8.0, size.y - 8.0 - FONT_SIZE, FONT_SIZE, SELECTED_COLOR);
    }
}

fn draw_grid(session: &EditorSession, camera: &EditorCamera, size: Vec2) {
    let cell = 1.0 / session.grid_scale;
    if cell * camera.unit_scale < MIN_GRID_SPACING {
        return;
    }
    let (min, max) = camera.visible_bounds(size);
    let mut x = (min.x / cell).floor() * cell;
    while x <= max.x {
        let sx = camera.world_to_screen(vec2(x, 0.0), size).x;
        let color = if x == 0.0 { AXIS_COLOR } else { GRID_COLOR };
        draw_line(sx, 0.0, sx, size.y, 1.0, color);
        x += cell;
    }
    let mut y = (min.y / cell).floor() * cell;
    while y <= max.y {
        let sy = camera.world_to_screen(vec2(0.0, y), size).y;
        let color = if y == 0.0 { AXIS_COLOR } else { GRID_COLOR };
        draw_line(0.0, sy, size.x, sy, 1.0, color);
        y += cell;
    }
}

fn draw_menu(menu: &ContextMenu, anchor: Vec2, mouse: Vec2, params: &EditorParams) {
    let height = params.menu_padding * 2.0 + menu.items.len() as f32 * params.menu_element_height;
    draw_rectangle(anchor.x, anchor.y, params.menu_width, height, MENU_BG);
    draw_rectangle_lines(anchor.x, anchor.y, params.menu_width, height, 1.0, MENU_BORDER);

    let hovered = menu_item_at(menu, anchor, mouse, params);
    for (i, item) in menu.items.iter().enumerate() {
        let (x, y, w, h) = menu_item_rect(anchor, i, params);
        if hovered == Some(*item) {
            draw_rectangle(x, y, w, h, MENU_HOVER);
        }
        draw_text(&item.label(), x + params.menu_padding, y + h * 0.75, FONT_SIZE, TEXT_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_at() {
        let params = EditorParams::default();
        let menu = ContextMenu::new(Vec2::ZERO);
        let anchor = vec2(100.0, 100.0);
        assert_eq!(menu_item_at(&menu, anchor, vec2(110.0, 110.0), &params), Some(MenuItem::AddQuad));
        let second = menu_item_at(&menu, anchor, vec2(110.0, 130.0), &params);
        assert_eq!(second, Some(menu.items[1]));
        assert_eq!(menu_item_at(&menu, anchor, vec2(90.0, 110.0), &params), None);
        assert_eq!(menu_item_at(&menu, anchor, vec2(110.0, 1000.0), &params), None);
    }
}
