//! Editor camera
//!
//! Pans with a lerped velocity and zooms along a lerped 0..1 zoom factor that
//! maps onto `camera_zoom_min..camera_zoom_max` pixels per world unit. World Y
//! points up; screen Y points down.

use super::params::EditorParams;
use crate::math::Vec2;

#[derive(Debug, Clone)]
pub struct EditorCamera {
    pub center: Vec2,
    /// Pixels per world unit
    pub unit_scale: f32,
    velocity: Vec2,
    /// Zoom factor in 0..1
    zoom: f32,
    zoom_velocity: f32,
}

impl EditorCamera {
    pub fn new(params: &EditorParams) -> Self {
        let zoom = 0.25;
        Self {
            center: Vec2::ZERO,
            unit_scale: lerp(params.camera_zoom_min, params.camera_zoom_max, zoom),
            velocity: Vec2::ZERO,
            zoom,
            zoom_velocity: 0.0,
        }
    }

    /// Advance by `dt` seconds. `direction` is the raw pan input (each axis -1..1),
    /// `scroll` the wheel delta this frame.
    pub fn update(&mut self, params: &EditorParams, direction: Vec2, scroll: f32, dt: f32) {
        let target = direction.normalize_or_zero() * params.camera_speed;
        self.velocity = self.velocity.lerp(target, params.camera_move_lerp_t);
        self.center += self.velocity * dt;

        self.zoom_velocity = lerp(self.zoom_velocity, scroll * params.camera_zoom_speed, params.camera_zoom_lerp_t);
        self.zoom = (self.zoom + self.zoom_velocity * dt).clamp(0.0, 1.0);
        self.unit_scale = lerp(params.camera_zoom_min, params.camera_zoom_max, self.zoom);
    }

    pub fn screen_to_world(&self, screen: Vec2, screen_size: Vec2) -> Vec2 {
        let d = (screen - screen_size * 0.5) / self.unit_scale;
        Vec2::new(self.center.x + d.x, self.center.y - d.y)
    }

    pub fn world_to_screen(&self, world: Vec2, screen_size: Vec2) -> Vec2 {
        let d = (world - self.center) * self.unit_scale;
        Vec2::new(screen_size.x * 0.5 + d.x, screen_size.y * 0.5 - d.y)
    }

    /// World-space corners (min, max) of the visible area
    pub fn visible_bounds(&self, screen_size: Vec2) -> (Vec2, Vec2) {
        let half = screen_size * 0.5 / self.unit_scale;
        (self.center - half, self.center + half)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
