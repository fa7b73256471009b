//! Scene camera
//!
//! A 2D camera expressed in logical game pixels: the world point `target`
//! appears at the game-space point `offset`, scaled by `zoom` and rotated by
//! `rotation` degrees. Converted into a macroquad `Camera2D` only when drawing.

use crate::config::GameConfig;
use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    /// World point the camera looks at
    pub target: Vec2,
    /// Game-space point where `target` is drawn
    pub offset: Vec2,
    /// Magnification (1.0 = one world pixel per game pixel)
    pub zoom: f32,
    /// Rotation in degrees
    pub rotation: f32,
}

impl SceneCamera {
    /// Camera centered on the logical game area
    pub fn centered(config: &GameConfig) -> Self {
        let center = config.game_center();
        Self {
            target: center,
            offset: center,
            zoom: 1.0,
            rotation: 0.0,
        }
    }

    /// Reset to the default view (what every scene starts with)
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::centered(config);
    }

    /// Project a world point into game space
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let rotated = Vec2::from_angle(self.rotation.to_radians()).rotate((world - self.target) * self.zoom);
        rotated + self.offset
    }

    /// Project a game-space point back into the world
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let unrotated = Vec2::from_angle(-self.rotation.to_radians()).rotate(screen - self.offset);
        unrotated / self.zoom + self.target
    }

    /// Build the macroquad camera drawing into a `game_width` x `game_height` area.
    ///
    /// Pass the render target the game is drawn into, if any.
    pub fn to_camera2d(&self, config: &GameConfig, render_target: Option<RenderTarget>) -> Camera2D {
        let (w, h) = (config.game_width, config.game_height);
        Camera2D {
            target: self.target,
            rotation: self.rotation,
            zoom: vec2(2.0 * self.zoom / w, -2.0 * self.zoom / h),
            offset: vec2(2.0 * self.offset.x / w - 1.0, 1.0 - 2.0 * self.offset.y / h),
            render_target,
            ..Default::default()
        }
    }
}
