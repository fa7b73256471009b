//! Letterboxed viewport
//!
//! The game renders at a fixed logical resolution and is scaled uniformly
//! into the window, with black bars filling the rest.

use macroquad::prelude::*;

/// Uniform scale and centering offset that fit the game area into the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Window pixels per game pixel
    pub scale: f32,
    /// Top-left corner of the game area in window pixels
    pub offset: Vec2,
    /// Logical game size
    pub game: Vec2,
}

impl Letterbox {
    /// Fit a game area of size `game` into a window of size `screen`
    pub fn fit(screen: Vec2, game: Vec2) -> Self {
        let scale = (screen.x / game.x).min(screen.y / game.y);
        let offset = (screen - game * scale) * 0.5;
        Self { scale, offset, game }
    }

    /// False for an empty (e.g. minimized) window, where nothing maps back
    pub fn has_area(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }

    /// Map a window-space point into game coordinates.
    /// `None` while the window has no area.
    pub fn try_to_virtual(&self, point: Vec2) -> Option<Vec2> {
        self.has_area().then(|| (point - self.offset) / self.scale)
    }

    /// Like [`Letterbox::try_to_virtual`], falling back to the game origin
    pub fn to_virtual(&self, point: Vec2) -> Vec2 {
        self.try_to_virtual(point).unwrap_or(Vec2::ZERO)
    }

    /// Map a game-space point into window coordinates
    pub fn to_window(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.offset
    }

    /// Window rectangle covered by the game area
    pub fn dest_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.game.x * self.scale,
            self.game.y * self.scale,
        )
    }
}

/// Blit a render target texture into the window with black bars.
///
/// Render targets drawn through a `Camera2D` end up vertically flipped, so the
/// blit flips them back.
pub fn draw_letterboxed(texture: &Texture2D, letterbox: &Letterbox) {
    clear_background(BLACK);
    let dest = letterbox.dest_rect();
    draw_texture_ex(
        texture,
        dest.x,
        dest.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(dest.w, dest.h)),
            flip_y: true,
            ..Default::default()
        },
    );
}
