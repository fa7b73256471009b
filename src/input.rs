//! Per-frame input snapshot
//!
//! Scenes read the window size and mouse position from a value captured once
//! per frame instead of polling macroquad themselves, so scene logic can run
//! without a window.

use macroquad::prelude::*;

/// Key that toggles hitbox debug drawing
pub const DEBUG_TOGGLE_KEY: KeyCode = KeyCode::T;

/// Window-space input captured at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Physical window size in pixels
    pub screen: Vec2,
    /// Mouse position in physical window pixels
    pub mouse: Vec2,
    /// Debug toggle key was pressed this frame
    pub toggle_debug: bool,
}

impl FrameInput {
    /// Capture the current frame's input from macroquad
    pub fn poll() -> Self {
        let (mx, my) = mouse_position();
        Self {
            screen: vec2(screen_width(), screen_height()),
            mouse: vec2(mx, my),
            toggle_debug: is_key_pressed(DEBUG_TOGGLE_KEY),
        }
    }

    /// Input for a window of the given size with the mouse at `mouse`
    pub fn at(screen: Vec2, mouse: Vec2) -> Self {
        Self {
            screen,
            mouse,
            toggle_debug: false,
        }
    }
}
