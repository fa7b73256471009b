//! Click-to-drop sandbox

use super::{LEVEL, SWITCH_KEY};
use macroquad::prelude::*;
use sine::{Body, FrameInput, GameConfig, GameState, NodeHandle, Scene};

const DROP_SIZE: f32 = 8.0;
const DROP_GRAVITY: f32 = 600.0;

pub struct Playground {
    scene: Scene,
    dropped: usize,
}

impl Playground {
    pub fn new(config: &GameConfig) -> Self {
        let mut scene = Scene::new(config);

        // Floor across the second to last row
        let tile = config.tile_size;
        let cols = (config.game_width / tile).ceil() as i32;
        let floor_row = (config.game_height / tile) as i32 - 2;
        for x in 0..cols {
            scene.grid_mut().set_solid(ivec2(x, floor_row), true);
        }

        Self { scene, dropped: 0 }
    }

    /// Drop a small falling body centered on a game-space point
    pub fn drop_at(&mut self, point: Vec2) -> NodeHandle {
        let world = self.scene.camera.screen_to_world(point);
        let half = DROP_SIZE / 2.0;
        let mut body = Body::new(world.x - half, world.y - half, DROP_SIZE, DROP_SIZE);
        body.gravity = DROP_GRAVITY;
        self.dropped += 1;
        log::debug!("dropped body {} at {:?}", self.dropped, world);
        self.scene.add(body)
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl GameState for Playground {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn update(&mut self, dt: f32, input: &FrameInput) {
        self.scene.update(dt, input);
        if is_mouse_button_pressed(MouseButton::Left) {
            self.drop_at(self.scene.virtual_mouse());
        }
        if is_key_pressed(SWITCH_KEY) {
            self.scene.request_switch(LEVEL);
        }
    }

    fn draw(&self) {
        self.scene.draw();
        self.scene.with_camera(|| {
            self.scene.draw_collision_debug(GRAY);
            draw_text("click to drop, P for the level", 8.0, 16.0, 16.0, WHITE);
        });
    }
}
