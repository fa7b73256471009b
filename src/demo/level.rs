//! Platformer level loaded from LDtk

use super::player::Player;
use super::{MAP_PATH, PLAYGROUND, SPAWN_MARKER, SWITCH_KEY};
use macroquad::prelude::*;
use sine::{FrameInput, GameConfig, GameState, NodeHandle, Scene};

pub struct LevelState {
    scene: Scene,
    player: NodeHandle,
    show_grid: bool,
}

impl LevelState {
    pub fn new(config: &GameConfig) -> Self {
        let mut scene = Scene::new(config);
        if let Err(e) = scene.load_ldtk(MAP_PATH) {
            log::error!("level map unavailable: {}", e);
        }

        let spawn = match scene.marker(SPAWN_MARKER) {
            Some(marker) => marker.point(),
            None => {
                log::warn!("no '{}' marker, spawning at the screen center", SPAWN_MARKER);
                config.game_center()
            }
        };
        let player = scene.add(Player::new(spawn.x, spawn.y));

        Self {
            scene,
            player,
            show_grid: false,
        }
    }

    pub fn player(&self) -> Option<&Player> {
        self.scene.get(self.player)
    }
}

impl GameState for LevelState {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn update(&mut self, dt: f32, input: &FrameInput) {
        self.scene.update(dt, input);
        if input.toggle_debug {
            self.show_grid = !self.show_grid;
        }
        if is_key_pressed(SWITCH_KEY) {
            self.scene.request_switch(PLAYGROUND);
        }
    }

    fn draw(&self) {
        self.scene.draw();
        if self.show_grid {
            self.scene.with_camera(|| self.scene.draw_collision_debug(DARKGRAY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_spawns_on_marker() {
        let level = LevelState::new(&GameConfig::default());
        let map = level.scene.map().expect("demo map should load");
        assert_eq!(map.levels, vec!["Demo".to_string()]);

        let player = level.player().unwrap();
        assert_eq!(player.sprite.body.position, vec2(48.0, 304.0));
        // Spawn cell is open, the one below is floor
        assert!(!level.scene.grid().is_solid(ivec2(3, 19)));
        assert!(level.scene.grid().is_solid(ivec2(3, 20)));
    }
}
