//! Demo game states
//!
//! Two screens to poke at the library with:
//! - [`Playground`]: click to drop small bodies onto a floor
//! - [`LevelState`]: a platformer player in the LDtk demo map
//!
//! `P` flips between them.

mod level;
mod player;
mod playground;

pub use level::LevelState;
pub use playground::Playground;

use macroquad::prelude::KeyCode;
use sine::SceneId;

/// Ids the switcher hands out, in registration order
pub const PLAYGROUND: SceneId = SceneId(1);
pub const LEVEL: SceneId = SceneId(2);

pub const SWITCH_KEY: KeyCode = KeyCode::P;

pub const CONFIG_PATH: &str = "assets/config.ron";
pub const MAP_PATH: &str = "assets/maps/demo.ldtk";

/// Marker the player spawns on
pub const SPAWN_MARKER: &str = "PlayerSpawn";
