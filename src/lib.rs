//! SINE: a small 2D game scaffolding layer on top of macroquad
//!
//! Provides the pieces a tile-based 2D game is usually glued from:
//! - Scene-graph nodes with active/visible flags and lifecycle hooks
//! - Dynamic bodies with drag, gravity and axis-separated tile collision
//! - Sprites (textured bodies)
//! - Groups that own their members and forward update/draw
//! - Scenes with a camera, an LDtk tilemap and a tile collision grid
//! - A scene switcher that rebuilds scenes from factories on every switch
//!
//! Everything runs on one thread: one `update(dt)` and one `draw()` per frame.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assets;
pub mod body;
pub mod camera;
pub mod config;
pub mod input;
pub mod node;
pub mod scene;
pub mod sprite;
pub mod tilemap;
pub mod viewport;

pub use body::{Body, Collisions, Direction};
pub use camera::SceneCamera;
pub use config::GameConfig;
pub use input::FrameInput;
pub use node::{Basic, Group, Node, NodeFlags, NodeHandle};
pub use scene::{GameState, Scene, SceneCommands, SceneContext, SceneId, SceneSwitcher, SwitchError};
pub use sprite::Sprite;
pub use tilemap::{MapError, TileGrid, TileMap};
pub use viewport::Letterbox;
