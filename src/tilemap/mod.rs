//! Tilemaps and tile collision
//!
//! LDtk projects are parsed into a collision grid, per-tileset draw lists and
//! named markers. The grid is what dynamic bodies collide against.

mod grid;
pub mod ldtk;
mod map;
mod textures;

pub use grid::{TileGrid, NEIGHBORHOOD};
pub use map::{MapError, TileLayer, TileMap, TileSprite, COLLISION_LAYER, MARKER_NAME_FIELD};
pub use textures::TilesetTextures;
