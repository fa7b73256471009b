//! Tileset textures owned by a scene
//!
//! Acquired when a map is loaded, released when the owner is dropped or a
//! new map replaces the old one.

use super::map::{TileLayer, TileMap};
use crate::assets::load_texture_file;
use crate::tilemap::MapError;
use macroquad::prelude::*;
use std::collections::HashMap;

#[derive(Default)]
pub struct TilesetTextures {
    textures: HashMap<String, Texture2D>,
}

impl TilesetTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every tileset the map draws with. Needs a live macroquad context.
    pub fn acquire(map: &TileMap) -> Result<Self, MapError> {
        let mut textures = HashMap::new();
        for (name, path) in &map.tilesets {
            log::info!("loading tileset {} from {}", name, path.display());
            textures.insert(name.clone(), load_texture_file(path)?);
        }
        Ok(Self { textures })
    }

    pub fn get(&self, tileset: &str) -> Option<&Texture2D> {
        self.textures.get(tileset)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Draw one layer's tiles with the current camera.
    /// Layers whose tileset was never loaded draw nothing.
    pub fn draw_layer(&self, layer: &TileLayer) {
        let Some(texture) = self.get(&layer.tileset) else {
            return;
        };
        for tile in &layer.tiles {
            draw_texture_ex(
                texture,
                tile.dest.x,
                tile.dest.y,
                WHITE,
                DrawTextureParams {
                    source: Some(tile.source),
                    flip_x: tile.flip_x,
                    flip_y: tile.flip_y,
                    ..Default::default()
                },
            );
        }
    }
}
