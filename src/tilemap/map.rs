//! Tilemap loading
//!
//! Turns an LDtk project into what a scene consumes:
//! - a [`TileGrid`] from every layer named `collision`
//! - draw lists for every other tile layer, in draw order
//! - named markers from entity layers
//!
//! Loading does not touch the GPU. Tileset textures are acquired separately
//! by [`TilesetTextures`](super::TilesetTextures).

use super::grid::TileGrid;
use super::ldtk::{LayerType, LdtkLayer, LdtkLevel, LdtkProject};
use crate::assets::AssetError;
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifier that marks a layer as collision data
pub const COLLISION_LAYER: &str = "collision";

/// Custom field holding a marker's name
pub const MARKER_NAME_FIELD: &str = "Name";

/// Error type for tilemap loading
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read tilemap {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tilemap: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("entity '{entity}' in {level}/{layer} has no \"Name\" field")]
    MissingMarkerName {
        level: String,
        layer: String,
        entity: String,
    },
    #[error("layer {layer} has invalid grid size {size}")]
    InvalidGridSize { layer: String, size: i32 },
    #[error(transparent)]
    Texture(#[from] AssetError),
}

/// One tile to draw: where it goes and which part of the tileset it shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    /// World-space top-left corner
    pub dest: Vec2,
    /// Source rectangle inside the tileset image
    pub source: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Drawable tiles of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub level: String,
    pub name: String,
    /// Key into [`TileMap::tilesets`]
    pub tileset: String,
    pub visible: bool,
    pub tiles: Vec<TileSprite>,
}

#[derive(Debug, Clone, Default)]
pub struct TileMap {
    /// Solid cells from the collision layers
    pub grid: TileGrid,
    /// Tile layers in draw order (bottom first)
    pub layers: Vec<TileLayer>,
    /// Tileset name -> image path
    pub tilesets: HashMap<String, PathBuf>,
    /// Marker name -> world-space placement
    pub markers: HashMap<String, Rect>,
    /// Level identifiers in file order
    pub levels: Vec<String>,
}

impl TileMap {
    /// Load an LDtk project. Tileset paths resolve against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let map = Self::from_json(&json, base_dir)?;
        log::info!(
            "loaded tilemap {}: {} levels, {} layers, {} solid cells, {} markers",
            path.display(),
            map.levels.len(),
            map.layers.len(),
            map.grid.solid_count(),
            map.markers.len()
        );
        Ok(map)
    }

    /// Build from LDtk JSON text. `base_dir` is where relative tileset paths start.
    pub fn from_json(json: &str, base_dir: &Path) -> Result<Self, MapError> {
        let project: LdtkProject = serde_json::from_str(json)?;
        Self::from_project(&project, base_dir)
    }

    pub fn from_project(project: &LdtkProject, base_dir: &Path) -> Result<Self, MapError> {
        let levels = project.world_levels();
        let tile_size = levels
            .iter()
            .flat_map(level_layers)
            .find(|l| is_collision(l))
            .map(|l| l.grid_size)
            .unwrap_or(project.default_grid_size);
        if tile_size <= 0 {
            return Err(MapError::InvalidGridSize {
                layer: COLLISION_LAYER.to_string(),
                size: tile_size,
            });
        }

        let mut map = TileMap {
            grid: TileGrid::new(tile_size as f32),
            ..Default::default()
        };

        for level in levels {
            map.levels.push(level.identifier.clone());
            let layers = level_layers(level);
            if level.layer_instances.is_none() {
                log::warn!("level {} is stored externally, skipping its layers", level.identifier);
            }

            // LDtk lists layers top to bottom; draw bottom first
            for layer in layers.iter().rev() {
                let origin = ivec2(
                    level.world_x + layer.px_total_offset_x,
                    level.world_y + layer.px_total_offset_y,
                );
                match layer.layer_type {
                    LayerType::Entities => map.add_markers(level, layer, origin)?,
                    _ if is_collision(layer) => map.add_collision(layer, origin)?,
                    _ => map.add_tile_layer(project, base_dir, level, layer, origin),
                }
            }
        }

        Ok(map)
    }

    pub fn marker(&self, name: &str) -> Option<Rect> {
        self.markers.get(name).copied()
    }

    fn add_collision(&mut self, layer: &LdtkLayer, origin: IVec2) -> Result<(), MapError> {
        if layer.grid_size <= 0 {
            return Err(MapError::InvalidGridSize {
                layer: layer.identifier.clone(),
                size: layer.grid_size,
            });
        }
        let cell_size = layer.grid_size as f32;

        if layer.c_wid > 0 {
            for (i, &value) in layer.int_grid_csv.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                let i = i as i32;
                let local = vec2((i % layer.c_wid) as f32, (i / layer.c_wid) as f32) * cell_size;
                self.mark_solid(origin.as_vec2() + local);
            }
        }
        for tile in layer.tiles() {
            self.mark_solid(origin.as_vec2() + vec2(tile.px[0] as f32, tile.px[1] as f32));
        }
        Ok(())
    }

    fn mark_solid(&mut self, pixel: Vec2) {
        let cell = self.grid.cell_at(pixel);
        self.grid.set_solid(cell, true);
    }

    fn add_tile_layer(
        &mut self,
        project: &LdtkProject,
        base_dir: &Path,
        level: &LdtkLevel,
        layer: &LdtkLayer,
        origin: IVec2,
    ) {
        if layer.tiles().next().is_none() {
            return;
        }

        let def = layer.tileset_def_uid.and_then(|uid| project.tileset(uid));
        let rel_path = layer
            .tileset_rel_path
            .clone()
            .or_else(|| def.and_then(|d| d.rel_path.clone()));
        let Some(rel_path) = rel_path else {
            log::warn!("layer {}/{} has tiles but no tileset, skipping", level.identifier, layer.identifier);
            return;
        };
        let tileset = def.map(|d| d.identifier.clone()).unwrap_or_else(|| rel_path.clone());
        self.tilesets
            .entry(tileset.clone())
            .or_insert_with(|| base_dir.join(&rel_path));

        let size = layer.grid_size as f32;
        let tiles = layer
            .tiles()
            .map(|tile| TileSprite {
                dest: (origin + ivec2(tile.px[0], tile.px[1])).as_vec2(),
                source: Rect::new(tile.src[0] as f32, tile.src[1] as f32, size, size),
                flip_x: tile.f & 1 != 0,
                flip_y: tile.f & 2 != 0,
            })
            .collect();

        self.layers.push(TileLayer {
            level: level.identifier.clone(),
            name: layer.identifier.clone(),
            tileset,
            visible: layer.visible,
            tiles,
        });
    }

    fn add_markers(&mut self, level: &LdtkLevel, layer: &LdtkLayer, origin: IVec2) -> Result<(), MapError> {
        for entity in &layer.entity_instances {
            let name = entity
                .string_field(MARKER_NAME_FIELD)
                .ok_or_else(|| MapError::MissingMarkerName {
                    level: level.identifier.clone(),
                    layer: layer.identifier.clone(),
                    entity: entity.identifier.clone(),
                })?;
            let pos = origin + ivec2(entity.px[0], entity.px[1]);
            let rect = Rect::new(pos.x as f32, pos.y as f32, entity.width as f32, entity.height as f32);
            if self.markers.insert(name.to_string(), rect).is_some() {
                log::warn!("marker '{}' defined twice, keeping the last one", name);
            }
        }
        Ok(())
    }
}

fn level_layers(level: &LdtkLevel) -> &[LdtkLayer] {
    level.layer_instances.as_deref().unwrap_or(&[])
}

fn is_collision(layer: &LdtkLayer) -> bool {
    layer.layer_type != LayerType::Entities && layer.identifier.eq_ignore_ascii_case(COLLISION_LAYER)
}
