//! LDtk project schema
//!
//! The subset of the LDtk JSON format the scene needs. Field names follow the
//! file format (LDtk prefixes computed fields with `__`). Unknown fields are
//! ignored so newer editor versions keep loading.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdtkProject {
    #[serde(default = "default_grid_size")]
    pub default_grid_size: i32,
    #[serde(default)]
    pub defs: Definitions,
    /// Levels of a single-world project
    #[serde(default)]
    pub levels: Vec<LdtkLevel>,
    /// Worlds of a multi-world project
    #[serde(default)]
    pub worlds: Vec<LdtkWorld>,
}

fn default_grid_size() -> i32 {
    16
}

impl LdtkProject {
    /// Levels of the first world, or the top-level levels in single-world mode
    pub fn world_levels(&self) -> &[LdtkLevel] {
        match self.worlds.first() {
            Some(world) if self.levels.is_empty() => &world.levels,
            _ => &self.levels,
        }
    }

    pub fn tileset(&self, uid: i64) -> Option<&TilesetDef> {
        self.defs.tilesets.iter().find(|t| t.uid == uid)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub tilesets: Vec<TilesetDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDef {
    pub uid: i64,
    pub identifier: String,
    /// Image path relative to the project file
    pub rel_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LdtkWorld {
    #[serde(default)]
    pub levels: Vec<LdtkLevel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdtkLevel {
    pub identifier: String,
    #[serde(default)]
    pub world_x: i32,
    #[serde(default)]
    pub world_y: i32,
    /// Null when levels are saved in separate files
    pub layer_instances: Option<Vec<LdtkLayer>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LayerType {
    IntGrid,
    Entities,
    Tiles,
    AutoLayer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdtkLayer {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__type")]
    pub layer_type: LayerType,
    #[serde(rename = "__gridSize")]
    pub grid_size: i32,
    #[serde(rename = "__cWid", default)]
    pub c_wid: i32,
    #[serde(rename = "__cHei", default)]
    pub c_hei: i32,
    #[serde(rename = "__tilesetDefUid", default)]
    pub tileset_def_uid: Option<i64>,
    #[serde(rename = "__tilesetRelPath", default)]
    pub tileset_rel_path: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub px_total_offset_x: i32,
    #[serde(default)]
    pub px_total_offset_y: i32,
    #[serde(default)]
    pub int_grid_csv: Vec<i64>,
    #[serde(default)]
    pub grid_tiles: Vec<LdtkTile>,
    #[serde(default)]
    pub auto_layer_tiles: Vec<LdtkTile>,
    #[serde(default)]
    pub entity_instances: Vec<LdtkEntity>,
}

fn default_visible() -> bool {
    true
}

impl LdtkLayer {
    /// Tiles drawn by this layer, whichever list the editor stored them in
    pub fn tiles(&self) -> impl Iterator<Item = &LdtkTile> {
        self.grid_tiles.iter().chain(self.auto_layer_tiles.iter())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LdtkTile {
    /// Pixel position inside the layer
    pub px: [i32; 2],
    /// Pixel position inside the tileset image
    pub src: [i32; 2],
    /// Flip bits: 1 = X, 2 = Y
    #[serde(default)]
    pub f: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdtkEntity {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    pub px: [i32; 2],
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub field_instances: Vec<LdtkField>,
}

impl LdtkEntity {
    /// String value of a custom field
    pub fn string_field(&self, name: &str) -> Option<&str> {
        self.field_instances
            .iter()
            .find(|f| f.identifier == name)
            .and_then(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LdtkField {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__value", default)]
    pub value: serde_json::Value,
}
