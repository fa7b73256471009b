//! Scenes
//!
//! A scene is a group of nodes plus everything they share:
//! - a camera (reset on every `start`)
//! - the tile collision grid, tile draw lists and markers of a loaded map
//! - the virtual mouse position in logical game pixels
//!
//! Nodes never hold a pointer back to their scene. The scene passes a
//! [`SceneContext`] into every update instead; what a node keeps is a
//! [`SceneLink`] naming which scene adopted it.

mod switcher;

pub use switcher::{SceneSwitcher, SwitchError};

use crate::camera::SceneCamera;
use crate::config::GameConfig;
use crate::input::FrameInput;
use crate::node::{AsAny, Group, Node, NodeFlags, NodeHandle, SceneLink};
use crate::tilemap::{MapError, TileGrid, TileMap, TilesetTextures};
use crate::viewport::Letterbox;
use macroquad::prelude::*;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Id handed out by the [`SceneSwitcher`], starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u32);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one scene instance. Never reused, so a rebuilt scene gets a
/// new key even though it keeps its [`SceneId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey(u64);

impl SceneKey {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Structural changes requested during a traversal, applied right after it
#[derive(Default)]
pub struct SceneCommands {
    spawn: Vec<Box<dyn Node>>,
    despawn: Vec<NodeHandle>,
    switch_to: Option<SceneId>,
}

impl SceneCommands {
    pub fn spawn<N: Node>(&mut self, node: N) {
        self.spawn.push(Box::new(node));
    }

    pub fn despawn(&mut self, handle: NodeHandle) {
        self.despawn.push(handle);
    }

    /// Ask the switcher to change scenes once this frame's update is done
    pub fn switch_to(&mut self, id: SceneId) {
        self.switch_to = Some(id);
    }

    pub fn is_empty(&self) -> bool {
        self.spawn.is_empty() && self.despawn.is_empty() && self.switch_to.is_none()
    }
}

/// What a node can see of its scene during `update`
pub struct SceneContext<'a> {
    scene: SceneKey,
    grid: &'a TileGrid,
    input: &'a FrameInput,
    virtual_mouse: Vec2,
    pub camera: &'a mut SceneCamera,
    pub commands: &'a mut SceneCommands,
}

impl<'a> SceneContext<'a> {
    pub fn new(
        scene: SceneKey,
        grid: &'a TileGrid,
        input: &'a FrameInput,
        virtual_mouse: Vec2,
        camera: &'a mut SceneCamera,
        commands: &'a mut SceneCommands,
    ) -> Self {
        Self {
            scene,
            grid,
            input,
            virtual_mouse,
            camera,
            commands,
        }
    }

    pub fn scene(&self) -> SceneKey {
        self.scene
    }

    pub fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    pub fn input(&self) -> &'a FrameInput {
        self.input
    }

    /// Mouse position in logical game pixels
    pub fn virtual_mouse(&self) -> Vec2 {
        self.virtual_mouse
    }

    pub fn tile_size(&self) -> f32 {
        self.grid.tile_size()
    }

    /// Solid tile rectangles around a pixel position
    pub fn physics_rects_around(&self, pos: Vec2) -> Vec<Rect> {
        self.grid.rects_around(pos)
    }
}

/// A screen of the game, as seen by the [`SceneSwitcher`].
///
/// Implementors wrap a [`Scene`] and override the hooks they need; the
/// defaults forward to the scene.
pub trait GameState: AsAny {
    fn scene(&self) -> &Scene;
    fn scene_mut(&mut self) -> &mut Scene;

    /// Runs every time this state becomes the active one.
    /// Overrides should call `self.scene_mut().start()` first.
    fn start(&mut self) {
        self.scene_mut().start();
    }

    fn update(&mut self, dt: f32, input: &FrameInput) {
        self.scene_mut().update(dt, input);
    }

    fn draw(&self) {
        self.scene().draw();
    }
}

pub struct Scene {
    pub camera: SceneCamera,
    config: GameConfig,
    key: SceneKey,
    id: Option<SceneId>,
    group: Group,
    grid: TileGrid,
    map: Option<TileMap>,
    tilesets: TilesetTextures,
    virtual_mouse: Vec2,
    commands: SceneCommands,
    pending_switch: Option<SceneId>,
    render_target: Option<RenderTarget>,
}

impl Scene {
    pub fn new(config: &GameConfig) -> Self {
        let key = SceneKey::next();
        let mut group = Group::new();
        group.attach_all(SceneLink { scene: key });
        Self {
            camera: SceneCamera::centered(config),
            config: config.clone(),
            key,
            id: None,
            group,
            grid: TileGrid::new(config.tile_size),
            map: None,
            tilesets: TilesetTextures::new(),
            virtual_mouse: Vec2::ZERO,
            commands: SceneCommands::default(),
            pending_switch: None,
            render_target: None,
        }
    }

    pub fn key(&self) -> SceneKey {
        self.key
    }

    /// Id assigned by the switcher, if this scene is registered
    pub fn id(&self) -> Option<SceneId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: SceneId) {
        self.id = Some(id);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset per-load state. Runs each time the scene becomes active.
    pub fn start(&mut self) {
        self.camera.reset(&self.config);
    }

    /// Take ownership of a node and link it to this scene.
    /// Groups pass the link on to members added to them later.
    pub fn add<N: Node>(&mut self, node: N) -> NodeHandle {
        self.add_boxed(Box::new(node))
    }

    pub fn add_boxed(&mut self, node: Box<dyn Node>) -> NodeHandle {
        self.group.add(node)
    }

    /// Destroy and drop a node immediately
    pub fn remove(&mut self, handle: NodeHandle) -> bool {
        self.group.remove(handle)
    }

    pub fn get<T: Node>(&self, handle: NodeHandle) -> Option<&T> {
        self.group.get(handle)
    }

    pub fn get_mut<T: Node>(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.group.get_mut(handle)
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Recompute the virtual mouse, then update every active child.
    /// Commands queued by children are applied once all of them have run.
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        // A minimized window keeps last frame's position
        let letterbox = Letterbox::fit(input.screen, self.config.game_size());
        if let Some(mouse) = letterbox.try_to_virtual(input.mouse) {
            self.virtual_mouse = mouse;
        }

        let mut ctx = SceneContext::new(
            self.key,
            &self.grid,
            input,
            self.virtual_mouse,
            &mut self.camera,
            &mut self.commands,
        );
        self.group.update(dt, &mut ctx);

        self.apply_commands();
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for handle in commands.despawn {
            self.group.remove(handle);
        }
        for node in commands.spawn {
            self.add_boxed(node);
        }
        if let Some(id) = commands.switch_to {
            self.pending_switch = Some(id);
        }
    }

    /// Draw the map, then the children, through the scene camera
    pub fn draw(&self) {
        self.with_camera(|| {
            self.draw_map();
            self.group.draw();
        });
    }

    /// Run `f` with the scene camera applied
    pub fn with_camera(&self, f: impl FnOnce()) {
        push_camera_state();
        set_camera(&self.camera.to_camera2d(&self.config, self.render_target.clone()));
        f();
        pop_camera_state();
    }

    pub fn set_render_target(&mut self, target: Option<RenderTarget>) {
        self.render_target = target;
    }

    /// Mouse position in logical game pixels, as of the last update
    pub fn virtual_mouse(&self) -> Vec2 {
        self.virtual_mouse
    }

    /// Queue a switch for the [`SceneSwitcher`] to perform after this update
    pub fn request_switch(&mut self, id: SceneId) {
        self.pending_switch = Some(id);
    }

    pub(crate) fn take_switch_request(&mut self) -> Option<SceneId> {
        self.pending_switch.take()
    }

    // =========================================================================
    // Tilemap
    // =========================================================================

    /// Load an LDtk map: collision grid, draw lists, markers and tilesets.
    pub fn load_ldtk<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MapError> {
        let map = TileMap::load(path)?;
        let tilesets = TilesetTextures::acquire(&map)?;
        self.set_map(map);
        self.tilesets = tilesets;
        Ok(())
    }

    /// Install an already parsed map, releasing the previous map's tileset
    /// textures. Tile layers draw nothing until their tileset is loaded,
    /// so use [`Scene::load_ldtk`] for maps that draw tiles.
    pub fn set_map(&mut self, mut map: TileMap) {
        self.grid = std::mem::take(&mut map.grid);
        self.map = Some(map);
        self.tilesets = TilesetTextures::new();
    }

    /// Tileset textures currently held for the map
    pub fn tilesets(&self) -> &TilesetTextures {
        &self.tilesets
    }

    pub fn map(&self) -> Option<&TileMap> {
        self.map.as_ref()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn tile_size(&self) -> f32 {
        self.grid.tile_size()
    }

    pub fn physics_rects_around(&self, pos: Vec2) -> Vec<Rect> {
        self.grid.rects_around(pos)
    }

    /// Placement of a named map marker
    pub fn marker(&self, name: &str) -> Option<Rect> {
        self.map.as_ref()?.marker(name)
    }

    /// Draw every visible tile layer
    pub fn draw_map(&self) {
        for layer in self.map.iter().flat_map(|m| &m.layers) {
            if layer.visible {
                self.tilesets.draw_layer(layer);
            }
        }
    }

    /// Draw the visible layers of one level
    pub fn draw_map_level(&self, level: &str) {
        for layer in self.map.iter().flat_map(|m| &m.layers) {
            if layer.visible && layer.level == level {
                self.tilesets.draw_layer(layer);
            }
        }
    }

    /// Draw the named layer in every level, visible or not
    pub fn draw_map_layer(&self, name: &str) {
        for layer in self.map.iter().flat_map(|m| &m.layers) {
            if layer.name == name {
                self.tilesets.draw_layer(layer);
            }
        }
    }

    /// Outline every solid cell
    pub fn draw_collision_debug(&self, color: Color) {
        for cell in self.grid.solid_cells() {
            let r = self.grid.cell_rect(cell);
            draw_rectangle_lines(r.x, r.y, r.w, r.h, 1.0, color);
        }
    }
}

impl GameState for Scene {
    fn scene(&self) -> &Scene {
        self
    }

    fn scene_mut(&mut self) -> &mut Scene {
        self
    }
}

impl Node for Scene {
    fn flags(&self) -> &NodeFlags {
        &self.group.flags
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.group.flags
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        Scene::update(self, dt, ctx.input());
    }

    fn draw(&self) {
        Scene::draw(self);
    }

    fn destroy(&mut self) {
        self.group.destroy();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::node::Basic;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Copies what it sees of the context into shared cells
    struct Watcher {
        flags: NodeFlags,
        mouse: Rc<Cell<Vec2>>,
    }

    impl Node for Watcher {
        fn flags(&self) -> &NodeFlags {
            &self.flags
        }

        fn flags_mut(&mut self) -> &mut NodeFlags {
            &mut self.flags
        }

        fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) {
            self.mouse.set(ctx.virtual_mouse());
            ctx.camera.zoom = 3.0;
        }
    }

    /// Spawns a body and asks for a switch on its first update
    struct Spawner {
        flags: NodeFlags,
        victim: Option<NodeHandle>,
    }

    impl Node for Spawner {
        fn flags(&self) -> &NodeFlags {
            &self.flags
        }

        fn flags_mut(&mut self) -> &mut NodeFlags {
            &mut self.flags
        }

        fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) {
            ctx.commands.spawn(Body::at(1.0, 2.0));
            if let Some(victim) = self.victim.take() {
                ctx.commands.despawn(victim);
            }
            ctx.commands.switch_to(SceneId(2));
        }
    }

    #[test]
    fn test_children_see_this_frames_virtual_mouse() {
        let mut scene = Scene::new(&GameConfig::default());
        let seen = Rc::new(Cell::new(Vec2::ZERO));
        scene.add(Watcher {
            flags: NodeFlags::default(),
            mouse: Rc::clone(&seen),
        });

        // 1600x720 window: 2x scale with 160px side bars
        let input = FrameInput::at(vec2(1600.0, 720.0), vec2(800.0, 360.0));
        scene.update(0.016, &input);

        assert_eq!(seen.get(), vec2(320.0, 180.0));
        assert_eq!(scene.virtual_mouse(), vec2(320.0, 180.0));
        // Children may drive the camera
        assert_eq!(scene.camera.zoom, 3.0);
    }

    #[test]
    fn test_minimized_window_keeps_last_virtual_mouse() {
        let mut scene = Scene::new(&GameConfig::default());
        scene.update(0.016, &FrameInput::at(vec2(1280.0, 720.0), vec2(640.0, 360.0)));
        assert_eq!(scene.virtual_mouse(), vec2(320.0, 180.0));

        scene.update(0.016, &FrameInput::at(Vec2::ZERO, vec2(10.0, 10.0)));
        assert_eq!(scene.virtual_mouse(), vec2(320.0, 180.0));
    }

    #[test]
    fn test_start_resets_camera() {
        let config = GameConfig::default();
        let mut scene = Scene::new(&config);
        scene.camera.zoom = 0.2;
        scene.camera.target = vec2(-100.0, 7.0);
        scene.start();
        assert_eq!(scene.camera, SceneCamera::centered(&config));
    }

    #[test]
    fn test_added_bodies_collide_with_scene_grid() {
        let mut scene = Scene::new(&GameConfig::default());
        scene.grid_mut().set_solid(ivec2(7, 6), true);

        let mut body = Body::at(100.0, 100.0);
        body.velocity = vec2(50.0, 0.0);
        let handle = scene.add(body);
        assert_eq!(scene.get::<Body>(handle).unwrap().link(), Some(SceneLink { scene: scene.key() }));

        scene.update(0.016, &FrameInput::default());
        let body = scene.get::<Body>(handle).unwrap();
        assert!(body.collisions.right);
        assert_eq!(body.hitbox.x, 96.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_nested_group_members_collide() {
        let mut scene = Scene::new(&GameConfig::default());
        scene.grid_mut().set_solid(ivec2(7, 6), true);
        let group = scene.add(Group::new());

        let mut body = Body::at(100.0, 100.0);
        body.velocity = vec2(50.0, 0.0);
        let inner = scene.get_mut::<Group>(group).unwrap().add(Box::new(body));

        scene.update(0.016, &FrameInput::default());
        let body = scene.get::<Group>(group).unwrap().get::<Body>(inner).unwrap();
        assert_eq!(body.link(), Some(SceneLink { scene: scene.key() }));
        assert!(body.collisions.right);
        assert_eq!(body.hitbox.x, 96.0);
    }

    #[test]
    fn test_commands_apply_after_traversal() {
        let mut scene = Scene::new(&GameConfig::default());
        let victim = scene.add(Basic::new());
        scene.add(Spawner {
            flags: NodeFlags::default(),
            victim: Some(victim),
        });
        assert_eq!(scene.group().len(), 2);

        scene.update(0.016, &FrameInput::default());

        assert!(scene.get::<Basic>(victim).is_none());
        assert_eq!(scene.group().len(), 2);
        let (_, spawned) = scene.group().iter().last().unwrap();
        let spawned = spawned.as_any().downcast_ref::<Body>().unwrap();
        // Spawned nodes are adopted like any other
        assert_eq!(spawned.link(), Some(SceneLink { scene: scene.key() }));
        assert_eq!(scene.take_switch_request(), Some(SceneId(2)));
        assert_eq!(scene.take_switch_request(), None);
    }

    #[test]
    fn test_physics_rects_and_markers_from_map() {
        let json = r#"{ "levels": [ { "identifier": "L", "worldX": 0, "worldY": 0, "layerInstances": [
            { "__identifier": "Markers", "__type": "Entities", "__gridSize": 16, "entityInstances": [
                { "__identifier": "Spawn", "px": [48, 32], "width": 16, "height": 16,
                  "fieldInstances": [ { "__identifier": "Name", "__value": "Start" } ] } ] },
            { "__identifier": "Collision", "__type": "IntGrid", "__gridSize": 16, "__cWid": 3, "__cHei": 3,
              "intGridCsv": [0, 0, 0, 0, 0, 0, 1, 1, 1] }
        ] } ] }"#;
        let mut scene = Scene::new(&GameConfig::default());
        scene.set_map(TileMap::from_json(json, Path::new(".")).unwrap());
        assert!(scene.tilesets().is_empty());

        assert_eq!(scene.tile_size(), 16.0);
        assert_eq!(scene.marker("Start"), Some(Rect::new(48.0, 32.0, 16.0, 16.0)));
        assert_eq!(scene.marker("Missing"), None);

        let rects = scene.physics_rects_around(vec2(20.0, 20.0));
        assert_eq!(rects.len(), 3);
        assert!(rects.contains(&Rect::new(16.0, 32.0, 16.0, 16.0)));
        assert!(scene.physics_rects_around(vec2(200.0, 200.0)).is_empty());
    }

    #[test]
    fn test_scene_keys_are_unique() {
        let config = GameConfig::default();
        let a = Scene::new(&config);
        let b = Scene::new(&config);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_destroy_cascades_to_children() {
        let mut scene = Scene::new(&GameConfig::default());
        let child = scene.add(Basic::new());
        Node::destroy(&mut scene);
        assert!(!scene.is_active());
        assert!(!scene.get::<Basic>(child).unwrap().is_active());
    }
}
