//! Scene switching
//!
//! Scenes are registered as factories. Slot 0 always holds the active scene;
//! every other slot holds at most a dormant instance that is never updated.
//!
//! Switching never reuses a scene:
//! 1. The active scene is destroyed and rebuilt from its own factory, so the
//!    dormant copy left behind is clean.
//! 2. The target slot is swapped into slot 0 and built fresh.
//! 3. The new active scene is started.
//!
//! Unknown ids are rejected before anything is rebuilt.

use super::{GameState, SceneId};
use crate::config::GameConfig;
use crate::input::FrameInput;
use crate::node::Node;
use macroquad::prelude::RenderTarget;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwitchError {
    #[error("no scenes registered")]
    NoScenes,
    #[error("no scene registered with id {0}")]
    UnknownScene(SceneId),
}

type Factory = Box<dyn Fn(&GameConfig) -> Box<dyn GameState>>;

struct Slot {
    id: SceneId,
    factory: Factory,
    instance: Option<Box<dyn GameState>>,
}

pub struct SceneSwitcher {
    config: GameConfig,
    slots: Vec<Slot>,
    last_id: u32,
    render_target: Option<RenderTarget>,
}

impl SceneSwitcher {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            last_id: 0,
            render_target: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Render target handed to every scene built from now on (and the live ones)
    pub fn set_render_target(&mut self, target: Option<RenderTarget>) {
        for instance in self.slots.iter_mut().filter_map(|s| s.instance.as_mut()) {
            instance.scene_mut().set_render_target(target.clone());
        }
        self.render_target = target;
    }

    /// Register a scene factory. The first registration is built and started
    /// immediately; later ones stay unbuilt until switched to.
    pub fn register<S, F>(&mut self, factory: F) -> SceneId
    where
        S: GameState,
        F: Fn(&GameConfig) -> S + 'static,
    {
        self.last_id += 1;
        let id = SceneId(self.last_id);
        self.slots.push(Slot {
            id,
            factory: Box::new(move |config| Box::new(factory(config))),
            instance: None,
        });
        log::info!("registered scene {}", id);

        if self.slots.len() == 1 {
            let mut instance = self.manufacture(0);
            instance.start();
            self.slots[0].instance = Some(instance);
        }
        id
    }

    /// Make `id` the active scene, rebuilding both the outgoing and incoming scenes.
    pub fn switch_to(&mut self, id: SceneId) -> Result<(), SwitchError> {
        if self.slots.is_empty() {
            return Err(SwitchError::NoScenes);
        }
        let index = self
            .slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(SwitchError::UnknownScene(id))?;
        let from = self.slots[0].id;

        self.rebuild_active();
        if index != 0 {
            self.slots.swap(0, index);
            self.rebuild_active();
        }

        if let Some(active) = self.slots[0].instance.as_mut() {
            active.start();
        }
        log::info!("switched scene {} -> {}", from, id);
        Ok(())
    }

    /// Update the active scene, then perform any switch it requested
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        let request = match self.active_mut() {
            Some(active) => {
                active.update(dt, input);
                active.scene_mut().take_switch_request()
            }
            None => return,
        };
        if let Some(target) = request {
            if let Err(e) = self.switch_to(target) {
                log::warn!("scene switch rejected: {}", e);
            }
        }
    }

    pub fn draw(&self) {
        if let Some(active) = self.active() {
            active.draw();
        }
    }

    pub fn active_id(&self) -> Option<SceneId> {
        self.slots.first().map(|s| s.id)
    }

    pub fn active(&self) -> Option<&dyn GameState> {
        self.slots.first()?.instance.as_deref()
    }

    pub fn active_mut(&mut self) -> Option<&mut dyn GameState> {
        self.slots.first_mut()?.instance.as_deref_mut()
    }

    /// The active scene as its concrete type
    pub fn active_as<T: GameState>(&self) -> Option<&T> {
        self.active()?.as_any().downcast_ref::<T>()
    }

    pub fn active_as_mut<T: GameState>(&mut self) -> Option<&mut T> {
        self.active_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Whatever instance a slot currently holds, active or dormant
    pub fn instance_as<T: GameState>(&self, id: SceneId) -> Option<&T> {
        let slot = self.slots.iter().find(|s| s.id == id)?;
        slot.instance.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Registered ids in slot order (active first)
    pub fn ids(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Destroy every instance and forget every registration.
    /// Ids are not reused afterwards.
    pub fn unload_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(mut instance) = slot.instance.take() {
                instance.scene_mut().destroy();
            }
        }
        self.slots.clear();
        log::info!("unloaded all scenes");
    }

    /// Replace slot 0's instance with a fresh, unstarted one
    fn rebuild_active(&mut self) {
        if let Some(mut old) = self.slots[0].instance.take() {
            old.scene_mut().destroy();
        }
        let instance = self.manufacture(0);
        self.slots[0].instance = Some(instance);
    }

    fn manufacture(&self, index: usize) -> Box<dyn GameState> {
        let slot = &self.slots[index];
        let mut instance = (slot.factory)(&self.config);
        let scene = instance.scene_mut();
        scene.set_id(slot.id);
        scene.set_render_target(self.render_target.clone());
        instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Scene that knows which construction it was and how often it started
    struct Counted {
        scene: Scene,
        label: &'static str,
        serial: u32,
        starts: u32,
        switch_on_update: Option<SceneId>,
    }

    impl GameState for Counted {
        fn scene(&self) -> &Scene {
            &self.scene
        }

        fn scene_mut(&mut self) -> &mut Scene {
            &mut self.scene
        }

        fn start(&mut self) {
            self.scene.start();
            self.starts += 1;
        }

        fn update(&mut self, dt: f32, input: &FrameInput) {
            self.scene.update(dt, input);
            if let Some(id) = self.switch_on_update {
                self.scene.request_switch(id);
            }
        }
    }

    fn counted(label: &'static str, built: &Rc<Cell<u32>>) -> impl Fn(&GameConfig) -> Counted {
        let built = Rc::clone(built);
        move |config| {
            built.set(built.get() + 1);
            Counted {
                scene: Scene::new(config),
                label,
                serial: built.get(),
                starts: 0,
                switch_on_update: None,
            }
        }
    }

    fn active(switcher: &SceneSwitcher) -> (&'static str, u32, u32) {
        let s = switcher.active_as::<Counted>().unwrap();
        (s.label, s.serial, s.starts)
    }

    #[test]
    fn test_ids_increase_and_only_first_starts() {
        let built_a = Rc::new(Cell::new(0));
        let built_b = Rc::new(Cell::new(0));
        let built_c = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());

        let a = switcher.register(counted("a", &built_a));
        let b = switcher.register(counted("b", &built_b));
        let c = switcher.register(counted("c", &built_c));

        assert_eq!((a, b, c), (SceneId(1), SceneId(2), SceneId(3)));
        assert_eq!(switcher.len(), 3);
        assert_eq!(switcher.active_id(), Some(a));
        assert_eq!(active(&switcher), ("a", 1, 1));
        assert_eq!((built_a.get(), built_b.get(), built_c.get()), (1, 0, 0));
        assert!(switcher.instance_as::<Counted>(b).is_none());
    }

    #[test]
    fn test_switch_rebuilds_both_sides() {
        let built_a = Rc::new(Cell::new(0));
        let built_b = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        let a = switcher.register(counted("a", &built_a));
        let b = switcher.register(counted("b", &built_b));

        switcher.switch_to(b).unwrap();
        assert_eq!(switcher.active_id(), Some(b));
        assert_eq!(active(&switcher), ("b", 1, 1));
        let dormant_a = switcher.instance_as::<Counted>(a).unwrap();
        assert_eq!((dormant_a.serial, dormant_a.starts), (2, 0));

        switcher.switch_to(a).unwrap();
        assert_eq!(switcher.active_id(), Some(a));
        assert_eq!(active(&switcher), ("a", 3, 1));
        let dormant_b = switcher.instance_as::<Counted>(b).unwrap();
        assert_eq!((dormant_b.serial, dormant_b.starts), (2, 0));
    }

    #[test]
    fn test_rebuilt_scenes_keep_their_id() {
        let built = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        let a = switcher.register(counted("a", &built));
        let b = switcher.register(counted("b", &built));
        let first_key = switcher.active().unwrap().scene().key();

        switcher.switch_to(b).unwrap();
        assert_eq!(switcher.active().unwrap().scene().id(), Some(b));
        let dormant = switcher.instance_as::<Counted>(a).unwrap();
        assert_eq!(dormant.scene.id(), Some(a));
        assert_ne!(dormant.scene.key(), first_key);
    }

    #[test]
    fn test_switch_to_self_restarts_fresh() {
        let built = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        let a = switcher.register(counted("a", &built));

        switcher.switch_to(a).unwrap();
        assert_eq!(active(&switcher), ("a", 2, 1));
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn test_unknown_id_is_rejected_without_rebuild() {
        let built = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        switcher.register(counted("a", &built));

        assert_eq!(switcher.switch_to(SceneId(42)), Err(SwitchError::UnknownScene(SceneId(42))));
        assert_eq!(active(&switcher), ("a", 1, 1));
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn test_empty_switcher() {
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        assert_eq!(switcher.switch_to(SceneId(1)), Err(SwitchError::NoScenes));
        assert!(switcher.active().is_none());
        assert_eq!(switcher.active_id(), None);
        // Nothing to update
        switcher.update(0.016, &FrameInput::default());
    }

    #[test]
    fn test_switch_requested_during_update() {
        let built_a = Rc::new(Cell::new(0));
        let built_b = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        switcher.register(counted("a", &built_a));
        let b = switcher.register(counted("b", &built_b));

        switcher.active_as_mut::<Counted>().unwrap().switch_on_update = Some(b);
        switcher.update(0.016, &FrameInput::default());

        assert_eq!(switcher.active_id(), Some(b));
        assert_eq!(active(&switcher), ("b", 1, 1));
    }

    #[test]
    fn test_bad_request_during_update_is_ignored() {
        let built = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        let a = switcher.register(counted("a", &built));

        switcher.active_as_mut::<Counted>().unwrap().switch_on_update = Some(SceneId(9));
        switcher.update(0.016, &FrameInput::default());

        assert_eq!(switcher.active_id(), Some(a));
        assert_eq!(active(&switcher), ("a", 1, 1));
    }

    #[test]
    fn test_plain_scenes_can_be_registered() {
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        let id = switcher.register(Scene::new);
        assert_eq!(switcher.active_as::<Scene>().unwrap().id(), Some(id));
    }

    #[test]
    fn test_unload_all() {
        let built = Rc::new(Cell::new(0));
        let mut switcher = SceneSwitcher::new(GameConfig::default());
        switcher.register(counted("a", &built));
        switcher.register(counted("b", &built));

        switcher.unload_all();
        assert!(switcher.is_empty());
        assert!(switcher.active().is_none());

        // Fresh registrations continue the id sequence
        assert_eq!(switcher.register(counted("c", &built)), SceneId(3));
    }
}
