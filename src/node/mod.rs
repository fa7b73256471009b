//! Scene-graph nodes
//!
//! Every object living in a scene implements [`Node`]: plain nodes, bodies,
//! sprites, groups and scenes themselves. A node has two flags:
//! - `active`: updated and drawn. `destroy()` clears it (soft delete).
//! - `visible`: drawn. Invisible nodes keep updating.
//!
//! Containers skip inactive and invisible members but never remove them on
//! their own; removal is always explicit.

mod group;
mod handle;

pub use group::Group;
pub use handle::{HandleAllocator, NodeHandle};

use crate::scene::{SceneContext, SceneKey};
use std::any::Any;

/// Upcast to `Any` for typed access to boxed nodes and scenes.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Lifecycle flags shared by all nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeFlags {
    pub active: bool,
    pub visible: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            active: true,
            visible: true,
        }
    }
}

/// Non-owning relation from a node to the scene that owns it.
///
/// Assigned when a scene adopts the node. The node never reaches the scene
/// through it; scene queries arrive through the [`SceneContext`] passed to
/// `update`, and the link only says which scene's context the node may trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLink {
    pub scene: SceneKey,
}

pub trait Node: AsAny {
    fn flags(&self) -> &NodeFlags;
    fn flags_mut(&mut self) -> &mut NodeFlags;

    fn update(&mut self, _dt: f32, _ctx: &mut SceneContext<'_>) {}

    fn draw(&self) {}

    /// Soft delete: the node stops updating and drawing but stays owned.
    fn destroy(&mut self) {
        self.flags_mut().active = false;
    }

    /// Called by a scene when it takes ownership of the node.
    fn attach(&mut self, _link: SceneLink) {}

    fn is_active(&self) -> bool {
        self.flags().active
    }

    fn is_visible(&self) -> bool {
        self.flags().visible
    }
}

/// A node with nothing but lifecycle flags
#[derive(Debug, Clone, Default)]
pub struct Basic {
    pub flags: NodeFlags,
}

impl Basic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for Basic {
    fn flags(&self) -> &NodeFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.flags
    }
}
