//! Composite container
//!
//! A `Group` owns its members outright. Members are updated and drawn in
//! insertion order; inactive members are skipped by both passes and
//! invisible ones by `draw`.
//!
//! The group is mutably borrowed for the whole traversal, so members cannot
//! add or remove siblings mid-update. Structural changes requested from
//! inside an update go through `SceneCommands` and are applied by the scene
//! once the traversal is over.

use super::{HandleAllocator, Node, NodeFlags, NodeHandle, SceneLink};
use crate::scene::SceneContext;

struct Member {
    handle: NodeHandle,
    node: Box<dyn Node>,
}

#[derive(Default)]
pub struct Group {
    pub flags: NodeFlags,
    members: Vec<Member>,
    handles: HandleAllocator,
    /// Scene this group was adopted by; handed on to members added later
    link: Option<SceneLink>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a node. The returned handle identifies it from now on.
    pub fn add(&mut self, mut node: Box<dyn Node>) -> NodeHandle {
        if let Some(link) = self.link {
            node.attach(link);
        }
        let handle = self.handles.allocate();
        self.members.push(Member { handle, node });
        handle
    }

    /// Destroy and drop a member immediately.
    /// Returns false if the handle is stale or belongs to another group.
    pub fn remove(&mut self, handle: NodeHandle) -> bool {
        if !self.handles.free(handle) {
            return false;
        }
        match self.members.iter().position(|m| m.handle == handle) {
            Some(i) => {
                let mut member = self.members.remove(i);
                member.node.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroy and drop every member.
    pub fn clear(&mut self) {
        for member in &mut self.members {
            member.node.destroy();
        }
        self.members.clear();
        self.handles.clear();
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.handles.is_alive(handle)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Borrow a member as a trait object
    pub fn node(&self, handle: NodeHandle) -> Option<&dyn Node> {
        self.member(handle).map(|m| m.node.as_ref())
    }

    /// Borrow a member as its concrete type
    pub fn get<T: Node>(&self, handle: NodeHandle) -> Option<&T> {
        self.node(handle)?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a member as its concrete type
    pub fn get_mut<T: Node>(&mut self, handle: NodeHandle) -> Option<&mut T> {
        if !self.handles.is_alive(handle) {
            return None;
        }
        let member = self.members.iter_mut().find(|m| m.handle == handle)?;
        member.node.as_mut().as_any_mut().downcast_mut::<T>()
    }

    /// Members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &dyn Node)> {
        self.members.iter().map(|m| (m.handle, m.node.as_ref()))
    }

    pub fn link(&self) -> Option<SceneLink> {
        self.link
    }

    /// Link the group and every member to a scene
    pub(crate) fn attach_all(&mut self, link: SceneLink) {
        self.link = Some(link);
        for member in &mut self.members {
            member.node.attach(link);
        }
    }

    fn member(&self, handle: NodeHandle) -> Option<&Member> {
        if !self.handles.is_alive(handle) {
            return None;
        }
        self.members.iter().find(|m| m.handle == handle)
    }
}

impl Node for Group {
    fn flags(&self) -> &NodeFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.flags
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        for member in &mut self.members {
            if member.node.is_active() {
                member.node.update(dt, ctx);
            }
        }
    }

    fn draw(&self) {
        for member in &self.members {
            if member.node.is_active() && member.node.is_visible() {
                member.node.draw();
            }
        }
    }

    /// Cascades to every member.
    fn destroy(&mut self) {
        self.flags.active = false;
        for member in &mut self.members {
            member.node.destroy();
        }
    }

    fn attach(&mut self, link: SceneLink) {
        self.attach_all(link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::scene::testing::Harness;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every update into a shared log
    struct Probe {
        flags: NodeFlags,
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Box<Self> {
            Box::new(Self {
                flags: NodeFlags::default(),
                name,
                log: Rc::clone(log),
            })
        }
    }

    impl Node for Probe {
        fn flags(&self) -> &NodeFlags {
            &self.flags
        }

        fn flags_mut(&mut self) -> &mut NodeFlags {
            &mut self.flags
        }

        fn update(&mut self, _dt: f32, _ctx: &mut SceneContext<'_>) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_update_in_insertion_order_skipping_inactive() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = Group::new();
        group.add(Probe::boxed("a", &log));
        let b = group.add(Probe::boxed("b", &log));
        group.add(Probe::boxed("c", &log));

        group.get_mut::<Probe>(b).unwrap().destroy();

        let mut harness = Harness::new();
        group.update(0.016, &mut harness.context());
        assert_eq!(*log.borrow(), vec!["a", "c"]);

        // Soft-deleted members stay owned
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_invisible_members_still_update() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = Group::new();
        let a = group.add(Probe::boxed("a", &log));
        group.get_mut::<Probe>(a).unwrap().flags.visible = false;

        let mut harness = Harness::new();
        group.update(0.016, &mut harness.context());
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_remove_drops_immediately() {
        let mut group = Group::new();
        let a = group.add(Box::new(crate::node::Basic::new()));
        let b = group.add(Box::new(crate::node::Basic::new()));

        assert!(group.remove(a));
        assert_eq!(group.len(), 1);
        assert!(!group.contains(a));
        assert!(group.get::<crate::node::Basic>(a).is_none());

        // Second removal of the same handle is rejected
        assert!(!group.remove(a));
        assert!(group.contains(b));
    }

    #[test]
    fn test_stale_handle_does_not_reach_new_node() {
        let mut group = Group::new();
        let a = group.add(Box::new(crate::node::Basic::new()));
        group.remove(a);
        let b = group.add(Box::new(crate::node::Basic::new()));

        assert_eq!(a.index(), b.index());
        assert!(group.node(a).is_none());
        assert!(group.node(b).is_some());
    }

    #[test]
    fn test_destroy_cascades() {
        let mut inner = Group::new();
        inner.add(Box::new(crate::node::Basic::new()));
        let mut outer = Group::new();
        let inner_handle = outer.add(Box::new(inner));
        let leaf = outer.add(Box::new(crate::node::Basic::new()));

        outer.destroy();
        assert!(!outer.is_active());
        assert!(!outer.node(leaf).unwrap().is_active());
        let inner = outer.get::<Group>(inner_handle).unwrap();
        assert!(!inner.is_active());
        assert!(inner.iter().all(|(_, n)| !n.is_active()));
    }

    #[test]
    fn test_get_wrong_type_is_none() {
        let mut group = Group::new();
        let a = group.add(Box::new(crate::node::Basic::new()));
        assert!(group.get::<Group>(a).is_none());
        assert!(group.get::<crate::node::Basic>(a).is_some());
    }

    #[test]
    fn test_members_added_after_attach_are_linked() {
        let mut harness = Harness::new();
        harness.grid.set_solid(macroquad::math::ivec2(7, 6), true);

        let mut group = Group::new();
        group.attach(SceneLink { scene: harness.key });
        let mut body = Body::at(100.0, 100.0);
        body.velocity.x = 50.0;
        let handle = group.add(Box::new(body));
        assert_eq!(group.get::<Body>(handle).unwrap().link(), Some(SceneLink { scene: harness.key }));

        group.update(0.1, &mut harness.context());
        let body = group.get::<Body>(handle).unwrap();
        assert!(body.collisions.right);
        assert_eq!(body.hitbox.x, 96.0);
    }
}
