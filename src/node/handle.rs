//! Node Handles with Generational Indices
//!
//! A group hands out a handle for every node it takes ownership of.
//! - Each slot has a generation counter
//! - When a node is removed, its slot can be reused
//! - The generation increments on reuse, invalidating old handles
//!
//! Game code keeps handles instead of pointers into the group, so a handle to
//! a removed enemy can never reach whatever node later reused its slot.

/// A reference to a node owned by a [`Group`](super::Group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Allocates handles and tracks which ones are still alive.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// Free slots available for reuse (LIFO)
    free_indices: Vec<u32>,
    alive_count: u32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle.
    pub fn allocate(&mut self) -> NodeHandle {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped on free
            NodeHandle::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            NodeHandle::new(index, 0)
        }
    }

    /// Free a handle. Returns false if it was already stale.
    pub fn free(&mut self, handle: NodeHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        self.generations[handle.index as usize] += 1;
        self.free_indices.push(handle.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, handle: NodeHandle) -> bool {
        self.generations
            .get(handle.index as usize)
            .is_some_and(|&gen| gen == handle.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Invalidate every outstanding handle.
    pub fn clear(&mut self) {
        for gen in &mut self.generations {
            *gen += 1;
        }
        self.free_indices = (0..self.generations.len() as u32).rev().collect();
        self.alive_count = 0;
    }
}
