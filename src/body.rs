//! Dynamic bodies
//!
//! A body moves by velocity, acceleration, drag and gravity, and resolves
//! collisions against the owning scene's tile grid one axis at a time.
//!
//! Tick order (load-bearing, diagonal approaches depend on it):
//! 1. Reset collision flags
//! 2. Drag pulls velocity toward zero without crossing it
//! 3. Integrate X, resolve X against the 3x3 tile neighborhood
//! 4. Acceleration.y = gravity, integrate Y, resolve Y

use crate::node::{Node, NodeFlags, SceneLink};
use crate::scene::SceneContext;
use crate::tilemap::TileGrid;
use macroquad::prelude::*;

/// Side of a body touched by a solid tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which sides touched solid tiles during the last tick.
/// Recomputed every tick, never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn get(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Move `start` toward `end` by at most `amount`, never past it.
pub fn move_towards(start: f32, end: f32, amount: f32) -> f32 {
    if start < end {
        (start + amount).min(end)
    } else if start > end {
        (start - amount).max(end)
    } else {
        end
    }
}

/// Strict overlap: rectangles that merely share an edge do not collide.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

#[derive(Debug, Clone)]
pub struct Body {
    pub flags: NodeFlags,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Deceleration per second on each axis
    pub drag: Vec2,
    /// Hitbox origin relative to `position`
    pub offset: Vec2,
    /// Always `position + offset` after a tick; size is fixed
    pub hitbox: Rect,
    /// Overrides `acceleration.y` every tick
    pub gravity: f32,
    pub rotation: f32,
    /// Collides with the tile grid
    pub solid: bool,
    pub collisions: Collisions,
    link: Option<SceneLink>,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(0.0, 0.0, 16.0, 16.0)
    }
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            flags: NodeFlags::default(),
            position: vec2(x, y),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            offset: Vec2::ZERO,
            hitbox: Rect::new(x, y, width, height),
            gravity: 0.0,
            rotation: 0.0,
            solid: true,
            collisions: Collisions::default(),
            link: None,
        }
    }

    /// Body at `(x, y)` with the default 16x16 hitbox
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 16.0, 16.0)
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = vec2(x, y);
        self.sync_hitbox();
    }

    pub fn set_hitbox_size(&mut self, width: f32, height: f32) {
        self.hitbox.w = width;
        self.hitbox.h = height;
    }

    /// Scene this body belongs to, if any
    pub fn link(&self) -> Option<SceneLink> {
        self.link
    }

    pub fn apply_drag(&mut self, dt: f32) {
        if self.drag.x != 0.0 {
            self.velocity.x = move_towards(self.velocity.x, 0.0, self.drag.x * dt);
        }
        if self.drag.y != 0.0 {
            self.velocity.y = move_towards(self.velocity.y, 0.0, self.drag.y * dt);
        }
    }

    /// Advance one tick, colliding against `grid` when given and `solid` is set.
    pub fn step(&mut self, dt: f32, grid: Option<&TileGrid>) {
        self.collisions.clear();
        self.apply_drag(dt);
        let grid = grid.filter(|_| self.solid);

        self.velocity.x += self.acceleration.x * dt;
        self.position.x += self.velocity.x * dt;
        self.hitbox.x = self.position.x + self.offset.x;
        if let Some(grid) = grid {
            self.resolve_x(grid);
        }

        self.acceleration.y = self.gravity;
        self.velocity.y += self.acceleration.y * dt;
        self.position.y += self.velocity.y * dt;
        self.hitbox.y = self.position.y + self.offset.y;
        if let Some(grid) = grid {
            self.resolve_y(grid);
        }
    }

    fn resolve_x(&mut self, grid: &TileGrid) {
        for tile in grid.rects_around(self.position) {
            if !rects_overlap(&self.hitbox, &tile) {
                continue;
            }
            if self.velocity.x > 0.0 {
                self.hitbox.x = tile.x - self.hitbox.w;
                self.collisions.right = true;
            } else if self.velocity.x < 0.0 {
                self.hitbox.x = tile.x + tile.w;
                self.collisions.left = true;
            }
            self.position.x = self.hitbox.x - self.offset.x;
            self.hitbox.x = self.position.x + self.offset.x;
        }
        if self.collisions.left || self.collisions.right {
            self.velocity.x = 0.0;
        }
    }

    fn resolve_y(&mut self, grid: &TileGrid) {
        for tile in grid.rects_around(self.position) {
            if !rects_overlap(&self.hitbox, &tile) {
                continue;
            }
            if self.velocity.y > 0.0 {
                self.hitbox.y = tile.y - self.hitbox.h;
                self.collisions.down = true;
            } else if self.velocity.y < 0.0 {
                self.hitbox.y = tile.y + tile.h;
                self.collisions.up = true;
            }
            self.position.y = self.hitbox.y - self.offset.y;
            self.hitbox.y = self.position.y + self.offset.y;
        }
        if self.collisions.up || self.collisions.down {
            self.velocity.y = 0.0;
        }
    }

    fn sync_hitbox(&mut self) {
        self.hitbox.x = self.position.x + self.offset.x;
        self.hitbox.y = self.position.y + self.offset.y;
    }

    /// Hitbox outline and position marker
    pub fn draw_debug(&self) {
        draw_rectangle_lines(self.hitbox.x, self.hitbox.y, self.hitbox.w, self.hitbox.h, 1.0, RED);
        draw_circle(self.position.x, self.position.y, 2.0, GREEN);
    }
}

impl Node for Body {
    fn flags(&self) -> &NodeFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.flags
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        if let Some(link) = self.link {
            if link.scene != ctx.scene() {
                log::debug!("body outlived its scene, dropping stale link");
                self.link = None;
            }
        }
        let grid = self.link.map(|_| ctx.grid());
        self.step(dt, grid);
    }

    fn draw(&self) {
        let center = vec2(self.hitbox.x + self.hitbox.w / 2.0, self.hitbox.y + self.hitbox.h / 2.0);
        draw_circle(center.x, center.y, 3.0, GREEN);
    }

    fn attach(&mut self, link: SceneLink) {
        self.link = Some(link);
    }
}
