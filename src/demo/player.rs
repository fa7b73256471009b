//! Platformer player controller

use macroquad::prelude::*;
use sine::node::{Node, NodeFlags, SceneLink};
use sine::{SceneContext, Sprite};

pub const ACCELERATION: f32 = 900.0;
pub const MAX_SPEED: f32 = 120.0;
/// Horizontal slowdown while no direction is held
pub const STOP_DRAG: f32 = 800.0;
pub const JUMP_SPEED: f32 = 260.0;
pub const GRAVITY: f32 = 700.0;
/// Extra gravity while falling, for a snappier arc
pub const FALL_MULTIPLIER: f32 = 1.6;

pub const PLAYER_SIZE: Vec2 = vec2(12.0, 16.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Controls {
    pub fn poll() -> Self {
        Self {
            left: is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::D),
            jump: is_key_pressed(KeyCode::Space),
        }
    }
}

/// Where the player's controls come from each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSource {
    Keyboard,
    Fixed(Controls),
}

pub struct Player {
    pub sprite: Sprite,
    pub source: ControlSource,
    /// Keep the scene camera on the player
    pub follow: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        let mut sprite = Sprite::new(x, y);
        sprite.body.set_hitbox_size(PLAYER_SIZE.x, PLAYER_SIZE.y);
        sprite.body.gravity = GRAVITY;
        Self {
            sprite,
            source: ControlSource::Keyboard,
            follow: true,
        }
    }

    /// Turn controls into acceleration, drag and jumps for the next tick.
    /// Ground contact is whatever the previous tick resolved.
    pub fn steer(&mut self, controls: Controls) {
        let body = &mut self.sprite.body;
        let dir = controls.right as i32 - controls.left as i32;

        body.acceleration.x = dir as f32 * ACCELERATION;
        body.drag.x = if dir == 0 { STOP_DRAG } else { 0.0 };
        body.velocity.x = body.velocity.x.clamp(-MAX_SPEED, MAX_SPEED);

        if controls.jump && body.collisions.down {
            body.velocity.y = -JUMP_SPEED;
        }
        body.gravity = if body.velocity.y > 0.0 {
            GRAVITY * FALL_MULTIPLIER
        } else {
            GRAVITY
        };
    }

    pub fn center(&self) -> Vec2 {
        self.sprite.body.hitbox.center()
    }
}

impl Node for Player {
    fn flags(&self) -> &NodeFlags {
        self.sprite.flags()
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        self.sprite.flags_mut()
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        let controls = match self.source {
            ControlSource::Keyboard => Controls::poll(),
            ControlSource::Fixed(controls) => controls,
        };
        self.steer(controls);
        self.sprite.update(dt, ctx);
        if self.follow {
            ctx.camera.target = self.center().round();
        }
    }

    fn draw(&self) {
        let r = self.sprite.body.hitbox;
        draw_rectangle(r.x, r.y, r.w, r.h, SKYBLUE);
        self.sprite.draw();
    }

    fn attach(&mut self, link: SceneLink) {
        self.sprite.attach(link);
    }
}
