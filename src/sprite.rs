//! Textured bodies
//!
//! A `Sprite` is a [`Body`] with something to draw. The texture is optional so
//! sprites can be built and simulated before (or without) loading art.

use crate::assets::{load_texture_file, AssetError};
use crate::body::Body;
use crate::node::{Node, NodeFlags, SceneLink};
use crate::scene::SceneContext;
use macroquad::prelude::*;
use std::path::Path;

pub struct Sprite {
    pub body: Body,
    pub texture: Option<Texture2D>,
    pub scale: Vec2,
    pub tint: Color,
    /// Draw the hitbox outline and position marker
    pub debug: bool,
}

impl Sprite {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::at(x, y),
            texture: None,
            scale: vec2(1.0, 1.0),
            tint: WHITE,
            debug: false,
        }
    }

    /// Load a texture and size the hitbox to it.
    pub fn load_texture<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AssetError> {
        let texture = load_texture_file(path)?;
        self.set_texture(texture);
        Ok(())
    }

    /// Use an already loaded texture and size the hitbox to it.
    pub fn set_texture(&mut self, texture: Texture2D) {
        self.body.set_hitbox_size(texture.width(), texture.height());
        self.texture = Some(texture);
    }

    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = vec2(x, y);
    }
}

impl Node for Sprite {
    fn flags(&self) -> &NodeFlags {
        &self.body.flags
    }

    fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.body.flags
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        self.body.update(dt, ctx);
        if ctx.input().toggle_debug {
            self.debug = !self.debug;
        }
    }

    fn draw(&self) {
        if let Some(texture) = &self.texture {
            let size = vec2(texture.width(), texture.height()) * self.scale;
            draw_texture_ex(
                texture,
                self.body.position.x,
                self.body.position.y,
                self.tint,
                DrawTextureParams {
                    dest_size: Some(size),
                    rotation: self.body.rotation.to_radians(),
                    pivot: Some(self.body.position),
                    ..Default::default()
                },
            );
        }
        if self.debug {
            self.body.draw_debug();
        }
    }

    fn attach(&mut self, link: SceneLink) {
        self.body.attach(link);
    }
}
