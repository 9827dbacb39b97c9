//! Sprite component
//!
//! Describes what the external renderer should draw for an entity. The
//! engine core only stores and persists it.

use std::path::PathBuf;

use crate::ecs::Component;
use crate::foundation::math::{Color, Vec2, Vec4};
use crate::registry::{Inspector, ReflectComponent};
use crate::serialization::SerializedObject;

/// Textured quad drawn by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    /// Texture file, relative to the project root
    pub texture: PathBuf,

    /// Color multiplied into the texture
    pub tint: Color,

    /// Sub-rectangle of the texture as (u, v, width, height)
    pub uv_rect: Vec4,

    /// Pivot in normalized sprite coordinates
    pub pivot: Vec2,

    /// Sorting layer (higher values render later)
    pub layer: i32,

    /// Tie-breaker within a layer
    pub sort_key: i64,

    /// Whether the sprite is drawn
    pub visible: bool,
}

impl Component for SpriteComponent {}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            texture: PathBuf::new(),
            tint: Color::WHITE,
            uv_rect: Vec4::new(0.0, 0.0, 1.0, 1.0),
            pivot: Vec2::new(0.5, 0.5),
            layer: 0,
            sort_key: 0,
            visible: true,
        }
    }
}

impl SpriteComponent {
    /// Sprite showing a whole texture
    pub fn new(texture: impl Into<PathBuf>) -> Self {
        Self {
            texture: texture.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: Set tint
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Builder pattern: Set layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Check if this component should be rendered
    pub fn should_render(&self) -> bool {
        self.visible && self.tint.a > 0.0
    }
}

impl ReflectComponent for SpriteComponent {
    fn serialize(&self, out: &mut SerializedObject) {
        out.set("Texture", self.texture.clone());
        out.set("Tint", self.tint);
        out.set("UvRect", self.uv_rect);
        out.set("Pivot", self.pivot);
        out.set("Layer", self.layer);
        out.set("SortKey", self.sort_key);
        out.set("Visible", self.visible);
    }

    fn deserialize(&mut self, data: &SerializedObject) {
        data.read_into("Texture", &mut self.texture);
        data.read_into("Tint", &mut self.tint);
        data.read_into("UvRect", &mut self.uv_rect);
        data.read_into("Pivot", &mut self.pivot);
        data.read_into("Layer", &mut self.layer);
        data.read_into("SortKey", &mut self.sort_key);
        data.read_into("Visible", &mut self.visible);
    }

    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        let mut changed = ui.edit_bool("Visible", &mut self.visible);
        changed |= ui.edit_path("Texture", &mut self.texture);
        changed |= ui.edit_color("Tint", &mut self.tint);
        changed |= ui.edit_vec2("Pivot", &mut self.pivot);
        changed |= ui.edit_i32("Layer", &mut self.layer);
        changed
    }
}
