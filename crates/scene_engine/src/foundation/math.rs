//! Math utilities and types
//!
//! Only the value types that components persist live here: vectors,
//! rotations and colors. Heavier math stays with the external collaborators.

pub use nalgebra::{Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Build a rotation from raw quaternion coordinates without renormalizing.
///
/// Persisted rotations must come back bit-for-bit, so the coordinates are
/// trusted as written.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    Unit::new_unchecked(Quaternion::new(w, x, y, z))
}

/// Raw `[x, y, z, w]` coordinates of a rotation
pub fn quat_to_xyzw(q: &Quat) -> [f32; 4] {
    let c = q.quaternion().coords;
    [c.x, c.y, c.z, c.w]
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a new color
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as an array in RGBA order
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create a color from an RGBA array
    pub const fn from_array(rgba: [f32; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
