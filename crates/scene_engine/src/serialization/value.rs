//! Primitive encodings
//!
//! Each persisted scalar type knows how to turn itself into a TOML value and
//! back. Single-precision floats widen to `f64` on the way out and narrow
//! back exactly. Vectors, rotations and colors are flat float arrays.

use std::path::PathBuf;

use toml::Value;

use crate::foundation::math::{quat_from_xyzw, quat_to_xyzw, Color, Quat, Vec2, Vec3, Vec4};

/// A value that can live under a key of a [`super::SerializedObject`]
pub trait SerializedValue: Sized {
    /// Encode into a document value
    fn to_value(&self) -> Value;

    /// Decode from a document value, `None` if the value has the wrong shape
    fn from_value(value: &Value) -> Option<Self>;
}

impl SerializedValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl SerializedValue for i32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer().and_then(|v| i32::try_from(v).ok())
    }
}

impl SerializedValue for u32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer().and_then(|v| u32::try_from(v).ok())
    }
}

impl SerializedValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl SerializedValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            // Hand-edited files often write `1` where `1.0` is meant
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl SerializedValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl SerializedValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl SerializedValue for PathBuf {
    fn to_value(&self) -> Value {
        // Forward slashes keep scene files portable between platforms
        Value::String(self.to_string_lossy().replace('\\', "/"))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(PathBuf::from)
    }
}

fn floats_to_value(floats: &[f32]) -> Value {
    Value::Array(floats.iter().map(SerializedValue::to_value).collect())
}

fn value_to_floats<const N: usize>(value: &Value) -> Option<[f32; N]> {
    let array = value.as_array()?;
    if array.len() != N {
        return None;
    }

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(array) {
        *slot = f32::from_value(item)?;
    }
    Some(out)
}

impl SerializedValue for Vec2 {
    fn to_value(&self) -> Value {
        floats_to_value(&[self.x, self.y])
    }

    fn from_value(value: &Value) -> Option<Self> {
        value_to_floats::<2>(value).map(|[x, y]| Self::new(x, y))
    }
}

impl SerializedValue for Vec3 {
    fn to_value(&self) -> Value {
        floats_to_value(&[self.x, self.y, self.z])
    }

    fn from_value(value: &Value) -> Option<Self> {
        value_to_floats::<3>(value).map(|[x, y, z]| Self::new(x, y, z))
    }
}

impl SerializedValue for Vec4 {
    fn to_value(&self) -> Value {
        floats_to_value(&[self.x, self.y, self.z, self.w])
    }

    fn from_value(value: &Value) -> Option<Self> {
        value_to_floats::<4>(value).map(|[x, y, z, w]| Self::new(x, y, z, w))
    }
}

impl SerializedValue for Quat {
    fn to_value(&self) -> Value {
        floats_to_value(&quat_to_xyzw(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value_to_floats::<4>(value).map(|[x, y, z, w]| quat_from_xyzw(x, y, z, w))
    }
}

impl SerializedValue for Color {
    fn to_value(&self) -> Value {
        floats_to_value(&self.to_array())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value_to_floats::<4>(value).map(Self::from_array)
    }
}

impl SerializedValue for Vec<String> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(SerializedValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(String::from_value).collect()
    }
}
