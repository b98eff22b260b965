//! Variable types, values, and their byte encodings.
//!
//! Every variable occupies a fixed number of bytes in the blackboard's
//! variable segment.  Encodings are little-endian and padding-free:
//!
//! | Type     | Size     | Encoding                                   |
//! |----------|----------|--------------------------------------------|
//! | `Bool`   | 1        | `0` / `1`                                  |
//! | `Int`    | 4        | `i32` LE                                   |
//! | `Float`  | 4        | `f32` LE                                   |
//! | `Vec2`   | 8        | `x`, `y` as `f32` LE                       |
//! | `Vec3`   | 12       | `x`, `y`, `z` as `f32` LE                  |
//! | `String` | declared | UTF-8, zero-padded to the declared size    |
//! | `Entity` | 4        | `EntityId` as `u32` LE                     |

use std::fmt;

use bt_core::{EntityId, Vec2, Vec3};

// ── VarType ───────────────────────────────────────────────────────────────────

/// Declared type of a blackboard variable.
///
/// `Invalid` is the sentinel returned by lookups on undeclared names.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum VarType {
    Invalid,
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    String,
    Entity,
}

impl VarType {
    /// Encoded size in bytes, or `None` for variable-capacity `String`.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            VarType::Bool => Some(1),
            VarType::Int | VarType::Float | VarType::Entity => Some(4),
            VarType::Vec2 => Some(8),
            VarType::Vec3 => Some(12),
            VarType::String | VarType::Invalid => None,
        }
    }

    /// `true` for types that accept a min/max range.
    pub const fn is_numeric(self) -> bool {
        matches!(self, VarType::Int | VarType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Invalid => "invalid",
            VarType::Bool    => "bool",
            VarType::Int     => "int",
            VarType::Float   => "float",
            VarType::Vec2    => "vec2",
            VarType::Vec3    => "vec3",
            VarType::String  => "string",
            VarType::Entity  => "entity",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── VarValue ──────────────────────────────────────────────────────────────────

/// A dynamically typed variable value, used for defaults and generic access.
///
/// Hot-path code should prefer the statically typed
/// [`AgentBlackboard::get`][crate::AgentBlackboard::get] /
/// [`set`][crate::AgentBlackboard::set] with a [`VarData`] type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Str(String),
    Entity(EntityId),
}

impl VarValue {
    pub fn var_type(&self) -> VarType {
        match self {
            VarValue::Bool(_)   => VarType::Bool,
            VarValue::Int(_)    => VarType::Int,
            VarValue::Float(_)  => VarType::Float,
            VarValue::Vec2(_)   => VarType::Vec2,
            VarValue::Vec3(_)   => VarType::Vec3,
            VarValue::Str(_)    => VarType::String,
            VarValue::Entity(_) => VarType::Entity,
        }
    }

    /// Number of meaningful bytes this value encodes to.  For strings this is
    /// the UTF-8 length, which must fit the declared capacity.
    pub fn encoded_len(&self) -> usize {
        match self {
            VarValue::Str(s) => s.len(),
            other => other.var_type().fixed_size().unwrap_or(0),
        }
    }

    /// Write the encoding into `out`, which must be exactly the slot size.
    /// Strings are zero-padded; callers check `encoded_len() <= out.len()`.
    pub(crate) fn encode_into(&self, out: &mut [u8]) {
        match self {
            VarValue::Bool(v)   => v.encode(out),
            VarValue::Int(v)    => v.encode(out),
            VarValue::Float(v)  => v.encode(out),
            VarValue::Vec2(v)   => v.encode(out),
            VarValue::Vec3(v)   => v.encode(out),
            VarValue::Entity(v) => v.encode(out),
            VarValue::Str(s) => {
                let n = s.len();
                out[..n].copy_from_slice(s.as_bytes());
                out[n..].fill(0);
            }
        }
    }

    /// Decode a slot.  Returns `None` for `Invalid` or non-UTF-8 string bytes.
    pub(crate) fn decode(ty: VarType, bytes: &[u8]) -> Option<VarValue> {
        Some(match ty {
            VarType::Bool   => VarValue::Bool(bool::decode(bytes)),
            VarType::Int    => VarValue::Int(i32::decode(bytes)),
            VarType::Float  => VarValue::Float(f32::decode(bytes)),
            VarType::Vec2   => VarValue::Vec2(Vec2::decode(bytes)),
            VarType::Vec3   => VarValue::Vec3(Vec3::decode(bytes)),
            VarType::Entity => VarValue::Entity(EntityId::decode(bytes)),
            VarType::String => VarValue::Str(string_content(bytes)?.to_owned()),
            VarType::Invalid => return None,
        })
    }

    /// Numeric view used for range clamping and comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VarValue::Int(v)   => Some(*v as f64),
            VarValue::Float(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<bool> for VarValue {
    fn from(v: bool) -> Self { VarValue::Bool(v) }
}
impl From<i32> for VarValue {
    fn from(v: i32) -> Self { VarValue::Int(v) }
}
impl From<f32> for VarValue {
    fn from(v: f32) -> Self { VarValue::Float(v) }
}
impl From<Vec2> for VarValue {
    fn from(v: Vec2) -> Self { VarValue::Vec2(v) }
}
impl From<Vec3> for VarValue {
    fn from(v: Vec3) -> Self { VarValue::Vec3(v) }
}
impl From<EntityId> for VarValue {
    fn from(v: EntityId) -> Self { VarValue::Entity(v) }
}
impl From<&str> for VarValue {
    fn from(v: &str) -> Self { VarValue::Str(v.to_owned()) }
}
impl From<String> for VarValue {
    fn from(v: String) -> Self { VarValue::Str(v) }
}

/// The text held by a string slot: UTF-8 up to the first NUL, followed only
/// by NUL padding.  `None` for anything else.
pub(crate) fn string_content(bytes: &[u8]) -> Option<&str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    if bytes[end..].iter().any(|&b| b != 0) {
        return None;
    }
    std::str::from_utf8(&bytes[..end]).ok()
}

// ── VarData ───────────────────────────────────────────────────────────────────

/// A fixed-size Rust type that maps 1:1 onto a [`VarType`].
///
/// `encode` / `decode` operate on a slice of exactly `SIZE` bytes.
pub trait VarData: Copy + Sized {
    const TYPE: VarType;
    const SIZE: usize;

    fn encode(&self, out: &mut [u8]);
    fn decode(bytes: &[u8]) -> Self;
}

#[inline]
fn f32_at(bytes: &[u8], i: usize) -> f32 {
    f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
}

impl VarData for bool {
    const TYPE: VarType = VarType::Bool;
    const SIZE: usize = 1;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[0] = *self as u8;
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl VarData for i32 {
    const TYPE: VarType = VarType::Int;
    const SIZE: usize = 4;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl VarData for f32 {
    const TYPE: VarType = VarType::Float;
    const SIZE: usize = 4;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        f32_at(bytes, 0)
    }
}

impl VarData for Vec2 {
    const TYPE: VarType = VarType::Vec2;
    const SIZE: usize = 8;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        Vec2::new(f32_at(bytes, 0), f32_at(bytes, 4))
    }
}

impl VarData for Vec3 {
    const TYPE: VarType = VarType::Vec3;
    const SIZE: usize = 12;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.z.to_le_bytes());
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        Vec3::new(f32_at(bytes, 0), f32_at(bytes, 4), f32_at(bytes, 8))
    }
}

impl VarData for EntityId {
    const TYPE: VarType = VarType::Entity;
    const SIZE: usize = 4;

    #[inline]
    fn encode(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.0.to_le_bytes());
    }
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        EntityId(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
