//! Variable declarations.

use std::ops::BitOr;

use bt_core::VarKey;

use crate::{VarType, VarValue};

/// Capacity given to string variables declared through
/// [`VariableDefinition::new`] when the default is shorter.
pub const DEFAULT_STRING_CAPACITY: u32 = 32;

/// Largest byte capacity a string variable may declare.
pub const MAX_STRING_CAPACITY: u32 = 4_096;

// ── Flags ─────────────────────────────────────────────────────────────────────

/// Per-variable behavior flags.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarFlags(pub u8);

impl VarFlags {
    pub const NONE: VarFlags = VarFlags(0);
    /// Writes after spawn are rejected; the value is always the default.
    pub const READ_ONLY: VarFlags = VarFlags(1 << 0);
    /// The current value survives `AgentBlackboard::reset`.
    pub const PERSISTENT: VarFlags = VarFlags(1 << 1);

    #[inline]
    pub const fn contains(self, other: VarFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for VarFlags {
    type Output = VarFlags;
    fn bitor(self, rhs: VarFlags) -> VarFlags {
        VarFlags(self.0 | rhs.0)
    }
}

// ── Range ─────────────────────────────────────────────────────────────────────

/// Inclusive numeric bounds.  Writes to `Int`/`Float` variables are clamped.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarRange {
    pub min: f64,
    pub max: f64,
}

impl VarRange {
    #[inline]
    pub fn clamp_i32(&self, v: i32) -> i32 {
        (v as f64).clamp(self.min, self.max) as i32
    }

    #[inline]
    pub fn clamp_f32(&self, v: f32) -> f32 {
        (v as f64).clamp(self.min, self.max) as f32
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

// ── VariableDefinition ────────────────────────────────────────────────────────

/// One declared blackboard variable.
///
/// Build with [`new`](Self::new) (type and size inferred from the default),
/// [`string`](Self::string) (explicit capacity), or [`declare`](Self::declare)
/// (everything explicit, validated by the registry).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDefinition {
    pub name:    String,
    pub key:     VarKey,
    pub ty:      VarType,
    /// Slot size in bytes.
    pub size:    u32,
    pub default: VarValue,
    pub range:   Option<VarRange>,
    pub flags:   VarFlags,
}

impl VariableDefinition {
    /// Declare a variable whose type and size follow from `default`.
    pub fn new(name: impl Into<String>, default: impl Into<VarValue>) -> Self {
        let name = name.into();
        let default = default.into();
        let ty = default.var_type();
        let size = match ty.fixed_size() {
            Some(n) => n as u32,
            None => (default.encoded_len() as u32).max(DEFAULT_STRING_CAPACITY),
        };
        Self {
            key: VarKey::from_name(&name),
            name,
            ty,
            size,
            default,
            range: None,
            flags: VarFlags::NONE,
        }
    }

    /// Declare a string variable holding up to `capacity` bytes of UTF-8.
    pub fn string(name: impl Into<String>, capacity: u32, default: impl Into<String>) -> Self {
        let mut def = Self::new(name, VarValue::Str(default.into()));
        def.size = capacity;
        def
    }

    /// Fully explicit form; the registry rejects inconsistent combinations.
    pub fn declare(
        name:    impl Into<String>,
        ty:      VarType,
        size:    u32,
        default: impl Into<VarValue>,
    ) -> Self {
        let mut def = Self::new(name, default);
        def.ty = ty;
        def.size = size;
        def
    }

    /// Clamp writes to `[min, max]`.  Numeric types only.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(VarRange { min, max });
        self
    }

    pub fn with_flags(mut self, flags: VarFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check internal consistency.  Returns a human-readable reason on failure.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.ty == VarType::Invalid {
            return Err(format!("variable '{}' has the invalid type", self.name));
        }
        if self.default.var_type() != self.ty {
            return Err(format!(
                "variable '{}' declared as {} but its default is {}",
                self.name,
                self.ty,
                self.default.var_type()
            ));
        }
        match self.ty.fixed_size() {
            Some(n) if n as u32 != self.size => {
                return Err(format!(
                    "variable '{}' of type {} must be {n} bytes, declared {}",
                    self.name, self.ty, self.size
                ));
            }
            None if self.size == 0 => {
                return Err(format!("string variable '{}' needs a positive capacity", self.name));
            }
            None if self.size > MAX_STRING_CAPACITY => {
                return Err(format!(
                    "string variable '{}' capacity {} exceeds {MAX_STRING_CAPACITY}",
                    self.name, self.size
                ));
            }
            None if self.default.encoded_len() > self.size as usize => {
                return Err(format!(
                    "default of '{}' is {} bytes, capacity is {}",
                    self.name,
                    self.default.encoded_len(),
                    self.size
                ));
            }
            _ => {}
        }
        if let VarValue::Str(text) = &self.default {
            if text.contains('\0') {
                return Err(format!("default of '{}' contains a NUL byte", self.name));
            }
        }
        if let Some(range) = self.range {
            if !self.ty.is_numeric() {
                return Err(format!("range on non-numeric variable '{}'", self.name));
            }
            if range.min > range.max {
                return Err(format!(
                    "variable '{}' has min {} above max {}",
                    self.name, range.min, range.max
                ));
            }
            if self.default.as_f64().is_some_and(|v| !range.contains(v)) {
                return Err(format!("default of '{}' lies outside its range", self.name));
            }
        }
        Ok(())
    }
}
