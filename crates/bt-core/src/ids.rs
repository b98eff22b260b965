//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` so arena
//! code can index with `id.0 as usize`, but callers should prefer `.index()`.
//!
//! Two families live here:
//!
//! - **Indices** (`AgentId`, `TemplateId`, `NodeIndex`, `EntityId`) — dense
//!   positions with a `MAX` sentinel.
//! - **Name keys** (`VarKey`, `BehaviorKey`) — 32-bit FNV-1a hashes of the
//!   names used at authoring time.  Hashing happens once, at setup; the tick
//!   loop only ever compares integers.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// `true` unless this is the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Simulation-wide agent identifier.  Max ~4.3 billion agents.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a template in a `TemplateLibrary`.
    pub struct TemplateId(u16);
}

typed_id! {
    /// Index of a node inside one template's node arena.
    ///
    /// Indices are assigned in insertion order and never change for the
    /// lifetime of the template.
    pub struct NodeIndex(u32);
}

typed_id! {
    /// Reference to some other simulation entity, stored in
    /// entity-reference blackboard variables.
    pub struct EntityId(u32);
}

impl NodeIndex {
    /// "No node": the parent of a root, or an empty child cursor.
    pub const NONE: NodeIndex = NodeIndex::INVALID;
}

// ── Name hashing ──────────────────────────────────────────────────────────────

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash of `bytes`.  `const` so keys can be computed at compile
/// time: `const SPEED: VarKey = VarKey::from_name("speed");`
pub const fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Generate a name-hash key type.
macro_rules! name_key {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Hash an authoring-time name into a key.
            #[inline]
            pub const fn from_name(name: &str) -> Self {
                Self(fnv1a(name.as_bytes()))
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(name: &str) -> Self {
                Self::from_name(name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#010x})", stringify!($name), self.0)
            }
        }
    };
}

name_key! {
    /// Hashed blackboard variable name.  Unique within a template.
    pub struct VarKey;
}

name_key! {
    /// Hashed name of a registered leaf behavior (action or condition).
    pub struct BehaviorKey;
}
