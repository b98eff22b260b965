//! `bt-blackboard` — typed per-agent memory for the behavior-tree runtime.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`value`]      | `VarType`, `VarValue`, `VarData` (typed byte codecs)         |
//! | [`variable`]   | `VariableDefinition`, `VarFlags`, `VarRange`                 |
//! | [`registry`]   | `VariableRegistry` (setup), `BlackboardLayout` (offset table)|
//! | [`instance`]   | `NodeInstance` — per-(agent, node) resumption record         |
//! | [`blackboard`] | `AgentBlackboard`, `BlackboardHeader`                        |
//! | [`pool`]       | `BlackboardPool`, `PoolStats`                                |
//! | [`error`]      | `BlackboardError`, `BlackboardResult<T>`                     |
//!
//! # Memory model
//!
//! ```text
//! AgentBlackboard
//! ├─ header     agent id, template id, last update, tick count
//! ├─ variables  [u8; Σ slot sizes]      offsets from BlackboardLayout
//! └─ nodes      [NodeInstance; node_count]
//! ```
//!
//! The layout is computed once per template and shared through an `Arc`;
//! per-agent cost is the two flat buffers.

pub mod blackboard;
pub mod error;
pub mod instance;
pub mod pool;
pub mod registry;
pub mod value;
pub mod variable;

#[cfg(test)]
mod tests;

pub use blackboard::{AgentBlackboard, BlackboardHeader};
pub use error::{BlackboardError, BlackboardResult};
pub use instance::NodeInstance;
pub use pool::{BlackboardPool, PoolStats};
pub use registry::{BlackboardLayout, VarSlot, VariableRegistry};
pub use value::{VarData, VarType, VarValue};
pub use variable::{
    DEFAULT_STRING_CAPACITY, MAX_STRING_CAPACITY, VarFlags, VarRange, VariableDefinition,
};
