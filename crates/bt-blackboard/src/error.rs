use bt_core::VarKey;
use thiserror::Error;

use crate::VarType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlackboardError {
    #[error("variable {0} is not declared for this template")]
    UnknownVariable(VarKey),

    #[error("variable {key} is {expected}, not {got}")]
    TypeMismatch {
        key:      VarKey,
        expected: VarType,
        got:      VarType,
    },

    #[error("value of {len} bytes does not fit variable {key} (capacity {capacity})")]
    ValueTooLarge {
        key:      VarKey,
        capacity: usize,
        len:      usize,
    },

    #[error("string for variable {0} must be UTF-8 without interior NULs")]
    InvalidString(VarKey),

    #[error("variable {0} is read-only")]
    ReadOnly(VarKey),

    #[error("variable '{name}' collides with already declared '{existing}'")]
    DuplicateVariable { name: String, existing: String },

    #[error("variable limit of {limit} reached")]
    VariableCapacity { limit: usize },

    #[error("invalid variable definition: {0}")]
    InvalidDefinition(String),

    #[error("blackboard pool exhausted ({capacity} live)")]
    PoolExhausted { capacity: usize },
}

pub type BlackboardResult<T> = Result<T, BlackboardError>;
