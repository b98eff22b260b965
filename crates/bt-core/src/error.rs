//! Runtime-wide base error type.
//!
//! Sub-crates define their own error enums and wrap `BtError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The base error type for `bt-core` and a common variant for sub-crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BtError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `bt-core`.
pub type BtResult<T> = Result<T, BtError>;
