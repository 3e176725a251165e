//! Errors that abort the symbol-table build pass.
//!
//! User mistakes and recoverable inconsistencies are diagnostics, not
//! errors; see [`super::diagnostics`].

use thiserror::Error;

use crate::base::FileId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("scope stack underflow: cannot pop the initial scope")]
    StackUnderflow,
    #[error("scope stack unbalanced after walking {file}: depth {depth}, expected 1")]
    Unbalanced { file: FileId, depth: usize },
}

pub type Result<T> = std::result::Result<T, ScopeError>;
