//! Foundation types shared by the syntax and semantic tiers.
//!
//! - [`FileId`] - Module identifiers (the "module link" of a node)
//! - [`LineCol`] - Source positions
//! - [`ScopeId`] - Handles into a module's scope tree
//!
//! This module has NO dependencies on other jacsym modules.

mod file_id;
mod scope_id;
mod span;

pub use file_id::FileId;
pub use scope_id::ScopeId;
pub use span::LineCol;
