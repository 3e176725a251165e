//! # jacsym-base
//!
//! Symbol-table construction for Jac modules.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir     → Scope tables, the build pass, absorption, diagnostics
//!   ↓
//! syntax  → Node arena, tree builder, enter/exit walker
//!   ↓
//! base    → Primitives (FileId, ScopeId, LineCol)
//! ```
//!
//! The usual entry point is [`hir::Workspace`]: register every parsed
//! module, then call [`hir::Workspace::resolve_all`]. A single module can
//! be handled directly with [`hir::build_module_scopes`].

/// Foundation types: FileId, ScopeId, LineCol
pub mod base;

/// Scope tables and the symbol-table build pass
pub mod hir;

/// The parsed tree consumed by the pass
pub mod syntax;

// Re-export the types most callers need
pub use base::{FileId, LineCol, ScopeId};
pub use hir::{
    Diagnostic, DiagnosticCollector, ModuleScopes, ScopeError, SourceRoot, Workspace,
    WorkspaceConfig, WorkspaceReport, build_module_scopes,
};
pub use syntax::{Ast, AstBuilder, NodeId, NodeKind};
