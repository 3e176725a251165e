//! Semantic tier: scope tables and the pass that builds them.
//!
//! ## Module Structure
//!
//! - [`symtab`] - Scope tables, symbol records and the per-module scope tree
//! - [`scope_stack`] - The stack of active scopes during a walk
//! - [`naming`] - Qualified keys for abilities and ability definitions
//! - [`build`] - The symbol-table build pass over one module
//! - [`absorb`] - Wildcard-import absorption of resolved modules
//! - [`diagnostics`] - Duplicate-binding and internal-error reporting
//! - [`workspace`] - Dependency-ordered resolution of many modules

pub mod absorb;
pub mod build;
pub mod diagnostics;
mod error;
mod ids;
mod input;
pub mod naming;
pub mod scope_stack;
pub mod symtab;
pub mod workspace;

pub use absorb::{AbsorbCollision, ResolvedModules, absorb_into};
pub use build::{ModuleScopes, SymTabBuildPass, build_module_scopes, scope_rule};
pub use diagnostics::{
    CitedSite, ConstructLabel, Diagnostic, DiagnosticCollector, DiagnosticKind, RelatedInfo,
};
pub use error::{Result, ScopeError};
pub use ids::NodeRef;
pub use input::{ModulePaths, SourceRoot};
pub use naming::{DefinitionKey, QualifyError};
pub use scope_stack::ScopeStack;
pub use symtab::{Occurrence, ScopeTable, ScopeTree, SymbolHit, SymbolRecord};
pub use workspace::{Workspace, WorkspaceConfig, WorkspaceReport};
