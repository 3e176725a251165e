//! Symbol-table build pass.
//!
//! Walks one module depth-first, keeping a [`ScopeStack`]. Each node kind
//! has a [`ScopeRule`]: whether it opens a scope and what, if anything, it
//! binds in the scope around it. Every node is stamped with the scope that
//! is active once its own rule has run, so a scope-owning node points at
//! its body table and everything else at its surroundings.
//!
//! Problems are collected into a [`DiagnosticCollector`] and the walk
//! carries on. Only a broken stack aborts it.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{FileId, ScopeId};
use crate::syntax::{Ast, NodeId, NodeKind, Visitor, walk};

use super::absorb::{ResolvedModules, absorb_into};
use super::diagnostics::{CitedSite, ConstructLabel, DiagnosticCollector};
use super::error::{Result, ScopeError};
use super::input::SourceRoot;
use super::naming::{self, DefinitionKey};
use super::scope_stack::ScopeStack;
use super::symtab::{Occurrence, ScopeTable, ScopeTree, SymbolHit};

// ============================================================================
// OUTPUT
// ============================================================================

/// Scope tables built for one module.
#[derive(Debug)]
pub struct ModuleScopes {
    pub file: FileId,
    /// Every table created for the module, the pass's initial table included.
    pub tree: ScopeTree,
    /// Table opened by the module node; `None` if the tree had no module.
    pub root: Option<ScopeId>,
}

impl ModuleScopes {
    pub fn root_table(&self) -> Option<&ScopeTable> {
        self.root.and_then(|root| self.tree.get(root))
    }
}

// ============================================================================
// RULES
// ============================================================================

/// What a node does to the scope stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Push {
    /// Open a parentless table.
    Fresh,
    /// Open a table nested in the active one.
    Nested,
    /// Leave the stack alone.
    Keep,
}

/// What a node binds in the scope it is entered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding<'k> {
    None,
    Declare { name: &'k SmolStr, label: ConstructLabel },
    GlobalVars,
    ImportItems,
    Ability,
    AbilityDef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeRule<'k> {
    pub push: Push,
    pub binding: Binding<'k>,
}

impl<'k> ScopeRule<'k> {
    const BIND_ONLY: ScopeRule<'static> = ScopeRule {
        push: Push::Keep,
        binding: Binding::None,
    };

    fn nested(binding: Binding<'k>) -> Self {
        Self {
            push: Push::Nested,
            binding,
        }
    }

    fn keep(binding: Binding<'k>) -> Self {
        Self {
            push: Push::Keep,
            binding,
        }
    }
}

/// The scoping rule for a node kind.
///
/// Type and enum implementation blocks (`ArchDef`, `EnumDef`) do not open
/// a scope, while out-of-body ability definitions do.
pub fn scope_rule(kind: &NodeKind) -> ScopeRule<'_> {
    match kind {
        NodeKind::Module { .. } => ScopeRule {
            push: Push::Fresh,
            binding: Binding::None,
        },
        NodeKind::Test { name } => ScopeRule::nested(match name {
            Some(name) => Binding::Declare {
                name,
                label: ConstructLabel::Test,
            },
            None => Binding::None,
        }),
        NodeKind::ModuleCode => ScopeRule::nested(Binding::None),
        NodeKind::GlobalVars { .. } => ScopeRule::keep(Binding::GlobalVars),
        NodeKind::Import { .. } => ScopeRule::keep(Binding::ImportItems),
        NodeKind::Architype { name, .. } => ScopeRule::nested(Binding::Declare {
            name,
            label: ConstructLabel::Architype,
        }),
        NodeKind::Enum { name } => ScopeRule::nested(Binding::Declare {
            name,
            label: ConstructLabel::Enum,
        }),
        NodeKind::Ability { .. } => ScopeRule::nested(Binding::Ability),
        NodeKind::AbilityDef => ScopeRule::nested(Binding::AbilityDef),

        NodeKind::ArchDef
        | NodeKind::EnumDef
        | NodeKind::Elements
        | NodeKind::ModulePath { .. }
        | NodeKind::ModuleItems
        | NodeKind::ModuleItem { .. }
        | NodeKind::Decorators
        | NodeKind::BaseClasses
        | NodeKind::EventSignature
        | NodeKind::DottedNameList
        | NodeKind::FuncSignature
        | NodeKind::FuncParams
        | NodeKind::ParamVar
        | NodeKind::EnumBlock
        | NodeKind::ArchBlock
        | NodeKind::ArchHas { .. }
        | NodeKind::HasVar
        | NodeKind::HasVarList
        | NodeKind::TypeSpec
        | NodeKind::TypeSpecList
        | NodeKind::CodeBlock
        | NodeKind::TypedCtxBlock
        | NodeKind::IfStmt
        | NodeKind::ElseIfs
        | NodeKind::ElseStmt
        | NodeKind::TryStmt
        | NodeKind::Except
        | NodeKind::ExceptList
        | NodeKind::FinallyStmt
        | NodeKind::IterForStmt
        | NodeKind::InForStmt
        | NodeKind::Name { .. }
        | NodeKind::NameList
        | NodeKind::WhileStmt
        | NodeKind::WithStmt
        | NodeKind::ExprAsItem
        | NodeKind::ExprAsItemList
        | NodeKind::RaiseStmt
        | NodeKind::AssertStmt
        | NodeKind::CtrlStmt
        | NodeKind::DeleteStmt
        | NodeKind::ReportStmt
        | NodeKind::ReturnStmt
        | NodeKind::YieldStmt
        | NodeKind::IgnoreStmt
        | NodeKind::VisitStmt
        | NodeKind::RevisitStmt
        | NodeKind::DisengageStmt
        | NodeKind::AwaitStmt
        | NodeKind::Assignment
        | NodeKind::BinaryExpr
        | NodeKind::IfElseExpr
        | NodeKind::UnaryExpr
        | NodeKind::UnpackExpr
        | NodeKind::MultiString
        | NodeKind::ExprList
        | NodeKind::ListVal
        | NodeKind::SetVal
        | NodeKind::TupleVal
        | NodeKind::DictVal
        | NodeKind::InnerCompr
        | NodeKind::DictCompr
        | NodeKind::KVPair
        | NodeKind::AtomTrailer
        | NodeKind::FuncCall
        | NodeKind::ParamList
        | NodeKind::AssignmentList
        | NodeKind::IndexSlice
        | NodeKind::ArchRef { .. }
        | NodeKind::SpecialVarRef { .. }
        | NodeKind::EdgeOpRef
        | NodeKind::DisconnectOp
        | NodeKind::ConnectOp
        | NodeKind::FilterCompr
        | NodeKind::FString
        | NodeKind::Parse
        | NodeKind::Token { .. }
        | NodeKind::Constant { .. } => ScopeRule::BIND_ONLY,
    }
}

// ============================================================================
// PASS
// ============================================================================

/// Build the symbol tables of one module.
///
/// `resolved` must already hold every module this one absorbs with a
/// wildcard import; a missing one is reported, not fatal.
#[tracing::instrument(skip_all, fields(file = %ast.file()))]
pub fn build_module_scopes(
    ast: &mut Ast,
    source_root: &SourceRoot,
    resolved: &ResolvedModules,
    diagnostics: &mut DiagnosticCollector,
) -> Result<ModuleScopes> {
    let mut pass = SymTabBuildPass::new(ast.file(), source_root, resolved, diagnostics);
    walk(ast, &mut pass)?;
    pass.finish()
}

/// The pass state. Usually driven through [`build_module_scopes`]; exposed
/// so callers can wrap it in their own [`Visitor`].
pub struct SymTabBuildPass<'a> {
    file: FileId,
    stack: ScopeStack,
    root: Option<ScopeId>,
    source_root: &'a SourceRoot,
    resolved: &'a ResolvedModules,
    diagnostics: &'a mut DiagnosticCollector,
}

impl<'a> SymTabBuildPass<'a> {
    pub fn new(
        file: FileId,
        source_root: &'a SourceRoot,
        resolved: &'a ResolvedModules,
        diagnostics: &'a mut DiagnosticCollector,
    ) -> Self {
        Self {
            file,
            stack: ScopeStack::new(),
            root: None,
            source_root,
            resolved,
            diagnostics,
        }
    }

    /// Current scope-stack depth, the initial table included.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn active(&self) -> ScopeId {
        self.stack.active()
    }

    /// Check the stack is back to its initial entry and hand over the tables.
    pub fn finish(self) -> Result<ModuleScopes> {
        let depth = self.stack.depth();
        if depth != 1 {
            return Err(ScopeError::Unbalanced {
                file: self.file,
                depth,
            });
        }
        tracing::debug!(tables = self.stack.tree().len(), "symbol tables built");
        Ok(ModuleScopes {
            file: self.file,
            tree: self.stack.into_tree(),
            root: self.root,
        })
    }

    fn apply_binding(&mut self, ast: &Ast, node: NodeId, binding: Binding<'_>) {
        match binding {
            Binding::None => {}
            Binding::Declare { name, label } => {
                self.bind_name(ast, node, name, SymbolHit::Declaration, label)
            }
            Binding::GlobalVars => self.declare_global_vars(ast, node),
            Binding::ImportItems => self.declare_import_items(ast, node),
            Binding::Ability => {
                if let Some(key) = naming::ability_key(ast, node) {
                    self.bind_name(ast, node, &key, SymbolHit::Declaration, ConstructLabel::Ability);
                }
            }
            Binding::AbilityDef => match naming::ability_def_key(ast, node) {
                Ok(DefinitionKey { key, owner_error }) => {
                    if let Some(err) = owner_error {
                        self.internal(ast, node, err.to_string());
                    }
                    self.bind_name(ast, node, &key, SymbolHit::Definition, ConstructLabel::AbilityDef);
                }
                Err(err) => self.internal(ast, node, err.to_string()),
            },
        }
    }

    /// Insert `name` into the active scope, carrying `at` as the occurrence.
    fn bind_name(
        &mut self,
        ast: &Ast,
        at: NodeId,
        name: &SmolStr,
        hit: SymbolHit,
        label: ConstructLabel,
    ) {
        let occurrence = Occurrence::of(ast, at);
        tracing::trace!(
            name = %name,
            ?hit,
            scope = ?self.stack.active(),
            line = occurrence.pos.line_one_indexed(),
            "bind"
        );
        let collide = self
            .stack
            .active_table_mut()
            .insert(name.clone(), hit, occurrence, true);
        if let Some(existing) = collide {
            self.report_duplicate(ast, at, name, label, &[existing]);
        }
    }

    fn declare_global_vars(&mut self, ast: &Ast, node: NodeId) {
        let mut assignments = Vec::new();
        collect_assignments(ast, node, &mut assignments);

        for assign in assignments {
            match ast.children(assign).first().map(|&target| ast.kind(target)) {
                Some(NodeKind::Name { value }) => {
                    self.bind_name(ast, assign, value, SymbolHit::Declaration, ConstructLabel::GlobalVar)
                }
                other => self.internal(
                    ast,
                    assign,
                    format!(
                        "global var assignment target is a {}, expected a name",
                        other.map_or("missing node", NodeKind::label)
                    ),
                ),
            }
        }
    }

    fn declare_import_items(&mut self, ast: &Ast, node: NodeId) {
        let Some(items) = ast.child_where(node, |k| matches!(k, NodeKind::ModuleItems)) else {
            return;
        };
        for &item in ast.children(items) {
            if let NodeKind::ModuleItem { name, alias } = ast.kind(item) {
                let key = alias.as_ref().unwrap_or(name);
                self.bind_name(ast, node, key, SymbolHit::Declaration, ConstructLabel::ImportItem);
            }
        }
    }

    fn absorb(&mut self, ast: &Ast, node: NodeId, sub_module: Option<FileId>) {
        let resolved = self.resolved;
        let Some(source) = sub_module.and_then(|file| resolved.root_table(file)) else {
            let path = module_path(ast, node).unwrap_or_else(|| SmolStr::new_static("<unknown>"));
            self.internal(
                ast,
                node,
                format!("Module {path} not found to include *, or ICE occurred!"),
            );
            return;
        };

        let collisions = absorb_into(self.stack.active_table_mut(), source);
        for collision in collisions {
            self.report_duplicate(
                ast,
                node,
                &collision.name,
                ConstructLabel::IncludeItem,
                &[collision.existing, collision.absorbed],
            );
        }
    }

    fn report_duplicate(
        &mut self,
        ast: &Ast,
        at: NodeId,
        name: &str,
        label: ConstructLabel,
        occupants: &[Occurrence],
    ) {
        let sites: Vec<CitedSite> = occupants
            .iter()
            .map(|occurrence| self.cite(ast, at, occurrence))
            .collect();
        self.diagnostics
            .duplicate_binding(ast.file(), ast[at].pos, name, label, &sites);
    }

    /// Resolve an occurrence to a printable site. A missing module link or
    /// an unregistered module is itself an internal error.
    fn cite(&mut self, ast: &Ast, at: NodeId, occurrence: &Occurrence) -> CitedSite {
        let path: Arc<str> = match occurrence.module {
            None => {
                self.internal(
                    ast,
                    at,
                    format!("{:?} has no module link", occurrence.node),
                );
                Arc::from("<unknown module>")
            }
            Some(file) => match self.source_root.paths(file) {
                Some(paths) => paths.rel_path.clone(),
                None => {
                    self.internal(ast, at, format!("{file} is not registered in the source root"));
                    Arc::from(file.to_string())
                }
            },
        };
        CitedSite {
            file: occurrence.module,
            path,
            pos: occurrence.pos,
        }
    }

    fn internal(&mut self, ast: &Ast, at: NodeId, message: impl Into<Arc<str>>) {
        let message = message.into();
        tracing::warn!(node = ?at, %message, "internal error while building symbol tables");
        self.diagnostics.internal_error(ast.file(), ast[at].pos, message);
    }
}

impl Visitor for SymTabBuildPass<'_> {
    type Error = ScopeError;

    fn enter(&mut self, ast: &mut Ast, node: NodeId) -> Result<()> {
        let rule = scope_rule(ast.kind(node));
        self.apply_binding(ast, node, rule.binding);

        match rule.push {
            Push::Fresh => {
                let id = self.stack.push_fresh();
                self.root.get_or_insert(id);
            }
            Push::Nested => {
                self.stack.push_nested();
            }
            Push::Keep => {}
        }
        self.stack.bind(ast, node);
        Ok(())
    }

    fn exit(&mut self, ast: &mut Ast, node: NodeId) -> Result<()> {
        if let NodeKind::Import {
            is_absorb: true,
            sub_module,
            ..
        } = ast.kind(node)
        {
            let sub_module = *sub_module;
            self.absorb(ast, node, sub_module);
        }

        if scope_rule(ast.kind(node)).push != Push::Keep {
            self.stack.pop()?;
        }
        Ok(())
    }
}

/// Assignments beneath `node`, without looking inside an assignment.
fn collect_assignments(ast: &Ast, node: NodeId, out: &mut Vec<NodeId>) {
    for &child in ast.children(node) {
        if matches!(ast.kind(child), NodeKind::Assignment) {
            out.push(child);
        } else {
            collect_assignments(ast, child, out);
        }
    }
}

fn module_path(ast: &Ast, import: NodeId) -> Option<SmolStr> {
    let path = ast.child_where(import, |k| matches!(k, NodeKind::ModulePath { .. }))?;
    match ast.kind(path) {
        NodeKind::ModulePath { path } => Some(path.clone()),
        _ => None,
    }
}
