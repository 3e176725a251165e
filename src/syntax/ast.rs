//! Arena AST for one Jac module.
//!
//! The front end hands this pass a fully parsed tree. Nodes live in a flat
//! arena owned by [`Ast`] and refer to each other by [`NodeId`]; the parent
//! link is kept so rules can look at a node's lexical context (for example
//! whether an ability sits inside an architype body).
//!
//! [`NodeKind`] is a closed enum. Payloads only carry what scoping needs;
//! everything else about a construct is expressed through its children.

use std::fmt;
use std::ops::Index;

use smol_str::SmolStr;

use crate::base::{FileId, LineCol, ScopeId};

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Index of a node inside its module's [`Ast`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ============================================================================
// NAMES
// ============================================================================

/// Kind of architype declared by `obj`/`node`/`edge`/`walker`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArchType {
    Object,
    Node,
    Edge,
    Walker,
}

/// Kind tag on an arch reference such as `:obj:Foo` or `:can:talk`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Object,
    Node,
    Edge,
    Walker,
    Enum,
    Ability,
}

/// Special-form names (`<init>`, `<self>`, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialVar {
    Init,
    PostInit,
    SelfRef,
    Super,
    Root,
    Here,
    Visitor,
}

impl SpecialVar {
    /// The name this special form resolves to in a symbol table.
    pub fn resolved_name(self) -> &'static str {
        match self {
            SpecialVar::Init => "__init__",
            SpecialVar::PostInit => "__post_init__",
            SpecialVar::SelfRef => "self",
            SpecialVar::Super => "super",
            SpecialVar::Root => "root",
            SpecialVar::Here => "here",
            SpecialVar::Visitor => "visitor",
        }
    }
}

/// A name that is either a plain identifier or a special form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefName {
    Ident(SmolStr),
    Special(SpecialVar),
}

impl RefName {
    pub fn ident(name: impl Into<SmolStr>) -> Self {
        RefName::Ident(name.into())
    }

    /// Resolved simple name used as (part of) a symbol key.
    pub fn resolve(&self) -> SmolStr {
        match self {
            RefName::Ident(name) => name.clone(),
            RefName::Special(var) => SmolStr::new_static(var.resolved_name()),
        }
    }
}

impl From<&str> for RefName {
    fn from(name: &str) -> Self {
        RefName::Ident(SmolStr::new(name))
    }
}

impl From<SpecialVar> for RefName {
    fn from(var: SpecialVar) -> Self {
        RefName::Special(var)
    }
}

// ============================================================================
// NODE KINDS
// ============================================================================

/// Every syntactic construct of the language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    // --- module level ---
    Module { name: SmolStr },
    Elements,
    GlobalVars { is_frozen: bool },
    Test { name: Option<SmolStr> },
    ModuleCode,
    Import {
        lang: SmolStr,
        is_absorb: bool,
        /// The module this import was linked to by the front end, if any.
        sub_module: Option<FileId>,
    },
    ModulePath { path: SmolStr },
    ModuleItems,
    ModuleItem { name: SmolStr, alias: Option<SmolStr> },

    // --- architypes and abilities ---
    Architype { name: SmolStr, arch_type: ArchType },
    ArchDef,
    Decorators,
    BaseClasses,
    Ability { name: RefName },
    AbilityDef,
    EventSignature,
    DottedNameList,
    FuncSignature,
    FuncParams,
    ParamVar,
    Enum { name: SmolStr },
    EnumDef,
    EnumBlock,
    ArchBlock,
    ArchHas { is_static: bool },
    HasVar,
    HasVarList,
    TypeSpec,
    TypeSpecList,

    // --- statements ---
    CodeBlock,
    TypedCtxBlock,
    IfStmt,
    ElseIfs,
    ElseStmt,
    TryStmt,
    Except,
    ExceptList,
    FinallyStmt,
    IterForStmt,
    InForStmt,
    Name { value: SmolStr },
    NameList,
    WhileStmt,
    WithStmt,
    ExprAsItem,
    ExprAsItemList,
    RaiseStmt,
    AssertStmt,
    CtrlStmt,
    DeleteStmt,
    ReportStmt,
    ReturnStmt,
    YieldStmt,
    IgnoreStmt,
    VisitStmt,
    RevisitStmt,
    DisengageStmt,
    AwaitStmt,
    Assignment,

    // --- expressions ---
    BinaryExpr,
    IfElseExpr,
    UnaryExpr,
    UnpackExpr,
    MultiString,
    ExprList,
    ListVal,
    SetVal,
    TupleVal,
    DictVal,
    InnerCompr,
    DictCompr,
    KVPair,
    AtomTrailer,
    FuncCall,
    ParamList,
    AssignmentList,
    IndexSlice,
    ArchRef { name: RefName, kind: RefKind },
    SpecialVarRef { var: SpecialVar },
    EdgeOpRef,
    DisconnectOp,
    ConnectOp,
    FilterCompr,
    FString,

    // --- leaves ---
    Parse,
    Token { value: SmolStr },
    Constant { value: SmolStr },
}

impl NodeKind {
    /// Short name of the construct, for logs and internal errors.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Module { .. } => "module",
            NodeKind::Elements => "elements",
            NodeKind::GlobalVars { .. } => "global vars",
            NodeKind::Test { .. } => "test",
            NodeKind::ModuleCode => "module code",
            NodeKind::Import { .. } => "import",
            NodeKind::ModulePath { .. } => "module path",
            NodeKind::ModuleItems => "module items",
            NodeKind::ModuleItem { .. } => "module item",
            NodeKind::Architype { .. } => "architype",
            NodeKind::ArchDef => "arch def",
            NodeKind::Decorators => "decorators",
            NodeKind::BaseClasses => "base classes",
            NodeKind::Ability { .. } => "ability",
            NodeKind::AbilityDef => "ability def",
            NodeKind::EventSignature => "event signature",
            NodeKind::DottedNameList => "dotted name list",
            NodeKind::FuncSignature => "func signature",
            NodeKind::FuncParams => "func params",
            NodeKind::ParamVar => "param var",
            NodeKind::Enum { .. } => "enum",
            NodeKind::EnumDef => "enum def",
            NodeKind::EnumBlock => "enum block",
            NodeKind::ArchBlock => "arch block",
            NodeKind::ArchHas { .. } => "arch has",
            NodeKind::HasVar => "has var",
            NodeKind::HasVarList => "has var list",
            NodeKind::TypeSpec => "type spec",
            NodeKind::TypeSpecList => "type spec list",
            NodeKind::CodeBlock => "code block",
            NodeKind::TypedCtxBlock => "typed ctx block",
            NodeKind::IfStmt => "if stmt",
            NodeKind::ElseIfs => "else ifs",
            NodeKind::ElseStmt => "else stmt",
            NodeKind::TryStmt => "try stmt",
            NodeKind::Except => "except",
            NodeKind::ExceptList => "except list",
            NodeKind::FinallyStmt => "finally stmt",
            NodeKind::IterForStmt => "iter for stmt",
            NodeKind::InForStmt => "in for stmt",
            NodeKind::Name { .. } => "name",
            NodeKind::NameList => "name list",
            NodeKind::WhileStmt => "while stmt",
            NodeKind::WithStmt => "with stmt",
            NodeKind::ExprAsItem => "expr as item",
            NodeKind::ExprAsItemList => "expr as item list",
            NodeKind::RaiseStmt => "raise stmt",
            NodeKind::AssertStmt => "assert stmt",
            NodeKind::CtrlStmt => "ctrl stmt",
            NodeKind::DeleteStmt => "delete stmt",
            NodeKind::ReportStmt => "report stmt",
            NodeKind::ReturnStmt => "return stmt",
            NodeKind::YieldStmt => "yield stmt",
            NodeKind::IgnoreStmt => "ignore stmt",
            NodeKind::VisitStmt => "visit stmt",
            NodeKind::RevisitStmt => "revisit stmt",
            NodeKind::DisengageStmt => "disengage stmt",
            NodeKind::AwaitStmt => "await stmt",
            NodeKind::Assignment => "assignment",
            NodeKind::BinaryExpr => "binary expr",
            NodeKind::IfElseExpr => "if else expr",
            NodeKind::UnaryExpr => "unary expr",
            NodeKind::UnpackExpr => "unpack expr",
            NodeKind::MultiString => "multi string",
            NodeKind::ExprList => "expr list",
            NodeKind::ListVal => "list val",
            NodeKind::SetVal => "set val",
            NodeKind::TupleVal => "tuple val",
            NodeKind::DictVal => "dict val",
            NodeKind::InnerCompr => "inner compr",
            NodeKind::DictCompr => "dict compr",
            NodeKind::KVPair => "kv pair",
            NodeKind::AtomTrailer => "atom trailer",
            NodeKind::FuncCall => "func call",
            NodeKind::ParamList => "param list",
            NodeKind::AssignmentList => "assignment list",
            NodeKind::IndexSlice => "index slice",
            NodeKind::ArchRef { .. } => "arch ref",
            NodeKind::SpecialVarRef { .. } => "special var ref",
            NodeKind::EdgeOpRef => "edge op ref",
            NodeKind::DisconnectOp => "disconnect op",
            NodeKind::ConnectOp => "connect op",
            NodeKind::FilterCompr => "filter compr",
            NodeKind::FString => "f-string",
            NodeKind::Parse => "parse",
            NodeKind::Token { .. } => "token",
            NodeKind::Constant { .. } => "constant",
        }
    }
}

// ============================================================================
// NODES & ARENA
// ============================================================================

/// One syntax node.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Children in source order.
    pub children: Vec<NodeId>,
    pub pos: LineCol,
    /// Module link: the module this node was parsed from.
    pub module: Option<FileId>,
    /// Scope the node was visited in, written by the symbol-table build pass.
    pub scope: Option<ScopeId>,
}

/// The arena holding every node of one module.
#[derive(Clone, Debug)]
pub struct Ast {
    file: FileId,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    /// Assemble an arena. Prefer [`AstBuilder`](super::AstBuilder), which
    /// keeps parent and child links consistent.
    pub(crate) fn from_parts(file: FileId, nodes: Vec<Node>, root: Option<NodeId>) -> Self {
        Self { file, nodes, root }
    }

    /// The module this tree belongs to.
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    /// First direct child matching `pred`.
    pub fn child_where(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| pred(self.kind(child)))
    }

    /// Pre-order iterator over the strict descendants of `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { ast: self, stack }
    }

    /// Scope bound to `id` by the symbol-table build pass.
    pub fn scope_of(&self, id: NodeId) -> Option<ScopeId> {
        self.get(id).and_then(|node| node.scope)
    }

    pub fn set_scope(&mut self, id: NodeId, scope: ScopeId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.scope = Some(scope);
        }
    }

    /// Iterate over all nodes with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    /// # Panics
    /// Panics if `id` was not allocated by this tree.
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// See [`Ast::descendants`].
pub struct Descendants<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.ast.children(id).iter().rev().copied());
        Some(id)
    }
}
