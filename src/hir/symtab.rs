//! Scope tables and symbol records.
//!
//! A [`ScopeTable`] maps names to [`SymbolRecord`]s in insertion order and
//! remembers its lexically enclosing table. All tables of one module live
//! in a [`ScopeTree`] arena and are released together with it.

use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use indexmap::map::Entry;
use smol_str::SmolStr;

use crate::base::{FileId, LineCol, ScopeId};
use crate::syntax::{Ast, NodeId};

use super::ids::NodeRef;

// ============================================================================
// OCCURRENCES
// ============================================================================

/// Whether an occurrence introduces a name or supplies its body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolHit {
    Declaration,
    Definition,
}

/// One occurrence of a name: the node plus where it sits in the source.
///
/// The position and module link are captured at insertion time so that a
/// diagnostic can cite the site even after the record was copied into
/// another module's table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub node: NodeRef,
    /// Module link of the node, if the front end set one.
    pub module: Option<FileId>,
    pub pos: LineCol,
}

impl Occurrence {
    /// Capture `node` of `ast`.
    pub fn of(ast: &Ast, node: NodeId) -> Self {
        let n = &ast[node];
        Self {
            node: NodeRef::new(ast.file(), node),
            module: n.module,
            pos: n.pos,
        }
    }
}

// ============================================================================
// SYMBOL RECORD
// ============================================================================

/// Everything a scope knows about one name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolRecord {
    declaration: Option<Occurrence>,
    definitions: Vec<Occurrence>,
}

impl SymbolRecord {
    pub fn declaration(&self) -> Option<&Occurrence> {
        self.declaration.as_ref()
    }

    pub fn definitions(&self) -> &[Occurrence] {
        &self.definitions
    }

    /// The occupant a new binding collides with: the declaration if there
    /// is one, else the most recent definition.
    pub fn latest(&self) -> Option<Occurrence> {
        self.representative().map(|(_, occurrence)| occurrence)
    }

    /// Like [`latest`](Self::latest), but also says which slot it came from.
    pub fn representative(&self) -> Option<(SymbolHit, Occurrence)> {
        match (self.declaration, self.definitions.last()) {
            (Some(decl), _) => Some((SymbolHit::Declaration, decl)),
            (None, Some(&defn)) => Some((SymbolHit::Definition, defn)),
            (None, None) => None,
        }
    }

    /// Every occurrence, declaration first.
    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.declaration.iter().chain(self.definitions.iter())
    }

    pub fn occurrence_count(&self) -> usize {
        usize::from(self.declaration.is_some()) + self.definitions.len()
    }

    fn record(&mut self, hit: SymbolHit, occurrence: Occurrence) {
        match hit {
            SymbolHit::Declaration => self.declaration = Some(occurrence),
            SymbolHit::Definition => self.definitions.push(occurrence),
        }
    }
}

// ============================================================================
// SCOPE TABLE
// ============================================================================

/// A single lexical scope.
#[derive(Clone, Debug, Default)]
pub struct ScopeTable {
    entries: IndexMap<SmolStr, SymbolRecord>,
    parent: Option<ScopeId>,
}

impl ScopeTable {
    fn with_parent(parent: Option<ScopeId>) -> Self {
        Self {
            entries: IndexMap::new(),
            parent,
        }
    }

    /// The enclosing table. Fixed at creation.
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Record an occurrence of `name`.
    ///
    /// With `enforce_unique`, an existing entry is left untouched and its
    /// [latest](SymbolRecord::latest) occupant is returned as the conflict.
    /// Without it, the occurrence is added to the record. Returns `None`
    /// when nothing collided.
    pub fn insert(
        &mut self,
        name: impl Into<SmolStr>,
        hit: SymbolHit,
        occurrence: Occurrence,
        enforce_unique: bool,
    ) -> Option<Occurrence> {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(SymbolRecord::default()).record(hit, occurrence);
                None
            }
            Entry::Occupied(entry) if enforce_unique => entry.get().latest(),
            Entry::Occupied(mut entry) => {
                entry.get_mut().record(hit, occurrence);
                None
            }
        }
    }

    /// Look up a name in this table only.
    pub fn lookup_local(&self, name: &str) -> Option<&SymbolRecord> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &SymbolRecord)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SCOPE TREE
// ============================================================================

/// Owner of every scope table created while resolving one module.
#[derive(Clone, Debug, Default)]
pub struct ScopeTree {
    tables: Vec<ScopeTable>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a parentless table.
    pub fn alloc_root(&mut self) -> ScopeId {
        self.alloc(None)
    }

    /// Allocate a table nested in `parent`.
    pub fn alloc_child(&mut self, parent: ScopeId) -> ScopeId {
        self.alloc(Some(parent))
    }

    fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.tables.len() as u32);
        self.tables.push(ScopeTable::with_parent(parent));
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&ScopeTable> {
        self.tables.get(id.index())
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut ScopeTable> {
        self.tables.get_mut(id.index())
    }

    /// `id` followed by each enclosing table up to its root.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |&current| {
            self.get(current).and_then(ScopeTable::parent)
        })
    }

    /// Resolve `name` by walking outwards from `id`.
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<(ScopeId, &SymbolRecord)> {
        self.ancestors(id).find_map(|scope| {
            self.get(scope)
                .and_then(|table| table.lookup_local(name))
                .map(|record| (scope, record))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &ScopeTable)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(i, table)| (ScopeId::new(i as u32), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Index<ScopeId> for ScopeTree {
    type Output = ScopeTable;

    /// # Panics
    /// Panics if `id` was not allocated by this tree.
    fn index(&self, id: ScopeId) -> &ScopeTable {
        &self.tables[id.index()]
    }
}

impl IndexMut<ScopeId> for ScopeTree {
    fn index_mut(&mut self, id: ScopeId) -> &mut ScopeTable {
        &mut self.tables[id.index()]
    }
}
