//! The scope stack threaded through the symbol-table build pass.

use crate::base::ScopeId;
use crate::syntax::{Ast, NodeId};

use super::error::{Result, ScopeError};
use super::symtab::{ScopeTable, ScopeTree};

/// Stack of active scopes, owning the tree the scopes are allocated in.
///
/// Starts with one fresh table that can never be popped, so the stack is
/// never empty. A balanced walk ends back at that single entry.
#[derive(Debug)]
pub struct ScopeStack {
    tree: ScopeTree,
    initial: ScopeId,
    pushed: Vec<ScopeId>,
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut tree = ScopeTree::new();
        let initial = tree.alloc_root();
        Self {
            tree,
            initial,
            pushed: Vec::new(),
        }
    }

    /// Push a new parentless table (module roots).
    pub fn push_fresh(&mut self) -> ScopeId {
        let id = self.tree.alloc_root();
        self.pushed.push(id);
        tracing::debug!(scope = ?id, depth = self.depth(), "push fresh scope");
        id
    }

    /// Push a new table nested in the active one.
    pub fn push_nested(&mut self) -> ScopeId {
        let id = self.tree.alloc_child(self.active());
        self.pushed.push(id);
        tracing::debug!(scope = ?id, depth = self.depth(), "push nested scope");
        id
    }

    /// Pop the active table, making its predecessor active again.
    pub fn pop(&mut self) -> Result<ScopeId> {
        let id = self.pushed.pop().ok_or(ScopeError::StackUnderflow)?;
        tracing::debug!(scope = ?id, depth = self.depth(), "pop scope");
        Ok(id)
    }

    pub fn active(&self) -> ScopeId {
        self.pushed.last().copied().unwrap_or(self.initial)
    }

    pub fn active_table(&self) -> &ScopeTable {
        &self.tree[self.active()]
    }

    pub fn active_table_mut(&mut self) -> &mut ScopeTable {
        let id = self.active();
        &mut self.tree[id]
    }

    /// Stamp `node` with the active scope.
    pub fn bind(&self, ast: &mut Ast, node: NodeId) {
        ast.set_scope(node, self.active());
    }

    /// The table the stack was created with.
    pub fn initial(&self) -> ScopeId {
        self.initial
    }

    /// Number of entries, the initial table included.
    pub fn depth(&self) -> usize {
        self.pushed.len() + 1
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn into_tree(self) -> ScopeTree {
        self.tree
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::syntax::{AstBuilder, NodeKind};

    #[test]
    fn test_starts_with_single_initial_scope() {
        let stack = ScopeStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.active(), stack.initial());
        assert_eq!(stack.tree().len(), 1);
    }

    #[test]
    fn test_nested_scope_parent_is_active() {
        let mut stack = ScopeStack::new();
        let outer = stack.push_fresh();
        let inner = stack.push_nested();

        assert_eq!(stack.tree()[outer].parent(), None);
        assert_eq!(stack.tree()[inner].parent(), Some(outer));
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_pop_restores_previous() {
        let mut stack = ScopeStack::new();
        let outer = stack.push_nested();
        let inner = stack.push_nested();

        assert_eq!(stack.pop(), Ok(inner));
        assert_eq!(stack.active(), outer);
        assert_eq!(stack.pop(), Ok(outer));
        assert_eq!(stack.active(), stack.initial());
    }

    #[test]
    fn test_pop_initial_is_underflow() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.pop(), Err(ScopeError::StackUnderflow));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_bind_stamps_active_scope() {
        let mut b = AstBuilder::new(FileId::new(0));
        let node = b.leaf(NodeKind::Parse, 1);
        let mut ast = b.build();

        let mut stack = ScopeStack::new();
        let scope = stack.push_fresh();
        stack.bind(&mut ast, node);

        assert_eq!(ast.scope_of(node), Some(scope));
    }

    #[test]
    fn test_popped_tables_stay_alive() {
        let mut stack = ScopeStack::new();
        stack.push_nested();
        stack.pop().unwrap();
        stack.push_nested();
        stack.pop().unwrap();

        assert_eq!(stack.into_tree().len(), 3);
    }
}
