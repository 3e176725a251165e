//! Depth-first traversal driver.
//!
//! For every node: `enter` (pre-order), then each child left to right,
//! then `exit` (post-order). Visitors get mutable access to the tree so
//! they can annotate nodes as they go. An `Err` from either hook aborts
//! the walk.

use super::ast::{Ast, NodeId};

/// Per-node hooks invoked by [`walk`].
pub trait Visitor {
    type Error;

    fn enter(&mut self, ast: &mut Ast, node: NodeId) -> Result<(), Self::Error>;

    fn exit(&mut self, _ast: &mut Ast, _node: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk the whole tree from its root. An empty tree is a no-op.
pub fn walk<V: Visitor>(ast: &mut Ast, visitor: &mut V) -> Result<(), V::Error> {
    match ast.root() {
        Some(root) => walk_node(ast, visitor, root),
        None => Ok(()),
    }
}

/// Walk the subtree rooted at `node`.
pub fn walk_node<V: Visitor>(ast: &mut Ast, visitor: &mut V, node: NodeId) -> Result<(), V::Error> {
    visitor.enter(ast, node)?;
    let mut i = 0;
    while let Some(&child) = ast.children(node).get(i) {
        walk_node(ast, visitor, child)?;
        i += 1;
    }
    visitor.exit(ast, node)
}
