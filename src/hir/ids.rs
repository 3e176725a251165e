//! Cross-module node identity.

use std::fmt;

use crate::base::FileId;
use crate::syntax::NodeId;

/// A node anywhere in the compilation.
///
/// A bare [`NodeId`] is only meaningful inside its own module's arena.
/// Symbol records outlive that context once a wildcard import copies them
/// into another module's scope, so they hold the pair.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeRef {
    /// Module whose arena owns the node
    pub file: FileId,
    /// The node within that arena
    pub node: NodeId,
}

impl NodeRef {
    #[inline]
    pub const fn new(file: FileId, node: NodeId) -> Self {
        Self { file, node }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:?}:{})", self.file, self.node.0)
    }
}
