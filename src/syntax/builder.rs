//! Incremental construction of an [`Ast`].

use crate::base::{FileId, LineCol};

use super::ast::{Ast, Node, NodeId, NodeKind};

/// Builds a module tree top-down.
///
/// `start` opens a node under the currently open one, `finish` closes it,
/// and `leaf` adds a childless node. The first parentless node becomes the
/// root. Every node is stamped with the builder's module link unless
/// [`unlinked`](Self::unlinked) was called just before creating it.
///
/// ```ignore
/// let mut b = AstBuilder::new(FileId::new(0));
/// b.node(NodeKind::Module { name: "main".into() }, 1, |b| {
///     b.leaf(NodeKind::Elements, 1);
/// });
/// let ast = b.build();
/// ```
#[derive(Debug)]
pub struct AstBuilder {
    file: FileId,
    nodes: Vec<Node>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
    skip_link: bool,
}

impl AstBuilder {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            nodes: Vec::new(),
            open: Vec::new(),
            root: None,
            skip_link: false,
        }
    }

    /// Open a node at the given 1-indexed line.
    pub fn start(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = self.alloc(kind, line);
        self.open.push(id);
        id
    }

    /// Close the most recently opened node.
    pub fn finish(&mut self) -> Option<NodeId> {
        self.open.pop()
    }

    /// Add a node with no children.
    pub fn leaf(&mut self, kind: NodeKind, line: u32) -> NodeId {
        self.alloc(kind, line)
    }

    /// Open a node, let `body` add its children, then close it.
    pub fn node(&mut self, kind: NodeKind, line: u32, body: impl FnOnce(&mut Self)) -> NodeId {
        let id = self.start(kind, line);
        body(self);
        self.finish();
        id
    }

    /// Create the next node without a module link.
    pub fn unlinked(&mut self) -> &mut Self {
        self.skip_link = true;
        self
    }

    /// Return the tree. Nodes still open are kept as built so far.
    pub fn build(self) -> Ast {
        Ast::from_parts(self.file, self.nodes, self.root)
    }

    fn alloc(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let parent = self.open.last().copied();
        let module = if std::mem::take(&mut self.skip_link) {
            None
        } else {
            Some(self.file)
        };

        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            pos: LineCol::at_line(line),
            module,
            scope: None,
        });

        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => {
                debug_assert!(
                    self.root.is_none(),
                    "{id:?} has no parent but the tree already has a root"
                );
                self.root.get_or_insert(id);
            }
        }
        id
    }
}
