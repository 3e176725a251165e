//! Syntax tier: the parsed tree this crate consumes.
//!
//! - [`ast`] - Closed node-kind enum and the per-module node arena
//! - [`builder`] - Top-down tree construction
//! - [`walk`] - The enter/exit traversal driver

pub mod ast;
pub mod builder;
pub mod walk;

pub use ast::{
    ArchType, Ast, Descendants, Node, NodeId, NodeKind, RefKind, RefName, SpecialVar,
};
pub use builder::AstBuilder;
pub use walk::{Visitor, walk, walk_node};
