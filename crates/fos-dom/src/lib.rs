//! fOS DOM - Document Object Model
//!
//! Memory-efficient, arena-backed host document. Nodes are addressed by
//! [`NodeId`] and linked through parent / first-child / sibling ids, so
//! moving a subtree never copies it.

mod node;
mod operations;
mod tree;

pub use node::{Attribute, ElementData, Listener, Node, NodeData, TextData};
pub use operations::{DomError, DomResult};
pub use tree::{Children, DomTree};

/// HTML namespace URI; elements created with an empty namespace use it.
pub const NAMESPACE_HTML: &str = "http://www.w3.org/1999/xhtml";

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert the sentinel into `None`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}
