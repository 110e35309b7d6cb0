//! Metadata Tree
//!
//! Shadow of the host tree holding what host nodes cannot: node kind, key,
//! the logical child list (fragments are flattened in the host but nested
//! here) and live listener and timer state.

use std::collections::HashMap;

use crate::host::TimerId;
use crate::path::SEPARATOR_ELEMENT;
use crate::vattr::Policy;
use crate::vnode::NodeKind;

/// Metadata node handle (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MetaId(u32);

impl MetaId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Options of an attached listener, needed when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListenerOptions {
    pub prevent_default: Policy,
    pub stop_propagation: Policy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Throttle {
    pub delay: u64,
    /// Time of the last dispatched occurrence
    pub last: Option<u64>,
    /// Sequence number of the last dispatched occurrence
    pub last_event: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Debounce {
    pub delay: u64,
    pub timer: Option<TimerId>,
}

#[derive(Debug)]
pub(crate) struct MetaNode<N> {
    pub kind: NodeKind,
    /// Non-owning back-reference
    pub parent: Option<MetaId>,
    pub children: Vec<MetaId>,
    pub key: String,
    /// Host node; the marker text node for fragments
    pub node: N,
    pub handlers: HashMap<String, ListenerOptions>,
    pub throttles: HashMap<String, Throttle>,
    pub debouncers: HashMap<String, Debounce>,
}

impl<N> MetaNode<N> {
    fn new(kind: NodeKind, parent: Option<MetaId>, node: N, key: &str) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            key: key.to_string(),
            node,
            handlers: HashMap::new(),
            throttles: HashMap::new(),
            debouncers: HashMap::new(),
        }
    }
}

/// Arena of metadata nodes; freed slots are reused
#[derive(Debug)]
pub(crate) struct MetaTree<N> {
    nodes: Vec<Option<MetaNode<N>>>,
    free: Vec<MetaId>,
}

impl<N> MetaTree<N> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    #[inline]
    pub fn get(&self, id: MetaId) -> Option<&MetaNode<N>> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: MetaId) -> Option<&mut MetaNode<N>> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Create a node and splice it into `parent`'s children at `index`
    pub fn insert(&mut self, kind: NodeKind, parent: Option<MetaId>, node: N, index: usize, key: &str) -> MetaId {
        let meta = MetaNode::new(kind, parent, node, key);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(meta);
                id
            }
            None => {
                let id = MetaId(self.nodes.len() as u32);
                self.nodes.push(Some(meta));
                id
            }
        };
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            let index = index.min(parent.children.len());
            parent.children.insert(index, id);
        }
        id
    }

    /// Free a node. Its children and its entry in the parent are left
    /// alone; callers detach it first.
    pub fn release(&mut self, id: MetaId) -> Option<MetaNode<N>> {
        let meta = self.nodes.get_mut(id.index())?.take()?;
        self.free.push(id);
        Some(meta)
    }

    /// Child at `index` of `parent`
    pub fn child(&self, parent: MetaId, index: usize) -> Option<MetaId> {
        self.get(parent)?.children.get(index).copied()
    }

    /// Serialized path of `id`, as the event registry keys it
    pub fn path(&self, id: MetaId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(meta) = self.get(current) {
            let Some(parent) = meta.parent else {
                break;
            };
            if meta.key.is_empty() {
                let index = self
                    .get(parent)
                    .and_then(|p| p.children.iter().position(|&c| c == current))
                    .unwrap_or(0);
                segments.push(index.to_string());
            } else {
                segments.push(meta.key.clone());
            }
            current = parent;
        }
        let mut path = String::new();
        for (i, segment) in segments.iter().rev().enumerate() {
            if i > 0 {
                path.push(SEPARATOR_ELEMENT);
            }
            path.push_str(segment);
        }
        path
    }
}
