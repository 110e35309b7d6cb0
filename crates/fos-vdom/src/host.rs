//! Host Abstraction
//!
//! The mutable tree the reconciler drives. A browser document, a native
//! widget tree or the in-memory [`fos_dom::DomTree`] all fit behind this
//! trait; the reconciler never touches host nodes any other way.

use std::fmt;
use std::hash::Hash;

use serde_json::Value;

use crate::PlayError;

/// Handle of a pending host timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What a host node is, as far as virtualisation cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNodeType {
    /// Element with its namespace URI (`""` for HTML) and local name
    Element { namespace: String, tag: String },
    /// Text node with its content
    Text(String),
    /// Comments, processing instructions, ...
    Other,
}

/// Host tree operations
pub trait Host {
    /// Host node handle
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// Create a detached element; `namespace` is `""` for HTML
    fn create_element(&mut self, namespace: &str, tag: &str) -> Self::Node;

    /// Create a detached text node
    fn create_text(&mut self, content: &str) -> Self::Node;

    /// Insert (or move) `node` into `parent` before `reference`, or at the
    /// end when `reference` is `None`
    fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);

    /// Relocate an attached node. Hosts that can move a node without
    /// detaching it (and so keep focus, selection or playback state)
    /// override this.
    fn move_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) {
        self.insert_before(parent, node, reference);
    }

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn node_type(&self, node: &Self::Node) -> HostNodeType;

    /// All attributes of an element, in document order
    fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;

    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn set_property(&mut self, node: &Self::Node, name: &str, value: Value);

    /// Replace the content of a text node
    fn set_text(&mut self, node: &Self::Node, content: &str);

    /// Replace the children of an element with parsed markup
    fn set_inner_html(&mut self, node: &Self::Node, html: &str);

    /// Start routing `name` events on `node` to the reconciler. A passive
    /// listener promises never to call `prevent_default`.
    fn add_event_listener(&mut self, node: &Self::Node, name: &str, passive: bool);

    fn remove_event_listener(&mut self, node: &Self::Node, name: &str);

    fn focus(&mut self, node: &Self::Node);

    /// Start media playback
    fn play(&mut self, node: &Self::Node) -> Result<(), PlayError>;

    /// Current time in milliseconds
    fn now(&self) -> u64;

    /// Schedule a timer; the owner hands it back to the reconciler when it
    /// fires.
    fn set_timeout(&mut self, delay: u64) -> TimerId;

    fn clear_timeout(&mut self, timer: TimerId);
}
