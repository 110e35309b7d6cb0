//! fOS DOM Host
//!
//! Drives an in-memory [`DomTree`] with a manual clock. Used for headless
//! rendering and by the tests: time only moves when [`DomHost::advance`] is
//! called, which returns the timers that came due.

use std::collections::BTreeMap;

use fos_dom::{DomTree, NodeData, NodeId};
use serde_json::Value;

use crate::host::{Host, HostNodeType, TimerId};
use crate::PlayError;

/// [`Host`] over a fos-dom tree
#[derive(Debug, Clone, Default)]
pub struct DomHost {
    tree: DomTree,
    now: u64,
    next_timer: u64,
    /// Pending timers by id, with their deadline
    timers: BTreeMap<TimerId, u64>,
}

impl DomHost {
    /// Host with an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Host over an existing document
    pub fn with_tree(tree: DomTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Create an element attached to the document, to mount into
    pub fn create_root(&mut self, tag: &str) -> NodeId {
        let root = self.tree.create_element("", tag);
        let document = self.tree.root();
        if let Err(error) = self.tree.append_child(document, root) {
            tracing::warn!(%error, "could not attach root");
        }
        root
    }

    /// Move the clock forward by `ms` and return the timers that came due,
    /// earliest deadline first.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerId> {
        self.now += ms;
        let mut due: Vec<(u64, TimerId)> = self
            .timers
            .iter()
            .filter(|&(_, &deadline)| deadline <= self.now)
            .map(|(&timer, &deadline)| (deadline, timer))
            .collect();
        due.sort();
        for (_, timer) in &due {
            self.timers.remove(timer);
        }
        due.into_iter().map(|(_, timer)| timer).collect()
    }

    /// Number of timers not yet due or cleared
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Markup of everything under `node`
    pub fn inner_html(&self, node: NodeId) -> String {
        self.tree.inner_html(node)
    }
}

impl Host for DomHost {
    type Node = NodeId;

    fn create_element(&mut self, namespace: &str, tag: &str) -> NodeId {
        self.tree.create_element(namespace, tag)
    }

    fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        if let Err(error) = self.tree.insert_before(*parent, *node, reference.copied()) {
            tracing::warn!(%error, ?parent, ?node, "insert_before failed");
        }
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if let Err(error) = self.tree.remove_child(*parent, *child) {
            tracing::warn!(%error, ?parent, ?child, "remove_child failed");
        }
    }

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.parent(*node)
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.first_child(*node)
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.next_sibling(*node)
    }

    fn node_type(&self, node: &NodeId) -> HostNodeType {
        match self.tree.get(*node).map(|n| &n.data) {
            Some(NodeData::Element(element)) => HostNodeType::Element {
                namespace: element.namespace.clone(),
                tag: element.tag.clone(),
            },
            Some(NodeData::Text(text)) => HostNodeType::Text(text.content.clone()),
            Some(NodeData::Document) | None => HostNodeType::Other,
        }
    }

    fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
        self.tree
            .element(*node)
            .map(|e| {
                e.attrs
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.tree
            .element(*node)
            .and_then(|e| e.get_attr(name))
            .map(str::to_string)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(element) = self.tree.element_mut(*node) {
            element.set_attr(name, value);
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(element) = self.tree.element_mut(*node) {
            element.remove_attr(name);
        }
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: Value) {
        if let Some(element) = self.tree.element_mut(*node) {
            element.set_property(name, value);
        }
    }

    fn set_text(&mut self, node: &NodeId, content: &str) {
        if let Err(error) = self.tree.set_text(*node, content) {
            tracing::warn!(%error, ?node, "set_text failed");
        }
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) {
        if let Err(error) = self.tree.set_inner_html(*node, html) {
            tracing::warn!(%error, ?node, "set_inner_html failed");
        }
    }

    fn add_event_listener(&mut self, node: &NodeId, name: &str, passive: bool) {
        if let Some(element) = self.tree.element_mut(*node) {
            element.add_listener(name, passive);
        }
    }

    fn remove_event_listener(&mut self, node: &NodeId, name: &str) {
        if let Some(element) = self.tree.element_mut(*node) {
            element.remove_listener(name);
        }
    }

    fn focus(&mut self, node: &NodeId) {
        self.tree.focus(*node);
    }

    fn play(&mut self, node: &NodeId) -> Result<(), PlayError> {
        match self.tree.element_mut(*node) {
            Some(element) if matches!(element.tag.as_str(), "audio" | "video") => {
                element.play_count += 1;
                Ok(())
            }
            Some(element) => Err(PlayError(format!("<{}> is not a media element", element.tag))),
            None => Err(PlayError("not an element".to_string())),
        }
    }

    fn now(&self) -> u64 {
        self.now
    }

    fn set_timeout(&mut self, delay: u64) -> TimerId {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.timers.insert(timer, self.now + delay);
        timer
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_come_due_in_order() {
        let mut host = DomHost::new();
        let slow = host.set_timeout(300);
        let fast = host.set_timeout(100);
        let cleared = host.set_timeout(50);
        host.clear_timeout(cleared);

        assert!(host.advance(99).is_empty());
        assert_eq!(host.advance(201), vec![fast, slow]);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.now(), 300);
    }

    #[test]
    fn test_play_requires_media() {
        let mut host = DomHost::new();
        let video = host.create_element("", "video");
        let div = host.create_element("", "div");

        assert!(host.play(&video).is_ok());
        assert!(host.play(&div).is_err());
        assert_eq!(host.tree().element(video).unwrap().play_count, 1);
    }

    #[test]
    fn test_node_type() {
        let mut host = DomHost::new();
        let svg = host.create_element("http://www.w3.org/2000/svg", "svg");
        let text = host.create_text("hi");

        assert_eq!(
            host.node_type(&svg),
            HostNodeType::Element {
                namespace: "http://www.w3.org/2000/svg".into(),
                tag: "svg".into()
            }
        );
        assert_eq!(host.node_type(&text), HostNodeType::Text("hi".into()));
        assert_eq!(host.node_type(&host.tree().root()), HostNodeType::Other);
    }
}
