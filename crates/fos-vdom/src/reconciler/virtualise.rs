//! Virtualisation
//!
//! Adopt host content that was rendered ahead of time (for instance from
//! [`Node::to_html`]) instead of rebuilding it. The returned tree has no
//! listeners; the first diff against the real view attaches them.

use fos_dom::NAMESPACE_HTML;

use crate::config::ReconcilerConfig;
use crate::element::{keyed, none, text};
use crate::host::{Host, HostNodeType};
use crate::vattr::{attribute, Attribute};
use crate::vnode::{Node, NodeKind};

use super::meta::MetaId;
use super::Reconciler;

impl<H: Host, Msg: 'static> Reconciler<H, Msg> {
    /// Build metadata and a virtual tree from the existing children of
    /// `root`. Comments and empty text nodes are dropped from the host.
    pub fn virtualise(host: &mut H, root: H::Node, config: ReconcilerConfig) -> (Self, Node<Msg>) {
        let mut reconciler = Self::new(root.clone(), config);
        let root_id = reconciler.root;

        let mut count = 0;
        let mut child = host.first_child(&root);
        while let Some(node) = child {
            if can_virtualise(host, &node) {
                count += 1;
            }
            child = host.next_sibling(&node);
        }

        let tree = match count {
            0 => {
                let mut child = host.first_child(&root);
                while let Some(node) = child {
                    child = host.next_sibling(&node);
                    host.remove_child(&root, &node);
                }
                let placeholder = host.create_text("");
                reconciler.track(NodeKind::Text, root_id, placeholder.clone(), 0, "");
                host.insert_before(&root, &placeholder, None);
                none()
            }
            1 => {
                let mut children = reconciler.virtualise_children(host, root_id, &root);
                match children.pop() {
                    Some((key, node)) => node.with_key(&key),
                    None => none(),
                }
            }
            _ => {
                let marker = host.create_text("");
                let fragment = reconciler.track(NodeKind::Fragment, root_id, marker.clone(), 0, "");
                let children = reconciler.virtualise_children(host, fragment, &root);
                let first = host.first_child(&root);
                host.insert_before(&root, &marker, first.as_ref());
                keyed::fragment(borrow_keys(&children))
            }
        };

        tracing::debug!(nodes = reconciler.meta.len(), "virtualised");
        (reconciler, tree)
    }

    fn virtualise_children(&mut self, host: &mut H, parent: MetaId, node: &H::Node) -> Vec<(String, Node<Msg>)> {
        let mut children = Vec::new();
        let mut child = host.first_child(node);
        while let Some(current) = child {
            child = host.next_sibling(&current);
            let index = children.len();
            match self.virtualise_node(host, parent, &current, index) {
                Some(entry) => children.push(entry),
                None => host.remove_child(node, &current),
            }
        }
        children
    }

    fn virtualise_node(
        &mut self,
        host: &mut H,
        parent: MetaId,
        node: &H::Node,
        index: usize,
    ) -> Option<(String, Node<Msg>)> {
        match host.node_type(node) {
            HostNodeType::Element { namespace, tag } => {
                let key_attribute = self.config.key_attribute.clone();
                let key = host.get_attribute(node, &key_attribute).unwrap_or_default();
                if !key.is_empty() {
                    host.remove_attribute(node, &key_attribute);
                }

                let id = self.track(NodeKind::Element, parent, node.clone(), index, &key);
                let attributes: Vec<Attribute<Msg>> = host
                    .attributes(node)
                    .into_iter()
                    .filter(|(name, _)| name != "xmlns")
                    .map(|(name, value)| attribute(&name, &value))
                    .collect();
                let children = self.virtualise_children(host, id, node);
                let children = borrow_keys(&children);

                let vnode = if namespace.is_empty() || namespace == NAMESPACE_HTML {
                    keyed::element(&tag, attributes, children)
                } else {
                    keyed::namespaced(&namespace, &tag, attributes, children)
                };
                Some((key, vnode))
            }
            HostNodeType::Text(content) if !content.is_empty() => {
                self.track(NodeKind::Text, parent, node.clone(), index, "");
                Some((String::new(), text(&content)))
            }
            HostNodeType::Text(_) | HostNodeType::Other => None,
        }
    }
}

fn can_virtualise<H: Host>(host: &H, node: &H::Node) -> bool {
    match host.node_type(node) {
        HostNodeType::Element { .. } => true,
        HostNodeType::Text(content) => !content.is_empty(),
        HostNodeType::Other => false,
    }
}

fn borrow_keys<Msg>(children: &[(String, Node<Msg>)]) -> Vec<(&str, Node<Msg>)> {
    children
        .iter()
        .map(|(key, node)| (key.as_str(), node.clone()))
        .collect()
}
