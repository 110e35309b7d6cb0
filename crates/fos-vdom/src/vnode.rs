//! Virtual Nodes
//!
//! Immutable description of a UI subtree. A new tree is built for every
//! render and diffed against the previous one.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::vattr::Attribute;

/// Discriminant of a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Fragment,
    Element,
    Text,
    RawHtml,
}

/// Virtual node
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", bound = "")]
pub enum Node<Msg> {
    /// Children without a wrapping element
    Fragment(Fragment<Msg>),
    /// Element with attributes and children
    Element(Element<Msg>),
    /// Text node
    Text(Text),
    /// Element whose content is raw markup
    RawHtml(RawHtml<Msg>),
}

/// Children without a wrapping element
#[derive(Serialize)]
#[serde(bound = "")]
pub struct Fragment<Msg> {
    pub key: String,
    pub children: Vec<Node<Msg>>,
    /// Position in `children` of every non-empty key
    #[serde(skip)]
    pub keyed_children: HashMap<String, usize>,
}

/// Element with attributes and children
#[derive(Serialize)]
#[serde(bound = "")]
pub struct Element<Msg> {
    pub key: String,
    /// Namespace URI, `""` for HTML
    pub namespace: String,
    pub tag: String,
    /// Sorted by name, see [`crate::vattr::prepare`]
    pub attributes: Vec<Attribute<Msg>>,
    pub children: Vec<Node<Msg>>,
    #[serde(skip)]
    pub keyed_children: HashMap<String, usize>,
    /// Render as `<tag/>` when serialized to HTML
    pub self_closing: bool,
    /// HTML void element (no closing tag)
    pub void: bool,
}

/// Text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub key: String,
    pub content: String,
}

/// Element whose content is raw markup
#[derive(Serialize)]
#[serde(bound = "")]
pub struct RawHtml<Msg> {
    pub key: String,
    pub namespace: String,
    pub tag: String,
    pub attributes: Vec<Attribute<Msg>>,
    pub inner_html: String,
}

impl<Msg> Node<Msg> {
    /// Sibling-unique key, `""` when unkeyed
    pub fn key(&self) -> &str {
        match self {
            Node::Fragment(n) => &n.key,
            Node::Element(n) => &n.key,
            Node::Text(n) => &n.key,
            Node::RawHtml(n) => &n.key,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Fragment(_) => NodeKind::Fragment,
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::RawHtml(_) => NodeKind::RawHtml,
        }
    }

    /// Replace the key of this node
    pub fn with_key(mut self, key: &str) -> Self {
        let slot = match &mut self {
            Node::Fragment(n) => &mut n.key,
            Node::Element(n) => &mut n.key,
            Node::Text(n) => &mut n.key,
            Node::RawHtml(n) => &mut n.key,
        };
        slot.clear();
        slot.push_str(key);
        self
    }

    /// Positional children (empty for text and raw HTML)
    pub fn children(&self) -> &[Node<Msg>] {
        match self {
            Node::Fragment(n) => &n.children,
            Node::Element(n) => &n.children,
            Node::Text(_) | Node::RawHtml(_) => &[],
        }
    }

    /// Attributes (empty for fragments and text)
    pub fn attributes(&self) -> &[Attribute<Msg>] {
        match self {
            Node::Element(n) => &n.attributes,
            Node::RawHtml(n) => &n.attributes,
            Node::Fragment(_) | Node::Text(_) => &[],
        }
    }

    /// Mark an element as self-closing for HTML output
    pub fn self_closing(mut self) -> Self {
        if let Node::Element(element) = &mut self {
            element.self_closing = true;
        }
        self
    }

    /// Convert every listener in the subtree to produce `U` messages
    pub fn map<U: 'static>(self, f: impl Fn(Msg) -> U + 'static) -> Node<U>
    where
        Msg: 'static,
    {
        let f: Rc<dyn Fn(Msg) -> U> = Rc::new(f);
        self.map_with(&f)
    }

    fn map_with<U: 'static>(self, f: &Rc<dyn Fn(Msg) -> U>) -> Node<U>
    where
        Msg: 'static,
    {
        let map_attrs = |attrs: Vec<Attribute<Msg>>| attrs.into_iter().map(|a| a.map(f)).collect();
        let map_children =
            |children: Vec<Node<Msg>>| children.into_iter().map(|c| c.map_with(f)).collect();
        match self {
            Node::Fragment(n) => Node::Fragment(Fragment {
                key: n.key,
                children: map_children(n.children),
                keyed_children: n.keyed_children,
            }),
            Node::Element(n) => Node::Element(Element {
                key: n.key,
                namespace: n.namespace,
                tag: n.tag,
                attributes: map_attrs(n.attributes),
                children: map_children(n.children),
                keyed_children: n.keyed_children,
                self_closing: n.self_closing,
                void: n.void,
            }),
            Node::Text(n) => Node::Text(n),
            Node::RawHtml(n) => Node::RawHtml(RawHtml {
                key: n.key,
                namespace: n.namespace,
                tag: n.tag,
                attributes: map_attrs(n.attributes),
                inner_html: n.inner_html,
            }),
        }
    }
}

impl<Msg> Clone for Node<Msg> {
    fn clone(&self) -> Self {
        match self {
            Node::Fragment(n) => Node::Fragment(Fragment {
                key: n.key.clone(),
                children: n.children.clone(),
                keyed_children: n.keyed_children.clone(),
            }),
            Node::Element(n) => Node::Element(Element {
                key: n.key.clone(),
                namespace: n.namespace.clone(),
                tag: n.tag.clone(),
                attributes: n.attributes.clone(),
                children: n.children.clone(),
                keyed_children: n.keyed_children.clone(),
                self_closing: n.self_closing,
                void: n.void,
            }),
            Node::Text(n) => Node::Text(n.clone()),
            Node::RawHtml(n) => Node::RawHtml(RawHtml {
                key: n.key.clone(),
                namespace: n.namespace.clone(),
                tag: n.tag.clone(),
                attributes: n.attributes.clone(),
                inner_html: n.inner_html.clone(),
            }),
        }
    }
}

impl<Msg> fmt::Debug for Node<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Fragment(n) => f
                .debug_struct("Fragment")
                .field("key", &n.key)
                .field("children", &n.children)
                .finish(),
            Node::Element(n) => f
                .debug_struct("Element")
                .field("key", &n.key)
                .field("namespace", &n.namespace)
                .field("tag", &n.tag)
                .field("attributes", &n.attributes)
                .field("children", &n.children)
                .finish(),
            Node::Text(n) => fmt::Debug::fmt(n, f),
            Node::RawHtml(n) => f
                .debug_struct("RawHtml")
                .field("key", &n.key)
                .field("tag", &n.tag)
                .field("attributes", &n.attributes)
                .field("inner_html", &n.inner_html)
                .finish(),
        }
    }
}

/// Index the non-empty keys of `children`; later duplicates win
pub fn index_keys<Msg>(children: &[Node<Msg>]) -> HashMap<String, usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, child)| !child.key().is_empty())
        .map(|(i, child)| (child.key().to_string(), i))
        .collect()
}

/// Check for HTML elements that never have children or a closing tag
pub fn is_void_html_element(tag: &str, namespace: &str) -> bool {
    namespace.is_empty()
        && matches!(
            tag,
            "area"
                | "base"
                | "br"
                | "col"
                | "embed"
                | "hr"
                | "img"
                | "input"
                | "link"
                | "meta"
                | "param"
                | "source"
                | "track"
                | "wbr"
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{self, keyed, text};
    use crate::vattr::{on, Handler};
    use crate::DomEvent;

    #[test]
    fn test_void_detection() {
        assert!(is_void_html_element("input", ""));
        assert!(!is_void_html_element("input", "http://www.w3.org/2000/svg"));
        assert!(!is_void_html_element("div", ""));
    }

    #[test]
    fn test_with_key() {
        let node: Node<()> = text("hi").with_key("a");
        assert_eq!(node.key(), "a");
        assert_eq!(node.kind(), NodeKind::Text);
    }

    #[test]
    fn test_index_keys_skips_unkeyed() {
        let node: Node<()> = keyed::element(
            "ul",
            vec![],
            vec![("a", text("1")), ("", text("2")), ("b", text("3"))],
        );
        let Node::Element(ul) = node else {
            panic!("expected element");
        };
        assert_eq!(ul.keyed_children.len(), 2);
        assert_eq!(ul.keyed_children["b"], 2);
    }

    #[test]
    fn test_map_rewraps_listeners() {
        let node: Node<u8> = element::element(
            "button",
            vec![on("click", |_| Ok(Handler::new(1u8)))],
            vec![text("+")],
        );
        let mapped: Node<String> = node.map(|n| format!("clicked {n}"));

        let Node::Element(button) = &mapped else {
            panic!("expected element");
        };
        let crate::vattr::Attribute::Event(listener) = &button.attributes[0] else {
            panic!("expected listener");
        };
        let handler = listener.decode(&DomEvent::new("click")).unwrap();
        assert_eq!(handler.message, "clicked 1");
    }
}
