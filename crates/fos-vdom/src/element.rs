//! Node Constructors
//!
//! Builders for virtual nodes. Attribute lists are canonicalized here so
//! every node handed to the diff is already sorted.

use std::collections::HashMap;

use crate::vattr::{prepare, Attribute};
use crate::vnode::{is_void_html_element, Element, Fragment, Node, RawHtml, Text};

/// HTML element
pub fn element<Msg>(tag: &str, attributes: Vec<Attribute<Msg>>, children: Vec<Node<Msg>>) -> Node<Msg> {
    namespaced("", tag, attributes, children)
}

/// Element in an explicit namespace (SVG, MathML, ...)
pub fn namespaced<Msg>(
    namespace: &str,
    tag: &str,
    attributes: Vec<Attribute<Msg>>,
    children: Vec<Node<Msg>>,
) -> Node<Msg> {
    build_element(namespace, tag, attributes, children, HashMap::new())
}

/// Children without a wrapping element
pub fn fragment<Msg>(children: Vec<Node<Msg>>) -> Node<Msg> {
    Node::Fragment(Fragment {
        key: String::new(),
        children,
        keyed_children: HashMap::new(),
    })
}

/// Text node
pub fn text<Msg>(content: &str) -> Node<Msg> {
    Node::Text(Text {
        key: String::new(),
        content: content.to_string(),
    })
}

/// Renders nothing (an empty text node)
pub fn none<Msg>() -> Node<Msg> {
    text("")
}

/// Element whose content is the given markup, inserted verbatim
pub fn raw_html<Msg>(
    namespace: &str,
    tag: &str,
    attributes: Vec<Attribute<Msg>>,
    inner_html: &str,
) -> Node<Msg> {
    Node::RawHtml(RawHtml {
        key: String::new(),
        namespace: namespace.to_string(),
        tag: tag.to_string(),
        attributes: prepare(attributes),
        inner_html: inner_html.to_string(),
    })
}

fn build_element<Msg>(
    namespace: &str,
    tag: &str,
    attributes: Vec<Attribute<Msg>>,
    children: Vec<Node<Msg>>,
    keyed_children: HashMap<String, usize>,
) -> Node<Msg> {
    Node::Element(Element {
        key: String::new(),
        namespace: namespace.to_string(),
        tag: tag.to_string(),
        attributes: prepare(attributes),
        children,
        keyed_children,
        self_closing: false,
        void: is_void_html_element(tag, namespace),
    })
}

/// Constructors whose children carry keys
///
/// A keyed child is matched by key across renders instead of by position,
/// so reordering moves existing host nodes rather than rebuilding them.
pub mod keyed {
    use super::*;
    use crate::vnode::index_keys;

    fn apply_keys<Msg>(children: Vec<(&str, Node<Msg>)>) -> Vec<Node<Msg>> {
        children
            .into_iter()
            .map(|(key, child)| child.with_key(key))
            .collect()
    }

    /// HTML element with keyed children
    pub fn element<Msg>(
        tag: &str,
        attributes: Vec<Attribute<Msg>>,
        children: Vec<(&str, Node<Msg>)>,
    ) -> Node<Msg> {
        namespaced("", tag, attributes, children)
    }

    /// Namespaced element with keyed children
    pub fn namespaced<Msg>(
        namespace: &str,
        tag: &str,
        attributes: Vec<Attribute<Msg>>,
        children: Vec<(&str, Node<Msg>)>,
    ) -> Node<Msg> {
        let children = apply_keys(children);
        let keyed_children = index_keys(&children);
        build_element(namespace, tag, attributes, children, keyed_children)
    }

    /// Fragment with keyed children
    pub fn fragment<Msg>(children: Vec<(&str, Node<Msg>)>) -> Node<Msg> {
        let children = apply_keys(children);
        let keyed_children = index_keys(&children);
        Node::Fragment(Fragment {
            key: String::new(),
            children,
            keyed_children,
        })
    }

    pub fn ul<Msg>(attributes: Vec<Attribute<Msg>>, children: Vec<(&str, Node<Msg>)>) -> Node<Msg> {
        element("ul", attributes, children)
    }

    pub fn ol<Msg>(attributes: Vec<Attribute<Msg>>, children: Vec<(&str, Node<Msg>)>) -> Node<Msg> {
        element("ol", attributes, children)
    }

    pub fn div<Msg>(attributes: Vec<Attribute<Msg>>, children: Vec<(&str, Node<Msg>)>) -> Node<Msg> {
        element("div", attributes, children)
    }
}
