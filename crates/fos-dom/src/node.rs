//! DOM Node - Compact representation
//!
//! Uses NodeId (4 bytes) links instead of pointers; the tree owns every
//! node and the links are plain indices.

use std::collections::HashMap;

use serde_json::Value;

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(namespace: &str, tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(namespace, tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Namespace URI ("" for HTML)
    pub namespace: String,
    /// Local tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Script-visible properties (`value`, `checked`, ...)
    pub properties: HashMap<String, Value>,
    /// Registered event listeners
    pub listeners: Vec<Listener>,
    /// Raw markup assigned through `innerHTML`
    pub inner_html: Option<String>,
    /// Number of times playback was started on this element
    pub play_count: u32,
}

impl ElementData {
    pub fn new(namespace: &str, tag: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            tag: tag.to_string(),
            attrs: Vec::new(),
            properties: HashMap::new(),
            listeners: Vec::new(),
            inner_html: None,
            play_count: 0,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        // Check if attribute already exists
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value.to_string();
                return;
            }
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.attrs.len() != before
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set a property value
    pub fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Register a listener, replacing any previous one for the same event
    pub fn add_listener(&mut self, name: &str, passive: bool) {
        self.remove_listener(name);
        self.listeners.push(Listener {
            name: name.to_string(),
            passive,
        });
    }

    /// Drop the listener for `name`
    pub fn remove_listener(&mut self, name: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.name != name);
        self.listeners.len() != before
    }

    /// Look up the listener for `name`
    pub fn listener(&self, name: &str) -> Option<&Listener> {
        self.listeners.iter().find(|l| l.name == name)
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Event listener registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    /// Event name (`click`, `input`, ...)
    pub name: String,
    /// Passive listeners cannot cancel the default action
    pub passive: bool,
}
