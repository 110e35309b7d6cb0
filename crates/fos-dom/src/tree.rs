//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId, NAMESPACE_HTML};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Arena-based DOM tree for memory efficiency
///
/// Slot 0 always holds the document node. Removed nodes stay in the arena
/// (detached) so outstanding ids never dangle.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    focused: NodeId,
}

impl DomTree {
    /// Create a new tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            focused: NodeId::NONE,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, namespace: &str, tag: &str) -> NodeId {
        // HTML is the default namespace; store it as "" so comparisons stay cheap
        let namespace = if namespace == NAMESPACE_HTML { "" } else { namespace };
        self.push(Node::element(namespace, tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Element data of `id`
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of `id`
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Text content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::as_text)
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        match self.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(text)) => {
                text.content.clear();
                text.content.push_str(content);
                Ok(())
            }
            Some(_) => Err(DomError::InvalidNodeType),
            None => Err(DomError::NotFound),
        }
    }

    /// Assign raw markup to an element, dropping its child nodes
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
        let children: Vec<NodeId> = self.children(id).collect();
        tracing::trace!(node = id.index(), dropped = children.len(), "replacing inner html");
        for child in children {
            self.remove_child(id, child)?;
        }
        let elem = self.element_mut(id).ok_or(DomError::InvalidNodeType)?;
        elem.inner_html = Some(html.to_string());
        Ok(())
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    /// First child of `id`
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.to_option())
    }

    /// Next sibling of `id`
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.to_option())
    }

    /// Iterate over the children of `id`
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node.to_option();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    ///
    /// A child that is already attached somewhere is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if child == NodeId::ROOT || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if self.get(parent).is_some_and(Node::is_text) {
            return Err(DomError::InvalidNodeType);
        }
        let mut reference = reference;
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotAChild);
            }
            if r == child {
                reference = self.next_sibling(child);
            }
        }

        self.detach(child);

        let prev = match reference {
            Some(r) => self.nodes[r.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference.unwrap_or(NodeId::NONE);
        }
        match prev.to_option() {
            Some(p) => self.nodes[p.index()].next_sibling = child,
            None => self.nodes[parent.index()].first_child = child,
        }
        match reference {
            Some(r) => self.nodes[r.index()].prev_sibling = child,
            None => self.nodes[parent.index()].last_child = child,
        }
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        match prev.to_option() {
            Some(p) => self.nodes[p.index()].next_sibling = next,
            None => self.nodes[parent.index()].first_child = next,
        }
        match next.to_option() {
            Some(n) => self.nodes[n.index()].prev_sibling = prev,
            None => self.nodes[parent.index()].last_child = prev,
        }
        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Give focus to `id`
    pub fn focus(&mut self, id: NodeId) {
        self.focused = id;
    }

    /// The focused node, if any
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.to_option()
    }

    /// Concatenated text of `id` and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(text);
            return;
        }
        for child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Serialize the children of `id` to HTML
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(html) = self.element(id).and_then(|e| e.inner_html.as_deref()) {
            out.push_str(html);
        }
        for child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize `id` (including itself) to HTML
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            NodeData::Text(text) => escape_into(&text.content, false, out),
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for attr in &elem.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        out.push_str("=\"");
                        escape_into(&attr.value, true, out);
                        out.push('"');
                    }
                }
                out.push('>');
                let is_void = elem.namespace.is_empty() && VOID_ELEMENTS.contains(&elem.tag.as_str());
                if is_void && !node.first_child.is_valid() {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.to_option()?;
        self.next = self.tree.get(current).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(current)
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_and_siblings() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("", "ul");
        let a = tree.create_element("", "li");
        let b = tree.create_element("", "li");
        let c = tree.create_element("", "li");

        tree.append_child(tree.root(), ul).unwrap();
        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, c).unwrap();
        tree.insert_before(ul, b, Some(c)).unwrap();

        let children: Vec<_> = tree.children(ul).collect();
        assert_eq!(children, vec![a, b, c]);
        assert_eq!(tree.get(b).unwrap().prev_sibling, a);
        assert_eq!(tree.get(ul).unwrap().last_child, c);
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("", "ul");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, b).unwrap();

        tree.insert_before(ul, b, Some(a)).unwrap();

        assert_eq!(tree.text_content(ul), "ba");
        assert_eq!(tree.get(ul).unwrap().first_child, b);
        assert_eq!(tree.get(ul).unwrap().last_child, a);
    }

    #[test]
    fn test_remove_child_errors() {
        let mut tree = DomTree::new();
        let div = tree.create_element("", "div");
        let span = tree.create_element("", "span");

        assert_eq!(tree.remove_child(div, span), Err(DomError::NotAChild));
        tree.append_child(div, span).unwrap();
        assert_eq!(tree.remove_child(div, span), Ok(()));
        assert!(tree.parent(span).is_none());
        assert!(tree.first_child(div).is_none());
    }

    #[test]
    fn test_hierarchy_request() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("", "div");
        let inner = tree.create_element("", "div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(tree.append_child(inner, outer), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_outer_html() {
        let mut tree = DomTree::new();
        let div = tree.create_element("", "div");
        let input = tree.create_element("", "input");
        let text = tree.create_text("a < b");
        tree.element_mut(div).unwrap().set_attr("class", "x \"y\"");
        tree.append_child(div, input).unwrap();
        tree.append_child(div, text).unwrap();

        assert_eq!(
            tree.outer_html(div),
            "<div class=\"x &quot;y&quot;\"><input>a &lt; b</div>"
        );
    }

    #[test]
    fn test_set_inner_html_drops_children() {
        let mut tree = DomTree::new();
        let div = tree.create_element("", "div");
        let text = tree.create_text("old");
        tree.append_child(div, text).unwrap();

        tree.set_inner_html(div, "<b>new</b>").unwrap();

        assert!(tree.first_child(div).is_none());
        assert_eq!(tree.inner_html(div), "<b>new</b>");
    }
}
