//! Patches
//!
//! A patch describes the mutations for one level of the host tree: the
//! changes to apply to the node's own child list (or attributes), how many
//! trailing children to drop afterwards, and nested patches for children
//! that survive.

use serde::Serialize;

use crate::vattr::Attribute;
use crate::vnode::Node;

/// Mutations for one level of the tree
#[derive(Serialize)]
#[serde(bound = "")]
pub struct Patch<Msg> {
    /// Position of the patched node among its parent's children (after the
    /// parent's own changes are applied)
    pub index: usize,
    /// Number of children to drop from the end of the child list
    pub removed: usize,
    /// Changes in application order
    pub changes: Vec<Change<Msg>>,
    pub children: Vec<Patch<Msg>>,
}

/// A single mutation
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", bound = "")]
pub enum Change<Msg> {
    /// Replace the content of a text node
    ReplaceText { content: String },
    /// Replace the markup of a raw HTML element
    ReplaceInnerHtml { inner_html: String },
    /// Add or remove attributes, properties and listeners
    Update {
        added: Vec<Attribute<Msg>>,
        removed: Vec<Attribute<Msg>>,
    },
    /// Move the keyed child in front of the child at `before`
    Move { key: String, before: usize },
    /// Remove the child at `index`
    Remove { index: usize },
    /// Replace the child at `index`
    Replace { index: usize, with: Node<Msg> },
    /// Insert `children` in front of the child at `before`
    Insert { children: Vec<Node<Msg>>, before: usize },
}

impl<Msg> Patch<Msg> {
    pub fn new(index: usize, removed: usize, changes: Vec<Change<Msg>>, children: Vec<Patch<Msg>>) -> Self {
        Self {
            index,
            removed,
            changes,
            children,
        }
    }

    /// Check if applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.changes.is_empty() && self.children.is_empty()
    }

    /// Total number of changes in this patch and all nested patches
    pub fn change_count(&self) -> usize {
        self.changes.len() + self.children.iter().map(Patch::change_count).sum::<usize>()
    }
}

impl<Msg> Change<Msg> {
    /// Short name of the change kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Change::ReplaceText { .. } => "replace_text",
            Change::ReplaceInnerHtml { .. } => "replace_inner_html",
            Change::Update { .. } => "update",
            Change::Move { .. } => "move",
            Change::Remove { .. } => "remove",
            Change::Replace { .. } => "replace",
            Change::Insert { .. } => "insert",
        }
    }
}

impl<Msg> Clone for Patch<Msg> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            removed: self.removed,
            changes: self.changes.clone(),
            children: self.children.clone(),
        }
    }
}

impl<Msg> Clone for Change<Msg> {
    fn clone(&self) -> Self {
        match self {
            Change::ReplaceText { content } => Change::ReplaceText {
                content: content.clone(),
            },
            Change::ReplaceInnerHtml { inner_html } => Change::ReplaceInnerHtml {
                inner_html: inner_html.clone(),
            },
            Change::Update { added, removed } => Change::Update {
                added: added.clone(),
                removed: removed.clone(),
            },
            Change::Move { key, before } => Change::Move {
                key: key.clone(),
                before: *before,
            },
            Change::Remove { index } => Change::Remove { index: *index },
            Change::Replace { index, with } => Change::Replace {
                index: *index,
                with: with.clone(),
            },
            Change::Insert { children, before } => Change::Insert {
                children: children.clone(),
                before: *before,
            },
        }
    }
}

impl<Msg> std::fmt::Debug for Patch<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patch")
            .field("index", &self.index)
            .field("removed", &self.removed)
            .field("changes", &self.changes)
            .field("children", &self.children)
            .finish()
    }
}

impl<Msg> std::fmt::Debug for Change<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::ReplaceText { content } => f.debug_tuple("ReplaceText").field(content).finish(),
            Change::ReplaceInnerHtml { inner_html } => {
                f.debug_tuple("ReplaceInnerHtml").field(inner_html).finish()
            }
            Change::Update { added, removed } => f
                .debug_struct("Update")
                .field("added", added)
                .field("removed", removed)
                .finish(),
            Change::Move { key, before } => f
                .debug_struct("Move")
                .field("key", key)
                .field("before", before)
                .finish(),
            Change::Remove { index } => f.debug_struct("Remove").field("index", index).finish(),
            Change::Replace { index, with } => f
                .debug_struct("Replace")
                .field("index", index)
                .field("with", with)
                .finish(),
            Change::Insert { children, before } => f
                .debug_struct("Insert")
                .field("children", children)
                .field("before", before)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::text;
    use serde_json::json;

    #[test]
    fn test_empty_patch() {
        let patch: Patch<()> = Patch::new(0, 0, vec![], vec![]);
        assert!(patch.is_empty());
        assert!(!Patch::<()>::new(0, 1, vec![], vec![]).is_empty());
    }

    #[test]
    fn test_change_count() {
        let leaf: Patch<()> = Patch::new(1, 0, vec![Change::ReplaceText { content: "x".into() }], vec![]);
        let patch = Patch::new(0, 0, vec![Change::Remove { index: 3 }], vec![leaf]);
        assert_eq!(patch.change_count(), 2);
    }

    #[test]
    fn test_serialize_tagged() {
        let patch: Patch<()> = Patch::new(
            0,
            0,
            vec![
                Change::Move { key: "b".into(), before: 0 },
                Change::Insert { children: vec![text("hi")], before: 2 },
            ],
            vec![],
        );

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            json!({
                "index": 0,
                "removed": 0,
                "changes": [
                    { "kind": "move", "key": "b", "before": 0 },
                    {
                        "kind": "insert",
                        "children": [{ "kind": "text", "key": "", "content": "hi" }],
                        "before": 2
                    }
                ],
                "children": []
            })
        );
    }
}
