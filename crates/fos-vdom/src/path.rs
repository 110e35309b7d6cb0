//! Node Paths
//!
//! A path names a node by the chain of keys and sibling indices leading to
//! it from the root. Keyed steps survive reordering; indexed steps are
//! positional. Paths serialize to the strings the event registry is keyed
//! by, and the reconciler rebuilds the same strings from its metadata tree.

use std::fmt;
use std::rc::Rc;

/// Separates path segments in the serialized form
pub const SEPARATOR_ELEMENT: char = '\t';

/// Separates the path from the event name in registry keys
pub const SEPARATOR_EVENT: char = '\n';

/// Parent-linked node address
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Path {
    /// The mount point itself
    #[default]
    Root,
    /// A keyed child of `parent`
    Key { key: Rc<str>, parent: Rc<Path> },
    /// The `index`th child of `parent`
    Index { index: usize, parent: Rc<Path> },
}

impl Path {
    /// Address the child at `index` of this node; a non-empty `key` wins
    /// over the index.
    pub fn add(&self, index: usize, key: &str) -> Path {
        let parent = Rc::new(self.clone());
        if key.is_empty() {
            Path::Index { index, parent }
        } else {
            Path::Key {
                key: Rc::from(key),
                parent,
            }
        }
    }

    /// Check whether this is the root path
    pub fn is_root(&self) -> bool {
        matches!(self, Path::Root)
    }

    /// Registry key for `event` fired on this path
    pub fn event_key(&self, event: &str) -> String {
        event_key(&self.to_string(), event)
    }

    /// Does this path start with any of `candidates` (serialized paths)?
    ///
    /// This is a plain string-prefix test, matching how dispatched paths are
    /// recorded.
    pub fn matches(&self, candidates: &[String]) -> bool {
        if candidates.is_empty() {
            return false;
        }
        let path = self.to_string();
        candidates.iter().any(|candidate| path.starts_with(candidate.as_str()))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments: Vec<&Path> = Vec::new();
        let mut current = self;
        loop {
            match current {
                Path::Root => break,
                Path::Key { parent, .. } | Path::Index { parent, .. } => {
                    segments.push(current);
                    current = parent;
                }
            }
        }

        for (i, segment) in segments.iter().rev().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR_ELEMENT}")?;
            }
            match segment {
                Path::Key { key, .. } => f.write_str(key)?,
                Path::Index { index, .. } => write!(f, "{index}")?,
                Path::Root => {}
            }
        }
        Ok(())
    }
}

/// Registry key for `event` on an already serialized path
pub fn event_key(path: &str, event: &str) -> String {
    let mut key = String::with_capacity(path.len() + event.len() + 1);
    key.push_str(path);
    key.push(SEPARATOR_EVENT);
    key.push_str(event);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_empty() {
        assert_eq!(Path::Root.to_string(), "");
        assert!(Path::Root.is_root());
    }

    #[test]
    fn test_mixed_segments() {
        let path = Path::Root.add(0, "").add(3, "todo-1").add(2, "");
        assert_eq!(path.to_string(), "0\ttodo-1\t2");
        assert_eq!(path.event_key("click"), "0\ttodo-1\t2\nclick");
    }

    #[test]
    fn test_key_wins_over_index() {
        let path = Path::Root.add(7, "k");
        assert!(matches!(path, Path::Key { .. }));
        assert_eq!(path.to_string(), "k");
    }

    #[test]
    fn test_matches_is_prefix() {
        let path = Path::Root.add(0, "").add(1, "");
        assert!(path.matches(&["0\t1".to_string()]));
        assert!(path.matches(&["x".to_string(), "0".to_string()]));
        assert!(!path.matches(&["0\t2".to_string()]));
        assert!(!path.matches(&[]));
    }
}
