//! Tree Diff
//!
//! Compares two virtual trees level by level and produces the [`Patch`]
//! that turns the host tree of the first into that of the second, while
//! keeping the [`EventRegistry`] in step with the listeners of the new tree.
//!
//! Each level is a two-pointer merge over the old and new child lists.
//! Keyed children that moved are pulled forward with `Move` instead of being
//! rebuilt. Once a node has been moved the physical positions in the host
//! drift from the positions in the new list; `moved_offset` tracks that
//! drift so every index-addressed change targets the host's current order.
//!
//! Changes are collected in emission order and reversed when a level is
//! finished: the reconciler applies them in that reversed order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::slice;

use crate::events::EventRegistry;
use crate::patch::{Change, Patch};
use crate::path::Path;
use crate::vattr::Attribute;
use crate::vnode::Node;

/// Result of [`diff`]
#[derive(Debug)]
pub struct Diff<Msg> {
    pub patch: Patch<Msg>,
    /// Registry matching the new tree
    pub events: EventRegistry<Msg>,
}

/// Compute the patch from `old` to `new`.
///
/// `events` must be the registry that matched `old`. It is ticked first, so
/// controlled-input detection sees exactly the events dispatched since the
/// previous diff.
pub fn diff<Msg: 'static>(events: EventRegistry<Msg>, old: &Node<Msg>, new: &Node<Msg>) -> Diff<Msg> {
    let mut events = events.tick();
    let unkeyed = HashMap::new();

    let mut stack = vec![Level::new(
        slice::from_ref(old),
        &unkeyed,
        slice::from_ref(new),
        &unkeyed,
        0,
        Path::Root,
        Vec::new(),
    )];

    loop {
        let Some(level) = stack.last_mut() else {
            // The root level always finishes last and returns below.
            return Diff {
                patch: Patch::new(0, 0, Vec::new(), Vec::new()),
                events,
            };
        };

        match level.step(&mut events) {
            Step::Continue => {}
            Step::Descend(child) => stack.push(child),
            Step::Done => {
                let Some(finished) = stack.pop() else {
                    continue;
                };
                let patch = finished.into_patch();
                match stack.last_mut() {
                    Some(parent) => {
                        if !patch.is_empty() {
                            parent.children.push(patch);
                        }
                    }
                    None => {
                        tracing::debug!(
                            changes = patch.change_count(),
                            handlers = events.len(),
                            "diff complete"
                        );
                        return Diff { patch, events };
                    }
                }
            }
        }
    }
}

enum Step<'a, Msg> {
    Continue,
    Descend(Level<'a, Msg>),
    Done,
}

/// Work item for one child list
struct Level<'a, Msg> {
    old_children: &'a [Node<Msg>],
    old: VecDeque<&'a Node<Msg>>,
    old_keyed: &'a HashMap<String, usize>,
    new: VecDeque<&'a Node<Msg>>,
    new_keyed: &'a HashMap<String, usize>,
    moved: HashSet<&'a str>,
    moved_offset: isize,
    removed: usize,
    node_index: usize,
    patch_index: usize,
    path: Path,
    changes: Vec<Change<Msg>>,
    children: Vec<Patch<Msg>>,
}

impl<'a, Msg: 'static> Level<'a, Msg> {
    fn new(
        old_children: &'a [Node<Msg>],
        old_keyed: &'a HashMap<String, usize>,
        new_children: &'a [Node<Msg>],
        new_keyed: &'a HashMap<String, usize>,
        patch_index: usize,
        path: Path,
        changes: Vec<Change<Msg>>,
    ) -> Self {
        Self {
            old_children,
            old: old_children.iter().collect(),
            old_keyed,
            new: new_children.iter().collect(),
            new_keyed,
            moved: HashSet::new(),
            moved_offset: 0,
            removed: 0,
            node_index: 0,
            patch_index,
            path,
            changes,
            children: Vec::new(),
        }
    }

    fn into_patch(mut self) -> Patch<Msg> {
        self.changes.reverse();
        Patch::new(self.patch_index, self.removed, self.changes, self.children)
    }

    /// Host position of the node that will end up at `index` in the new list
    fn logical(&self, index: usize) -> usize {
        let logical = index as isize - self.moved_offset;
        if logical < 0 {
            tracing::warn!(index, offset = self.moved_offset, "host position drifted below zero");
            return 0;
        }
        logical as usize
    }

    fn step(&mut self, events: &mut EventRegistry<Msg>) -> Step<'a, Msg> {
        let Some(&prev) = self.old.front() else {
            self.insert_remaining(events);
            return Step::Done;
        };

        let Some(&next) = self.new.front() else {
            self.old.pop_front();
            // A node moved earlier in this pass is still in use.
            if prev.key().is_empty() || !self.moved.contains(prev.key()) {
                self.removed += 1;
                events.unregister_child(&self.path, self.node_index, prev);
            }
            // Each dropped child was registered at its own old position.
            self.node_index += 1;
            return Step::Continue;
        };

        if prev.key() != next.key() {
            self.reconcile_keys(prev, next, events);
            return Step::Continue;
        }

        self.old.pop_front();
        self.new.pop_front();
        let index = self.node_index;

        let step = match (prev, next) {
            (Node::Fragment(p), Node::Fragment(n)) => {
                let path = self.path.add(index, &n.key);
                Step::Descend(Level::new(
                    &p.children,
                    &p.keyed_children,
                    &n.children,
                    &n.keyed_children,
                    index,
                    path,
                    Vec::new(),
                ))
            }
            (Node::Element(p), Node::Element(n)) if p.namespace == n.namespace && p.tag == n.tag => {
                let path = self.path.add(index, &n.key);
                let controlled = is_controlled(events, &n.namespace, &n.tag, &path);
                let changes = diff_attributes(controlled, &path, events, &p.attributes, &n.attributes)
                    .into_iter()
                    .collect();
                Step::Descend(Level::new(
                    &p.children,
                    &p.keyed_children,
                    &n.children,
                    &n.keyed_children,
                    index,
                    path,
                    changes,
                ))
            }
            (Node::Text(p), Node::Text(n)) => {
                if p.content != n.content {
                    let change = Change::ReplaceText {
                        content: n.content.clone(),
                    };
                    self.children.push(Patch::new(index, 0, vec![change], Vec::new()));
                }
                Step::Continue
            }
            (Node::RawHtml(p), Node::RawHtml(n)) => {
                let path = self.path.add(index, &n.key);
                let mut changes: Vec<Change<Msg>> =
                    diff_attributes(false, &path, events, &p.attributes, &n.attributes)
                        .into_iter()
                        .collect();
                if p.inner_html != n.inner_html {
                    changes.push(Change::ReplaceInnerHtml {
                        inner_html: n.inner_html.clone(),
                    });
                }
                if !changes.is_empty() {
                    // Inner HTML goes first, then attributes.
                    changes.reverse();
                    self.children.push(Patch::new(index, 0, changes, Vec::new()));
                }
                Step::Continue
            }
            _ => {
                self.replace(prev, next, events);
                Step::Continue
            }
        };

        self.node_index += 1;
        step
    }

    /// Old list exhausted: everything left in the new list is appended
    fn insert_remaining(&mut self, events: &mut EventRegistry<Msg>) {
        if self.new.is_empty() {
            return;
        }
        let before = self.logical(self.node_index);
        let mut children = Vec::with_capacity(self.new.len());
        for (offset, child) in self.new.drain(..).enumerate() {
            events.register_child(None, &self.path, self.node_index + offset, child);
            children.push(child.clone());
        }
        self.changes.push(Change::Insert { children, before });
    }

    /// Heads carry different keys: move, insert, remove or replace
    fn reconcile_keys(&mut self, prev: &'a Node<Msg>, next: &'a Node<Msg>, events: &mut EventRegistry<Msg>) {
        let next_did_exist = self
            .old_keyed
            .get(next.key())
            .and_then(|&i| self.old_children.get(i));
        let prev_does_exist = self.new_keyed.contains_key(prev.key());

        match (prev_does_exist, next_did_exist) {
            (true, Some(matched)) => {
                if self.moved.contains(prev.key()) {
                    // Already pulled forward; its old slot is stale.
                    self.old.pop_front();
                    self.moved_offset -= 1;
                } else {
                    self.changes.push(Change::Move {
                        key: next.key().to_string(),
                        before: self.logical(self.node_index),
                    });
                    self.moved.insert(next.key());
                    self.moved_offset += 1;
                    self.old.push_front(matched);
                }
            }
            (true, None) => {
                self.changes.push(Change::Insert {
                    children: vec![next.clone()],
                    before: self.logical(self.node_index),
                });
                events.register_child(None, &self.path, self.node_index, next);
                self.new.pop_front();
                self.moved_offset += 1;
                self.node_index += 1;
            }
            (false, Some(_)) => {
                self.changes.push(Change::Remove {
                    index: self.logical(self.node_index),
                });
                events.unregister_child(&self.path, self.node_index, prev);
                self.old.pop_front();
                self.moved_offset -= 1;
            }
            (false, None) => {
                self.old.pop_front();
                self.new.pop_front();
                self.replace(prev, next, events);
                self.node_index += 1;
            }
        }
    }

    /// Swap `prev` for `next` at the current position
    fn replace(&mut self, prev: &Node<Msg>, next: &Node<Msg>, events: &mut EventRegistry<Msg>) {
        self.changes.push(Change::Replace {
            index: self.logical(self.node_index),
            with: next.clone(),
        });
        events.unregister_child(&self.path, self.node_index, prev);
        events.register_child(None, &self.path, self.node_index, next);
    }
}

/// Form controls whose live value can drift from the declared one once the
/// user has interacted with them.
fn is_controlled<Msg: 'static>(events: &EventRegistry<Msg>, namespace: &str, tag: &str, path: &Path) -> bool {
    namespace.is_empty()
        && matches!(tag, "input" | "select" | "textarea")
        && events.has_dispatched_events(path)
}

fn is_controlled_value(name: &str) -> bool {
    matches!(name, "value" | "checked" | "selected")
}

/// Merge two sorted attribute lists into an `Update`, or `None` if nothing
/// changed. Listener registrations are updated as a side effect, even when
/// no change is emitted.
pub(crate) fn diff_attributes<Msg: 'static>(
    controlled: bool,
    path: &Path,
    events: &mut EventRegistry<Msg>,
    old: &[Attribute<Msg>],
    new: &[Attribute<Msg>],
) -> Option<Change<Msg>> {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let (mut i, mut j) = (0, 0);

    loop {
        let ordering = match (old.get(i), new.get(j)) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(prev), Some(next)) => prev.name().cmp(next.name()),
        };

        match ordering {
            Ordering::Less => {
                let prev = &old[i];
                if let Attribute::Event(listener) = prev {
                    events.remove_decoder(path, &listener.name);
                }
                removed.push(prev.clone());
                i += 1;
            }
            Ordering::Greater => {
                let next = &new[j];
                if let Attribute::Event(listener) = next {
                    events.insert_decoder(None, path, &listener.name, &listener.decoder);
                }
                added.push(next.clone());
                j += 1;
            }
            Ordering::Equal => {
                let (prev, next) = (&old[i], &new[j]);
                match (prev, next) {
                    (Attribute::Attr { value: before, .. }, Attribute::Attr { name, value }) => {
                        if value != before || (controlled && is_controlled_value(name)) {
                            added.push(next.clone());
                        }
                    }
                    (Attribute::Property { value: before, .. }, Attribute::Property { name, value }) => {
                        let changed = match name.as_str() {
                            "scrollLeft" | "scrollRight" => true,
                            name if is_controlled_value(name) => controlled || value != before,
                            _ => value != before,
                        };
                        if changed {
                            added.push(next.clone());
                        }
                    }
                    (Attribute::Event(before), Attribute::Event(listener)) => {
                        // The decoder may have changed even if nothing visible did.
                        events.insert_decoder(None, path, &listener.name, &listener.decoder);
                        if before.options_differ(listener) {
                            added.push(next.clone());
                        }
                    }
                    _ => {
                        if let Attribute::Event(listener) = prev {
                            events.remove_decoder(path, &listener.name);
                        }
                        if let Attribute::Event(listener) = next {
                            events.insert_decoder(None, path, &listener.name, &listener.decoder);
                        }
                        removed.push(prev.clone());
                        added.push(next.clone());
                    }
                }
                i += 1;
                j += 1;
            }
        }
    }

    if added.is_empty() && removed.is_empty() {
        None
    } else {
        Some(Change::Update { added, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{element, fragment, keyed, raw_html, text};
    use crate::vattr::{attribute, class, id, on, property, Handler};
    use crate::DomEvent;
    use serde_json::Value;

    type N = Node<&'static str>;

    fn registry(node: &N) -> EventRegistry<&'static str> {
        EventRegistry::from_node(node)
    }

    fn run(old: &N, new: &N) -> Diff<&'static str> {
        diff(registry(old), old, new)
    }

    fn li(key: &'static str) -> (&'static str, N) {
        (key, element("li", vec![], vec![text(key)]))
    }

    fn list(keys: &[&'static str]) -> N {
        keyed::ul(vec![], keys.iter().map(|k| li(k)).collect())
    }

    /// Changes of the patch for the root element
    fn root_changes<'a>(diff: &'a Diff<&'static str>) -> &'a [Change<&'static str>] {
        match diff.patch.children.first() {
            Some(patch) => &patch.changes,
            None => &[],
        }
    }

    #[test]
    fn test_identical_trees_produce_empty_patch() {
        let tree = || -> N {
            element(
                "div",
                vec![class("app"), on("click", |_| Ok(Handler::new("click")))],
                vec![
                    text("hello"),
                    fragment(vec![text("a"), text("b")]),
                    list(&["x", "y"]),
                    raw_html("", "div", vec![], "<b>raw</b>"),
                ],
            )
        };
        let result = run(&tree(), &tree());

        assert!(result.patch.is_empty());
        assert_eq!(result.events.len(), 1);
    }

    #[test]
    fn test_keyed_swap_is_single_move() {
        let old: N = keyed::ul(vec![], vec![("a", text("1")), ("b", text("2"))]);
        let new: N = keyed::ul(vec![], vec![("b", text("2")), ("a", text("1"))]);
        let result = run(&old, &new);

        let changes = root_changes(&result);
        assert_eq!(changes.len(), 1);
        assert!(matches!(&changes[0], Change::Move { key, before: 0 } if key == "b"));
        assert_eq!(result.patch.children[0].removed, 0);
    }

    #[test]
    fn test_keyed_rotation_only_moves() {
        let result = run(&list(&["a", "b", "c"]), &list(&["c", "a", "b"]));
        let changes = root_changes(&result);

        assert!(!changes.is_empty());
        assert!(changes.iter().all(|c| matches!(c, Change::Move { .. })));
        assert_eq!(result.patch.children[0].removed, 0);
    }

    #[test]
    fn test_keyed_reverse_only_moves() {
        let result = run(&list(&["a", "b", "c"]), &list(&["c", "b", "a"]));
        let changes = root_changes(&result);

        // Applied in reverse emission order: b then c, both to the front.
        let moves: Vec<_> = changes
            .iter()
            .map(|c| match c {
                Change::Move { key, before } => (key.as_str(), *before),
                other => panic!("unexpected change {other:?}"),
            })
            .collect();
        assert_eq!(moves, vec![("b", 0), ("c", 0)]);
    }

    #[test]
    fn test_keyed_insert_and_remove() {
        let result = run(&list(&["a", "b", "c"]), &list(&["b", "x", "a"]));
        let patch = &result.patch.children[0];

        // Insert x in front of a, then move b to the front.
        assert!(matches!(&patch.changes[0], Change::Insert { children, before: 0 } if children[0].key() == "x"));
        assert!(matches!(&patch.changes[1], Change::Move { key, before: 0 } if key == "b"));
        assert!(!patch.changes.iter().any(|c| matches!(c, Change::Replace { .. })));
        assert_eq!(patch.removed, 1);
    }

    /// Keyed list whose items each answer a click with their own key
    fn clickable(keys: &[&'static str]) -> N {
        keyed::ul(
            vec![],
            keys.iter()
                .map(|&k| (k, element("li", vec![on("click", move |_| Ok(Handler::new(k)))], vec![text(k)])))
                .collect(),
        )
    }

    fn clicked(events: &EventRegistry<&'static str>, path: &str) -> Option<&'static str> {
        match events.decode(path, "click", &DomEvent::new("click")) {
            crate::events::Decoded::Event { handler, .. } => Some(handler.message),
            crate::events::Decoded::Dispatched { .. } => None,
        }
    }

    #[test]
    fn test_keyed_remove_at_head() {
        let result = run(&clickable(&["a", "b"]), &clickable(&["b"]));
        let patch = &result.patch.children[0];

        assert!(matches!(&patch.changes[..], [Change::Remove { index: 0 }]));
        assert_eq!(patch.removed, 0);
        assert!(!result.events.contains("0\ta", "click"));
        assert_eq!(result.events.len(), 1);
    }

    #[test]
    fn test_stale_moved_entry_skipped_mid_list() {
        let result = run(&list(&["a", "b", "c", "d"]), &list(&["c", "a", "b", "d"]));
        let patch = &result.patch.children[0];

        assert!(matches!(&patch.changes[..], [Change::Move { key, before: 0 }] if key == "c"));
        assert_eq!(patch.removed, 0);
    }

    #[test]
    fn test_remove_and_stale_skip_together() {
        let result = run(&clickable(&["a", "b", "c", "d"]), &clickable(&["c", "a", "d"]));
        let patch = &result.patch.children[0];

        assert!(matches!(&patch.changes[0], Change::Remove { index: 1 }));
        assert!(matches!(&patch.changes[1], Change::Move { key, before: 0 } if key == "c"));
        assert_eq!(patch.changes.len(), 2);
        assert_eq!(patch.removed, 0);
        assert_eq!(result.events.len(), 3);
        for key in ["a", "c", "d"] {
            assert_eq!(clicked(&result.events, &format!("0\t{key}")), Some(key));
        }
    }

    #[test]
    fn test_moved_node_keeps_listeners() {
        let result = run(&clickable(&["a", "b"]), &clickable(&["b", "a"]));

        assert_eq!(result.events.len(), 2);
        assert_eq!(clicked(&result.events, "0\ta"), Some("a"));
        assert_eq!(clicked(&result.events, "0\tb"), Some("b"));
    }

    #[test]
    fn test_truncated_children_unregistered_at_own_index() {
        let button = |label: &'static str| -> N {
            element("button", vec![on("click", move |_| Ok(Handler::new(label)))], vec![])
        };
        let old: N = element("div", vec![], vec![button("p"), button("q"), button("r")]);
        let new: N = element("div", vec![], vec![button("p")]);
        let result = run(&old, &new);

        assert_eq!(result.patch.children[0].removed, 2);
        assert_eq!(result.events.len(), 1);
        assert!(result.events.contains("0\t0", "click"));
    }

    #[test]
    fn test_logical_position_never_negative() {
        let old: [N; 0] = [];
        let keys = HashMap::new();
        let mut level = Level::new(&old, &keys, &old, &keys, 0, Path::Root, Vec::new());
        level.moved_offset = 2;

        assert_eq!(level.logical(1), 0);
        assert_eq!(level.logical(3), 1);
    }

    #[test]
    fn test_unkeyed_append_and_truncate() {
        let short: N = element("p", vec![], vec![text("a")]);
        let long: N = element("p", vec![], vec![text("a"), text("b"), text("c")]);

        let grow = run(&short, &long);
        let changes = root_changes(&grow);
        assert!(matches!(&changes[0], Change::Insert { children, before: 1 } if children.len() == 2));

        let shrink = run(&long, &short);
        assert_eq!(shrink.patch.children[0].removed, 2);
        assert!(shrink.patch.children[0].changes.is_empty());
    }

    #[test]
    fn test_text_change_is_child_patch() {
        let result = run(
            &element("p", vec![], vec![text("a"), text("b")]),
            &element("p", vec![], vec![text("a"), text("c")]),
        );
        let p = &result.patch.children[0];

        assert!(p.changes.is_empty());
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].index, 1);
        assert!(matches!(&p.children[0].changes[0], Change::ReplaceText { content } if content == "c"));
    }

    #[test]
    fn test_tag_change_replaces() {
        let result = run(
            &element("div", vec![], vec![element("span", vec![], vec![])]),
            &element("div", vec![], vec![element("em", vec![], vec![])]),
        );
        assert!(matches!(root_changes(&result), [Change::Replace { index: 0, .. }]));
    }

    #[test]
    fn test_attribute_order_independence() {
        let old: N = element("a", vec![id("x"), class("c"), attribute("href", "/")], vec![]);
        let new: N = element("a", vec![attribute("href", "/"), class("c"), id("x")], vec![]);
        assert!(run(&old, &new).patch.is_empty());
    }

    #[test]
    fn test_attribute_update() {
        let old: N = element("a", vec![id("x"), attribute("title", "t")], vec![]);
        let new: N = element("a", vec![id("y"), attribute("href", "/")], vec![]);
        let result = run(&old, &new);

        let [Change::Update { added, removed }] = root_changes(&result) else {
            panic!("expected a single update");
        };
        let added: Vec<_> = added.iter().map(Attribute::name).collect();
        let removed: Vec<_> = removed.iter().map(Attribute::name).collect();
        assert_eq!(added, vec!["href", "id"]);
        assert_eq!(removed, vec!["title"]);
    }

    #[test]
    fn test_controlled_input_forces_value() {
        let input = || -> N {
            element(
                "input",
                vec![attribute("value", "x"), on("input", |_| Ok(Handler::new("typed")))],
                vec![],
            )
        };

        // Uncontrolled: nothing dispatched, nothing to do.
        assert!(run(&input(), &input()).patch.is_empty());

        // Controlled: an input event fired on this path since the last diff.
        let (events, _) = registry(&input()).handle("0", "input", &DomEvent::new("input"));
        let result = diff(events, &input(), &input());
        let [Change::Update { added, removed }] = root_changes(&result) else {
            panic!("expected a forced update");
        };
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].name(), "value");
        assert!(removed.is_empty());
    }

    #[test]
    fn test_controlled_requires_form_tag() {
        let div = || -> N { element("div", vec![attribute("value", "x")], vec![]) };
        let (events, _) = registry(&div()).handle("0", "click", &DomEvent::new("click"));
        assert!(diff(events, &div(), &div()).patch.is_empty());
    }

    #[test]
    fn test_scroll_properties_always_reapplied() {
        let node = || -> N { element("div", vec![property("scrollLeft", Value::from(10))], vec![]) };
        assert!(matches!(root_changes(&run(&node(), &node())), [Change::Update { .. }]));

        let plain = || -> N { element("div", vec![property("hidden", Value::Bool(true))], vec![]) };
        assert!(run(&plain(), &plain()).patch.is_empty());
    }

    #[test]
    fn test_listener_option_change_is_emitted() {
        let plain: N = element("input", vec![on("input", |_| Ok(Handler::new("a")))], vec![]);
        let debounced: N = element(
            "input",
            vec![Attribute::Event(
                crate::vattr::EventListener::new("input", |_| Ok(Handler::new("b"))).debounce(300),
            )],
            vec![],
        );

        let result = run(&plain, &debounced);
        assert!(matches!(root_changes(&result), [Change::Update { added, .. }] if added.len() == 1));

        // The new decoder is live even without an emitted change.
        let (_, handler) = run(&debounced, &debounced).events.handle("0", "input", &DomEvent::new("input"));
        assert_eq!(handler.unwrap().message, "b");
    }

    #[test]
    fn test_removed_listener_is_unregistered() {
        let old: N = element("button", vec![on("click", |_| Ok(Handler::new("x")))], vec![]);
        let new: N = element("button", vec![], vec![]);
        let result = run(&old, &new);

        assert!(matches!(root_changes(&result), [Change::Update { added, removed }] if added.is_empty() && removed.len() == 1));
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_inserted_subtree_registers_listeners() {
        let old: N = element("div", vec![], vec![]);
        let new: N = element(
            "div",
            vec![],
            vec![element("button", vec![on("click", |_| Ok(Handler::new("x")))], vec![])],
        );
        let result = run(&old, &new);
        assert!(result.events.contains("0\t0", "click"));
    }

    #[test]
    fn test_raw_html_change() {
        let old: N = element("div", vec![], vec![raw_html("", "p", vec![], "<i>a</i>")]);
        let new: N = element("div", vec![], vec![raw_html("", "p", vec![class("x")], "<i>b</i>")]);
        let result = run(&old, &new);

        let raw = &result.patch.children[0].children[0];
        assert_eq!(raw.index, 0);
        assert!(matches!(raw.changes[0], Change::ReplaceInnerHtml { .. }));
        assert!(matches!(raw.changes[1], Change::Update { .. }));
    }

    #[test]
    fn test_fragment_children_diffed_in_place() {
        let old: N = element("div", vec![], vec![fragment(vec![text("a"), text("b")])]);
        let new: N = element("div", vec![], vec![fragment(vec![text("a"), text("z")])]);
        let result = run(&old, &new);

        let frag = &result.patch.children[0].children[0];
        assert_eq!(frag.index, 0);
        assert_eq!(frag.children[0].index, 1);
    }
}
