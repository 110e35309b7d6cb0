//! Reconciler
//!
//! Applies patches to a live host tree. A metadata tree mirrors the host
//! 1:1 and carries what the host cannot: node kinds, keys, nested fragment
//! structure and per-listener throttle / debounce state.
//!
//! A fragment is hosted as an empty marker text node followed by its
//! children, flattened into the parent host element.

mod meta;
mod synced;
mod virtualise;

use std::collections::HashMap;
use std::mem;

use crate::config::ReconcilerConfig;
use crate::events::{Decoded, EventRegistry};
use crate::host::{Host, TimerId};
use crate::patch::{Change, Patch};
use crate::vattr::{Attribute, Policy};
use crate::vnode::{Node, NodeKind};
use crate::DomEvent;

use meta::{Debounce, ListenerOptions, MetaId, MetaTree, Throttle};

/// A debounced occurrence waiting for its timer
struct PendingDebounce<Msg> {
    meta: MetaId,
    name: String,
    occurrence: u64,
    /// `None` when the occurrence was already dispatched by the throttle
    decoded: Option<Decoded<Msg>>,
}

/// Keeps a host tree in sync with patches
pub struct Reconciler<H: Host, Msg> {
    config: ReconcilerConfig,
    meta: MetaTree<H::Node>,
    by_host: HashMap<H::Node, MetaId>,
    root: MetaId,
    root_node: H::Node,
    pending: HashMap<TimerId, PendingDebounce<Msg>>,
    occurrences: u64,
}

impl<H: Host, Msg: 'static> Reconciler<H, Msg> {
    /// Reconciler managing the children of `root`
    pub fn new(root: H::Node, config: ReconcilerConfig) -> Self {
        let mut meta = MetaTree::new();
        let root_id = meta.insert(NodeKind::Element, None, root.clone(), 0, "");
        let mut by_host = HashMap::new();
        by_host.insert(root.clone(), root_id);
        Self {
            config,
            meta,
            by_host,
            root: root_id,
            root_node: root,
            pending: HashMap::new(),
            occurrences: 0,
        }
    }

    /// The host node the tree is mounted into
    pub fn root(&self) -> &H::Node {
        &self.root_node
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Build the host tree for `vdom` under the root
    pub fn mount(&mut self, host: &mut H, vdom: &Node<Msg>) {
        let root_node = self.root_node.clone();
        self.insert_child(host, &root_node, None, self.root, 0, vdom);
        tracing::debug!(nodes = self.meta.len(), "mounted");
    }

    /// Apply `patch` to the host tree
    pub fn push(&mut self, host: &mut H, patch: &Patch<Msg>) {
        let mut stack = vec![(self.root, patch)];
        while let Some((id, patch)) = stack.pop() {
            for change in &patch.changes {
                tracing::trace!(kind = change.kind(), "apply change");
                self.apply(host, id, change);
            }

            if patch.removed > 0 {
                let len = self.meta.get(id).map_or(0, |m| m.children.len());
                self.remove_children(host, id, len.saturating_sub(patch.removed), patch.removed);
            }

            for child in &patch.children {
                match self.meta.child(id, child.index) {
                    Some(target) => stack.push((target, child)),
                    None => tracing::warn!(index = child.index, "patch target missing, skipped"),
                }
            }
        }
        tracing::debug!(
            changes = patch.change_count(),
            nodes = self.meta.len(),
            timers = self.pending.len(),
            "patch applied"
        );
    }

    /// Route a native event fired on `target` to its listener.
    ///
    /// Returns the message to hand to the application, if the occurrence is
    /// dispatched now. Throttled occurrences inside the interval produce
    /// nothing; debounced ones arm a host timer and are dispatched by
    /// [`Reconciler::fire_timer`].
    pub fn handle_event(
        &mut self,
        host: &mut H,
        events: &mut EventRegistry<Msg>,
        target: &H::Node,
        event: &mut DomEvent,
    ) -> Option<Msg> {
        let id = *self.by_host.get(target)?;
        let name = event.kind.clone();
        let options = *self.meta.get(id)?.handlers.get(&name)?;

        if options.prevent_default == Policy::Always {
            event.prevent_default();
        }
        if options.stop_propagation == Policy::Always {
            event.stop_propagation();
        }

        let path = self.meta.path(id);
        let mut decoded = Some(events.decode(&path, &name, event));
        self.occurrences += 1;
        let occurrence = self.occurrences;
        let now = host.now();

        let meta = self.meta.get_mut(id)?;
        let throttled = meta.throttles.get_mut(&name).map(|throttle| {
            let due = throttle.last.is_none_or(|last| now > last + throttle.delay);
            if due {
                throttle.last = Some(now);
                throttle.last_event = Some(occurrence);
            }
            due
        });

        let mut message = None;
        if throttled == Some(true) {
            message = decoded.take().and_then(|d| dispatch(events, d, options, Some(event)));
        }

        if let Some(debounce) = meta.debouncers.get_mut(&name) {
            if let Some(timer) = debounce.timer.take() {
                host.clear_timeout(timer);
                self.pending.remove(&timer);
            }
            let timer = host.set_timeout(debounce.delay);
            debounce.timer = Some(timer);
            self.pending.insert(
                timer,
                PendingDebounce {
                    meta: id,
                    name,
                    occurrence,
                    decoded,
                },
            );
        } else if throttled.is_none() {
            message = decoded.take().and_then(|d| dispatch(events, d, options, Some(event)));
        }

        message
    }

    /// Complete a debounced occurrence whose host timer fired
    pub fn fire_timer(&mut self, events: &mut EventRegistry<Msg>, timer: TimerId) -> Option<Msg> {
        let pending = self.pending.remove(&timer)?;
        let meta = self.meta.get_mut(pending.meta)?;

        if let Some(debounce) = meta.debouncers.get_mut(&pending.name) {
            if debounce.timer == Some(timer) {
                debounce.timer = None;
            }
        }

        let already_throttled = meta
            .throttles
            .get(&pending.name)
            .is_some_and(|t| t.last_event == Some(pending.occurrence));
        if already_throttled {
            return None;
        }

        let options = *meta.handlers.get(&pending.name)?;
        dispatch(events, pending.decoded?, options, None)
    }

    /// Number of armed debounce timers
    pub fn pending_timers(&self) -> usize {
        self.pending.len()
    }

    /// Serialized path of a mounted host node
    pub fn path_of(&self, node: &H::Node) -> Option<String> {
        self.by_host.get(node).map(|&id| self.meta.path(id))
    }

    /// Check whether `node` is managed by this reconciler
    pub fn is_tracked(&self, node: &H::Node) -> bool {
        self.by_host.contains_key(node)
    }

    /// Kind and path of every metadata node below the root, in tree order
    pub fn outline(&self) -> Vec<(NodeKind, String)> {
        let mut out = Vec::new();
        let mut stack: Vec<MetaId> = self
            .meta
            .get(self.root)
            .map(|m| m.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(meta) = self.meta.get(id) else {
                continue;
            };
            out.push((meta.kind, self.meta.path(id)));
            stack.extend(meta.children.iter().rev().copied());
        }
        out
    }

    fn apply(&mut self, host: &mut H, id: MetaId, change: &Change<Msg>) {
        match change {
            Change::ReplaceText { content } => {
                if let Some(meta) = self.meta.get(id) {
                    host.set_text(&meta.node, content);
                }
            }
            Change::ReplaceInnerHtml { inner_html } => {
                if let Some(meta) = self.meta.get(id) {
                    host.set_inner_html(&meta.node, inner_html);
                }
            }
            Change::Update { added, removed } => self.update(host, id, added, removed),
            Change::Move { key, before } => self.move_child(host, id, key, *before),
            Change::Remove { index } => self.remove_children(host, id, *index, 1),
            Change::Replace { index, with } => {
                self.remove_children(host, id, *index, 1);
                let Some(dom_parent) = self.parent_node(host, id) else {
                    return;
                };
                let before = self.reference(host, id, *index);
                self.insert_child(host, &dom_parent, before.as_ref(), id, *index, with);
            }
            Change::Insert { children, before } => {
                let Some(dom_parent) = self.parent_node(host, id) else {
                    tracing::warn!("insert into detached node, skipped");
                    return;
                };
                let reference = self.reference(host, id, *before);
                for (offset, child) in children.iter().enumerate() {
                    self.insert_child(host, &dom_parent, reference.as_ref(), id, before + offset, child);
                }
            }
        }
    }

    /// Host node children of `id` are inserted into
    fn parent_node(&self, host: &H, id: MetaId) -> Option<H::Node> {
        let meta = self.meta.get(id)?;
        if meta.kind == NodeKind::Fragment {
            host.parent_node(&meta.node)
        } else {
            Some(meta.node.clone())
        }
    }

    /// Host node a child inserted at `index` of `id` goes in front of
    fn reference(&self, host: &H, id: MetaId, index: usize) -> Option<H::Node> {
        let meta = self.meta.get(id)?;
        if let Some(&child) = meta.children.get(index) {
            return self.meta.get(child).map(|c| c.node.clone());
        }

        let mut last = match meta.children.last() {
            Some(&child) => child,
            None if meta.kind == NodeKind::Fragment => id,
            None => return None,
        };
        loop {
            let current = self.meta.get(last)?;
            match current.children.last() {
                Some(&child) if current.kind == NodeKind::Fragment => last = child,
                _ => return host.next_sibling(&current.node),
            }
        }
    }

    fn track(&mut self, kind: NodeKind, parent: MetaId, node: H::Node, index: usize, key: &str) -> MetaId {
        let id = self.meta.insert(kind, Some(parent), node.clone(), index, key);
        self.by_host.insert(node, id);
        id
    }

    fn track_element(&mut self, host: &mut H, kind: NodeKind, parent: MetaId, node: &H::Node, index: usize, key: &str) -> MetaId {
        let id = self.track(kind, parent, node.clone(), index, key);
        if self.config.expose_keys && !key.is_empty() {
            host.set_attribute(node, &self.config.key_attribute, key);
        }
        id
    }

    fn insert_child(
        &mut self,
        host: &mut H,
        dom_parent: &H::Node,
        before: Option<&H::Node>,
        parent: MetaId,
        index: usize,
        vnode: &Node<Msg>,
    ) {
        match vnode {
            Node::Element(element) => {
                let node = host.create_element(&element.namespace, &element.tag);
                let id = self.track_element(host, NodeKind::Element, parent, &node, index, &element.key);
                for attribute in &element.attributes {
                    self.create_attribute(host, id, &node, attribute);
                }
                for (i, child) in element.children.iter().enumerate() {
                    self.insert_child(host, &node, None, id, i, child);
                }
                host.insert_before(dom_parent, &node, before);
            }
            Node::Text(text) => {
                let node = host.create_text(&text.content);
                self.track(NodeKind::Text, parent, node.clone(), index, &text.key);
                host.insert_before(dom_parent, &node, before);
            }
            Node::Fragment(fragment) => {
                let marker = host.create_text("");
                let id = self.track(NodeKind::Fragment, parent, marker.clone(), index, &fragment.key);
                host.insert_before(dom_parent, &marker, before);
                for (i, child) in fragment.children.iter().enumerate() {
                    self.insert_child(host, dom_parent, before, id, i, child);
                }
            }
            Node::RawHtml(raw) => {
                let node = host.create_element(&raw.namespace, &raw.tag);
                let id = self.track_element(host, NodeKind::RawHtml, parent, &node, index, &raw.key);
                for attribute in &raw.attributes {
                    self.create_attribute(host, id, &node, attribute);
                }
                host.set_inner_html(&node, &raw.inner_html);
                host.insert_before(dom_parent, &node, before);
            }
        }
    }

    fn create_attribute(&mut self, host: &mut H, id: MetaId, node: &H::Node, attribute: &Attribute<Msg>) {
        match attribute {
            Attribute::Attr { name, value } => {
                if let Some((property, value)) = synced::default_property(name, value) {
                    host.set_property(node, property, value);
                    return;
                }
                if host.get_attribute(node, name).as_deref() != Some(value.as_str()) {
                    host.set_attribute(node, name, value);
                }
                synced::added(host, node, name, value);
            }
            Attribute::Property { name, value } => host.set_property(node, name, value.clone()),
            Attribute::Event(listener) => {
                let Some(meta) = self.meta.get_mut(id) else {
                    return;
                };
                if meta.handlers.contains_key(&listener.name) {
                    host.remove_event_listener(node, &listener.name);
                }
                let passive = listener.prevent_default == Policy::Never;
                host.add_event_listener(node, &listener.name, passive);
                update_throttle(&mut meta.throttles, &listener.name, listener.throttle);
                update_debounce(host, &mut self.pending, &mut meta.debouncers, &listener.name, listener.debounce);
                meta.handlers.insert(
                    listener.name.clone(),
                    ListenerOptions {
                        prevent_default: listener.prevent_default,
                        stop_propagation: listener.stop_propagation,
                    },
                );
            }
        }
    }

    fn update(&mut self, host: &mut H, id: MetaId, added: &[Attribute<Msg>], removed: &[Attribute<Msg>]) {
        let Some(node) = self.meta.get(id).map(|m| m.node.clone()) else {
            tracing::warn!("update of unknown node, skipped");
            return;
        };

        for attribute in removed {
            let name = attribute.name();
            let Some(meta) = self.meta.get_mut(id) else {
                return;
            };
            if meta.handlers.remove(name).is_some() {
                host.remove_event_listener(&node, name);
                update_throttle(&mut meta.throttles, name, 0);
                update_debounce(host, &mut self.pending, &mut meta.debouncers, name, 0);
            } else {
                host.remove_attribute(&node, name);
                synced::removed(host, &node, name);
            }
        }

        for attribute in added {
            self.create_attribute(host, id, &node, attribute);
        }
    }

    fn move_child(&mut self, host: &mut H, id: MetaId, key: &str, before: usize) {
        let Some(dom_parent) = self.parent_node(host, id) else {
            return;
        };
        let Some(meta) = self.meta.get(id) else {
            return;
        };
        let Some(&anchor) = meta.children.get(before) else {
            tracing::warn!(key, before, "move past the end, skipped");
            return;
        };
        let offset = meta.children[before..]
            .iter()
            .position(|&c| self.meta.get(c).is_some_and(|m| m.key == key));
        let Some(offset) = offset else {
            tracing::warn!(key, "move of unknown key, skipped");
            return;
        };
        if offset == 0 {
            return;
        }

        if let Some(meta) = self.meta.get_mut(id) {
            meta.children[before..=before + offset].rotate_right(1);
        }
        let moved = match self.meta.child(id, before) {
            Some(moved) => moved,
            None => return,
        };
        let Some(anchor_node) = self.meta.get(anchor).map(|m| m.node.clone()) else {
            return;
        };

        // Fragment children follow their marker, depth first.
        let mut queue = vec![moved];
        while let Some(current) = queue.pop() {
            let Some(meta) = self.meta.get(current) else {
                continue;
            };
            host.move_before(&dom_parent, &meta.node, Some(&anchor_node));
            if meta.kind == NodeKind::Fragment {
                queue.extend(meta.children.iter().rev().copied());
            }
        }
    }

    fn remove_children(&mut self, host: &mut H, id: MetaId, index: usize, count: usize) {
        let Some(dom_parent) = self.parent_node(host, id) else {
            return;
        };
        let deleted: Vec<MetaId> = match self.meta.get_mut(id) {
            Some(meta) => {
                let end = (index + count).min(meta.children.len());
                if index >= end {
                    tracing::warn!(index, count, "remove past the end, skipped");
                    return;
                }
                meta.children.drain(index..end).collect()
            }
            None => return,
        };

        // Fragments are flat in the host: their children are siblings too.
        let mut queue = deleted.clone();
        let mut i = 0;
        while let Some(&current) = queue.get(i) {
            i += 1;
            let Some(meta) = self.meta.get(current) else {
                continue;
            };
            host.remove_child(&dom_parent, &meta.node);
            if meta.kind == NodeKind::Fragment {
                queue.extend(meta.children.iter().copied());
            }
        }

        for id in deleted {
            self.discard(host, id);
        }
    }

    /// Free the metadata of a removed subtree and cancel its timers
    fn discard(&mut self, host: &mut H, id: MetaId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(meta) = self.meta.release(current) else {
                continue;
            };
            for debounce in meta.debouncers.values() {
                if let Some(timer) = debounce.timer {
                    host.clear_timeout(timer);
                    self.pending.remove(&timer);
                }
            }
            self.by_host.remove(&meta.node);
            stack.extend(meta.children);
        }
    }
}

fn dispatch<Msg: 'static>(
    events: &mut EventRegistry<Msg>,
    decoded: Decoded<Msg>,
    options: ListenerOptions,
    event: Option<&mut DomEvent>,
) -> Option<Msg> {
    let (registry, result) = mem::take(events).dispatch(decoded);
    *events = registry;

    match result {
        Ok(handler) => {
            if let Some(event) = event {
                if options.prevent_default == Policy::Possible && handler.prevent_default {
                    event.prevent_default();
                }
                if options.stop_propagation == Policy::Possible && handler.stop_propagation {
                    event.stop_propagation();
                }
            }
            Some(handler.message)
        }
        Err(error) => {
            tracing::debug!(%error, "event produced no message");
            None
        }
    }
}

fn update_throttle(throttles: &mut HashMap<String, Throttle>, name: &str, delay: u64) {
    if delay > 0 {
        throttles
            .entry(name.to_string())
            .and_modify(|t| t.delay = delay)
            .or_insert(Throttle {
                delay,
                last: None,
                last_event: None,
            });
    } else {
        throttles.remove(name);
    }
}

fn update_debounce<H: Host, Msg>(
    host: &mut H,
    pending: &mut HashMap<TimerId, PendingDebounce<Msg>>,
    debouncers: &mut HashMap<String, Debounce>,
    name: &str,
    delay: u64,
) {
    if delay > 0 {
        debouncers
            .entry(name.to_string())
            .and_modify(|d| d.delay = delay)
            .or_insert(Debounce { delay, timer: None });
    } else if let Some(debounce) = debouncers.remove(name) {
        if let Some(timer) = debounce.timer {
            host.clear_timeout(timer);
            pending.remove(&timer);
        }
    }
}
