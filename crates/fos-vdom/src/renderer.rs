//! Renderer
//!
//! Owns everything one mounted view needs between renders: the host, the
//! reconciler, the current virtual tree and the event registry. It performs
//! no scheduling; callers decide when to render and feed it events and
//! timers.

use crate::config::ReconcilerConfig;
use crate::diff::diff;
use crate::events::EventRegistry;
use crate::host::{Host, TimerId};
use crate::reconciler::Reconciler;
use crate::vnode::Node;
use crate::DomEvent;

/// A view mounted into a host
pub struct Renderer<H: Host, Msg> {
    host: H,
    reconciler: Reconciler<H, Msg>,
    tree: Node<Msg>,
    events: EventRegistry<Msg>,
}

impl<H: Host, Msg: 'static> Renderer<H, Msg> {
    /// Mount `tree` into `root`
    pub fn new(mut host: H, root: H::Node, tree: Node<Msg>, config: ReconcilerConfig) -> Self {
        let mut reconciler = Reconciler::new(root, config);
        reconciler.mount(&mut host, &tree);
        let events = EventRegistry::from_node(&tree);
        tracing::debug!(handlers = events.len(), "renderer mounted");
        Self {
            host,
            reconciler,
            tree,
            events,
        }
    }

    /// Adopt content already present under `root`. Listeners attach on the
    /// first [`Renderer::render`].
    pub fn hydrate(mut host: H, root: H::Node, config: ReconcilerConfig) -> Self {
        let (reconciler, tree) = Reconciler::virtualise(&mut host, root, config);
        let events = EventRegistry::from_node(&tree);
        Self {
            host,
            reconciler,
            tree,
            events,
        }
    }

    /// Bring the host in line with `next`
    pub fn render(&mut self, next: Node<Msg>) {
        let events = std::mem::take(&mut self.events);
        let result = diff(events, &self.tree, &next);
        self.reconciler.push(&mut self.host, &result.patch);
        self.events = result.events;
        self.tree = next;
        tracing::debug!(
            changes = result.patch.change_count(),
            handlers = self.events.len(),
            "rendered"
        );
    }

    /// Deliver `event` to `target` and bubble it through the target's
    /// ancestors up to the root, until a listener stops propagation.
    /// Returns the messages dispatched along the way, innermost first.
    pub fn handle_event(&mut self, target: &H::Node, mut event: DomEvent) -> Vec<Msg> {
        let root = self.reconciler.root().clone();
        let mut messages = Vec::new();
        let mut current = Some(target.clone());
        while let Some(node) = current {
            if let Some(message) =
                self.reconciler
                    .handle_event(&mut self.host, &mut self.events, &node, &mut event)
            {
                messages.push(message);
            }
            if event.is_propagation_stopped() || node == root {
                break;
            }
            current = self.host.parent_node(&node);
        }
        messages
    }

    /// Complete the debounced occurrence waiting on `timer`
    pub fn fire_timer(&mut self, timer: TimerId) -> Option<Msg> {
        self.reconciler.fire_timer(&mut self.events, timer)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The tree last rendered
    pub fn tree(&self) -> &Node<Msg> {
        &self.tree
    }

    pub fn events(&self) -> &EventRegistry<Msg> {
        &self.events
    }

    pub fn reconciler(&self) -> &Reconciler<H, Msg> {
        &self.reconciler
    }
}
