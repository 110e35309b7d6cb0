//! Event Registry
//!
//! Maps `(path, event name)` to the decoder currently declared there, and
//! remembers which paths saw an event during the last render cycle. The
//! diff keeps the registry in step with the tree; the reconciler consults it
//! when a native event arrives.
//!
//! The registry is threaded by value: every operation consumes it and
//! returns the next one, so a render cycle can never observe a half-updated
//! registry.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::path::{event_key, Path};
use crate::vattr::{Attribute, Decoder, Handler};
use crate::vnode::Node;
use crate::{DecodeError, DomEvent};

/// Same-type message transform applied to decoded handlers
pub type Mapper<Msg> = Rc<dyn Fn(Msg) -> Msg>;

/// Result of running a registered decoder
#[derive(Debug)]
pub enum Decoded<Msg> {
    /// The decoder produced a handler
    Event { path: String, handler: Handler<Msg> },
    /// No handler, or the decoder rejected the event
    Dispatched { path: String, error: DecodeError },
}

impl<Msg> Decoded<Msg> {
    /// Serialized path the event fired on
    pub fn path(&self) -> &str {
        match self {
            Decoded::Event { path, .. } | Decoded::Dispatched { path, .. } => path,
        }
    }
}

/// Registered handlers plus dispatch bookkeeping
pub struct EventRegistry<Msg> {
    handlers: HashMap<String, Decoder<Msg>>,
    dispatched_paths: Vec<String>,
    next_dispatched_paths: Vec<String>,
}

impl<Msg: 'static> EventRegistry<Msg> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            dispatched_paths: Vec::new(),
            next_dispatched_paths: Vec::new(),
        }
    }

    /// Registry holding every listener declared in `root`
    pub fn from_node(root: &Node<Msg>) -> Self {
        Self::new().add_child(None, &Path::Root, 0, root)
    }

    /// Start a render cycle: paths dispatched since the previous tick become
    /// the ones `has_dispatched_events` answers for.
    pub fn tick(self) -> Self {
        Self {
            handlers: self.handlers,
            dispatched_paths: self.next_dispatched_paths,
            next_dispatched_paths: Vec::new(),
        }
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Check whether a handler is registered for `name` at `path`
    pub fn contains(&self, path: &str, name: &str) -> bool {
        self.handlers.contains_key(&event_key(path, name))
    }

    /// Register (or replace) the decoder for `name` at `path`
    pub fn add_event(mut self, mapper: Option<&Mapper<Msg>>, path: &Path, name: &str, decoder: &Decoder<Msg>) -> Self {
        self.insert_decoder(mapper, path, name, decoder);
        self
    }

    /// Drop the decoder for `name` at `path`
    pub fn remove_event(mut self, path: &Path, name: &str) -> Self {
        self.remove_decoder(path, name);
        self
    }

    /// Run the decoder registered for `name` at `path` (a serialized path)
    pub fn decode(&self, path: &str, name: &str, event: &DomEvent) -> Decoded<Msg> {
        let path = path.to_string();
        let Some(decoder) = self.handlers.get(&event_key(&path, name)) else {
            let error = DecodeError::MissingHandler {
                path: path.clone(),
                name: name.to_string(),
            };
            return Decoded::Dispatched { path, error };
        };
        match decoder(event) {
            Ok(handler) => Decoded::Event { path, handler },
            Err(error) => Decoded::Dispatched { path, error },
        }
    }

    /// Record the occurrence and hand out its handler.
    ///
    /// The path is recorded even when decoding failed, so an input the user
    /// typed into still counts as controlled on the next render.
    pub fn dispatch(mut self, decoded: Decoded<Msg>) -> (Self, Result<Handler<Msg>, DecodeError>) {
        match decoded {
            Decoded::Event { path, handler } => {
                self.next_dispatched_paths.push(path);
                (self, Ok(handler))
            }
            Decoded::Dispatched { path, error } => {
                self.next_dispatched_paths.push(path);
                (self, Err(error))
            }
        }
    }

    /// `decode` then `dispatch`
    pub fn handle(self, path: &str, name: &str, event: &DomEvent) -> (Self, Result<Handler<Msg>, DecodeError>) {
        let decoded = self.decode(path, name, event);
        self.dispatch(decoded)
    }

    /// Did an event fire at `path`, or at one of its ancestors, during the
    /// previous cycle?
    pub fn has_dispatched_events(&self, path: &Path) -> bool {
        path.matches(&self.dispatched_paths)
    }

    /// Register every listener in `child`, placed at `index` under `parent`
    pub fn add_child(mut self, mapper: Option<&Mapper<Msg>>, parent: &Path, index: usize, child: &Node<Msg>) -> Self {
        self.register_child(mapper, parent, index, child);
        self
    }

    /// Register every listener in `children`, the first placed at `index`
    pub fn add_children(
        mut self,
        mapper: Option<&Mapper<Msg>>,
        parent: &Path,
        index: usize,
        children: &[Node<Msg>],
    ) -> Self {
        for (offset, child) in children.iter().enumerate() {
            self.register_child(mapper, parent, index + offset, child);
        }
        self
    }

    /// Unregister every listener in `child`, placed at `index` under `parent`
    pub fn remove_child(mut self, parent: &Path, index: usize, child: &Node<Msg>) -> Self {
        self.unregister_child(parent, index, child);
        self
    }

    pub(crate) fn insert_decoder(&mut self, mapper: Option<&Mapper<Msg>>, path: &Path, name: &str, decoder: &Decoder<Msg>) {
        let decoder = match mapper {
            None => Rc::clone(decoder),
            Some(mapper) => {
                let decoder = Rc::clone(decoder);
                let mapper = Rc::clone(mapper);
                Rc::new(move |event: &DomEvent| decoder(event).map(|handler| handler.map(&*mapper))) as Decoder<Msg>
            }
        };
        self.handlers.insert(path.event_key(name), decoder);
    }

    pub(crate) fn remove_decoder(&mut self, path: &Path, name: &str) {
        self.handlers.remove(&path.event_key(name));
    }

    fn register_attributes(&mut self, mapper: Option<&Mapper<Msg>>, path: &Path, attributes: &[Attribute<Msg>]) {
        for attribute in attributes {
            if let Attribute::Event(listener) = attribute {
                self.insert_decoder(mapper, path, &listener.name, &listener.decoder);
            }
        }
    }

    pub(crate) fn register_child(&mut self, mapper: Option<&Mapper<Msg>>, parent: &Path, index: usize, child: &Node<Msg>) {
        match child {
            Node::Fragment(fragment) => {
                let path = parent.add(index, &fragment.key);
                for (i, grandchild) in fragment.children.iter().enumerate() {
                    self.register_child(mapper, &path, i, grandchild);
                }
            }
            Node::Element(element) => {
                let path = parent.add(index, &element.key);
                self.register_attributes(mapper, &path, &element.attributes);
                for (i, grandchild) in element.children.iter().enumerate() {
                    self.register_child(mapper, &path, i, grandchild);
                }
            }
            Node::Text(_) => {}
            Node::RawHtml(raw) => {
                let path = parent.add(index, &raw.key);
                self.register_attributes(mapper, &path, &raw.attributes);
            }
        }
    }

    fn unregister_attributes(&mut self, path: &Path, attributes: &[Attribute<Msg>]) {
        for attribute in attributes {
            if let Attribute::Event(listener) = attribute {
                self.remove_decoder(path, &listener.name);
            }
        }
    }

    pub(crate) fn unregister_child(&mut self, parent: &Path, index: usize, child: &Node<Msg>) {
        match child {
            Node::Fragment(fragment) => {
                let path = parent.add(index, &fragment.key);
                for (i, grandchild) in fragment.children.iter().enumerate() {
                    self.unregister_child(&path, i, grandchild);
                }
            }
            Node::Element(element) => {
                let path = parent.add(index, &element.key);
                self.unregister_attributes(&path, &element.attributes);
                for (i, grandchild) in element.children.iter().enumerate() {
                    self.unregister_child(&path, i, grandchild);
                }
            }
            Node::Text(_) => {}
            Node::RawHtml(raw) => {
                let path = parent.add(index, &raw.key);
                self.unregister_attributes(&path, &raw.attributes);
            }
        }
    }
}

impl<Msg: 'static> Default for EventRegistry<Msg> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Msg> Clone for EventRegistry<Msg> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            dispatched_paths: self.dispatched_paths.clone(),
            next_dispatched_paths: self.next_dispatched_paths.clone(),
        }
    }
}

impl<Msg> fmt::Debug for EventRegistry<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("EventRegistry")
            .field("handlers", &keys)
            .field("dispatched_paths", &self.dispatched_paths)
            .field("next_dispatched_paths", &self.next_dispatched_paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{element, fragment, keyed, text};
    use crate::vattr::on;

    fn click(msg: &'static str) -> Attribute<&'static str> {
        on("click", move |_| Ok(Handler::new(msg)))
    }

    fn tree() -> Node<&'static str> {
        element(
            "div",
            vec![click("root")],
            vec![
                text("label"),
                fragment(vec![element("button", vec![click("a")], vec![])]),
                keyed::ul(vec![], vec![("item", element("li", vec![click("b")], vec![]))]),
            ],
        )
    }

    #[test]
    fn test_from_node_paths() {
        let registry = EventRegistry::from_node(&tree());

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("0", "click"));
        assert!(registry.contains("0\t1\t0", "click"));
        assert!(registry.contains("0\t2\titem", "click"));
    }

    #[test]
    fn test_handle_decodes() {
        let registry = EventRegistry::from_node(&tree());
        let (registry, result) = registry.handle("0\t1\t0", "click", &DomEvent::new("click"));

        assert_eq!(result.unwrap().message, "a");
        assert!(!registry.has_dispatched_events(&Path::Root.add(0, "")));

        let registry = registry.tick();
        let button = Path::Root.add(0, "").add(1, "").add(0, "");
        assert!(registry.has_dispatched_events(&button));
        assert!(!registry.has_dispatched_events(&Path::Root.add(0, "").add(2, "")));
    }

    #[test]
    fn test_failed_decode_still_records_path() {
        let failing: Node<()> = element(
            "input",
            vec![on("input", |_| Err(DecodeError::MissingField("value".into())))],
            vec![],
        );
        let registry = EventRegistry::from_node(&failing);
        let (registry, result) = registry.handle("0", "input", &DomEvent::new("input"));

        assert_eq!(result.unwrap_err(), DecodeError::MissingField("value".into()));
        assert!(registry.tick().has_dispatched_events(&Path::Root.add(0, "")));
    }

    #[test]
    fn test_missing_handler() {
        let registry: EventRegistry<()> = EventRegistry::new();
        let decoded = registry.decode("0", "click", &DomEvent::new("click"));
        assert!(matches!(decoded, Decoded::Dispatched { error: DecodeError::MissingHandler { .. }, .. }));
    }

    #[test]
    fn test_tick_forgets_older_cycles() {
        let registry: EventRegistry<()> = EventRegistry::new();
        let (registry, _) = registry.handle("0", "click", &DomEvent::new("click"));
        let registry = registry.tick();
        assert!(registry.has_dispatched_events(&Path::Root.add(0, "")));

        let registry = registry.tick();
        assert!(!registry.has_dispatched_events(&Path::Root.add(0, "")));
    }

    #[test]
    fn test_remove_child_unregisters_subtree() {
        let node = tree();
        let registry = EventRegistry::from_node(&node).remove_child(&Path::Root, 0, &node);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mapper_applies() {
        let node: Node<&'static str> = element("a", vec![click("x")], vec![]);
        let mapper: Mapper<&'static str> = Rc::new(|_| "mapped");
        let registry = EventRegistry::new().add_child(Some(&mapper), &Path::Root, 0, &node);

        let (_, result) = registry.handle("0", "click", &DomEvent::new("click"));
        assert_eq!(result.unwrap().message, "mapped");
    }
}
