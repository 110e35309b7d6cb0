//! Virtual Attributes
//!
//! Plain attributes, script properties and event listeners, plus the
//! canonicalization that keeps every attribute list sorted by name so two
//! lists can be diffed in a single merge pass.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::{DecodeError, DomEvent};

/// Turns a native event into a [`Handler`], or explains why it could not.
pub type Decoder<Msg> = Rc<dyn Fn(&DomEvent) -> Result<Handler<Msg>, DecodeError>>;

/// The outcome of a successful decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handler<Msg> {
    /// Ask for `preventDefault` (honoured when the listener policy allows it)
    pub prevent_default: bool,
    /// Ask for `stopPropagation` (honoured when the listener policy allows it)
    pub stop_propagation: bool,
    /// Message handed to the application
    pub message: Msg,
}

impl<Msg> Handler<Msg> {
    /// A handler that only carries a message
    pub fn new(message: Msg) -> Self {
        Self {
            prevent_default: false,
            stop_propagation: false,
            message,
        }
    }

    /// Transform the message, keeping the flags
    pub fn map<U>(self, f: impl FnOnce(Msg) -> U) -> Handler<U> {
        Handler {
            prevent_default: self.prevent_default,
            stop_propagation: self.stop_propagation,
            message: f(self.message),
        }
    }
}

/// When a listener may call `preventDefault` / `stopPropagation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Never; listeners are registered passive
    #[default]
    Never,
    /// Only when the decoded handler asks for it
    Possible,
    /// Always, before decoding runs
    Always,
}

/// An event listener attribute
#[derive(Serialize)]
#[serde(bound = "")]
pub struct EventListener<Msg> {
    /// Event name (`click`, `input`, ...)
    pub name: String,
    #[serde(skip)]
    pub decoder: Decoder<Msg>,
    pub prevent_default: Policy,
    pub stop_propagation: Policy,
    /// Debounce delay in milliseconds (0 = off)
    pub debounce: u64,
    /// Throttle interval in milliseconds (0 = off)
    pub throttle: u64,
}

impl<Msg> EventListener<Msg> {
    pub fn new(
        name: &str,
        decoder: impl Fn(&DomEvent) -> Result<Handler<Msg>, DecodeError> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            decoder: Rc::new(decoder),
            prevent_default: Policy::Never,
            stop_propagation: Policy::Never,
            debounce: 0,
            throttle: 0,
        }
    }

    /// Always call `preventDefault`
    pub fn prevent_default(self) -> Self {
        self.with_prevent_default(Policy::Always)
    }

    /// Always call `stopPropagation`
    pub fn stop_propagation(self) -> Self {
        self.with_stop_propagation(Policy::Always)
    }

    pub fn with_prevent_default(mut self, policy: Policy) -> Self {
        self.prevent_default = policy;
        self
    }

    pub fn with_stop_propagation(mut self, policy: Policy) -> Self {
        self.stop_propagation = policy;
        self
    }

    /// Delay dispatch until `ms` milliseconds without another occurrence
    pub fn debounce(mut self, ms: u64) -> Self {
        self.debounce = ms;
        self
    }

    /// Dispatch at most once every `ms` milliseconds
    pub fn throttle(mut self, ms: u64) -> Self {
        self.throttle = ms;
        self
    }

    /// Run the decoder
    pub fn decode(&self, event: &DomEvent) -> Result<Handler<Msg>, DecodeError> {
        (self.decoder)(event)
    }

    /// Check whether the host-visible options differ from `other`
    pub fn options_differ(&self, other: &Self) -> bool {
        self.prevent_default != other.prevent_default
            || self.stop_propagation != other.stop_propagation
            || self.debounce != other.debounce
            || self.throttle != other.throttle
    }

    /// Wrap the decoder so it produces `U` messages
    pub fn map<U: 'static>(self, f: Rc<dyn Fn(Msg) -> U>) -> EventListener<U>
    where
        Msg: 'static,
    {
        let decoder = self.decoder;
        EventListener {
            name: self.name,
            decoder: Rc::new(move |event: &DomEvent| {
                decoder(event).map(|handler| handler.map(&*f))
            }),
            prevent_default: self.prevent_default,
            stop_propagation: self.stop_propagation,
            debounce: self.debounce,
            throttle: self.throttle,
        }
    }
}

impl<Msg> Clone for EventListener<Msg> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            decoder: Rc::clone(&self.decoder),
            prevent_default: self.prevent_default,
            stop_propagation: self.stop_propagation,
            debounce: self.debounce,
            throttle: self.throttle,
        }
    }
}

impl<Msg> fmt::Debug for EventListener<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("name", &self.name)
            .field("prevent_default", &self.prevent_default)
            .field("stop_propagation", &self.stop_propagation)
            .field("debounce", &self.debounce)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

/// A node attribute
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", bound = "")]
pub enum Attribute<Msg> {
    /// HTML attribute with a string value
    Attr { name: String, value: String },
    /// Script property with an arbitrary value
    Property { name: String, value: Value },
    /// Event listener
    Event(EventListener<Msg>),
}

impl<Msg> Attribute<Msg> {
    /// Attribute name (event name for listeners)
    pub fn name(&self) -> &str {
        match self {
            Attribute::Attr { name, .. } | Attribute::Property { name, .. } => name,
            Attribute::Event(listener) => &listener.name,
        }
    }

    /// Check if this is an event listener
    pub fn is_event(&self) -> bool {
        matches!(self, Attribute::Event(_))
    }

    /// Convert listener messages to `U`; other attributes are unchanged
    pub fn map<U: 'static>(self, f: &Rc<dyn Fn(Msg) -> U>) -> Attribute<U>
    where
        Msg: 'static,
    {
        match self {
            Attribute::Attr { name, value } => Attribute::Attr { name, value },
            Attribute::Property { name, value } => Attribute::Property { name, value },
            Attribute::Event(listener) => Attribute::Event(listener.map(Rc::clone(f))),
        }
    }
}

impl<Msg> Clone for Attribute<Msg> {
    fn clone(&self) -> Self {
        match self {
            Attribute::Attr { name, value } => Attribute::Attr {
                name: name.clone(),
                value: value.clone(),
            },
            Attribute::Property { name, value } => Attribute::Property {
                name: name.clone(),
                value: value.clone(),
            },
            Attribute::Event(listener) => Attribute::Event(listener.clone()),
        }
    }
}

impl<Msg> fmt::Debug for Attribute<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Attr { name, value } => {
                f.debug_struct("Attr").field("name", name).field("value", value).finish()
            }
            Attribute::Property { name, value } => {
                f.debug_struct("Property").field("name", name).field("value", value).finish()
            }
            Attribute::Event(listener) => fmt::Debug::fmt(listener, f),
        }
    }
}

/// Sort attributes by name and fold repeated `class` / `style` entries.
///
/// Attributes with an empty name, and `class` / `style` attributes with an
/// empty value, are dropped. Repeated classes are joined with a space and
/// repeated styles with `;`, in declaration order.
pub fn prepare<Msg>(mut attributes: Vec<Attribute<Msg>>) -> Vec<Attribute<Msg>> {
    if attributes.is_empty() {
        return attributes;
    }

    // Stable sort, descending; the fold below reverses it back.
    attributes.sort_by(|a, b| b.name().cmp(a.name()));

    let mut merged = Vec::with_capacity(attributes.len());
    let mut iter = attributes.into_iter().peekable();
    while let Some(attribute) = iter.next() {
        match attribute {
            Attribute::Attr { name, .. } if name.is_empty() => {}
            Attribute::Attr { name, mut value } if name == "class" || name == "style" => {
                if value.is_empty() {
                    continue;
                }
                let separator = if name == "class" { ' ' } else { ';' };
                while let Some(Attribute::Attr { name: next, .. }) = iter.peek() {
                    if *next != name {
                        break;
                    }
                    if let Some(Attribute::Attr { value: next_value, .. }) = iter.next() {
                        value.push(separator);
                        value.push_str(&next_value);
                    }
                }
                merged.push(Attribute::Attr { name, value });
            }
            other => merged.push(other),
        }
    }
    merged.reverse();
    merged
}

/// Plain HTML attribute
pub fn attribute<Msg>(name: &str, value: &str) -> Attribute<Msg> {
    Attribute::Attr {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Script property
pub fn property<Msg>(name: &str, value: Value) -> Attribute<Msg> {
    Attribute::Property {
        name: name.to_string(),
        value,
    }
}

pub fn class<Msg>(name: &str) -> Attribute<Msg> {
    attribute("class", name)
}

pub fn id<Msg>(value: &str) -> Attribute<Msg> {
    attribute("id", value)
}

/// `data-*` attribute
pub fn data<Msg>(key: &str, value: &str) -> Attribute<Msg> {
    attribute(&format!("data-{key}"), value)
}

/// Single inline style declaration; empty property or value yields nothing
pub fn style<Msg>(property: &str, value: &str) -> Attribute<Msg> {
    if property.is_empty() || value.is_empty() {
        return class("");
    }
    attribute("style", &format!("{property}:{value};"))
}

/// Several inline style declarations, skipping empty entries
pub fn styles<Msg>(properties: &[(&str, &str)]) -> Attribute<Msg> {
    let mut css = String::new();
    for (name, value) in properties {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        css.push_str(name);
        css.push(':');
        css.push_str(value);
        css.push(';');
    }
    attribute("style", &css)
}

/// Event listener attribute with default options
pub fn on<Msg>(
    name: &str,
    decoder: impl Fn(&DomEvent) -> Result<Handler<Msg>, DecodeError> + 'static,
) -> Attribute<Msg> {
    Attribute::Event(EventListener::new(name, decoder))
}

/// Attribute holding the initial value of a form control
pub fn default_value<Msg>(value: &str) -> Attribute<Msg> {
    attribute("virtual:defaultValue", value)
}

/// Initial checked state of a checkbox or radio input
pub fn default_checked<Msg>(checked: bool) -> Attribute<Msg> {
    if checked {
        attribute("virtual:defaultChecked", "")
    } else {
        class("")
    }
}

/// Initial selected state of an option
pub fn default_selected<Msg>(selected: bool) -> Attribute<Msg> {
    if selected {
        attribute("virtual:defaultSelected", "")
    } else {
        class("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(attrs: &[Attribute<()>]) -> Vec<&str> {
        attrs.iter().map(Attribute::name).collect()
    }

    fn value_of<'a>(attrs: &'a [Attribute<()>], name: &str) -> Option<&'a str> {
        attrs.iter().find_map(|a| match a {
            Attribute::Attr { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_prepare_sorts_ascending() {
        let attrs = prepare(vec![attribute("type", "text"), id("a"), attribute("name", "q")]);
        assert_eq!(names(&attrs), vec!["id", "name", "type"]);
    }

    #[test]
    fn test_prepare_merges_class_and_style() {
        let attrs = prepare(vec![
            class("a"),
            style("color", "red"),
            id("x"),
            class("b"),
            style("margin", "0"),
        ]);

        assert_eq!(names(&attrs), vec!["class", "id", "style"]);
        assert_eq!(value_of(&attrs, "class"), Some("a b"));
        assert_eq!(value_of(&attrs, "style"), Some("color:red;;margin:0;"));
    }

    #[test]
    fn test_prepare_drops_empty() {
        let attrs = prepare(vec![class(""), attribute("", "x"), style("", "red"), id("y")]);
        assert_eq!(names(&attrs), vec!["id"]);
    }

    #[test]
    fn test_prepare_keeps_events_and_properties() {
        let attrs: Vec<Attribute<()>> = prepare(vec![
            on("click", |_| Ok(Handler::new(()))),
            property("value", Value::from("x")),
            on("blur", |_| Ok(Handler::new(()))),
        ]);
        assert_eq!(names(&attrs), vec!["blur", "click", "value"]);
    }

    #[test]
    fn test_listener_options_differ() {
        let a: EventListener<()> = EventListener::new("input", |_| Ok(Handler::new(())));
        let b = a.clone().debounce(300);

        assert!(!a.options_differ(&a.clone()));
        assert!(a.options_differ(&b));
        assert!(a.options_differ(&a.clone().prevent_default()));
    }

    #[test]
    fn test_listener_map() {
        let listener: EventListener<u32> = EventListener::new("click", |_| Ok(Handler::new(2)));
        let mapped = listener.map(Rc::new(|n: u32| format!("n={n}")));

        let handler = mapped.decode(&DomEvent::new("click")).unwrap();
        assert_eq!(handler.message, "n=2");
    }
}
