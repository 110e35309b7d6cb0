//! fOS Virtual DOM
//!
//! Declarative views for fOS. A view is a [`Node`] tree; [`diff`] compares
//! two trees into a [`Patch`], and the [`Reconciler`] applies patches to a
//! live [`Host`] tree and routes native events back to the listeners the
//! current tree declares.
//!
//! ```text
//! view ─► Node ─► diff ─► Patch ─► Reconciler ─► Host
//!                   │                   │
//!                   └── EventRegistry ◄─┘ (native events)
//! ```

mod config;
mod diff;
mod dom_host;
mod error;
mod event;
mod events;
mod host;
mod html;
mod patch;
mod path;
mod reconciler;
mod renderer;
mod vattr;
mod vnode;

pub mod element;

pub use config::ReconcilerConfig;
pub use diff::{diff, Diff};
pub use dom_host::DomHost;
pub use error::{DecodeError, PlayError};
pub use event::DomEvent;
pub use events::{Decoded, EventRegistry, Mapper};
pub use host::{Host, HostNodeType, TimerId};
pub use patch::{Change, Patch};
pub use path::{event_key, Path, SEPARATOR_ELEMENT, SEPARATOR_EVENT};
pub use reconciler::Reconciler;
pub use renderer::Renderer;
pub use vattr::{
    attribute, class, data, default_checked, default_selected, default_value, id, on, prepare,
    property, style, styles, Attribute, Decoder, EventListener, Handler, Policy,
};
pub use vnode::{is_void_html_element, Element, Fragment, Node, NodeKind, RawHtml, Text};
