//! Native Events
//!
//! The host-agnostic event handed to listener decoders.

use serde_json::Value;

/// A native event occurrence as seen by the reconciler
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    /// Event type (`click`, `input`, ...)
    pub kind: String,
    /// Event payload (target value, coordinates, key, ...)
    pub detail: Value,
    /// Host timestamp in milliseconds
    pub timestamp: u64,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event with an empty payload
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            detail: Value::Null,
            timestamp: 0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Attach a payload
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Set the timestamp
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Look up a string field of the payload
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.detail.get(field).and_then(Value::as_str)
    }
}
