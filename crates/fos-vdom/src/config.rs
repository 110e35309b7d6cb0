//! Reconciler Configuration

/// Reconciler configuration options
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Write each keyed node's key onto its host element
    pub expose_keys: bool,

    /// Attribute used for exposed keys, also read back by `virtualise`
    pub key_attribute: String,
}

impl ReconcilerConfig {
    /// Expose keys on host elements
    pub fn with_expose_keys(mut self, expose: bool) -> Self {
        self.expose_keys = expose;
        self
    }

    /// Use a different key attribute
    pub fn with_key_attribute(mut self, name: impl Into<String>) -> Self {
        self.key_attribute = name.into();
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            expose_keys: false,
            key_attribute: "data-key".to_string(),
        }
    }
}
