//! Error types

/// Why an event occurrence produced no message.
///
/// Decoders return this on failure; the registry also uses it when no
/// decoder is registered for the fired event. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No listener is registered for this path and event name
    #[error("no handler for `{name}` at path `{path}`")]
    MissingHandler { path: String, name: String },

    /// The event payload lacks a required field
    #[error("missing field `{0}`")]
    MissingField(String),

    /// A payload field has the wrong shape
    #[error("field `{field}` is not a {expected}")]
    WrongType { field: String, expected: &'static str },

    /// Decoder-specific failure
    #[error("{0}")]
    Custom(String),
}

/// Media playback could not be started by the host
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("playback refused: {0}")]
pub struct PlayError(pub String);
