//! Error types for the decoder API boundary.

use thiserror::Error;

use crate::audio::engine::{EngineError, SampleFormat};

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors surfaced by `AacDecoder`.
///
/// Recoverable conditions (rejected input, no frame ready) are reported as
/// `false` by `send`/`receive` and never show up here.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// The engine could not be located or opened with the requested parameters.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine produced samples in a representation this layer cannot convert.
    /// Fatal to the decode session.
    #[error("Decoder fault: expected {expected} samples, engine produced {actual}")]
    Fault {
        expected: SampleFormat,
        actual: SampleFormat,
    },

    /// Caller-supplied output buffer cannot hold the decoded frame.
    #[error("Buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// Unexpected engine failure while retrieving a frame
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl DecoderError {
    /// Whether the session must be abandoned after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DecoderError::Configuration(_) | DecoderError::Fault { .. })
    }
}
