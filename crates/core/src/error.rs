//! Error types for the sequencer engine.

use thiserror::Error;

use crate::voice::voice::Voice;

/// A display-capability call failed while drawing a voice row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("display fault on {voice} row: {message}")]
pub struct DisplayFault {
    pub voice: Voice,
    pub message: String,
}

impl DisplayFault {
    pub fn new(voice: Voice, message: impl Into<String>) -> Self {
        Self {
            voice,
            message: message.into(),
        }
    }
}

/// Errors raised synchronously by the animator and registry.
///
/// None of these leave partially-applied state behind: an operation that
/// returns an error has not changed the object it was called on.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("{what} index {index} is out of range (0..{len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Display(#[from] DisplayFault),

    #[error("tempo cannot be edited while the sequencers are playing")]
    TempoLocked,
}
