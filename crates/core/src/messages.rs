use serde::{Deserialize, Serialize};

use crate::rhythm::rhythm::Tempo;

/// Commands sent from the UI to the sequencer registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerCommand {
    /// Start every voice
    Play,
    /// Stop every voice and unlock tempo editing
    Stop,
    /// Set the global tempo in BPM (stopped only)
    SetTempo(f64),
    /// Move the global tempo by a number of BPM (stopped only)
    NudgeTempo(f64),
    /// Swap every drum voice to a preset pattern
    SelectPreset(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Snapshot of the transport for status lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportStatus {
    pub playback_state: PlaybackState,
    pub tempo: Tempo,
    pub preset_index: usize,
    pub preset_name: String,
    pub preset_count: usize,
}
