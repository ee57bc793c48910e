use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SequencerError;

pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
pub const MIN_TEMPO_BPM: f64 = 20.0;
pub const MAX_TEMPO_BPM: f64 = 300.0;

const MIN_STEP_INTERVAL: Duration = Duration::from_millis(1);
const MAX_STEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Tempo in beats per minute. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo(f64);

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self, SequencerError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SequencerError::Configuration(format!(
                "tempo must be a positive number of BPM, got {}",
                bpm
            )));
        }
        Ok(Self(bpm))
    }

    pub fn bpm(&self) -> f64 {
        self.0
    }

    /// Time between two steps: one sixteenth note at this tempo.
    ///
    /// Clamped to 1ms..=1h so absurd tempos still yield a schedulable period.
    pub fn step_interval(&self) -> Duration {
        Duration::try_from_secs_f64(60.0 / self.0 * 4.0 / 8.0)
            .unwrap_or(MAX_STEP_INTERVAL)
            .clamp(MIN_STEP_INTERVAL, MAX_STEP_INTERVAL)
    }

    /// Tempo moved by `delta` BPM, clamped to the editable range.
    pub fn nudged(&self, delta: f64) -> Self {
        Self((self.0 + delta).clamp(MIN_TEMPO_BPM, MAX_TEMPO_BPM))
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(DEFAULT_TEMPO_BPM)
    }
}

impl TryFrom<f64> for Tempo {
    type Error = SequencerError;

    fn try_from(bpm: f64) -> Result<Self, Self::Error> {
        Self::new(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl std::fmt::Display for Tempo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}
