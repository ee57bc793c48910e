use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::SequencerError;
use crate::voice::voice::Voice;

/// The set of steps that are "on" for one voice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepSet(BTreeSet<usize>);

impl StepSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, step: usize) -> bool {
        self.0.contains(&step)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Steps in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Check every step fits on a ring of `ring_length` cells.
    pub fn validate(&self, ring_length: usize) -> Result<(), SequencerError> {
        match self.0.iter().next_back() {
            Some(&step) if step >= ring_length => Err(SequencerError::OutOfRange {
                what: "step",
                index: step,
                len: ring_length,
            }),
            _ => Ok(()),
        }
    }
}

impl FromIterator<usize> for StepSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[usize]> for StepSet {
    fn from(steps: &[usize]) -> Self {
        steps.iter().copied().collect()
    }
}

impl<const N: usize> From<[usize; N]> for StepSet {
    fn from(steps: [usize; N]) -> Self {
        steps.into_iter().collect()
    }
}

/// A named pattern with one step set per drum voice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PresetPattern {
    pub name: String,
    #[serde(default)]
    pub kick: StepSet,
    #[serde(default)]
    pub snare: StepSet,
    #[serde(default)]
    pub open_hat: StepSet,
    #[serde(default)]
    pub closed_hat: StepSet,
}

impl PresetPattern {
    pub fn new(
        name: impl Into<String>,
        kick: impl Into<StepSet>,
        snare: impl Into<StepSet>,
        open_hat: impl Into<StepSet>,
        closed_hat: impl Into<StepSet>,
    ) -> Self {
        Self {
            name: name.into(),
            kick: kick.into(),
            snare: snare.into(),
            open_hat: open_hat.into(),
            closed_hat: closed_hat.into(),
        }
    }

    /// Steps for a drum voice. The timer row has no pattern.
    pub fn steps_for(&self, voice: Voice) -> Option<&StepSet> {
        match voice {
            Voice::Timer => None,
            Voice::Kick => Some(&self.kick),
            Voice::Snare => Some(&self.snare),
            Voice::OpenHat => Some(&self.open_hat),
            Voice::ClosedHat => Some(&self.closed_hat),
        }
    }

    pub fn validate(&self, ring_length: usize) -> Result<(), SequencerError> {
        Voice::ALL
            .iter()
            .filter_map(|voice| self.steps_for(*voice))
            .try_for_each(|steps| steps.validate(ring_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_set_dedups_and_orders() {
        let steps = StepSet::from([12, 0, 4, 4, 8]);
        assert_eq!(steps.len(), 4);
        assert_eq!(steps.iter().collect::<Vec<_>>(), vec![0, 4, 8, 12]);
    }

    #[test]
    fn test_step_set_validate() {
        assert!(StepSet::from([0, 15]).validate(16).is_ok());
        assert!(StepSet::new().validate(16).is_ok());

        match StepSet::from([3, 16]).validate(16) {
            Err(SequencerError::OutOfRange { index, len, .. }) => {
                assert_eq!(index, 16);
                assert_eq!(len, 16);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_steps_for_voice() {
        let preset = PresetPattern::new("Test", [0], [4], [2], [7]);
        assert!(preset.steps_for(Voice::Timer).is_none());
        assert!(preset.steps_for(Voice::OpenHat).unwrap().contains(2));
        assert!(preset.steps_for(Voice::ClosedHat).unwrap().contains(7));
    }

    #[test]
    fn test_preset_deserializes_voice_names() {
        let json = r#"{"name": "Sparse", "kick": [0, 8], "open-hat": [4]}"#;
        let preset: PresetPattern = serde_json::from_str(json).unwrap();
        assert_eq!(preset.kick, StepSet::from([0, 8]));
        assert_eq!(preset.open_hat, StepSet::from([4]));
        assert!(preset.snare.is_empty());
    }
}
