use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::preset::PresetPattern;
use crate::error::SequencerError;

/// Ordered list of patterns the preset selector chooses from.
///
/// Read-only once built; selecting an entry never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable {
    patterns: Vec<PresetPattern>,
}

impl PresetTable {
    pub fn new(patterns: Vec<PresetPattern>) -> Self {
        Self { patterns }
    }

    /// The patterns shipped with the drum machine.
    pub fn builtin() -> Self {
        Self::new(vec![
            PresetPattern::new(
                "Four on the Floor",
                [0, 4, 8, 12],
                [4, 12],
                [2, 6, 10, 14],
                [0, 4, 8, 12],
            ),
            PresetPattern::new(
                "Broken Beat",
                [0, 10],
                [4, 12],
                [0, 2, 4, 5, 8, 9, 10, 11, 13],
                [7, 15],
            ),
            PresetPattern::new(
                "Syncopated",
                [0, 3, 7, 8, 10, 15],
                [4, 11],
                [0, 2, 4, 6, 8, 10, 12, 14],
                [0, 4, 8, 12],
            ),
        ])
    }

    /// Load a table from a JSON array of patterns.
    pub fn load(path: &Path) -> Result<Self, SequencerError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SequencerError::Configuration(format!(
                "failed to read preset file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SequencerError> {
        serde_json::from_str(content).map_err(|e| {
            SequencerError::Configuration(format!("failed to parse preset table: {}", e))
        })
    }

    pub fn get(&self, index: usize) -> Option<&PresetPattern> {
        self.patterns.get(index)
    }

    /// Like [`PresetTable::get`] but with an `OutOfRange` error.
    pub fn require(&self, index: usize) -> Result<&PresetPattern, SequencerError> {
        self.patterns.get(index).ok_or(SequencerError::OutOfRange {
            what: "preset",
            index,
            len: self.patterns.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Check every pattern fits on a ring of `ring_length` cells.
    pub fn validate(&self, ring_length: usize) -> Result<(), SequencerError> {
        if self.patterns.is_empty() {
            return Err(SequencerError::Configuration(
                "preset table is empty".to_string(),
            ));
        }
        self.patterns
            .iter()
            .try_for_each(|pattern| pattern.validate(ring_length))
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}
