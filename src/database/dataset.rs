//! Dataset document types
//!
//! The serialized shape of a compiled triad dataset. The query layer depends
//! only on this shape; `generate` produces it and `TriadDatabase` consumes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fretboard::{ChordVoicing, DifficultyLevel};
use crate::triad::Triad;

/// A compiled dataset.
///
/// # Fields
/// - `version`: dataset format version
/// - `generated`: RFC 3339 timestamp of the generation run
/// - `instrument`: tuning and fret range the voicings were computed for
/// - `stats`: totals recorded at generation time
/// - `triads`: root name → quality name → entry
/// - `index`: secondary indices referencing entries by triad symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub version: String,
    pub generated: String,
    pub instrument: InstrumentInfo,
    pub stats: DatasetStats,
    pub triads: BTreeMap<String, BTreeMap<String, DatasetEntry>>,
    pub index: DatasetIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    pub name: String,
    pub strings: u8,
    pub frets: u8,
    /// Open-string notes, string 1 first.
    pub tuning: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub beginner: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

impl DifficultyCounts {
    pub fn add(&mut self, level: DifficultyLevel) {
        match level {
            DifficultyLevel::Beginner => self.beginner += 1,
            DifficultyLevel::Intermediate => self.intermediate += 1,
            DifficultyLevel::Advanced => self.advanced += 1,
        }
    }

    pub fn get(&self, level: DifficultyLevel) -> usize {
        match level {
            DifficultyLevel::Beginner => self.beginner,
            DifficultyLevel::Intermediate => self.intermediate,
            DifficultyLevel::Advanced => self.advanced,
        }
    }

    pub fn total(&self) -> usize {
        self.beginner + self.intermediate + self.advanced
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_triads: usize,
    pub total_voicings: usize,
    pub by_difficulty: DifficultyCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEntry {
    pub triad: Triad,
    pub voicings: Vec<ChordVoicing>,
    /// Subset of `voicings`, easiest first.
    pub common_voicings: Vec<ChordVoicing>,
}

/// A voicing addressed by its triad symbol and position in that entry's
/// `voicings` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicingKey {
    pub symbol: String,
    pub voicing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetIndex {
    pub by_root: BTreeMap<String, Vec<String>>,
    pub by_quality: BTreeMap<String, Vec<String>>,
    pub by_difficulty: BTreeMap<String, Vec<VoicingKey>>,
    pub by_neck_position: BTreeMap<u8, Vec<VoicingKey>>,
}
