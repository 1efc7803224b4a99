//! # Generation Policy
//!
//! YAML configuration for the offline dataset build: instrument, tuning,
//! search constraints and difficulty thresholds.
//!
//! ## Format
//! ```yaml
//! instrument: Guitar (drop D)
//! tuning: [E4, B3, G3, D3, A2, D2]
//! max-fret: 15
//! max-span: 4
//! include-open-strings: true
//! min-strings: 3
//! max-strings: 3
//! common-voicings: 3
//! beginner-max-score: 4
//! intermediate-max-score: 8
//! ```
//! Every key is optional; missing keys take the defaults of
//! [`GeneratorConfig::default`]. Unknown keys are rejected.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::TriadError;
use crate::fretboard::{DifficultyThresholds, MapConstraints, Tuning};

pub const DEFAULT_INSTRUMENT: &str = "Guitar (6-string)";

/// Raw policy for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    pub instrument: Option<String>,
    pub tuning: Option<Vec<String>>,
    pub max_fret: Option<u8>,
    pub max_span: Option<u8>,
    pub include_open_strings: Option<bool>,
    pub min_strings: Option<usize>,
    pub max_strings: Option<usize>,
    pub common_voicings: Option<usize>,
    pub beginner_max_score: Option<u8>,
    pub intermediate_max_score: Option<u8>,
}

/// Validated generation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub instrument: String,
    pub tuning: Tuning,
    pub constraints: MapConstraints,
    /// How many of the easiest voicings are recorded as common per triad.
    pub common_voicings: usize,
}

impl Default for GeneratorConfig {
    /// Standard tuning, three-string voicings, full 24-fret neck.
    fn default() -> Self {
        Self {
            instrument: DEFAULT_INSTRUMENT.to_string(),
            tuning: Tuning::standard(),
            constraints: MapConstraints {
                max_strings: 3,
                ..MapConstraints::default()
            },
            common_voicings: 3,
        }
    }
}

impl GeneratorConfig {
    fn from_raw(raw: RawConfig) -> Result<Self, TriadError> {
        let defaults = Self::default();

        let tuning = match &raw.tuning {
            Some(names) => Tuning::from_names(names.as_slice())?,
            None => defaults.tuning,
        };

        let thresholds = DifficultyThresholds {
            beginner_max: raw
                .beginner_max_score
                .unwrap_or(defaults.constraints.thresholds.beginner_max),
            intermediate_max: raw
                .intermediate_max_score
                .unwrap_or(defaults.constraints.thresholds.intermediate_max),
        };

        let constraints = MapConstraints {
            max_fret: raw.max_fret.unwrap_or(defaults.constraints.max_fret),
            max_span: raw.max_span.unwrap_or(defaults.constraints.max_span),
            include_open_strings: raw
                .include_open_strings
                .unwrap_or(defaults.constraints.include_open_strings),
            min_strings: raw.min_strings.unwrap_or(defaults.constraints.min_strings),
            max_strings: raw.max_strings.unwrap_or(defaults.constraints.max_strings),
            thresholds,
        };
        constraints.validate()?;

        Ok(Self {
            instrument: raw.instrument.unwrap_or(defaults.instrument),
            tuning,
            constraints,
            common_voicings: raw.common_voicings.unwrap_or(defaults.common_voicings),
        })
    }
}

/// Parse a YAML policy. An empty document yields the default policy.
pub fn parse_config(source: &str) -> Result<GeneratorConfig, TriadError> {
    if source.trim().is_empty() {
        return Ok(GeneratorConfig::default());
    }
    let raw: RawConfig =
        serde_yaml::from_str(source).map_err(|e| TriadError::ConfigError(e.to_string()))?;
    GeneratorConfig::from_raw(raw)
}

pub fn load_config(path: &Path) -> Result<GeneratorConfig, TriadError> {
    let source = fs::read_to_string(path)
        .map_err(|e| TriadError::ConfigError(format!("{}: {}", path.display(), e)))?;
    parse_config(&source)
}
