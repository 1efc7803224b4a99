//! # Dataset Generation
//!
//! Offline compile step: runs the triad engine and fretboard mapper over every
//! root and quality and records the results, with their secondary indices, in
//! a [`Dataset`] document.
//!
//! ## Pipeline
//! 1. Enumerate the 48 triads (4 qualities x 12 roots)
//! 2. Map each onto the fretboard under the policy's constraints
//! 3. Pick the easiest voicings as the entry's common voicings
//! 4. File every triad under its root and quality, and every voicing under its
//!    difficulty and neck position
//!
//! ## Example
//! ```rust,no_run
//! use triads::{generate_dataset, GeneratorConfig};
//!
//! let dataset = generate_dataset(&GeneratorConfig::default())?;
//! assert_eq!(dataset.stats.total_triads, 48);
//! # Ok::<(), triads::TriadError>(())
//! ```

use chrono::Utc;
use log::info;
use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::database::{
    Dataset, DatasetEntry, DatasetIndex, DatasetStats, DifficultyCounts, InstrumentInfo, VoicingKey,
};
use crate::error::TriadError;
use crate::fretboard::{map_triad_to_fretboard, ChordVoicing};
use crate::triad::{get_all_triad_qualities, get_all_triads};
use crate::validate::STRING_COUNT;

pub const DATASET_VERSION: &str = "1.0.0";

pub fn generate_dataset(config: &GeneratorConfig) -> Result<Dataset, TriadError> {
    let mut triads: BTreeMap<String, BTreeMap<String, DatasetEntry>> = BTreeMap::new();
    let mut index = DatasetIndex::default();
    let mut by_difficulty = DifficultyCounts::default();
    let mut total_triads = 0;

    for quality in get_all_triad_qualities() {
        for triad in get_all_triads(quality) {
            let voicings = map_triad_to_fretboard(&triad, &config.tuning, &config.constraints)?;
            let symbol = triad.symbol.clone();

            for (i, voicing) in voicings.iter().enumerate() {
                let key = VoicingKey {
                    symbol: symbol.clone(),
                    voicing: i,
                };
                index
                    .by_difficulty
                    .entry(voicing.difficulty.name().to_string())
                    .or_default()
                    .push(key.clone());
                index
                    .by_neck_position
                    .entry(voicing.neck_position)
                    .or_default()
                    .push(key);
                by_difficulty.add(voicing.difficulty);
            }

            index
                .by_root
                .entry(triad.root.name().to_string())
                .or_default()
                .push(symbol.clone());
            index
                .by_quality
                .entry(quality.name().to_string())
                .or_default()
                .push(symbol);

            let entry = DatasetEntry {
                common_voicings: pick_common(&voicings, config.common_voicings),
                voicings,
                triad: triad.clone(),
            };
            triads
                .entry(triad.root.name().to_string())
                .or_default()
                .insert(quality.name().to_string(), entry);
            total_triads += 1;
        }
    }

    info!(
        "generated {} triads with {} voicings",
        total_triads,
        by_difficulty.total()
    );

    Ok(Dataset {
        version: DATASET_VERSION.to_string(),
        generated: Utc::now().to_rfc3339(),
        instrument: InstrumentInfo {
            name: config.instrument.clone(),
            strings: STRING_COUNT,
            frets: config.constraints.max_fret,
            tuning: config.tuning.names(),
        },
        stats: DatasetStats {
            total_triads,
            total_voicings: by_difficulty.total(),
            by_difficulty,
        },
        triads,
        index,
    })
}

/// The `count` lowest-scoring voicings, lower on the neck first among equals.
fn pick_common(voicings: &[ChordVoicing], count: usize) -> Vec<ChordVoicing> {
    let mut ranked: Vec<&ChordVoicing> = voicings.iter().collect();
    ranked.sort_by_key(|v| (v.score, v.neck_position));
    ranked.into_iter().take(count).cloned().collect()
}
