//! Arena store for a loaded dataset.
//!
//! Entries and voicings live in two flat vectors. Each entry owns a contiguous
//! range of the voicing vector, and every index maps its key to a list of ids
//! into one of the two vectors. The store is built once and never mutated.

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;

use super::dataset::{Dataset, DatasetEntry, DatasetStats, InstrumentInfo, VoicingKey};
use crate::config::GeneratorConfig;
use crate::error::TriadError;
use crate::fretboard::{
    fret_span, neck_position, position_at, ChordVoicing, DifficultyLevel, Tuning,
};
use crate::generate::generate_dataset;
use crate::pitch::PitchClass;
use crate::triad::{Triad, TriadQuality};

const UNKNOWN: &str = "unknown";

#[derive(Debug)]
pub(super) struct Entry {
    pub(super) triad: Triad,
    pub(super) voicings: Range<usize>,
    /// Ids into the voicing vector, easiest first.
    pub(super) common: Vec<usize>,
}

/// Read-only, indexed triad dataset.
#[derive(Debug)]
pub struct TriadDatabase {
    pub(super) version: String,
    pub(super) generated: String,
    pub(super) instrument: InstrumentInfo,
    pub(super) stats: DatasetStats,
    pub(super) entries: Vec<Entry>,
    pub(super) voicings: Vec<ChordVoicing>,
    /// Owning entry of each voicing.
    pub(super) owners: Vec<usize>,
    pub(super) by_key: HashMap<(PitchClass, TriadQuality), usize>,
    pub(super) by_root: BTreeMap<PitchClass, Vec<usize>>,
    pub(super) by_quality: BTreeMap<TriadQuality, Vec<usize>>,
    pub(super) by_difficulty: BTreeMap<DifficultyLevel, Vec<usize>>,
    pub(super) by_neck_position: BTreeMap<u8, Vec<usize>>,
}

fn dataset_error(message: impl Into<String>) -> TriadError {
    TriadError::DatasetError(message.into())
}

impl TriadDatabase {
    /// A database with no entries. Every query against it returns nothing.
    pub fn empty() -> Self {
        Self {
            version: UNKNOWN.to_string(),
            generated: UNKNOWN.to_string(),
            instrument: InstrumentInfo {
                name: UNKNOWN.to_string(),
                strings: 0,
                frets: 0,
                tuning: Vec::new(),
            },
            stats: DatasetStats::default(),
            entries: Vec::new(),
            voicings: Vec::new(),
            owners: Vec::new(),
            by_key: HashMap::new(),
            by_root: BTreeMap::new(),
            by_quality: BTreeMap::new(),
            by_difficulty: BTreeMap::new(),
            by_neck_position: BTreeMap::new(),
        }
    }

    /// Generate a dataset from `config` and load it.
    pub fn generate(config: &GeneratorConfig) -> Result<Self, TriadError> {
        Self::from_dataset(generate_dataset(config)?)
    }

    pub fn from_json(source: &str) -> Result<Self, TriadError> {
        let dataset: Dataset =
            serde_json::from_str(source).map_err(|e| dataset_error(e.to_string()))?;
        Self::from_dataset(dataset)
    }

    pub fn load(path: &Path) -> Result<Self, TriadError> {
        let source = fs::read_to_string(path)
            .map_err(|e| dataset_error(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&source)
    }

    /// Check a dataset document and build the arena and its indices.
    ///
    /// Fails when an entry disagrees with its key, a voicing misses a chord
    /// tone, a common voicing is not one of the entry's voicings, an index
    /// references something that does not exist or is filed under the wrong
    /// key, or an index does not cover the whole table.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, TriadError> {
        let Dataset {
            version,
            generated,
            instrument,
            stats,
            triads,
            index,
        } = dataset;

        let mut table: Vec<DatasetEntry> = Vec::new();
        for (root_name, qualities) in triads {
            let root: PitchClass = root_name
                .parse()
                .map_err(|e| dataset_error(format!("triads key {}: {}", root_name, e)))?;
            for (quality_name, entry) in qualities {
                let quality: TriadQuality = quality_name
                    .parse()
                    .map_err(|e| dataset_error(format!("triads key {}: {}", quality_name, e)))?;
                if entry.triad != Triad::new(root, quality) {
                    return Err(dataset_error(format!(
                        "entry {}/{} holds triad {}",
                        root_name, quality_name, entry.triad
                    )));
                }
                table.push(entry);
            }
        }
        table.sort_by_key(|e| (e.triad.root, e.triad.quality));

        let tuning = Tuning::from_names(instrument.tuning.as_slice())
            .map_err(|e| dataset_error(format!("instrument tuning: {}", e)))?;

        let mut db = Self {
            version,
            generated,
            instrument,
            stats,
            ..Self::empty()
        };
        let mut by_symbol: HashMap<String, usize> = HashMap::new();

        for (id, entry) in table.into_iter().enumerate() {
            let DatasetEntry {
                triad,
                voicings,
                common_voicings,
            } = entry;
            let key = (triad.root, triad.quality);
            if db.by_key.insert(key, id).is_some() {
                return Err(dataset_error(format!("triad {} listed twice", triad)));
            }
            by_symbol.insert(triad.symbol.clone(), id);

            for voicing in &voicings {
                check_voicing(&triad, &tuning, voicing)?;
            }
            let common = common_voicings
                .iter()
                .map(|c| {
                    voicings
                        .iter()
                        .position(|v| v == c)
                        .map(|i| db.voicings.len() + i)
                        .ok_or_else(|| {
                            dataset_error(format!(
                                "{}: common voicing {} not among its voicings",
                                triad,
                                c.shape()
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let start = db.voicings.len();
            db.owners.extend(std::iter::repeat(id).take(voicings.len()));
            db.voicings.extend(voicings);
            db.entries.push(Entry {
                triad,
                voicings: start..db.voicings.len(),
                common,
            });
        }

        for (name, symbols) in index.by_root {
            let root: PitchClass = name
                .parse()
                .map_err(|e| dataset_error(format!("byRoot key: {}", e)))?;
            let ids = db.resolve_entries("byRoot", &by_symbol, &symbols, |t| t.root == root)?;
            db.by_root.insert(root, ids);
        }
        for (name, symbols) in index.by_quality {
            let quality: TriadQuality = name
                .parse()
                .map_err(|e| dataset_error(format!("byQuality key: {}", e)))?;
            let ids =
                db.resolve_entries("byQuality", &by_symbol, &symbols, |t| t.quality == quality)?;
            db.by_quality.insert(quality, ids);
        }
        for (name, keys) in index.by_difficulty {
            let level: DifficultyLevel = name
                .parse()
                .map_err(|e| dataset_error(format!("byDifficulty key: {}", e)))?;
            let ids =
                db.resolve_voicings("byDifficulty", &by_symbol, &keys, |v| v.difficulty == level)?;
            db.by_difficulty.insert(level, ids);
        }
        for (position, keys) in index.by_neck_position {
            let ids = db.resolve_voicings("byNeckPosition", &by_symbol, &keys, |v| {
                v.neck_position == position
            })?;
            db.by_neck_position.insert(position, ids);
        }

        let entry_count = db.entries.len();
        let voicing_count = db.voicings.len();
        check_coverage("byRoot", &db.by_root, entry_count)?;
        check_coverage("byQuality", &db.by_quality, entry_count)?;
        check_coverage("byDifficulty", &db.by_difficulty, voicing_count)?;
        check_coverage("byNeckPosition", &db.by_neck_position, voicing_count)?;

        if db.stats.total_triads != entry_count || db.stats.total_voicings != voicing_count {
            warn!(
                "recorded stats ({} triads, {} voicings) differ from contents ({}, {})",
                db.stats.total_triads, db.stats.total_voicings, entry_count, voicing_count
            );
        }
        debug!("loaded {} triads, {} voicings", entry_count, voicing_count);
        Ok(db)
    }

    fn resolve_entries(
        &self,
        index: &str,
        by_symbol: &HashMap<String, usize>,
        symbols: &[String],
        filed: impl Fn(&Triad) -> bool,
    ) -> Result<Vec<usize>, TriadError> {
        symbols
            .iter()
            .map(|symbol| {
                let id = *by_symbol
                    .get(symbol)
                    .ok_or_else(|| dataset_error(format!("{}: unknown triad {}", index, symbol)))?;
                if !filed(&self.entries[id].triad) {
                    return Err(dataset_error(format!(
                        "{}: {} filed under the wrong key",
                        index, symbol
                    )));
                }
                Ok(id)
            })
            .collect()
    }

    fn resolve_voicings(
        &self,
        index: &str,
        by_symbol: &HashMap<String, usize>,
        keys: &[VoicingKey],
        filed: impl Fn(&ChordVoicing) -> bool,
    ) -> Result<Vec<usize>, TriadError> {
        keys.iter()
            .map(|key| {
                let orphan = || {
                    dataset_error(format!(
                        "{}: unknown voicing {}#{}",
                        index, key.symbol, key.voicing
                    ))
                };
                let entry = by_symbol
                    .get(&key.symbol)
                    .map(|&id| &self.entries[id])
                    .ok_or_else(orphan)?;
                let id = entry.voicings.start + key.voicing;
                if !entry.voicings.contains(&id) {
                    return Err(orphan());
                }
                if !filed(&self.voicings[id]) {
                    return Err(dataset_error(format!(
                        "{}: {}#{} filed under the wrong key",
                        index, key.symbol, key.voicing
                    )));
                }
                Ok(id)
            })
            .collect()
    }

    pub(super) fn entry(&self, id: usize) -> EntryRef<'_> {
        EntryRef { db: self, id }
    }

    pub(super) fn voicing(&self, id: usize) -> VoicingRef<'_> {
        VoicingRef {
            triad: &self.entries[self.owners[id]].triad,
            voicing: &self.voicings[id],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn instrument(&self) -> &InstrumentInfo {
        &self.instrument
    }
}

/// A stored voicing must sit on the instrument, sound what its frets sound,
/// cover the triad, and carry the neck position and span of its positions.
fn check_voicing(
    triad: &Triad,
    tuning: &Tuning,
    voicing: &ChordVoicing,
) -> Result<(), TriadError> {
    let invalid = |reason: String| {
        dataset_error(format!("{}: voicing {} {}", triad, voicing.shape(), reason))
    };

    for p in &voicing.positions {
        let expected =
            position_at(tuning, p.string, p.fret).map_err(|e| invalid(e.to_string()))?;
        if expected.pitch != p.pitch {
            return Err(invalid(format!(
                "sounds {} on string {} fret {}, recorded {}",
                expected.pitch, p.string, p.fret, p.pitch
            )));
        }
    }
    let ordered = voicing
        .positions
        .windows(2)
        .all(|pair| pair[0].string < pair[1].string);
    if !ordered {
        return Err(invalid("repeats or misorders strings".to_string()));
    }
    let complete = triad
        .pitch_classes()
        .iter()
        .all(|pc| voicing.positions.iter().any(|p| p.pitch == *pc));
    if !complete {
        return Err(invalid("misses a chord tone".to_string()));
    }
    let position = neck_position(&voicing.positions);
    if voicing.neck_position != position {
        return Err(invalid(format!(
            "records neck position {}, frets give {}",
            voicing.neck_position, position
        )));
    }
    let span = fret_span(&voicing.positions);
    if voicing.span != span {
        return Err(invalid(format!(
            "records span {}, frets give {}",
            voicing.span, span
        )));
    }
    Ok(())
}

/// Every id in `0..count` must appear exactly once across the index.
fn check_coverage<K>(
    index: &str,
    map: &BTreeMap<K, Vec<usize>>,
    count: usize,
) -> Result<(), TriadError> {
    let mut seen = BTreeSet::new();
    for &id in map.values().flatten() {
        if !seen.insert(id) {
            return Err(dataset_error(format!("{}: id {} listed twice", index, id)));
        }
    }
    if seen.len() != count {
        return Err(dataset_error(format!(
            "{}: covers {} of {} records",
            index,
            seen.len(),
            count
        )));
    }
    Ok(())
}

/// A triad entry borrowed from a [`TriadDatabase`].
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
    db: &'a TriadDatabase,
    id: usize,
}

impl<'a> EntryRef<'a> {
    pub fn triad(&self) -> &'a Triad {
        &self.db.entries[self.id].triad
    }

    pub fn symbol(&self) -> &'a str {
        &self.triad().symbol
    }

    pub fn voicings(&self) -> &'a [ChordVoicing] {
        &self.db.voicings[self.db.entries[self.id].voicings.clone()]
    }

    pub fn common_voicings(&self) -> Vec<&'a ChordVoicing> {
        let db = self.db;
        db.entries[self.id]
            .common
            .iter()
            .map(|&id| &db.voicings[id])
            .collect()
    }

    pub(super) fn voicing_ids(&self) -> Range<usize> {
        self.db.entries[self.id].voicings.clone()
    }
}

impl fmt::Debug for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("symbol", &self.symbol())
            .field("voicings", &self.voicings().len())
            .finish()
    }
}

impl PartialEq for EntryRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.db, other.db) && self.id == other.id
    }
}

/// A voicing together with the triad it realizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicingRef<'a> {
    pub triad: &'a Triad,
    pub voicing: &'a ChordVoicing,
}
