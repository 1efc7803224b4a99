//! Query operations over a loaded [`TriadDatabase`].
//!
//! Every string or numeric input is validated first. Invalid input is logged
//! with the operation name and yields an empty result; it is never an error.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use super::dataset::DifficultyCounts;
use super::store::{EntryRef, TriadDatabase, VoicingRef};
use crate::fretboard::ChordVoicing;
use crate::validate::{
    checked, parse_difficulty, parse_quality, parse_root, validate_fret, validate_neck_position,
};

/// Triad lookup criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriadFilter {
    pub root: Option<String>,
    pub quality: Option<String>,
}

/// Voicing lookup criteria, combined with AND. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoicingFilter {
    pub root: Option<String>,
    pub quality: Option<String>,
    pub difficulty: Option<String>,
    pub neck_position: Option<i64>,
    /// Highest fret any position may use.
    pub max_frets: Option<i64>,
    pub exclude_open_strings: bool,
}

/// Summary of a loaded database, as recorded when it was generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub version: String,
    pub generated: String,
    pub instrument: String,
    pub total_triads: usize,
    pub total_voicings: usize,
    pub by_difficulty: DifficultyCounts,
}

impl TriadDatabase {
    pub fn get_triad(&self, root: &str, quality: &str) -> Option<EntryRef<'_>> {
        let root = checked("get_triad", parse_root(root))?;
        let quality = checked("get_triad", parse_quality(quality))?;
        self.by_key.get(&(root, quality)).map(|&id| self.entry(id))
    }

    pub fn get_triads_by_root(&self, root: &str) -> Vec<EntryRef<'_>> {
        let Some(root) = checked("get_triads_by_root", parse_root(root)) else {
            return Vec::new();
        };
        self.entries_for(self.by_root.get(&root))
    }

    pub fn get_triads_by_quality(&self, quality: &str) -> Vec<EntryRef<'_>> {
        let Some(quality) = checked("get_triads_by_quality", parse_quality(quality)) else {
            return Vec::new();
        };
        self.entries_for(self.by_quality.get(&quality))
    }

    pub fn get_voicings_by_difficulty(&self, level: &str) -> Vec<VoicingRef<'_>> {
        let Some(level) = checked("get_voicings_by_difficulty", parse_difficulty(level)) else {
            return Vec::new();
        };
        self.voicings_for(self.by_difficulty.get(&level))
    }

    pub fn get_voicings_by_neck_position(&self, position: i64) -> Vec<VoicingRef<'_>> {
        let Some(position) = checked(
            "get_voicings_by_neck_position",
            validate_neck_position(position),
        ) else {
            return Vec::new();
        };
        self.voicings_for(self.by_neck_position.get(&position))
    }

    /// Entries matching every set field of `filter`, in root then quality
    /// order. An empty filter returns the whole table.
    pub fn find_triads(&self, filter: &TriadFilter) -> Vec<EntryRef<'_>> {
        let root = match &filter.root {
            Some(name) => match checked("find_triads", parse_root(name)) {
                Some(root) => Some(root),
                None => return Vec::new(),
            },
            None => None,
        };
        let quality = match &filter.quality {
            Some(name) => match checked("find_triads", parse_quality(name)) {
                Some(quality) => Some(quality),
                None => return Vec::new(),
            },
            None => None,
        };

        (0..self.entries.len())
            .map(|id| self.entry(id))
            .filter(|e| root.map_or(true, |r| e.triad().root == r))
            .filter(|e| quality.map_or(true, |q| e.triad().quality == q))
            .collect()
    }

    pub fn find_voicings(&self, filter: &VoicingFilter) -> Vec<VoicingRef<'_>> {
        let difficulty = match &filter.difficulty {
            Some(name) => match checked("find_voicings", parse_difficulty(name)) {
                Some(level) => Some(level),
                None => return Vec::new(),
            },
            None => None,
        };
        let neck_position = match filter.neck_position {
            Some(n) => match checked("find_voicings", validate_neck_position(n)) {
                Some(n) => Some(n),
                None => return Vec::new(),
            },
            None => None,
        };
        let max_frets = match filter.max_frets {
            Some(n) => match checked("find_voicings", validate_fret(n)) {
                Some(n) => Some(n),
                None => return Vec::new(),
            },
            None => None,
        };

        let matches = |v: &ChordVoicing| {
            difficulty.map_or(true, |d| v.difficulty == d)
                && neck_position.map_or(true, |n| v.neck_position == n)
                && max_frets.map_or(true, |k| v.positions.iter().all(|p| p.fret <= k))
                && !(filter.exclude_open_strings && v.uses_open_strings())
        };

        let triads = TriadFilter {
            root: filter.root.clone(),
            quality: filter.quality.clone(),
        };
        self.find_triads(&triads)
            .into_iter()
            .flat_map(|e| e.voicing_ids())
            .map(|id| self.voicing(id))
            .filter(|v| matches(v.voicing))
            .collect()
    }

    /// A uniformly chosen entry, optionally restricted to one quality.
    pub fn get_random_triad(&self, quality: Option<&str>) -> Option<EntryRef<'_>> {
        self.get_random_triad_with(&mut rand::rng(), quality)
    }

    pub fn get_random_triad_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        quality: Option<&str>,
    ) -> Option<EntryRef<'_>> {
        let candidates = match quality {
            Some(name) => self.get_triads_by_quality(name),
            None => self.find_triads(&TriadFilter::default()),
        };
        candidates.choose(rng).copied()
    }

    pub fn get_common_voicings(&self, root: &str, quality: &str) -> Vec<&ChordVoicing> {
        self.get_triad(root, quality)
            .map(|e| e.common_voicings())
            .unwrap_or_default()
    }

    /// Symbols of every entry, in root then quality order.
    pub fn get_all_triad_symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.triad.symbol.clone()).collect()
    }

    pub fn get_database_stats(&self) -> DatabaseStats {
        DatabaseStats {
            version: self.version.clone(),
            generated: self.generated.clone(),
            instrument: self.instrument.name.clone(),
            total_triads: self.stats.total_triads,
            total_voicings: self.stats.total_voicings,
            by_difficulty: self.stats.by_difficulty,
        }
    }

    fn entries_for(&self, ids: Option<&Vec<usize>>) -> Vec<EntryRef<'_>> {
        ids.map(|ids| ids.iter().map(|&id| self.entry(id)).collect())
            .unwrap_or_default()
    }

    fn voicings_for(&self, ids: Option<&Vec<usize>>) -> Vec<VoicingRef<'_>> {
        ids.map(|ids| ids.iter().map(|&id| self.voicing(id)).collect())
            .unwrap_or_default()
    }
}
