//! # Triad Engine
//!
//! Construction of triads from a root and quality, and the reverse operation:
//! identifying a triad from an unordered set of three notes.
//!
//! ## Qualities
//! | Quality | Offsets | Suffix |
//! |---|---|---|
//! | major | 0 4 7 | (none) |
//! | minor | 0 3 7 | `m` |
//! | diminished | 0 3 6 | `dim` |
//! | augmented | 0 4 8 | `aug` |
//!
//! ## Identification Tie-break
//! `identify_triad` tries each input note as the root, lowest sounding note
//! first, and for each root tries the qualities in the order above. The first
//! match is returned. Only the augmented triad is symmetric enough to match
//! several readings: `C4 E4 G#4` identifies as `Caug` while `E4 G#4 C5`
//! identifies as `Eaug`.
//!
//! ## Example
//! ```rust
//! use triads::{generate_triad, identify_triad, note_from_name, TriadQuality};
//!
//! let c = note_from_name("C", None).unwrap();
//! let triad = generate_triad(&c, TriadQuality::Major);
//! assert_eq!(triad.symbol, "C");
//!
//! let notes = ["A", "C", "E"].map(|n| note_from_name(n, None).unwrap());
//! assert_eq!(identify_triad(&notes).unwrap().symbol, "Am");
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TriadError;
use crate::pitch::{Note, PitchClass, DEFAULT_OCTAVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriadQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl TriadQuality {
    /// Stable enumeration order, also the identification order.
    pub const ALL: [TriadQuality; 4] = [
        TriadQuality::Major,
        TriadQuality::Minor,
        TriadQuality::Diminished,
        TriadQuality::Augmented,
    ];

    /// Ascending semitone offsets of root, third and fifth.
    pub fn offsets(self) -> [u8; 3] {
        match self {
            TriadQuality::Major => [0, 4, 7],
            TriadQuality::Minor => [0, 3, 7],
            TriadQuality::Diminished => [0, 3, 6],
            TriadQuality::Augmented => [0, 4, 8],
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TriadQuality::Major => "",
            TriadQuality::Minor => "m",
            TriadQuality::Diminished => "dim",
            TriadQuality::Augmented => "aug",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TriadQuality::Major => "major",
            TriadQuality::Minor => "minor",
            TriadQuality::Diminished => "diminished",
            TriadQuality::Augmented => "augmented",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "maj" | "M" => Some(TriadQuality::Major),
            "m" | "min" | "-" => Some(TriadQuality::Minor),
            "dim" | "°" => Some(TriadQuality::Diminished),
            "aug" | "+" => Some(TriadQuality::Augmented),
            _ => None,
        }
    }
}

impl FromStr for TriadQuality {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|q| q.name() == s)
            .copied()
            .ok_or_else(|| TriadError::InvalidQuality(s.to_string()))
    }
}

impl fmt::Display for TriadQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which chord tone sounds lowest in a voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inversion {
    Root,
    First,
    Second,
}

/// A three-note chord. The three pitch classes are always distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triad {
    pub root: PitchClass,
    pub third: PitchClass,
    pub fifth: PitchClass,
    pub quality: TriadQuality,
    pub symbol: String,
}

impl Triad {
    pub fn new(root: PitchClass, quality: TriadQuality) -> Self {
        let [_, third, fifth] = quality.offsets();
        Self {
            root,
            third: root.transpose(third as i32),
            fifth: root.transpose(fifth as i32),
            quality,
            symbol: format!("{}{}", root.name(), quality.suffix()),
        }
    }

    /// Parse a chord symbol such as `"C"`, `"F#m"`, `"Bbdim"` or `"E+"`.
    /// Flat roots are normalized, so `"Bbm"` yields the triad `"A#m"`.
    pub fn from_symbol(symbol: &str) -> Result<Self, TriadError> {
        let invalid = || TriadError::InvalidSymbol(symbol.to_string());

        // Two-character roots first so "Bb" is not read as "B" + "b".
        let (root, rest) = [2, 1]
            .iter()
            .filter_map(|&len| {
                let head = symbol.get(..len)?;
                PitchClass::from_name(head).map(|pc| (pc, &symbol[len..]))
            })
            .next()
            .ok_or_else(invalid)?;

        let quality = TriadQuality::from_suffix(rest).ok_or_else(invalid)?;
        Ok(Self::new(root, quality))
    }

    pub fn pitch_classes(&self) -> [PitchClass; 3] {
        [self.root, self.third, self.fifth]
    }

    pub fn contains(&self, pitch_class: PitchClass) -> bool {
        self.pitch_classes().contains(&pitch_class)
    }

    /// Inversion implied by `bass` being the lowest note, or `None` when the
    /// bass is not a chord tone.
    pub fn inversion_for_bass(&self, bass: PitchClass) -> Option<Inversion> {
        if bass == self.root {
            Some(Inversion::Root)
        } else if bass == self.third {
            Some(Inversion::First)
        } else if bass == self.fifth {
            Some(Inversion::Second)
        } else {
            None
        }
    }

    fn pitch_class_set(&self) -> BTreeSet<PitchClass> {
        self.pitch_classes().into_iter().collect()
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Stack the quality's offsets on top of `root`.
pub fn generate_triad(root: &Note, quality: TriadQuality) -> Triad {
    Triad::new(root.pitch_class(), quality)
}

/// Root-position chord tones with the root in octave 4.
pub fn chord_tones(triad: &Triad) -> [Note; 3] {
    triad.quality.offsets().map(|offset| {
        let octave = DEFAULT_OCTAVE + ((triad.root.index() + offset) / 12) as i8;
        Note::from_parts(triad.root.transpose(offset as i32), octave)
    })
}

/// Identify the triad formed by exactly three notes, in any order, octave and
/// spelling. Returns `None` for non-triadic sets; a wrong note count is
/// logged as a validation failure and also returns `None`.
pub fn identify_triad(notes: &[Note]) -> Option<Triad> {
    if notes.len() != 3 {
        warn!("identify_triad: expected 3 notes, got {}", notes.len());
        return None;
    }

    let target: BTreeSet<PitchClass> = notes.iter().map(Note::pitch_class).collect();
    if target.len() != 3 {
        debug!("identify_triad: {} distinct pitch classes, not a triad", target.len());
        return None;
    }

    let mut candidates = notes.to_vec();
    candidates.sort_by_key(Note::midi);

    for candidate in &candidates {
        for quality in TriadQuality::ALL {
            let triad = generate_triad(candidate, quality);
            if triad.pitch_class_set() == target {
                return Some(triad);
            }
        }
    }
    None
}

/// One triad per pitch class, roots C through B.
pub fn get_all_triads(quality: TriadQuality) -> Vec<Triad> {
    PitchClass::ALL
        .iter()
        .map(|&root| Triad::new(root, quality))
        .collect()
}

pub fn get_all_triad_qualities() -> [TriadQuality; 4] {
    TriadQuality::ALL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::note_from_name;

    fn notes(names: &[&str]) -> Vec<Note> {
        names.iter().map(|n| note_from_name(n, None).unwrap()).collect()
    }

    #[test]
    fn test_generate_c_major() {
        let c = note_from_name("C", None).unwrap();
        let triad = generate_triad(&c, TriadQuality::Major);
        assert_eq!(triad.root.name(), "C");
        assert_eq!(triad.third.name(), "E");
        assert_eq!(triad.fifth.name(), "G");
        assert_eq!(triad.symbol, "C");
        assert_eq!(triad, Triad::new(PitchClass::C, TriadQuality::Major));
    }

    #[test]
    fn test_generate_wraps_past_b() {
        let b = note_from_name("B", None).unwrap();
        let triad = generate_triad(&b, TriadQuality::Diminished);
        assert_eq!(triad.pitch_classes().map(PitchClass::name), ["B", "D", "F"]);
        assert_eq!(triad.symbol, "Bdim");

        let gs = note_from_name("Ab", None).unwrap();
        let triad = generate_triad(&gs, TriadQuality::Augmented);
        assert_eq!(triad.pitch_classes().map(PitchClass::name), ["G#", "C", "E"]);
        assert_eq!(triad.symbol, "G#aug");
    }

    #[test]
    fn test_chord_tones_climb_past_octave() {
        let b = Triad::new(PitchClass::new(11), TriadQuality::Major);
        assert_eq!(chord_tones(&b).map(|n| n.to_string()), ["B4", "D#5", "F#5"]);

        let c = Triad::new(PitchClass::C, TriadQuality::Augmented);
        assert_eq!(chord_tones(&c).map(|n| n.to_string()), ["C4", "E4", "G#4"]);
    }

    #[test]
    fn test_identify_a_minor() {
        let triad = identify_triad(&notes(&["A", "C", "E"])).unwrap();
        assert_eq!(triad.root, PitchClass::A);
        assert_eq!(triad.quality, TriadQuality::Minor);
        assert_eq!(triad.symbol, "Am");
    }

    #[test]
    fn test_identify_is_order_and_octave_independent() {
        let triad = identify_triad(&notes(&["G2", "C5", "E3"])).unwrap();
        assert_eq!(triad.symbol, "C");

        let triad = identify_triad(&notes(&["Ab", "Db", "F"])).unwrap();
        assert_eq!(triad.symbol, "C#");
    }

    #[test]
    fn test_identify_recovers_every_generated_triad() {
        for quality in get_all_triad_qualities() {
            for triad in get_all_triads(quality) {
                let mut tones = chord_tones(&triad).to_vec();
                tones.reverse();
                let found = identify_triad(&tones).unwrap();
                assert_eq!(found.pitch_class_set(), triad.pitch_class_set());
                if quality != TriadQuality::Augmented {
                    assert_eq!(found, triad);
                }
            }
        }
    }

    #[test]
    fn test_augmented_tie_break_prefers_lowest_note() {
        let triad = identify_triad(&notes(&["C4", "E4", "G#4"])).unwrap();
        assert_eq!(triad.symbol, "Caug");

        let triad = identify_triad(&notes(&["E4", "G#4", "C5"])).unwrap();
        assert_eq!(triad.symbol, "Eaug");

        let triad = identify_triad(&notes(&["C5", "G#4", "E4"])).unwrap();
        assert_eq!(triad.symbol, "Eaug");
    }

    #[test]
    fn test_identify_non_triads() {
        assert!(identify_triad(&notes(&["C", "D", "G"])).is_none());
        assert!(identify_triad(&notes(&["C", "F", "Bb"])).is_none());
        assert!(identify_triad(&notes(&["C4", "C5", "G4"])).is_none());
        assert!(identify_triad(&notes(&["C", "E"])).is_none());
        assert!(identify_triad(&notes(&["C", "E", "G", "B"])).is_none());
    }

    #[test]
    fn test_all_triads_per_quality() {
        let minors = get_all_triads(TriadQuality::Minor);
        assert_eq!(minors.len(), 12);
        assert_eq!(minors[0].symbol, "Cm");
        assert_eq!(minors[11].symbol, "Bm");
        for triad in &minors {
            assert_eq!(triad.pitch_class_set().len(), 3);
        }
        assert_eq!(
            get_all_triad_qualities().map(TriadQuality::name),
            ["major", "minor", "diminished", "augmented"]
        );
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("minor".parse::<TriadQuality>().unwrap(), TriadQuality::Minor);
        assert!("sus4".parse::<TriadQuality>().is_err());
        assert!("Major".parse::<TriadQuality>().is_err());
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(Triad::from_symbol("C").unwrap().symbol, "C");
        assert_eq!(Triad::from_symbol("F#m").unwrap().symbol, "F#m");
        assert_eq!(Triad::from_symbol("Bbm").unwrap().symbol, "A#m");
        assert_eq!(Triad::from_symbol("Bdim").unwrap().symbol, "Bdim");
        assert_eq!(Triad::from_symbol("B°").unwrap().symbol, "Bdim");
        assert_eq!(Triad::from_symbol("E+").unwrap().symbol, "Eaug");
        assert_eq!(Triad::from_symbol("Dmin").unwrap().symbol, "Dm");
        assert!(Triad::from_symbol("").is_err());
        assert!(Triad::from_symbol("G7").is_err());
        assert!(Triad::from_symbol("Hm").is_err());
    }

    #[test]
    fn test_inversion_for_bass() {
        let c = Triad::new(PitchClass::C, TriadQuality::Major);
        assert_eq!(c.inversion_for_bass(PitchClass::C), Some(Inversion::Root));
        assert_eq!(c.inversion_for_bass(PitchClass::E), Some(Inversion::First));
        assert_eq!(c.inversion_for_bass(PitchClass::G), Some(Inversion::Second));
        assert_eq!(c.inversion_for_bass(PitchClass::A), None);
    }
}
