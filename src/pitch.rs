//! # Pitch Model
//!
//! Canonical 12-tone pitch classes, enharmonic normalization and
//! equal-temperament frequencies.
//!
//! ## Spelling
//! Every pitch class has one preferred sharp spelling (`C C# D D# E F F# G G# A A# B`).
//! The five black keys are also accepted in flat spelling (`Db Eb Gb Ab Bb`) and
//! normalize to their sharp equivalent. Double accidentals and white-key
//! enharmonics (`E#`, `Cb`) are not accepted.
//!
//! ## Frequency
//! `f = 440 * 2^(offset / 12)` where `offset` is the signed semitone distance
//! from A4. A4 is exactly 440.0 Hz.
//!
//! ## Example
//! ```rust
//! use triads::{add_semitones, note_from_name, normalize_note_name};
//!
//! assert_eq!(normalize_note_name("Bb").unwrap(), "A#");
//!
//! let a4 = note_from_name("A", Some(4)).unwrap();
//! assert_eq!(a4.frequency(), 440.0);
//!
//! let c5 = add_semitones(&a4, 3).unwrap();
//! assert_eq!(c5.to_string(), "C5");
//! assert!(add_semitones(&a4, 80).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriadError;
use crate::validate::validate_octave;

/// Preferred spelling of each pitch class, indexed by semitone above C.
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spelling of each pitch class (naturals repeat their sharp spelling).
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Reference pitch for A4.
pub const A4_FREQUENCY: f64 = 440.0;

/// Octave used when a note name carries none.
pub const DEFAULT_OCTAVE: i8 = 4;

/// One of the 12 equal-tempered tones within an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const E: PitchClass = PitchClass(4);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);

    /// All pitch classes in ascending order starting from C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass(0),
        PitchClass(1),
        PitchClass(2),
        PitchClass(3),
        PitchClass(4),
        PitchClass(5),
        PitchClass(6),
        PitchClass(7),
        PitchClass(8),
        PitchClass(9),
        PitchClass(10),
        PitchClass(11),
    ];

    /// Build a pitch class from any semitone index, wrapping modulo 12.
    pub fn new(index: i32) -> Self {
        Self(index.rem_euclid(12) as u8)
    }

    /// Semitones above C (0-11).
    pub fn index(self) -> u8 {
        self.0
    }

    /// Canonical (sharp) spelling.
    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    pub fn flat_name(self) -> &'static str {
        FLAT_NAMES[self.0 as usize]
    }

    /// Look up a note name in either spelling. Returns `None` for anything
    /// outside the 17 accepted spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        SHARP_NAMES
            .iter()
            .position(|n| *n == name)
            .or_else(|| FLAT_NAMES.iter().position(|n| *n == name))
            .map(|i| Self(i as u8))
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones)
    }
}

impl FromStr for PitchClass {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| TriadError::InvalidNoteName(s.to_string()))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = TriadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> Self {
        pc.name().to_string()
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `name` is one of the 12 pitch classes in sharp or flat spelling.
pub fn is_valid_note_name(name: &str) -> bool {
    PitchClass::from_name(name).is_some()
}

/// Map a flat spelling to its sharp equivalent. Sharps and naturals pass
/// through unchanged, so applying this twice is the same as applying it once.
pub fn normalize_note_name(name: &str) -> Result<&'static str, TriadError> {
    name.parse::<PitchClass>().map(PitchClass::name)
}

/// A pitch class at a specific octave. Frequency is derived once at
/// construction and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pitch_class: PitchClass,
    octave: i8,
    frequency: f64,
}

impl Note {
    /// Create a note, rejecting octaves outside 0-9.
    pub fn new(pitch_class: PitchClass, octave: i8) -> Result<Self, TriadError> {
        validate_octave(octave as i64)?;
        Ok(Self::from_parts(pitch_class, octave))
    }

    /// Callers guarantee `octave` is within 0-9.
    pub(crate) fn from_parts(pitch_class: PitchClass, octave: i8) -> Self {
        Self {
            pitch_class,
            octave,
            frequency: frequency_of(pitch_class, octave),
        }
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Absolute pitch as a MIDI note number (C4 = 60, A4 = 69).
    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.pitch_class.index() as i32
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Equal-temperament frequency relative to A4 = 440 Hz.
pub fn frequency_of(pitch_class: PitchClass, octave: i8) -> f64 {
    let offset = (octave as i32 - 4) * 12 + (pitch_class.index() as i32 - 9);
    A4_FREQUENCY * 2.0_f64.powf(offset as f64 / 12.0)
}

/// Build a note from a name such as `"C"`, `"Db"` or `"A4"`.
///
/// An explicit `octave` takes precedence; otherwise a trailing octave digit in
/// the name is used, falling back to octave 4.
pub fn note_from_name(name: &str, octave: Option<i8>) -> Result<Note, TriadError> {
    if let Some(octave) = octave {
        return Note::new(name.parse()?, octave);
    }

    match name.find(|c: char| c.is_ascii_digit() || c == '-') {
        Some(split) => {
            let pitch_class: PitchClass = name[..split].parse()?;
            let octave: i8 = name[split..]
                .parse()
                .map_err(|_| TriadError::InvalidNoteName(name.to_string()))?;
            Note::new(pitch_class, octave)
        }
        None => Note::new(name.parse()?, DEFAULT_OCTAVE),
    }
}

/// Move a note by `semitones`, wrapping the octave when the pitch class
/// crosses a C boundary in either direction. Fails when the result leaves
/// octaves 0-9.
pub fn add_semitones(note: &Note, semitones: i32) -> Result<Note, TriadError> {
    let absolute = i64::from(note.octave) * 12
        + i64::from(note.pitch_class.index())
        + i64::from(semitones);
    let octave = validate_octave(absolute.div_euclid(12))?;
    let pitch_class = PitchClass::new(absolute.rem_euclid(12) as i32);
    Ok(Note::from_parts(pitch_class, octave))
}
