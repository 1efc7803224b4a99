//! # Interval Calculator
//!
//! Named semitone distances between pitches.
//!
//! Distances are measured upward from the first pitch class to the second,
//! modulo 12, so `calculate_interval` is total. `Octave` is only reachable
//! through [`Interval::from_semitones`] and [`invert_interval`].
//!
//! | Semitones | Interval | Short |
//! |---|---|---|
//! | 0 | Root (unison) | P1 |
//! | 1 | minor 2nd | m2 |
//! | 2 | major 2nd | M2 |
//! | 3 | minor 3rd | m3 |
//! | 4 | major 3rd | M3 |
//! | 5 | perfect 4th | P4 |
//! | 6 | tritone | TT |
//! | 7 | perfect 5th | P5 |
//! | 8 | minor 6th | m6 |
//! | 9 | major 6th | M6 |
//! | 10 | minor 7th | m7 |
//! | 11 | major 7th | M7 |
//! | 12 | octave | P8 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriadError;
use crate::pitch::{Note, PitchClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    Root,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    Tritone,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::Root,
        Interval::MinorSecond,
        Interval::MajorSecond,
        Interval::MinorThird,
        Interval::MajorThird,
        Interval::PerfectFourth,
        Interval::Tritone,
        Interval::PerfectFifth,
        Interval::MinorSixth,
        Interval::MajorSixth,
        Interval::MinorSeventh,
        Interval::MajorSeventh,
        Interval::Octave,
    ];

    /// `None` only for distances above an octave.
    pub fn from_semitones(semitones: u8) -> Option<Self> {
        Self::ALL.get(semitones as usize).copied()
    }

    pub fn semitones(self) -> u8 {
        self as u8
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Interval::Root => "P1",
            Interval::MinorSecond => "m2",
            Interval::MajorSecond => "M2",
            Interval::MinorThird => "m3",
            Interval::MajorThird => "M3",
            Interval::PerfectFourth => "P4",
            Interval::Tritone => "TT",
            Interval::PerfectFifth => "P5",
            Interval::MinorSixth => "m6",
            Interval::MajorSixth => "M6",
            Interval::MinorSeventh => "m7",
            Interval::MajorSeventh => "M7",
            Interval::Octave => "P8",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Interval::Root => "Root",
            Interval::MinorSecond => "minor 2nd",
            Interval::MajorSecond => "major 2nd",
            Interval::MinorThird => "minor 3rd",
            Interval::MajorThird => "major 3rd",
            Interval::PerfectFourth => "Perfect 4th",
            Interval::Tritone => "Tritone",
            Interval::PerfectFifth => "Perfect 5th",
            Interval::MinorSixth => "minor 6th",
            Interval::MajorSixth => "major 6th",
            Interval::MinorSeventh => "minor 7th",
            Interval::MajorSeventh => "major 7th",
            Interval::Octave => "Octave",
        }
    }
}

impl FromStr for Interval {
    type Err = TriadError;

    /// Parses short names (`"P5"`, `"m3"`); `"R"` is accepted for the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "R" {
            return Ok(Interval::Root);
        }
        Self::ALL
            .iter()
            .find(|i| i.short_name() == s)
            .copied()
            .ok_or_else(|| TriadError::InvalidInterval(s.to_string()))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Upward distance between two pitch classes, in `0..12`.
pub fn semitones_between(from: PitchClass, to: PitchClass) -> u8 {
    (to.index() as i32 - from.index() as i32).rem_euclid(12) as u8
}

/// Interval from `a` up to `b`, ignoring octave.
pub fn calculate_interval(a: &Note, b: &Note) -> Interval {
    interval_between(a.pitch_class(), b.pitch_class())
}

pub fn interval_between(a: PitchClass, b: PitchClass) -> Interval {
    Interval::ALL[semitones_between(a, b) as usize]
}

/// Complement within the octave. Root and Octave invert into each other, so
/// inverting twice always returns the original interval.
pub fn invert_interval(interval: Interval) -> Interval {
    Interval::ALL[(12 - interval.semitones()) as usize]
}

pub fn is_consonant(interval: Interval) -> bool {
    matches!(
        interval,
        Interval::Root
            | Interval::MinorThird
            | Interval::MajorThird
            | Interval::PerfectFourth
            | Interval::PerfectFifth
            | Interval::MinorSixth
            | Interval::MajorSixth
            | Interval::Octave
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::note_from_name;

    #[test]
    fn test_c_to_g_is_perfect_fifth() {
        let c = note_from_name("C", None).unwrap();
        let g = note_from_name("G", None).unwrap();
        assert_eq!(calculate_interval(&c, &g), Interval::PerfectFifth);
        assert_eq!(calculate_interval(&g, &c), Interval::PerfectFourth);
    }

    #[test]
    fn test_distance_ignores_octave_and_spelling() {
        let db3 = note_from_name("Db3", None).unwrap();
        let f5 = note_from_name("F5", None).unwrap();
        assert_eq!(calculate_interval(&db3, &f5), Interval::MajorThird);

        let c = note_from_name("C4", None).unwrap();
        let c6 = note_from_name("C6", None).unwrap();
        assert_eq!(calculate_interval(&c, &c6), Interval::Root);
    }

    #[test]
    fn test_inversion() {
        let p5: Interval = "P5".parse().unwrap();
        assert_eq!(invert_interval(p5).short_name(), "P4");
        assert_eq!(invert_interval(Interval::MajorThird), Interval::MinorSixth);
        assert_eq!(invert_interval(Interval::Tritone), Interval::Tritone);
        assert_eq!(invert_interval(Interval::Root), Interval::Octave);
        assert_eq!(invert_interval(Interval::Octave), Interval::Root);
    }

    #[test]
    fn test_double_inversion_is_identity() {
        for interval in Interval::ALL {
            assert_eq!(invert_interval(invert_interval(interval)), interval);
        }
    }

    #[test]
    fn test_every_distance_has_one_name() {
        for semitones in 0..=12u8 {
            let interval = Interval::from_semitones(semitones).unwrap();
            assert_eq!(interval.semitones(), semitones);
            assert_eq!(interval.short_name().parse::<Interval>().unwrap(), interval);
        }
        assert_eq!(Interval::from_semitones(13), None);
        assert!("P9".parse::<Interval>().is_err());
    }

    #[test]
    fn test_long_names() {
        assert_eq!(Interval::Root.name(), "Root");
        assert_eq!(Interval::MinorThird.name(), "minor 3rd");
        assert_eq!(Interval::Tritone.name(), "Tritone");
        assert_eq!(Interval::PerfectFifth.name(), "Perfect 5th");
        assert_eq!(Interval::Octave.name(), "Octave");
        let names: std::collections::HashSet<_> = Interval::ALL.iter().map(|i| i.name()).collect();
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_consonance() {
        let consonant: Vec<&str> = Interval::ALL
            .iter()
            .filter(|i| is_consonant(**i))
            .map(|i| i.short_name())
            .collect();
        assert_eq!(consonant, vec!["P1", "m3", "M3", "P4", "P5", "m6", "M6", "P8"]);
    }
}
