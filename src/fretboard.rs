//! # Fretboard Mapper
//!
//! Maps triads onto string/fret positions of a six-string instrument.
//!
//! ## Strings
//! Strings are numbered 1-6 from the highest to the lowest. Standard tuning is
//! `E4 B3 G3 D3 A2 E2` (string 1 first). Frets run from 0 (open) to the
//! ceiling in [`MapConstraints::max_fret`], at most 24.
//!
//! ## Search
//! Every string gets a candidate list: muted, or one of the frets (up to the
//! ceiling) that sounds a chord tone. The cartesian product of the six lists
//! is the whole state space, at most 26^6 but in practice about 7^6. Each
//! combination is kept when:
//! - the number of sounding strings is within `min_strings..=max_strings`
//! - all three chord tones sound at least once
//! - the span between the lowest and highest non-open fret is at most `max_span`
//! - no open string sounds when `include_open_strings` is false
//!
//! ## Difficulty
//! ```text
//! score = span + (strings - 3) + 2 * skipped_strings
//!       + dissonant_adjacent_pairs + (fretted_notes > 3 ? 1 : 0)
//! ```
//! The score is classified by [`DifficultyThresholds`] (beginner <= 4,
//! intermediate <= 8, advanced above).

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::TriadError;
use crate::interval::{interval_between, is_consonant, semitones_between};
use crate::pitch::{note_from_name, Note, PitchClass};
use crate::triad::{Inversion, Triad};
use crate::validate::{validate_fret, validate_string, MAX_FRET, STRING_COUNT};

/// Standard tuning, string 1 first.
pub const STANDARD_TUNING: [&str; 6] = ["E4", "B3", "G3", "D3", "A2", "E2"];

/// Open-string notes, string 1 first.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    open: [Note; 6],
}

impl Tuning {
    pub fn standard() -> Self {
        let open = [
            (PitchClass::E, 4),
            (PitchClass::new(11), 3),
            (PitchClass::G, 3),
            (PitchClass::new(2), 3),
            (PitchClass::A, 2),
            (PitchClass::E, 2),
        ]
        .map(|(pc, octave)| Note::from_parts(pc, octave));
        Self { open }
    }

    /// Parse six note names, string 1 first. Names without an octave digit
    /// take the octave of the same string in standard tuning.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, TriadError> {
        if names.len() != STRING_COUNT as usize {
            return Err(TriadError::ConfigError(format!(
                "tuning needs {} strings, got {}",
                STRING_COUNT,
                names.len()
            )));
        }

        let standard = Self::standard();
        let mut open = standard.open;
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            open[i] = if name.chars().any(|c| c.is_ascii_digit()) {
                note_from_name(name, None)?
            } else {
                note_from_name(name, Some(standard.open[i].octave()))?
            };
        }
        Ok(Self { open })
    }

    /// Open note of a 1-based string number.
    pub fn open_note(&self, string: u8) -> Result<Note, TriadError> {
        let string = validate_string(string as i64)?;
        Ok(self.open[string as usize - 1])
    }

    pub fn notes(&self) -> &[Note; 6] {
        &self.open
    }

    pub fn names(&self) -> Vec<String> {
        self.open.iter().map(Note::to_string).collect()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|d| d.name() == s)
            .copied()
            .ok_or_else(|| TriadError::InvalidDifficulty(s.to_string()))
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Score limits for each difficulty level. Part of the dataset's generation
/// policy rather than the mapper itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyThresholds {
    pub beginner_max: u8,
    pub intermediate_max: u8,
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            beginner_max: 4,
            intermediate_max: 8,
        }
    }
}

impl DifficultyThresholds {
    pub fn classify(&self, score: u8) -> DifficultyLevel {
        if score <= self.beginner_max {
            DifficultyLevel::Beginner
        } else if score <= self.intermediate_max {
            DifficultyLevel::Intermediate
        } else {
            DifficultyLevel::Advanced
        }
    }
}

/// One sounding string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FretPosition {
    pub string: u8,
    pub fret: u8,
    pub pitch: PitchClass,
}

impl FretPosition {
    pub fn is_open(&self) -> bool {
        self.fret == 0
    }
}

/// A triad realized on the fretboard. Positions are ordered by string number
/// and no string appears twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordVoicing {
    pub positions: Vec<FretPosition>,
    pub difficulty: DifficultyLevel,
    pub score: u8,
    /// Lowest non-open fret, 0 when every string is open.
    pub neck_position: u8,
    pub span: u8,
    pub inversion: Inversion,
}

impl ChordVoicing {
    pub fn uses_open_strings(&self) -> bool {
        self.positions.iter().any(FretPosition::is_open)
    }

    pub fn highest_fret(&self) -> u8 {
        self.positions.iter().map(|p| p.fret).max().unwrap_or(0)
    }

    pub fn strings(&self) -> Vec<u8> {
        self.positions.iter().map(|p| p.string).collect()
    }

    /// Tab-style rendering, string 6 first: `x32010` for an open C.
    pub fn shape(&self) -> String {
        (1..=STRING_COUNT)
            .rev()
            .map(|string| {
                self.positions
                    .iter()
                    .find(|p| p.string == string)
                    .map(|p| {
                        if p.fret < 10 {
                            p.fret.to_string()
                        } else {
                            format!("({})", p.fret)
                        }
                    })
                    .unwrap_or_else(|| "x".to_string())
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConstraints {
    /// Fret ceiling, at most 24.
    pub max_fret: u8,
    /// Largest allowed distance between the lowest and highest non-open fret.
    pub max_span: u8,
    pub include_open_strings: bool,
    pub min_strings: usize,
    pub max_strings: usize,
    pub thresholds: DifficultyThresholds,
}

impl Default for MapConstraints {
    fn default() -> Self {
        Self {
            max_fret: MAX_FRET,
            max_span: 4,
            include_open_strings: true,
            min_strings: 3,
            max_strings: STRING_COUNT as usize,
            thresholds: DifficultyThresholds::default(),
        }
    }
}

impl MapConstraints {
    pub fn validate(&self) -> Result<(), TriadError> {
        validate_fret(self.max_fret as i64)?;
        validate_fret(self.max_span as i64)?;
        if self.min_strings < 1 || self.min_strings > self.max_strings {
            return Err(TriadError::ConfigError(format!(
                "min strings ({}) must be between 1 and max strings ({})",
                self.min_strings, self.max_strings
            )));
        }
        if self.max_strings > STRING_COUNT as usize {
            return Err(TriadError::OutOfRange {
                field: "max strings",
                value: self.max_strings as i64,
                min: 1,
                max: STRING_COUNT as i64,
            });
        }
        if self.thresholds.beginner_max > self.thresholds.intermediate_max {
            return Err(TriadError::ConfigError(
                "beginner threshold exceeds intermediate threshold".to_string(),
            ));
        }
        Ok(())
    }
}

/// The position produced by fretting `string` at `fret`.
pub fn position_at(tuning: &Tuning, string: u8, fret: u8) -> Result<FretPosition, TriadError> {
    let fret = validate_fret(fret as i64)?;
    let open = tuning.open_note(string)?;
    Ok(FretPosition {
        string,
        fret,
        pitch: open.pitch_class().transpose(fret as i32),
    })
}

/// Every fret on `string` up to `max_fret` that sounds `pitch_class`: the
/// lowest one plus its octave repeats.
pub fn find_note_on_fretboard(
    tuning: &Tuning,
    pitch_class: PitchClass,
    string: u8,
    max_fret: u8,
) -> Result<Vec<u8>, TriadError> {
    let max_fret = validate_fret(max_fret as i64)?;
    let open = tuning.open_note(string)?;
    let lowest = semitones_between(open.pitch_class(), pitch_class);
    Ok((lowest..=max_fret).step_by(12).collect())
}

/// Enumerate every playable voicing of `triad` under `constraints`, ordered
/// by neck position, then score, then shape.
pub fn map_triad_to_fretboard(
    triad: &Triad,
    tuning: &Tuning,
    constraints: &MapConstraints,
) -> Result<Vec<ChordVoicing>, TriadError> {
    constraints.validate()?;

    let mut candidates: Vec<Vec<Option<u8>>> = Vec::with_capacity(STRING_COUNT as usize);
    for string in 1..=STRING_COUNT {
        let mut frets = Vec::new();
        for pitch_class in triad.pitch_classes() {
            frets.extend(find_note_on_fretboard(tuning, pitch_class, string, constraints.max_fret)?);
        }
        if !constraints.include_open_strings {
            frets.retain(|&f| f > 0);
        }
        frets.sort_unstable();

        let mut options = vec![None];
        options.extend(frets.into_iter().map(Some));
        candidates.push(options);
    }

    let mut voicings: Vec<ChordVoicing> = candidates
        .into_iter()
        .multi_cartesian_product()
        .filter_map(|choice| build_voicing(triad, tuning, &choice, constraints))
        .collect();
    voicings.sort_by(compare_voicings);

    debug!("{}: {} voicings", triad.symbol, voicings.len());
    Ok(voicings)
}

fn compare_voicings(a: &ChordVoicing, b: &ChordVoicing) -> Ordering {
    a.neck_position
        .cmp(&b.neck_position)
        .then(a.score.cmp(&b.score))
        .then_with(|| {
            let key = |v: &ChordVoicing| -> Vec<(u8, u8)> {
                v.positions.iter().map(|p| (p.string, p.fret)).collect()
            };
            key(a).cmp(&key(b))
        })
}

/// Turn one point of the search space (a fret or mute per string) into a
/// voicing, or `None` when it breaks a constraint.
fn build_voicing(
    triad: &Triad,
    tuning: &Tuning,
    choice: &[Option<u8>],
    constraints: &MapConstraints,
) -> Option<ChordVoicing> {
    let sounding = choice.iter().filter(|f| f.is_some()).count();
    if sounding < constraints.min_strings || sounding > constraints.max_strings {
        return None;
    }

    let positions: Vec<FretPosition> = choice
        .iter()
        .zip(tuning.notes())
        .enumerate()
        .filter_map(|(i, (&fret, open))| {
            fret.map(|fret| FretPosition {
                string: i as u8 + 1,
                fret,
                pitch: open.pitch_class().transpose(fret as i32),
            })
        })
        .collect();

    let complete = triad
        .pitch_classes()
        .iter()
        .all(|pc| positions.iter().any(|p| p.pitch == *pc));
    if !complete {
        return None;
    }
    if positions
        .iter()
        .any(|p| p.fret > constraints.max_fret || (p.is_open() && !constraints.include_open_strings))
    {
        return None;
    }

    let span = fret_span(&positions);
    if span > constraints.max_span {
        return None;
    }

    Some(annotate(triad, tuning, positions, span, &constraints.thresholds))
}

/// Distance between the lowest and highest non-open fret.
pub(crate) fn fret_span(positions: &[FretPosition]) -> u8 {
    let fretted = positions.iter().filter(|p| !p.is_open()).map(|p| p.fret);
    match fretted.minmax().into_option() {
        Some((low, high)) => high - low,
        None => 0,
    }
}

/// Lowest non-open fret, 0 when every string is open.
pub(crate) fn neck_position(positions: &[FretPosition]) -> u8 {
    positions
        .iter()
        .filter(|p| !p.is_open())
        .map(|p| p.fret)
        .min()
        .unwrap_or(0)
}

fn annotate(
    triad: &Triad,
    tuning: &Tuning,
    positions: Vec<FretPosition>,
    span: u8,
    thresholds: &DifficultyThresholds,
) -> ChordVoicing {
    let lowest_string = positions.iter().map(|p| p.string).max().unwrap_or(1);
    let highest_string = positions.iter().map(|p| p.string).min().unwrap_or(1);
    let skips = (lowest_string - highest_string + 1) as usize - positions.len();

    // Positions are ordered high string to low, so each window is (upper, lower).
    let dissonant = positions
        .windows(2)
        .filter(|pair| !is_consonant(interval_between(pair[1].pitch, pair[0].pitch)))
        .count();
    let fretted = positions.iter().filter(|p| !p.is_open()).count();

    let score = span as usize
        + positions.len().saturating_sub(3)
        + 2 * skips
        + dissonant
        + usize::from(fretted > 3);
    let score = score.min(u8::MAX as usize) as u8;

    let bass = positions
        .iter()
        .min_by_key(|p| tuning.notes()[p.string as usize - 1].midi() + p.fret as i32)
        .map(|p| p.pitch)
        .unwrap_or(triad.root);

    ChordVoicing {
        inversion: triad.inversion_for_bass(bass).unwrap_or(Inversion::Root),
        difficulty: thresholds.classify(score),
        score,
        neck_position: neck_position(&positions),
        span,
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triad::TriadQuality;

    fn c_major() -> Triad {
        Triad::new(PitchClass::C, TriadQuality::Major)
    }

    fn assert_valid(triad: &Triad, voicings: &[ChordVoicing], constraints: &MapConstraints) {
        for v in voicings {
            let strings = v.strings();
            assert!(strings.windows(2).all(|w| w[0] < w[1]), "strings repeat in {}", v.shape());
            for pc in triad.pitch_classes() {
                assert!(v.positions.iter().any(|p| p.pitch == pc), "{} misses {}", v.shape(), pc);
            }
            assert!(v.span <= constraints.max_span);
            assert!(v.highest_fret() <= constraints.max_fret);
            assert!(v.positions.len() >= constraints.min_strings);
            assert!(v.positions.len() <= constraints.max_strings);
        }
    }

    #[test]
    fn test_find_note_on_fretboard() {
        let tuning = Tuning::standard();
        assert_eq!(find_note_on_fretboard(&tuning, PitchClass::C, 2, 24).unwrap(), vec![1, 13]);
        assert_eq!(find_note_on_fretboard(&tuning, PitchClass::E, 1, 24).unwrap(), vec![0, 12, 24]);
        assert_eq!(find_note_on_fretboard(&tuning, PitchClass::C, 5, 2).unwrap(), Vec::<u8>::new());
        assert!(find_note_on_fretboard(&tuning, PitchClass::C, 7, 24).is_err());
        assert!(find_note_on_fretboard(&tuning, PitchClass::C, 1, 25).is_err());
    }

    #[test]
    fn test_position_at() {
        let tuning = Tuning::standard();
        let pos = position_at(&tuning, 5, 3).unwrap();
        assert_eq!(pos.pitch, PitchClass::C);
        assert!(position_at(&tuning, 0, 3).is_err());
        assert!(position_at(&tuning, 1, 30).is_err());
    }

    #[test]
    fn test_c_major_voicings() {
        let constraints = MapConstraints::default();
        let triad = c_major();
        let voicings = map_triad_to_fretboard(&triad, &Tuning::standard(), &constraints).unwrap();

        assert!(!voicings.is_empty());
        assert_valid(&triad, &voicings, &constraints);
        assert!(voicings.iter().any(|v| v.uses_open_strings()));
        assert!(voicings.iter().any(|v| v.neck_position > 0));
        assert!(voicings
            .windows(2)
            .all(|w| compare_voicings(&w[0], &w[1]) == Ordering::Less));
    }

    #[test]
    fn test_ties_break_on_string_fret_list() {
        let voicings =
            map_triad_to_fretboard(&c_major(), &Tuning::standard(), &MapConstraints::default())
                .unwrap();
        let key = |v: &ChordVoicing| -> Vec<(u8, u8)> {
            v.positions.iter().map(|p| (p.string, p.fret)).collect()
        };
        let ties: Vec<_> = voicings
            .windows(2)
            .filter(|w| (w[0].neck_position, w[0].score) == (w[1].neck_position, w[1].score))
            .collect();
        assert!(!ties.is_empty());
        for w in ties {
            assert!(key(&w[0]) < key(&w[1]));
        }
    }

    #[test]
    fn test_open_c_shape_is_beginner() {
        let voicings =
            map_triad_to_fretboard(&c_major(), &Tuning::standard(), &MapConstraints::default())
                .unwrap();
        let open_c = voicings.iter().find(|v| v.shape() == "x32010").unwrap();
        assert_eq!(open_c.neck_position, 1);
        assert_eq!(open_c.span, 2);
        assert_eq!(open_c.score, 4);
        assert_eq!(open_c.difficulty, DifficultyLevel::Beginner);
        assert_eq!(open_c.inversion, Inversion::Root);
    }

    #[test]
    fn test_all_open_e_minor() {
        let e_minor = Triad::new(PitchClass::E, TriadQuality::Minor);
        let voicings =
            map_triad_to_fretboard(&e_minor, &Tuning::standard(), &MapConstraints::default())
                .unwrap();
        let all_open = voicings
            .iter()
            .find(|v| v.positions.iter().all(FretPosition::is_open))
            .unwrap();
        assert_eq!(all_open.neck_position, 0);
        assert_eq!(all_open.span, 0);
        assert_eq!(voicings[0].neck_position, 0);
    }

    #[test]
    fn test_excluding_open_strings() {
        let constraints = MapConstraints {
            include_open_strings: false,
            ..MapConstraints::default()
        };
        let voicings = map_triad_to_fretboard(&c_major(), &Tuning::standard(), &constraints).unwrap();
        assert!(!voicings.is_empty());
        assert!(voicings.iter().all(|v| !v.uses_open_strings()));
        assert!(voicings.iter().all(|v| v.neck_position > 0));
    }

    #[test]
    fn test_fret_ceiling_and_three_strings() {
        let constraints = MapConstraints {
            max_fret: 5,
            max_strings: 3,
            ..MapConstraints::default()
        };
        let triad = Triad::new(PitchClass::new(2), TriadQuality::Diminished);
        let voicings = map_triad_to_fretboard(&triad, &Tuning::standard(), &constraints).unwrap();
        assert!(!voicings.is_empty());
        assert_valid(&triad, &voicings, &constraints);
        assert!(voicings.iter().all(|v| v.positions.len() == 3));
    }

    #[test]
    fn test_string_skips_raise_score() {
        let tuning = Tuning::standard();
        let thresholds = DifficultyThresholds::default();
        let triad = c_major();
        // G on string 3, C on string 2, E on string 1 (adjacent)
        let adjacent = vec![
            position_at(&tuning, 1, 0).unwrap(),
            position_at(&tuning, 2, 1).unwrap(),
            position_at(&tuning, 3, 0).unwrap(),
        ];
        // Same top notes with G moved to string 6, skipping strings 3-5
        let skipping = vec![
            position_at(&tuning, 1, 0).unwrap(),
            position_at(&tuning, 2, 1).unwrap(),
            position_at(&tuning, 6, 3).unwrap(),
        ];
        let a = annotate(&triad, &tuning, adjacent.clone(), fret_span(&adjacent), &thresholds);
        let b = annotate(&triad, &tuning, skipping.clone(), fret_span(&skipping), &thresholds);
        assert!(b.score > a.score);
    }

    #[test]
    fn test_score_terms() {
        let tuning = Tuning::standard();
        let thresholds = DifficultyThresholds::default();
        let score = |triad: &Triad, shape: &[(u8, u8)]| {
            let positions: Vec<FretPosition> = shape
                .iter()
                .map(|&(string, fret)| position_at(&tuning, string, fret).unwrap())
                .collect();
            annotate(triad, &tuning, positions.clone(), fret_span(&positions), &thresholds)
        };
        let c = c_major();

        // E C G on the top three strings: nothing to pay for
        let v = score(&c, &[(1, 0), (2, 1), (3, 0)]);
        assert_eq!((v.span, v.score, v.neck_position), (0, 0, 1));

        // open C: span 2 + two extra strings
        let v = score(&c, &[(1, 0), (2, 1), (3, 0), (4, 2), (5, 3)]);
        assert_eq!((v.span, v.score), (2, 4));
        assert_eq!(v.difficulty, DifficultyLevel::Beginner);

        // G moved to string 6: span 2 + three skipped strings at 2 each
        let v = score(&c, &[(1, 0), (2, 1), (6, 3)]);
        assert_eq!((v.span, v.score), (2, 8));
        assert_eq!(v.difficulty, DifficultyLevel::Intermediate);

        // four fretted notes: span 2 + one extra string + one for the fourth finger
        let v = score(&c, &[(1, 3), (2, 5), (3, 5), (4, 5)]);
        assert_eq!((v.span, v.score, v.neck_position), (2, 4, 3));

        // B diminished with F under B: one tritone between adjacent strings
        let b_dim = Triad::new(PitchClass::new(11), TriadQuality::Diminished);
        let v = score(&b_dim, &[(1, 10), (2, 0), (3, 10)]);
        assert_eq!((v.span, v.score), (0, 1));

        // B F D F with string 4 muted: span 2, one extra string, one skip (2),
        // one tritone between strings 1 and 2, four fretted notes
        let v = score(&b_dim, &[(1, 7), (2, 6), (3, 7), (5, 8)]);
        assert_eq!((v.span, v.neck_position), (2, 6));
        assert_eq!(v.score, 2 + 1 + 2 + 1 + 1);
        assert_eq!(v.difficulty, DifficultyLevel::Intermediate);
    }

    #[test]
    fn test_invalid_constraints() {
        let constraints = MapConstraints {
            max_fret: 30,
            ..MapConstraints::default()
        };
        assert!(map_triad_to_fretboard(&c_major(), &Tuning::standard(), &constraints).is_err());

        let constraints = MapConstraints {
            min_strings: 4,
            max_strings: 3,
            ..MapConstraints::default()
        };
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_tuning_from_names() {
        let drop_d = Tuning::from_names(&["E", "B", "G", "D", "A", "D"]).unwrap();
        assert_eq!(drop_d.open_note(6).unwrap().to_string(), "D2");
        assert_eq!(drop_d.open_note(1).unwrap().to_string(), "E4");

        let explicit = Tuning::from_names(&STANDARD_TUNING).unwrap();
        assert_eq!(explicit, Tuning::standard());
        assert_eq!(explicit.names(), STANDARD_TUNING.to_vec());

        assert!(Tuning::from_names(&["E", "B", "G"]).is_err());
        assert!(Tuning::from_names(&["E", "B", "G", "D", "A", "H"]).is_err());
    }

    #[test]
    fn test_difficulty_classification() {
        let thresholds = DifficultyThresholds::default();
        assert_eq!(thresholds.classify(0), DifficultyLevel::Beginner);
        assert_eq!(thresholds.classify(4), DifficultyLevel::Beginner);
        assert_eq!(thresholds.classify(5), DifficultyLevel::Intermediate);
        assert_eq!(thresholds.classify(9), DifficultyLevel::Advanced);
        assert_eq!("advanced".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Advanced);
        assert!("expert".parse::<DifficultyLevel>().is_err());
    }
}
