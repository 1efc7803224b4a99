//! # Input Validation
//!
//! Checks every public input against its canonical enumeration or range before
//! it reaches the engine or the dataset.
//!
//! ## Validation Surface
//! - Note names: the 12 pitch classes in sharp or flat spelling
//! - Triad quality: `major`, `minor`, `diminished`, `augmented`
//! - Difficulty: `beginner`, `intermediate`, `advanced`
//! - Fret `0..=24`, string `1..=6`, octave `0..=9`, neck position `0..=24`
//!
//! ## Query Boundary
//! Query-layer operations never fail. They run their inputs through these
//! checks and hand the result to [`checked`], which logs a warning naming the
//! operation and the offending value and turns the failure into `None`.

use log::warn;

use crate::error::TriadError;
use crate::fretboard::DifficultyLevel;
use crate::pitch::PitchClass;
use crate::triad::TriadQuality;

pub const MAX_FRET: u8 = 24;
pub const STRING_COUNT: u8 = 6;
pub const MIN_OCTAVE: i8 = 0;
pub const MAX_OCTAVE: i8 = 9;

fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), TriadError> {
    if value < min || value > max {
        return Err(TriadError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

pub fn validate_fret(fret: i64) -> Result<u8, TriadError> {
    in_range("fret", fret, 0, MAX_FRET as i64)?;
    Ok(fret as u8)
}

pub fn validate_string(string: i64) -> Result<u8, TriadError> {
    in_range("string", string, 1, STRING_COUNT as i64)?;
    Ok(string as u8)
}

pub fn validate_octave(octave: i64) -> Result<i8, TriadError> {
    in_range("octave", octave, MIN_OCTAVE as i64, MAX_OCTAVE as i64)?;
    Ok(octave as i8)
}

pub fn validate_neck_position(position: i64) -> Result<u8, TriadError> {
    in_range("neck position", position, 0, MAX_FRET as i64)?;
    Ok(position as u8)
}

pub fn parse_root(name: &str) -> Result<PitchClass, TriadError> {
    name.parse()
}

pub fn parse_quality(name: &str) -> Result<TriadQuality, TriadError> {
    name.parse()
}

pub fn parse_difficulty(name: &str) -> Result<DifficultyLevel, TriadError> {
    name.parse()
}

/// Log a validation failure for `operation` and degrade it to `None`.
pub fn checked<T>(operation: &str, result: Result<T, TriadError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {}", operation, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(validate_fret(0).unwrap(), 0);
        assert_eq!(validate_fret(24).unwrap(), 24);
        assert!(validate_fret(25).is_err());
        assert!(validate_fret(-1).is_err());

        assert!(validate_string(0).is_err());
        assert_eq!(validate_string(6).unwrap(), 6);
        assert!(validate_string(7).is_err());

        assert!(validate_octave(9).is_ok());
        assert!(validate_octave(10).is_err());

        assert!(validate_neck_position(24).is_ok());
        assert!(validate_neck_position(25).is_err());
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let err = validate_string(9).unwrap_err();
        assert_eq!(
            err,
            TriadError::OutOfRange {
                field: "string",
                value: 9,
                min: 1,
                max: 6
            }
        );
    }

    #[test]
    fn test_checked_degrades_to_none() {
        assert_eq!(checked("get_triad", parse_root("C")), Some(PitchClass::C));
        assert_eq!(checked("get_triad", parse_root("Z")), None);
        assert!(checked("find_voicings", parse_difficulty("expert")).is_none());
        assert!(checked("find_triads", parse_quality("sus4")).is_none());
    }
}
