//! # Error Types
//!
//! This module defines all error types for the triad engine.
//!
//! Every error carries the offending value so that the query layer can log it
//! alongside the operation name before degrading to an empty result.
//!
//! ## Error Types
//! - `InvalidNoteName` - Note name outside the 12 sharp/flat spellings
//! - `InvalidQuality` - Triad quality outside major/minor/diminished/augmented
//! - `InvalidDifficulty` - Difficulty outside beginner/intermediate/advanced
//! - `InvalidInterval` - Unknown interval short name
//! - `InvalidSymbol` - Chord symbol that does not name a triad
//! - `OutOfRange` - Fret, string, octave or neck position outside its range
//! - `ConfigError` - Invalid YAML generation policy
//! - `DatasetError` - Dataset document missing keys or failing to load
//!
//! ## Usage
//! ```rust
//! use triads::{note_from_name, TriadError};
//!
//! match note_from_name("H", None) {
//!     Ok(note) => println!("{}", note),
//!     Err(TriadError::InvalidNoteName(name)) => eprintln!("bad note {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriadError {
    /// Note name that is not one of the 12 accepted spellings.
    ///
    /// # Example
    /// ```
    /// # use triads::TriadError;
    /// let err = TriadError::InvalidNoteName("Cbb".to_string());
    /// assert_eq!(err.to_string(), "Invalid note name: Cbb");
    /// ```
    #[error("Invalid note name: {0}")]
    InvalidNoteName(String),

    #[error("Invalid triad quality: {0}")]
    InvalidQuality(String),

    #[error("Invalid difficulty level: {0}")]
    InvalidDifficulty(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid chord symbol: {0}")]
    InvalidSymbol(String),

    /// Numeric input outside its canonical range.
    ///
    /// # Example
    /// ```
    /// # use triads::TriadError;
    /// let err = TriadError::OutOfRange { field: "fret", value: 30, min: 0, max: 24 };
    /// assert_eq!(err.to_string(), "fret out of range: 30 (expected 0..=24)");
    /// ```
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),
}
