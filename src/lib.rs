pub mod config;
pub mod database;
pub mod error;
pub mod fretboard;
pub mod generate;
pub mod interval;
pub mod pitch;
pub mod triad;
pub mod validate;

pub use config::{load_config, parse_config, GeneratorConfig};
pub use database::{database, EntryRef, TriadDatabase, TriadFilter, VoicingFilter, VoicingRef};
pub use error::*;
pub use fretboard::{
    find_note_on_fretboard, map_triad_to_fretboard, ChordVoicing, DifficultyLevel, FretPosition,
    MapConstraints, Tuning,
};
pub use generate::generate_dataset;
pub use interval::{calculate_interval, invert_interval, is_consonant, Interval};
pub use pitch::{
    add_semitones, is_valid_note_name, normalize_note_name, note_from_name, Note, PitchClass,
};
pub use triad::{
    chord_tones, generate_triad, get_all_triad_qualities, get_all_triads, identify_triad,
    Inversion, Triad, TriadQuality,
};

/// Identify the triad named by three note names, e.g. `["E", "G", "C"]`.
/// Fails on an invalid name; returns `Ok(None)` when the notes form no triad.
pub fn identify_names(names: &[&str]) -> Result<Option<Triad>, TriadError> {
    let notes = names
        .iter()
        .map(|name| note_from_name(name, None))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(identify_triad(&notes))
}

/// Every voicing of the triad named by `symbol`, up to `max_fret`.
pub fn voicings_for_symbol(symbol: &str, max_fret: u8) -> Result<Vec<ChordVoicing>, TriadError> {
    let triad = Triad::from_symbol(symbol)?;
    let constraints = MapConstraints {
        max_fret,
        ..MapConstraints::default()
    };
    map_triad_to_fretboard(&triad, &Tuning::standard(), &constraints)
}
