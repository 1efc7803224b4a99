//! # Triad Database
//!
//! Read-only lookup of precomputed triads and voicings.
//!
//! ## Purpose
//! The fretboard search is too slow to run per request, so its output is
//! compiled offline into a [`Dataset`] document (see [`crate::generate`]) and
//! loaded once into a [`TriadDatabase`]. Queries then only walk prebuilt
//! indices.
//!
//! ## Sub-modules
//! - `dataset` - serialized document types
//! - `store` - the arena, its indices and load-time checks
//! - `query` - lookup operations and filters
//!
//! ## Key Types
//! - [`TriadDatabase`] - flat entry and voicing tables plus four indices
//! - [`EntryRef`] - one triad with its voicings
//! - [`VoicingRef`] - one voicing with the triad it realizes
//! - [`TriadFilter`], [`VoicingFilter`] - query criteria
//!
//! ## Indices
//! | Index | Key | Points at |
//! |---|---|---|
//! | by root | pitch class | entries |
//! | by quality | triad quality | entries |
//! | by difficulty | difficulty level | voicings |
//! | by neck position | lowest non-open fret | voicings |
//!
//! Loading fails if any index references a missing record, files one under
//! the wrong key, or does not cover the whole table.
//!
//! ## Shared Instance
//! [`database()`] loads the dataset named by the `TRIADS_DATASET`
//! environment variable, or generates one from the default policy when it is
//! unset. Any failure is logged and leaves an empty database.
//!
//! ## Example
//! ```rust,no_run
//! use triads::database::{database, TriadFilter};
//!
//! let db = database();
//! let c = db.get_triad("C", "major").unwrap();
//! assert_eq!(c.symbol(), "C");
//!
//! let minors = db.find_triads(&TriadFilter {
//!     quality: Some("minor".to_string()),
//!     ..Default::default()
//! });
//! assert_eq!(minors.len(), 12);
//! ```

mod dataset;
mod query;
mod store;


pub use dataset::{
    Dataset, DatasetEntry, DatasetIndex, DatasetStats, DifficultyCounts, InstrumentInfo, VoicingKey,
};
pub use query::{DatabaseStats, TriadFilter, VoicingFilter};
pub use store::{EntryRef, TriadDatabase, VoicingRef};

use log::{error, info};
use once_cell::sync::Lazy;
use std::env;
use std::path::Path;

use crate::config::GeneratorConfig;

/// Environment variable naming a dataset JSON file for [`database()`].
pub const DATASET_ENV: &str = "TRIADS_DATASET";

static DATABASE: Lazy<TriadDatabase> = Lazy::new(|| {
    let loaded = match env::var(DATASET_ENV) {
        Ok(path) => {
            info!("loading triad dataset from {}", path);
            TriadDatabase::load(Path::new(&path))
        }
        Err(_) => {
            info!("generating triad dataset from the default policy");
            TriadDatabase::generate(&GeneratorConfig::default())
        }
    };
    loaded.unwrap_or_else(|e| {
        error!("triad database unavailable: {}", e);
        TriadDatabase::empty()
    })
});

/// The process-wide database, loaded on first use.
pub fn database() -> &'static TriadDatabase {
    &DATABASE
}
