//! Treasure Log Parser Library
//!
//! Converts the event log of the treasure hunt spatial-memory task into a
//! flat table with one row per chest encounter and one row per recall
//! response.
//!
//! # Architecture
//!
//! - `line` splits raw log lines into typed columns
//! - `correlator` runs the phase state machine over the lines, creating
//!   records and back-filling presentation records with recall responses
//! - `table` stores the records and indexes presentations by trial and item
//! - `output` writes the finished table (TSV or JSON lines)
//! - `timing` derives the phase-transition marker trace
//!
//! The library does NOT pick file names, parse arguments or set up
//! logging. That lives in the application layer (treasure-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use treasure_log_parser::{Emitter, EventCorrelator, ParserConfig};
//! use std::path::Path;
//!
//! let config = ParserConfig::new().with_subject("R1001P");
//!
//! let mut correlator = EventCorrelator::new(config.vocabulary.clone());
//! correlator.process_file(Path::new("session_0/log.txt")).unwrap();
//! let table = correlator.finish();
//!
//! let mut out = std::io::stdout();
//! Emitter::new(&config.output).write(&table, &mut out).unwrap();
//! ```

// Public modules
pub mod config;
pub mod context;
pub mod correlator;
pub mod geometry;
pub mod line;
pub mod output;
pub mod table;
pub mod timing;
pub mod types;

// Re-export main types for convenience
pub use config::{LogVocabulary, OutputFormat, OutputSchema, ParserConfig};
pub use context::Phase;
pub use correlator::{EventCorrelator, SessionStats};
pub use output::Emitter;
pub use table::{RecordId, RecordTable};
pub use timing::{write_markers, TimingMarker, TimingTrace};
pub use types::{ParseError, Point, Record, RecordKind, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Correlate an in-memory log into a finished record table
pub fn correlate(text: &str, config: &ParserConfig) -> Result<RecordTable> {
    config.validate()?;
    let mut correlator = EventCorrelator::new(config.vocabulary.clone());
    correlator.process_text(text)?;
    Ok(correlator.finish())
}
