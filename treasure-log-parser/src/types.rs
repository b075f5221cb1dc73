//! Core types for the treasure log parser
//!
//! This module defines the records the correlator emits and the error type
//! shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since session start, as written in column 0 of the log
pub type Timestamp = i64;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// A position on the horizontal plane of the environment
///
/// The log writes 3D positions as (x, vertical, z); only x and z are kept,
/// with z stored as `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Errors that can occur while converting a session log
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected a number in column {column}, found {value:?}")]
    MalformedNumber {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("line {line}: missing column {column}")]
    MissingField { line: usize, column: usize },

    #[error("line {line}: chest {chest:?} was opened before its position was logged")]
    UnknownChest { line: usize, chest: String },

    #[error("line {line}: treasure label without an open chest")]
    NoOpenChest { line: usize },

    #[error("line {line}: event logged before any trial info")]
    NoActiveTrial { line: usize },

    #[error("line {line}: no presentation of item {item:?} in trial {trial:?}")]
    PresentationNotFound {
        line: usize,
        trial: String,
        item: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which kind of event a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A chest opened during navigation (item present or empty)
    Chest,
    /// A recall response during the test phase
    Rec,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Chest => write!(f, "CHEST"),
            RecordKind::Rec => write!(f, "REC"),
        }
    }
}

/// One output row
///
/// Records are accumulators: the correlator creates them with whatever is
/// known at creation time and fills the remaining fields as later lines
/// arrive. A field that has been set is never cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub mstime: Timestamp,
    pub kind: RecordKind,
    pub item: Option<String>,
    pub trial: String,
    pub block: u32,
    /// Serial position of the chest within its trial
    pub chest_num: Option<u32>,
    pub location: Option<Point>,
    pub chosen_location: Option<Point>,
    pub nav_start_location: Option<Point>,
    pub rec_start_location: Option<Point>,
    /// `true` when the participant doubled down on the response
    pub high_confidence: Option<bool>,
    pub rec_from_near_side: Option<bool>,
    pub rec_from_start_side: Option<bool>,
    pub reaction_time: Option<i64>,
    pub remembered: Option<bool>,
}

impl Record {
    /// Create a record with every derived field unset
    pub fn new(mstime: Timestamp, kind: RecordKind, trial: impl Into<String>, block: u32) -> Self {
        Self {
            mstime,
            kind,
            item: None,
            trial: trial.into(),
            block,
            chest_num: None,
            location: None,
            chosen_location: None,
            nav_start_location: None,
            rec_start_location: None,
            high_confidence: None,
            rec_from_near_side: None,
            rec_from_start_side: None,
            reaction_time: None,
            remembered: None,
        }
    }

    pub fn is_chest(&self) -> bool {
        self.kind == RecordKind::Chest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = Record::new(2300, RecordKind::Chest, "1", 0);
        assert_eq!(record.trial, "1");
        assert!(record.item.is_none());
        assert!(record.chest_num.is_none());
        assert!(record.high_confidence.is_none());
        assert!(record.reaction_time.is_none());
        assert!(record.is_chest());
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(RecordKind::Chest.to_string(), "CHEST");
        assert_eq!(RecordKind::Rec.to_string(), "REC");
    }

    #[test]
    fn test_error_messages_carry_line() {
        let err = ParseError::PresentationNotFound {
            line: 42,
            trial: "3".into(),
            item: "gold".into(),
        };
        assert_eq!(
            err.to_string(),
            "line 42: no presentation of item \"gold\" in trial \"3\""
        );
    }
}
