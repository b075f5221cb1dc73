//! Session log line parsing
//!
//! Each log line is tab-separated:
//!
//! | column | content                                   |
//! |--------|-------------------------------------------|
//! | 0      | timestamp (ms since session start)        |
//! | 1      | unused                                    |
//! | 2      | category / entity name                    |
//! | 3      | event code                                |
//! | 4..    | payload (numbers, or `True` / `False`)    |
//!
//! Parsing is lazy: a line is only split here, and columns are converted
//! when the correlator asks for them, so lines it never looks at cannot fail.

use crate::types::{ParseError, Point, Result, Timestamp};

/// First payload column
pub const PAYLOAD: usize = 4;

/// Columns holding a planar (x, z) position
const X_COLUMN: usize = 4;
const Z_COLUMN: usize = 6;

/// One split log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// 1-based line number in the input
    pub number: usize,
    fields: Vec<String>,
}

impl LogLine {
    /// Split a raw line into columns
    ///
    /// Carriage returns are stripped first. Returns `None` for lines with
    /// fewer than two columns, which the log uses for blank and banner lines.
    pub fn parse(number: usize, raw: &str) -> Option<Self> {
        let cleaned = raw.replace('\r', "");
        let cleaned = cleaned.strip_suffix('\n').unwrap_or(&cleaned);
        let fields: Vec<String> = cleaned.split('\t').map(str::to_string).collect();

        if fields.len() < 2 {
            return None;
        }

        Some(Self { number, fields })
    }

    /// Get a column if present
    pub fn field(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Get a column, failing if the line is too short
    pub fn require(&self, column: usize) -> Result<&str> {
        self.field(column).ok_or(ParseError::MissingField {
            line: self.number,
            column,
        })
    }

    /// Category column, empty when absent
    pub fn category(&self) -> &str {
        self.field(2).unwrap_or("")
    }

    /// Event code column, empty when absent
    pub fn event(&self) -> &str {
        self.field(3).unwrap_or("")
    }

    /// Check both the category and the event code
    pub fn is(&self, category: &str, event: &str) -> bool {
        self.category() == category && self.event() == event
    }

    pub fn timestamp(&self) -> Result<Timestamp> {
        let raw = self.require(0)?;
        raw.trim().parse().map_err(|_| ParseError::MalformedNumber {
            line: self.number,
            column: 0,
            value: raw.to_string(),
        })
    }

    /// Parse a numeric payload column
    pub fn number_at(&self, column: usize) -> Result<f64> {
        let raw = self.require(column)?;
        raw.trim().parse().map_err(|_| ParseError::MalformedNumber {
            line: self.number,
            column,
            value: raw.to_string(),
        })
    }

    /// Parse a boolean payload column; anything but `True` is false
    pub fn flag_at(&self, column: usize) -> Result<bool> {
        Ok(self.require(column)?.trim() == "True")
    }

    /// Parse the planar position carried in the payload
    pub fn planar(&self) -> Result<Point> {
        Ok(Point::new(self.number_at(X_COLUMN)?, self.number_at(Z_COLUMN)?))
    }
}

/// Split a whole log into lines, skipping those with too few columns
pub fn log_lines(text: &str) -> impl Iterator<Item = LogLine> + '_ {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| LogLine::parse(idx + 1, raw))
}
