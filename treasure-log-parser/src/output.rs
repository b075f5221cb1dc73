//! Record table serialisation
//!
//! Column order is fixed:
//!
//! ```text
//! mstime type item trial block chestNum locationX locationY
//! chosenLocationX chosenLocationY navStartLocationX navStartLocationY
//! recStartLocationX recStartLocationY isHighConf isRecFromNearSide
//! [isRecFromStartSide] reactionTime rememberBool [subject]
//! ```
//!
//! The bracketed columns depend on the `OutputSchema`.

use crate::config::{OutputFormat, OutputSchema};
use crate::table::RecordTable;
use crate::types::{Point, Record, Result};
use serde_json::{Map, Value};
use std::io::Write;

const START_SIDE_COLUMN: &str = "isRecFromStartSide";
const SUBJECT_COLUMN: &str = "subject";

/// One rendered field
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Int(i64),
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Missing, |v| Cell::Text(v.to_string()))
    }

    fn int(value: Option<i64>) -> Self {
        value.map_or(Cell::Missing, Cell::Int)
    }

    fn flag(value: Option<bool>) -> Self {
        value.map_or(Cell::Missing, Cell::Flag)
    }

    fn point(value: Option<Point>) -> [Self; 2] {
        match value {
            Some(p) => [Cell::Number(p.x), Cell::Number(p.y)],
            None => [Cell::Missing, Cell::Missing],
        }
    }

    /// Render for TSV output
    pub fn render(&self, missing: &str) -> String {
        match self {
            Cell::Missing => missing.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(v) => v.clone(),
            Cell::Flag(v) => String::from(if *v { "1" } else { "0" }),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Cell::Missing => Value::Null,
            Cell::Int(v) => Value::from(*v),
            Cell::Number(v) => Value::from(*v),
            Cell::Text(v) => Value::from(v.as_str()),
            Cell::Flag(v) => Value::from(u8::from(*v)),
        }
    }
}

/// Writes a finished record table in the configured layout
pub struct Emitter<'a> {
    schema: &'a OutputSchema,
}

impl<'a> Emitter<'a> {
    pub fn new(schema: &'a OutputSchema) -> Self {
        Self { schema }
    }

    /// Header names in output order
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![
            "mstime",
            "type",
            "item",
            "trial",
            "block",
            "chestNum",
            "locationX",
            "locationY",
            "chosenLocationX",
            "chosenLocationY",
            "navStartLocationX",
            "navStartLocationY",
            "recStartLocationX",
            "recStartLocationY",
            "isHighConf",
            "isRecFromNearSide",
        ];
        if self.schema.include_start_side {
            columns.push(START_SIDE_COLUMN);
        }
        columns.extend(["reactionTime", "rememberBool"]);
        if self.schema.subject.is_some() {
            columns.push(SUBJECT_COLUMN);
        }
        columns
    }

    /// Fields of one record in output order
    pub fn cells(&self, record: &Record) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Int(record.mstime),
            Cell::Text(record.kind.to_string()),
            Cell::text(record.item.as_deref()),
            Cell::Text(record.trial.clone()),
            Cell::Int(i64::from(record.block)),
            Cell::int(record.chest_num.map(i64::from)),
        ];
        cells.extend(Cell::point(record.location));
        cells.extend(Cell::point(record.chosen_location));
        cells.extend(Cell::point(record.nav_start_location));
        cells.extend(Cell::point(record.rec_start_location));
        cells.push(Cell::flag(record.high_confidence));
        cells.push(Cell::flag(record.rec_from_near_side));
        if self.schema.include_start_side {
            cells.push(Cell::flag(record.rec_from_start_side));
        }
        cells.push(Cell::int(record.reaction_time));
        cells.push(Cell::flag(record.remembered));
        if let Some(subject) = &self.schema.subject {
            cells.push(Cell::Text(subject.clone()));
        }
        cells
    }

    /// Write every record, ordered by timestamp
    pub fn write<W: Write>(&self, table: &RecordTable, out: &mut W) -> Result<()> {
        match self.schema.format {
            OutputFormat::Tsv => self.write_tsv(table, out),
            OutputFormat::Json => self.write_json(table, out),
        }
    }

    /// Render the whole table into a string
    pub fn render(&self, table: &RecordTable) -> Result<String> {
        let mut buf = Vec::new();
        self.write(table, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_tsv<W: Write>(&self, table: &RecordTable, out: &mut W) -> Result<()> {
        writeln!(out, "{}", self.columns().join("\t"))?;
        for record in table.sorted() {
            let row: Vec<String> = self
                .cells(record)
                .iter()
                .map(|cell| cell.render(&self.schema.missing_token))
                .collect();
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, table: &RecordTable, out: &mut W) -> Result<()> {
        let columns = self.columns();
        for record in table.sorted() {
            let object: Map<String, Value> = columns
                .iter()
                .zip(self.cells(record))
                .map(|(name, cell)| (name.to_string(), cell.to_json()))
                .collect();
            serde_json::to_writer(&mut *out, &object).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
