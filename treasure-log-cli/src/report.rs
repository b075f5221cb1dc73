//! Output file generation
//!
//! Writes the record table and the timing trace. Files are only created
//! once the whole log has been correlated, so a failed run leaves no
//! partial output behind.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use treasure_log_parser::{write_markers, Emitter, OutputSchema, RecordTable, TimingMarker};

/// Write the record table in the configured format
pub fn write_records(path: &Path, table: &RecordTable, schema: &OutputSchema) -> Result<()> {
    log::info!("Writing {} records to {:?}", table.len(), path);

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut out = BufWriter::new(file);

    Emitter::new(schema)
        .write(table, &mut out)
        .with_context(|| format!("Failed to write records to {:?}", path))?;
    out.flush()
        .with_context(|| format!("Failed to write records to {:?}", path))?;

    Ok(())
}

/// Write the phase-transition marker trace
pub fn write_timing(path: &Path, markers: &[TimingMarker], missing: &str) -> Result<()> {
    log::info!("Writing {} timing markers to {:?}", markers.len(), path);

    let file = File::create(path)
        .with_context(|| format!("Failed to create timing file: {:?}", path))?;
    let mut out = BufWriter::new(file);

    write_markers(markers, missing, &mut out)
        .with_context(|| format!("Failed to write timing markers to {:?}", path))?;
    out.flush()
        .with_context(|| format!("Failed to write timing markers to {:?}", path))?;

    Ok(())
}
