//! Timing marker trace
//!
//! A second, much simpler view of a session log: one row per phase
//! transition, used to align the behavioural log with recordings made on
//! other clocks. The trace is bracketed by `START` and `END` rows at the
//! first and last lines of the log.

use crate::config::LogVocabulary;
use crate::line::{log_lines, LogLine, PAYLOAD};
use crate::types::{Result, Timestamp};
use std::io::Write;

pub const START_LABEL: &str = "START";
pub const END_LABEL: &str = "END";

/// One marker row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingMarker {
    pub mstime: Timestamp,
    pub trial: Option<String>,
    pub label: &'static str,
}

/// Builds the marker trace from a line stream
pub struct TimingTrace {
    vocab: LogVocabulary,
    trial: Option<String>,
    markers: Vec<TimingMarker>,
    last_mstime: Option<Timestamp>,
}

impl TimingTrace {
    pub fn new(vocab: LogVocabulary) -> Self {
        Self {
            vocab,
            trial: None,
            markers: Vec::new(),
            last_mstime: None,
        }
    }

    pub fn process_text(&mut self, text: &str) -> Result<()> {
        for line in log_lines(text) {
            self.process_line(&line)?;
        }
        Ok(())
    }

    /// Lines without a numeric timestamp carry no event and are skipped
    pub fn process_line(&mut self, line: &LogLine) -> Result<()> {
        let Ok(mstime) = line.timestamp() else {
            log::debug!("line {}: no timestamp, skipped in timing trace", line.number);
            return Ok(());
        };

        if line.category() == self.vocab.trial_info {
            self.trial = Some(line.require(PAYLOAD)?.to_string());
        }

        if self.last_mstime.is_none() {
            self.push(mstime, START_LABEL);
        }
        self.last_mstime = Some(mstime);

        if let Some(label) = self.label_for(line)? {
            self.push(mstime, label);
        }
        Ok(())
    }

    /// Close the trace with the `END` row
    pub fn finish(mut self) -> Vec<TimingMarker> {
        if let Some(mstime) = self.last_mstime {
            self.push(mstime, END_LABEL);
        }
        self.markers
    }

    fn push(&mut self, mstime: Timestamp, label: &'static str) {
        self.markers.push(TimingMarker {
            mstime,
            trial: self.trial.clone(),
            label,
        });
    }

    fn label_for(&self, line: &LogLine) -> Result<Option<&'static str>> {
        let vocab = &self.vocab;
        let event = line.event();

        if event == vocab.treasure_open {
            return Ok(Some("CHEST_OPEN"));
        }
        if line.category() != vocab.trial_event {
            return Ok(None);
        }
        let label = if event == vocab.navigation_started {
            Some("NAV_START")
        } else if event == vocab.recall_started {
            Some("REC_START")
        } else if event == vocab.recall_special {
            Some("REC_ITEM")
        } else if event == vocab.block_completed && line.flag_at(PAYLOAD)? {
            Some("BLOCK_END")
        } else {
            None
        };
        Ok(label)
    }
}

/// Write markers as a tab-separated table with a header row
pub fn write_markers<W: Write>(markers: &[TimingMarker], missing: &str, out: &mut W) -> Result<()> {
    writeln!(out, "mstime\ttrial\tevent")?;
    for marker in markers {
        writeln!(
            out,
            "{}\t{}\t{}",
            marker.mstime,
            marker.trial.as_deref().unwrap_or(missing),
            marker.label
        )?;
    }
    Ok(())
}
