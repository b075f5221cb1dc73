//! Event correlation state machine
//!
//! `EventCorrelator` is the entry point of the library. It consumes log
//! lines strictly in file order and turns them into records:
//!
//! - navigation phase: every opened chest becomes a CHEST record, created
//!   either at the open event (empty chest) or when the item spawns
//! - recall phase: every cued item becomes a REC record once the correct
//!   position is revealed, and the matching CHEST record is back-filled
//!   with the response
//!
//! Lines must be fed in order. Later lines resolve against state built by
//! earlier ones, and earlier records are updated once later lines arrive.

use crate::config::LogVocabulary;
use crate::context::{Phase, PhaseTracker, RecallItem, TrialContext};
use crate::geometry::same_side_of;
use crate::line::{log_lines, LogLine, PAYLOAD};
use crate::table::RecordTable;
use crate::types::{ParseError, Point, Record, RecordKind, Result};
use std::path::Path;

/// Payload column of TREASURE_OPEN telling whether the chest held an item
const ITEM_PRESENT_COLUMN: usize = 5;

/// Navigation-phase events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavEvent {
    Open,
    Label,
    Spawned,
}

/// Recall-phase events, in the order they occur for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecallEvent {
    Cue,
    Spawned,
    Remember,
    DoubleDown,
    Chosen,
    Correct,
}

/// Counts collected while correlating a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub lines: usize,
    pub chests: usize,
    pub empty_chests: usize,
    pub recalls: usize,
    pub blocks: u32,
}

/// The correlator - owns all session state and the record table
pub struct EventCorrelator {
    vocab: LogVocabulary,
    context: TrialContext,
    tracker: PhaseTracker,
    table: RecordTable,
    stats: SessionStats,
}

impl EventCorrelator {
    /// Create a correlator for logs written with the given vocabulary
    pub fn new(vocab: LogVocabulary) -> Self {
        Self {
            vocab,
            context: TrialContext::new(),
            tracker: PhaseTracker::new(),
            table: RecordTable::new(),
            stats: SessionStats::default(),
        }
    }

    /// Read a whole session log and process it
    ///
    /// # Example
    /// ```no_run
    /// use treasure_log_parser::{EventCorrelator, LogVocabulary};
    /// use std::path::Path;
    ///
    /// let mut correlator = EventCorrelator::new(LogVocabulary::default());
    /// correlator.process_file(Path::new("session_0/log.txt")).unwrap();
    /// let table = correlator.finish();
    /// println!("{} records", table.len());
    /// ```
    pub fn process_file(&mut self, path: &Path) -> Result<()> {
        log::info!("Reading session log: {:?}", path);
        let text = std::fs::read_to_string(path)?;
        self.process_text(&text)
    }

    /// Process every line of an in-memory log
    pub fn process_text(&mut self, text: &str) -> Result<()> {
        for line in log_lines(text) {
            self.process_line(&line)?;
        }
        Ok(())
    }

    /// Process a single line
    pub fn process_line(&mut self, line: &LogLine) -> Result<()> {
        self.stats.lines += 1;
        log::trace!("line {}: {} / {}", line.number, line.category(), line.event());

        self.update_context(line)?;

        match self.tracker.phase {
            Phase::Nav => self.handle_navigation(line),
            Phase::Rec => self.handle_recall(line),
            Phase::None => Ok(()),
        }
    }

    /// Session state after the lines processed so far
    pub fn context(&self) -> &TrialContext {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        self.tracker.phase
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            blocks: self.context.block,
            ..self.stats
        }
    }

    /// Finalise the session and hand over the record table
    pub fn finish(self) -> RecordTable {
        let stats = self.stats();
        log::info!(
            "Session complete: {} lines, {} chests ({} empty), {} recalls, {} blocks",
            stats.lines,
            stats.chests,
            stats.empty_chests,
            stats.recalls,
            stats.blocks
        );
        if let Some(rec) = &self.tracker.current_rec {
            log::warn!("Log ended during the recall of {:?}", rec.item);
        }
        self.table
    }

    /// Apply the facts every line may carry, whatever the phase
    fn update_context(&mut self, line: &LogLine) -> Result<()> {
        let vocab = &self.vocab;
        let category = line.category();
        let event = line.event();

        if category == vocab.trial_info {
            let trial = line.require(PAYLOAD)?;
            log::debug!("Trial {:?} begins at line {}", trial, line.number);
            self.context.trial = Some(trial.to_string());
        }

        if vocab.is_chest(category) && event == vocab.position {
            self.context.set_chest_position(category, line.planar()?);
        }

        if line.is(&vocab.experiment_info, &vocab.env_center) {
            self.context.env_center = Some(line.planar()?);
        }

        if line.is(&vocab.player, &vocab.position) {
            self.context.player_position = Some(line.planar()?);
        } else if category == vocab.trial_event {
            if event == vocab.navigation_started {
                self.tracker.start_navigation();
                self.context.nav_start = self.context.player_position;
                log::debug!("Navigation started at line {}", line.number);
            } else if event == vocab.recall_started {
                self.tracker.start_recall();
                log::debug!("Recall started at line {}", line.number);
            } else if event == vocab.block_completed && line.flag_at(PAYLOAD)? {
                self.context.complete_block();
                log::debug!("Block {} completed", self.context.block);
            }
        }

        Ok(())
    }

    fn classify_navigation(&self, line: &LogLine) -> Option<NavEvent> {
        let event = line.event();
        if event == self.vocab.treasure_open {
            Some(NavEvent::Open)
        } else if event == self.vocab.treasure_label {
            Some(NavEvent::Label)
        } else if event == self.vocab.spawned
            && self.tracker.current_item.as_deref() == Some(line.category())
        {
            Some(NavEvent::Spawned)
        } else {
            None
        }
    }

    fn handle_navigation(&mut self, line: &LogLine) -> Result<()> {
        match self.classify_navigation(line) {
            Some(NavEvent::Open) => {
                let chest = line.category();
                let position =
                    self.context
                        .chest_position(chest)
                        .ok_or_else(|| ParseError::UnknownChest {
                            line: line.number,
                            chest: chest.to_string(),
                        })?;
                let serial = self.tracker.open_chest(chest);

                if !line.flag_at(ITEM_PRESENT_COLUMN)? {
                    self.stats.empty_chests += 1;
                    self.create_chest_record(line, None, serial, position)?;
                }
            }
            Some(NavEvent::Label) => {
                let chest = self
                    .tracker
                    .current_chest
                    .clone()
                    .ok_or(ParseError::NoOpenChest { line: line.number })?;
                let item = line.require(PAYLOAD)?;
                self.context.label_chest(&chest, item);
                self.tracker.current_item = Some(item.to_string());
            }
            Some(NavEvent::Spawned) => {
                // The current item is only set after a chest was opened
                let chest = self
                    .tracker
                    .current_chest
                    .clone()
                    .ok_or(ParseError::NoOpenChest { line: line.number })?;
                let position =
                    self.context
                        .chest_position(&chest)
                        .ok_or_else(|| ParseError::UnknownChest {
                            line: line.number,
                            chest: chest.clone(),
                        })?;
                let item = self.tracker.current_item.take();
                self.create_chest_record(line, item, self.tracker.serial_pos, position)?;
            }
            None => {}
        }
        Ok(())
    }

    fn create_chest_record(
        &mut self,
        line: &LogLine,
        item: Option<String>,
        serial: u32,
        position: Point,
    ) -> Result<()> {
        let trial = self
            .context
            .trial
            .clone()
            .ok_or(ParseError::NoActiveTrial { line: line.number })?;
        let mut record = Record::new(line.timestamp()?, RecordKind::Chest, trial, self.context.block);
        record.item = item;
        record.chest_num = Some(serial);
        record.location = Some(position);
        record.nav_start_location = self.context.nav_start;

        log::debug!(
            "CHEST at {}: trial {} serial {} item {:?}",
            record.mstime,
            record.trial,
            serial,
            record.item
        );
        self.table.insert(record);
        self.stats.chests += 1;
        Ok(())
    }

    fn classify_recall(&self, line: &LogLine) -> Option<RecallEvent> {
        let vocab = &self.vocab;
        if line.is(&vocab.trial_event, &vocab.recall_special) {
            return Some(RecallEvent::Cue);
        }
        if let Some(rec) = &self.tracker.current_rec {
            if line.is(&rec.item, &vocab.spawned) {
                return Some(RecallEvent::Spawned);
            }
        }
        if line.is(&vocab.experiment, &vocab.remember_response) {
            Some(RecallEvent::Remember)
        } else if line.is(&vocab.experiment, &vocab.double_down_response) {
            Some(RecallEvent::DoubleDown)
        } else if line.is(&vocab.position_selector, &vocab.chosen_test_position) {
            Some(RecallEvent::Chosen)
        } else if line.is(&vocab.position_selector, &vocab.correct_test_position) {
            Some(RecallEvent::Correct)
        } else {
            None
        }
    }

    fn handle_recall(&mut self, line: &LogLine) -> Result<()> {
        let event = match self.classify_recall(line) {
            Some(event) => event,
            None => return Ok(()),
        };

        if event == RecallEvent::Cue {
            return self.begin_recall_item(line);
        }

        let Some(rec) = self.tracker.current_rec.as_mut() else {
            log::debug!(
                "line {}: {:?} outside of a recall item, ignored",
                line.number,
                event
            );
            return Ok(());
        };

        match event {
            RecallEvent::Spawned => {
                rec.spawned_at = Some(line.timestamp()?);
            }
            RecallEvent::Remember => {
                let remembered = line.flag_at(PAYLOAD)?;
                rec.remembered = Some(remembered);
                self.table.get_mut(rec.presentation).remembered = Some(remembered);
            }
            RecallEvent::DoubleDown => {
                let high = line.flag_at(PAYLOAD)?;
                rec.high_confidence = high;
                self.table.get_mut(rec.presentation).high_confidence = Some(high);
            }
            RecallEvent::Chosen => {
                rec.chosen = Some(line.planar()?);
                rec.reaction_time = Some(line.timestamp()?.saturating_sub(rec.started_at));
            }
            RecallEvent::Correct => {
                return self.finish_recall_item(line);
            }
            RecallEvent::Cue => {}
        }
        Ok(())
    }

    /// A recall cue: match the presentation and derive the side flags
    fn begin_recall_item(&mut self, line: &LogLine) -> Result<()> {
        let item = line.require(PAYLOAD)?;
        let started_at = line.timestamp()?;
        let trial = self
            .context
            .trial
            .as_deref()
            .ok_or(ParseError::NoActiveTrial { line: line.number })?;
        let presentation =
            self.table
                .find_presentation(trial, item)
                .ok_or_else(|| ParseError::PresentationNotFound {
                    line: line.number,
                    trial: trial.to_string(),
                    item: item.to_string(),
                })?;

        let rec_start = self.context.player_position;
        let center = self.context.env_center;
        if center.is_none() {
            log::warn!("line {}: no environment center logged, side flags left unset", line.number);
        }

        let mut scratch = RecallItem::new(item, presentation, started_at);
        scratch.rec_start = rec_start;

        let record = self.table.get_mut(presentation);
        scratch.presented = record.location;
        if rec_start.is_some() {
            record.rec_start_location = rec_start;
        }
        record.rec_from_start_side = same_side_of(record.nav_start_location, rec_start, center);
        record.rec_from_near_side = same_side_of(record.location, rec_start, center);

        let rec_pos = self.tracker.begin_recall_item(scratch);
        log::debug!("Recall {} of {:?} at {}", rec_pos, item, started_at);
        Ok(())
    }

    /// The correct position was revealed: create the REC record and back-fill
    fn finish_recall_item(&mut self, line: &LogLine) -> Result<()> {
        let presented = line.planar()?;
        let trial = self
            .context
            .trial
            .clone()
            .ok_or(ParseError::NoActiveTrial { line: line.number })?;
        let Some(mut rec) = self.tracker.current_rec.take() else {
            return Ok(());
        };
        rec.presented = Some(presented);
        let mstime = match rec.spawned_at {
            Some(spawned_at) => spawned_at,
            None => line.timestamp()?,
        };

        let presentation = self.table.get(rec.presentation);
        let mut record = Record::new(mstime, RecordKind::Rec, trial, self.context.block);
        record.item = Some(rec.item.clone());
        record.chest_num = presentation.chest_num;
        record.location = rec.presented;
        record.chosen_location = rec.chosen;
        record.nav_start_location = self.context.nav_start;
        record.rec_start_location = rec.rec_start;
        record.high_confidence = Some(rec.high_confidence);
        record.rec_from_near_side = presentation.rec_from_near_side;
        record.rec_from_start_side = presentation.rec_from_start_side;
        record.reaction_time = rec.reaction_time;
        record.remembered = rec.remembered;

        log::debug!(
            "REC at {}: trial {} item {:?} rt {:?}",
            record.mstime,
            record.trial,
            rec.item,
            rec.reaction_time
        );
        self.table.insert(record);
        self.stats.recalls += 1;

        let presentation = self.table.get_mut(rec.presentation);
        if rec.chosen.is_some() {
            presentation.chosen_location = rec.chosen;
        }
        if rec.reaction_time.is_some() {
            presentation.reaction_time = rec.reaction_time;
        }
        if rec.remembered.is_some() {
            presentation.remembered = rec.remembered;
        }
        presentation.high_confidence = Some(rec.high_confidence);
        Ok(())
    }
}
