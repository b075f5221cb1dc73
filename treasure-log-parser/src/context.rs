//! Session state carried between log lines
//!
//! `TrialContext` holds facts that stay true until the log overwrites them
//! (trial, block, chest positions, player position). `PhaseTracker` holds
//! the state machine and the counters local to the current phase.

use crate::table::RecordId;
use crate::types::{Point, Timestamp};
use std::collections::HashMap;

/// What the log has told us about one chest
#[derive(Debug, Clone, PartialEq)]
pub struct ChestInfo {
    pub position: Point,
    /// Item label, once the chest has been opened and labelled
    pub item: Option<String>,
}

/// Per-session facts, overwritten as the log is scanned
#[derive(Debug, Clone, Default)]
pub struct TrialContext {
    pub trial: Option<String>,
    /// Number of completed blocks
    pub block: u32,
    pub chests: HashMap<String, ChestInfo>,
    pub env_center: Option<Point>,
    pub player_position: Option<Point>,
    /// Player position when the current navigation phase began
    pub nav_start: Option<Point>,
}

impl TrialContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or move a chest; a known label survives the move
    pub fn set_chest_position(&mut self, chest: &str, position: Point) {
        self.chests
            .entry(chest.to_string())
            .and_modify(|info| info.position = position)
            .or_insert(ChestInfo {
                position,
                item: None,
            });
    }

    pub fn chest_position(&self, chest: &str) -> Option<Point> {
        self.chests.get(chest).map(|info| info.position)
    }

    pub fn label_chest(&mut self, chest: &str, item: &str) {
        if let Some(info) = self.chests.get_mut(chest) {
            info.item = Some(item.to_string());
        }
    }

    pub fn complete_block(&mut self) {
        self.block += 1;
    }
}

/// Experiment phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    None,
    Nav,
    Rec,
}

/// Scratch state for the recall item currently being tested
#[derive(Debug, Clone, PartialEq)]
pub struct RecallItem {
    pub item: String,
    /// Presentation record matched when the cue appeared
    pub presentation: RecordId,
    /// Timestamp of the recall cue; reaction times are measured from here
    pub started_at: Timestamp,
    /// Timestamp of the item spawn, used as the key of the REC record
    pub spawned_at: Option<Timestamp>,
    pub presented: Option<Point>,
    pub chosen: Option<Point>,
    pub rec_start: Option<Point>,
    pub high_confidence: bool,
    pub remembered: Option<bool>,
    pub reaction_time: Option<i64>,
}

impl RecallItem {
    pub fn new(item: impl Into<String>, presentation: RecordId, started_at: Timestamp) -> Self {
        Self {
            item: item.into(),
            presentation,
            started_at,
            spawned_at: None,
            presented: None,
            chosen: None,
            rec_start: None,
            high_confidence: false,
            remembered: None,
            reaction_time: None,
        }
    }
}

/// Phase state machine
///
/// Transitions happen only through `start_navigation` and `start_recall`;
/// there is no terminal state.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    pub phase: Phase,
    /// Chests opened so far in this navigation phase
    pub serial_pos: u32,
    /// Items cued so far in this recall phase
    pub rec_pos: u32,
    pub current_chest: Option<String>,
    pub current_item: Option<String>,
    pub current_rec: Option<RecallItem>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_navigation(&mut self) {
        self.phase = Phase::Nav;
        self.serial_pos = 0;
        self.current_item = None;
    }

    pub fn start_recall(&mut self) {
        self.phase = Phase::Rec;
        self.rec_pos = 0;
        self.current_rec = None;
    }

    /// A chest was opened; returns its serial position
    pub fn open_chest(&mut self, chest: &str) -> u32 {
        self.serial_pos += 1;
        self.current_chest = Some(chest.to_string());
        self.current_item = None;
        self.serial_pos
    }

    /// A recall cue appeared; returns its recall position
    pub fn begin_recall_item(&mut self, scratch: RecallItem) -> u32 {
        if let Some(unfinished) = &self.current_rec {
            log::warn!(
                "Recall of {:?} replaced by {:?} before its correct position, no REC row",
                unfinished.item,
                scratch.item
            );
        }
        self.rec_pos += 1;
        self.current_rec = Some(scratch);
        self.rec_pos
    }
}
