//! Parser configuration types
//!
//! The log vocabulary (category and event strings written by the task) and
//! the output schema are both configurable so that logs from older task
//! builds and the different column layouts used by the lab can share one
//! code path. Defaults match the current task build.

use serde::{Deserialize, Serialize};

/// Literal strings recognised in the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogVocabulary {
    /// Category of the line carrying the trial id
    pub trial_info: String,
    /// Category of the phase-transition and recall-cue events
    pub trial_event: String,
    /// Category of the environment center line
    pub experiment_info: String,
    /// Category of the participant response events
    pub experiment: String,
    /// Category of the player position line
    pub player: String,
    /// Category of the test-position selector events
    pub position_selector: String,
    /// Substring identifying a chest entity in the category column
    pub chest_marker: String,

    pub position: String,
    pub env_center: String,
    pub navigation_started: String,
    pub recall_started: String,
    pub block_completed: String,
    pub treasure_open: String,
    pub treasure_label: String,
    pub spawned: String,
    pub recall_special: String,
    pub remember_response: String,
    pub double_down_response: String,
    pub chosen_test_position: String,
    pub correct_test_position: String,
}

impl Default for LogVocabulary {
    fn default() -> Self {
        Self {
            trial_info: "Trial Info".to_string(),
            trial_event: "Trial Event".to_string(),
            experiment_info: "Experiment Info".to_string(),
            experiment: "Experiment".to_string(),
            player: "Player".to_string(),
            position_selector: "EnvironmentPositionSelector".to_string(),
            chest_marker: "TreasureChest".to_string(),
            position: "POSITION".to_string(),
            env_center: "ENV_CENTER".to_string(),
            navigation_started: "TRIAL_NAVIGATION_STARTED".to_string(),
            recall_started: "RECALL_PHASE_STARTED".to_string(),
            block_completed: "BLOCK_COMPLETED".to_string(),
            treasure_open: "TREASURE_OPEN".to_string(),
            treasure_label: "TREASURE_LABEL".to_string(),
            spawned: "SPAWNED".to_string(),
            recall_special: "RECALL_SPECIAL".to_string(),
            remember_response: "REMEMBER_RESPONSE".to_string(),
            double_down_response: "DOUBLE_DOWN_RESPONSE".to_string(),
            chosen_test_position: "CHOSEN_TEST_POSITION".to_string(),
            correct_test_position: "CORRECT_TEST_POSITION".to_string(),
        }
    }
}

impl LogVocabulary {
    /// Check if a category names a treasure chest entity
    pub fn is_chest(&self, category: &str) -> bool {
        !self.chest_marker.is_empty() && category.contains(&self.chest_marker)
    }
}

/// Serialisation format of the record table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated values with a header row
    #[default]
    Tsv,
    /// One JSON object per record
    Json,
}

/// Column layout of the record table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSchema {
    pub format: OutputFormat,
    /// Emit the `isRecFromStartSide` column
    pub include_start_side: bool,
    /// When set, a trailing `subject` column carrying this value on every row
    pub subject: Option<String>,
    /// Token written for unset fields in TSV output
    pub missing_token: String,
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self {
            format: OutputFormat::Tsv,
            include_start_side: true,
            subject: None,
            missing_token: "NaN".to_string(),
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub vocabulary: LogVocabulary,
    #[serde(default)]
    pub output: OutputSchema,
}

impl ParserConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: replace the log vocabulary
    pub fn with_vocabulary(mut self, vocabulary: LogVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Builder method: choose the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    /// Builder method: enable or disable the start-side column
    pub fn with_start_side(mut self, enabled: bool) -> Self {
        self.output.include_start_side = enabled;
        self
    }

    /// Builder method: append a subject column
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.output.subject = Some(subject.into());
        self
    }

    /// Builder method: set the missing-value token
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.output.missing_token = token.into();
        self
    }

    /// Reject settings that would produce an unreadable table
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.vocabulary.chest_marker.is_empty() {
            return Err(crate::types::ParseError::Config(
                "chest_marker must not be empty".to_string(),
            ));
        }
        let token = &self.output.missing_token;
        if token.contains('\t') || token.contains('\n') {
            return Err(crate::types::ParseError::Config(format!(
                "missing_token {:?} contains a column or row separator",
                token
            )));
        }
        Ok(())
    }
}
