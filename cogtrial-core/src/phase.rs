use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level phase of an experiment run.
///
/// Runs strictly forward: setup, practice, practice_complete, task, complete.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPhase {
    #[default]
    Setup,
    Practice,
    PracticeComplete,
    Task,
    Complete,
}

impl BlockPhase {
    pub fn next(&self) -> Option<Self> {
        use BlockPhase::*;
        Some(match self {
            Setup => Practice,
            Practice => PracticeComplete,
            PracticeComplete => Task,
            Task => Complete,
            Complete => return None,
        })
    }

    /// Block whose trials run during this phase, if any.
    pub fn block(&self) -> Option<Block> {
        match self {
            BlockPhase::Practice => Some(Block::Practice),
            BlockPhase::Task => Some(Block::Task),
            _ => None,
        }
    }

    /// Phase entered once this phase's trials are exhausted.
    pub fn completed(&self) -> Option<Self> {
        match self {
            BlockPhase::Practice => Some(BlockPhase::PracticeComplete),
            BlockPhase::Task => Some(BlockPhase::Complete),
            _ => None,
        }
    }

    pub fn runs_trials(&self) -> bool {
        self.block().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockPhase::Setup => "setup",
            BlockPhase::Practice => "practice",
            BlockPhase::PracticeComplete => "practice_complete",
            BlockPhase::Task => "task",
            BlockPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for BlockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two trial blocks. Each owns its own trial list and results.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Practice,
    Task,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Practice => "practice",
            Block::Task => "task",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named step in a single trial's timeline.
///
/// `duration_ms: None` means the phase only ends when the trial resolves,
/// which is only meaningful for a response-accepting phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Upper bound of a uniform random extension added to `duration_ms`.
    #[serde(default)]
    pub jitter_ms: u64,
    #[serde(default)]
    pub show_stimulus: bool,
    #[serde(default)]
    pub accepts_responses: bool,
}

impl PhaseSpec {
    /// A phase that ends on its own after `duration_ms`.
    pub fn timed(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms: Some(duration_ms),
            jitter_ms: 0,
            show_stimulus: false,
            accepts_responses: false,
        }
    }

    /// A response window that stays open until the trial resolves.
    pub fn response_window(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration_ms: None,
            jitter_ms: 0,
            show_stimulus: true,
            accepts_responses: true,
        }
    }

    pub fn showing_stimulus(mut self) -> Self {
        self.show_stimulus = true;
        self
    }

    pub fn hiding_stimulus(mut self) -> Self {
        self.show_stimulus = false;
        self
    }

    pub fn accepting_responses(mut self) -> Self {
        self.accepts_responses = true;
        self
    }

    pub fn with_jitter(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    pub fn awaits_resolution(&self) -> bool {
        self.duration_ms.is_none()
    }
}
