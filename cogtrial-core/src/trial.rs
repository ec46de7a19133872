use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::phase::Block;
use crate::stimulus::{
    ChangeDetectionTrial, FlankerTrial, MentalRotationTrial, NBackTrial, PosnerTrial, StroopTrial,
    VisualSearchTrial,
};

/// Response value recorded when the response window closes unanswered.
pub const TIMEOUT_RESPONSE: &str = "timeout";

/// What the participant did on a trial. Serialized as a plain string, with
/// `"timeout"` standing for no response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Response {
    Key(String),
    Timeout,
}

impl Response {
    pub fn key(value: impl Into<String>) -> Self {
        Self::from(value.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Response::Timeout)
    }

    pub fn responded(&self) -> bool {
        !self.is_timeout()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Response::Key(value) => value,
            Response::Timeout => TIMEOUT_RESPONSE,
        }
    }
}

impl From<String> for Response {
    fn from(value: String) -> Self {
        if value == TIMEOUT_RESPONSE {
            Response::Timeout
        } else {
            Response::Key(value)
        }
    }
}

impl From<&str> for Response {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Response> for String {
    fn from(response: Response) -> Self {
        match response {
            Response::Key(value) => value,
            Response::Timeout => TIMEOUT_RESPONSE.to_string(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correctness contract every trial definition shares with the engine.
pub trait TaskTrial: Clone + fmt::Debug {
    /// The single right answer, when the trial has one.
    fn correct_response(&self) -> Option<&str> {
        None
    }

    /// Scores a response. `None` leaves the trial unjudged.
    fn judge(&self, response: &Response) -> Option<bool> {
        self.correct_response()
            .map(|expected| response.as_str() == expected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Flanker,
    Stroop,
    NBack,
    VisualSearch,
    Posner,
    MentalRotation,
    ChangeDetection,
}

impl TaskKind {
    pub const ALL: [TaskKind; 7] = [
        TaskKind::Flanker,
        TaskKind::Stroop,
        TaskKind::NBack,
        TaskKind::VisualSearch,
        TaskKind::Posner,
        TaskKind::MentalRotation,
        TaskKind::ChangeDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Flanker => "flanker",
            TaskKind::Stroop => "stroop",
            TaskKind::NBack => "n_back",
            TaskKind::VisualSearch => "visual_search",
            TaskKind::Posner => "posner",
            TaskKind::MentalRotation => "mental_rotation",
            TaskKind::ChangeDetection => "change_detection",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized || kind.as_str().replace('_', "") == normalized)
            .ok_or_else(|| format!("unknown task `{s}`"))
    }
}

/// One trial of any supported task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TrialDefinition {
    Flanker(FlankerTrial),
    Stroop(StroopTrial),
    NBack(NBackTrial),
    VisualSearch(VisualSearchTrial),
    Posner(PosnerTrial),
    MentalRotation(MentalRotationTrial),
    ChangeDetection(ChangeDetectionTrial),
}

impl TrialDefinition {
    pub fn kind(&self) -> TaskKind {
        match self {
            TrialDefinition::Flanker(_) => TaskKind::Flanker,
            TrialDefinition::Stroop(_) => TaskKind::Stroop,
            TrialDefinition::NBack(_) => TaskKind::NBack,
            TrialDefinition::VisualSearch(_) => TaskKind::VisualSearch,
            TrialDefinition::Posner(_) => TaskKind::Posner,
            TrialDefinition::MentalRotation(_) => TaskKind::MentalRotation,
            TrialDefinition::ChangeDetection(_) => TaskKind::ChangeDetection,
        }
    }

    pub fn as_flanker(&self) -> Option<&FlankerTrial> {
        match self {
            TrialDefinition::Flanker(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_stroop(&self) -> Option<&StroopTrial> {
        match self {
            TrialDefinition::Stroop(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_n_back(&self) -> Option<&NBackTrial> {
        match self {
            TrialDefinition::NBack(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_visual_search(&self) -> Option<&VisualSearchTrial> {
        match self {
            TrialDefinition::VisualSearch(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_posner(&self) -> Option<&PosnerTrial> {
        match self {
            TrialDefinition::Posner(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_mental_rotation(&self) -> Option<&MentalRotationTrial> {
        match self {
            TrialDefinition::MentalRotation(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_change_detection(&self) -> Option<&ChangeDetectionTrial> {
        match self {
            TrialDefinition::ChangeDetection(trial) => Some(trial),
            _ => None,
        }
    }
}

macro_rules! impl_from_trial {
    ($($variant:ident($trial:ty)),* $(,)?) => {
        $(
            impl From<$trial> for TrialDefinition {
                fn from(trial: $trial) -> Self {
                    TrialDefinition::$variant(trial)
                }
            }
        )*
    };
}

impl_from_trial!(
    Flanker(FlankerTrial),
    Stroop(StroopTrial),
    NBack(NBackTrial),
    VisualSearch(VisualSearchTrial),
    Posner(PosnerTrial),
    MentalRotation(MentalRotationTrial),
    ChangeDetection(ChangeDetectionTrial),
);

impl TaskTrial for TrialDefinition {
    fn correct_response(&self) -> Option<&str> {
        match self {
            TrialDefinition::Flanker(trial) => trial.correct_response(),
            TrialDefinition::Stroop(trial) => trial.correct_response(),
            TrialDefinition::NBack(trial) => trial.correct_response(),
            TrialDefinition::VisualSearch(trial) => trial.correct_response(),
            TrialDefinition::Posner(trial) => trial.correct_response(),
            TrialDefinition::MentalRotation(trial) => trial.correct_response(),
            TrialDefinition::ChangeDetection(trial) => trial.correct_response(),
        }
    }

    fn judge(&self, response: &Response) -> Option<bool> {
        match self {
            TrialDefinition::Flanker(trial) => trial.judge(response),
            TrialDefinition::Stroop(trial) => trial.judge(response),
            TrialDefinition::NBack(trial) => trial.judge(response),
            TrialDefinition::VisualSearch(trial) => trial.judge(response),
            TrialDefinition::Posner(trial) => trial.judge(response),
            TrialDefinition::MentalRotation(trial) => trial.judge(response),
            TrialDefinition::ChangeDetection(trial) => trial.judge(response),
        }
    }
}

/// Recorded outcome of one trial. Produced exactly once per executed trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult<T> {
    /// 1-based position within the block.
    pub trial_number: usize,
    pub phase: Block,
    pub response: Response,
    pub reaction_time_ms: f64,
    /// `None` when the trial defines no correctness predicate.
    pub is_correct: Option<bool>,
    #[serde(flatten)]
    pub trial: T,
    pub timestamp_ns: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
}

impl<T> TrialResult<T> {
    pub fn is_timeout(&self) -> bool {
        self.response.is_timeout()
    }

    pub fn responded(&self) -> bool {
        self.response.responded()
    }

    /// Correct and answered with an actual keypress.
    pub fn is_correct_keypress(&self) -> bool {
        self.is_correct == Some(true) && self.responded()
    }
}
