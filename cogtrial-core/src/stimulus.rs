use serde::{Deserialize, Serialize};

use crate::trial::{Response, TaskTrial};

/// Response values shared by the task definitions below.
pub mod keys {
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const MATCH: &str = "match";
    pub const PRESENT: &str = "present";
    pub const ABSENT: &str = "absent";
    pub const SPACE: &str = "space";
    pub const SAME: &str = "same";
    pub const MIRROR: &str = "mirror";
    pub const DIFFERENT: &str = "different";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn key(&self) -> &'static str {
        match self {
            Direction::Left => keys::LEFT,
            Direction::Right => keys::RIGHT,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Congruency {
    Congruent,
    Incongruent,
    Neutral,
}

/// Flanker: respond to the direction of the central arrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlankerTrial {
    pub target: Direction,
    pub stimulus_type: Congruency,
}

impl TaskTrial for FlankerTrial {
    fn correct_response(&self) -> Option<&str> {
        Some(self.target.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl InkColor {
    pub const ALL: [InkColor; 4] = [
        InkColor::Red,
        InkColor::Green,
        InkColor::Blue,
        InkColor::Yellow,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            InkColor::Red => "red",
            InkColor::Green => "green",
            InkColor::Blue => "blue",
            InkColor::Yellow => "yellow",
        }
    }
}

/// Stroop: name the ink color, ignoring the word. `word` is `None` for
/// neutral (non-color) words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StroopTrial {
    pub word: Option<InkColor>,
    pub ink: InkColor,
    pub stimulus_type: Congruency,
}

impl TaskTrial for StroopTrial {
    fn correct_response(&self) -> Option<&str> {
        Some(self.ink.key())
    }
}

/// N-back: press "match" when the letter equals the one `n` positions back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NBackTrial {
    pub letter: char,
    pub n: usize,
    pub is_target: bool,
    #[serde(default)]
    pub is_lure: bool,
}

impl TaskTrial for NBackTrial {
    fn correct_response(&self) -> Option<&str> {
        self.is_target.then_some(keys::MATCH)
    }

    /// Signal detection: any keypress on a target is a hit, withholding on a
    /// non-target is a correct rejection.
    fn judge(&self, response: &Response) -> Option<bool> {
        Some(response.responded() == self.is_target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Feature,
    Conjunction,
}

/// Visual search: report whether the target is among `set_size` items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualSearchTrial {
    pub set_size: usize,
    pub target_present: bool,
    pub search_type: SearchType,
}

impl TaskTrial for VisualSearchTrial {
    fn correct_response(&self) -> Option<&str> {
        Some(if self.target_present {
            keys::PRESENT
        } else {
            keys::ABSENT
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueValidity {
    Valid,
    Invalid,
    Neutral,
}

/// Posner cueing: press space when the target appears. Catch trials have no
/// target and are correct only when the participant withholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosnerTrial {
    pub cue_side: Option<Direction>,
    pub target_side: Option<Direction>,
    pub cue_validity: CueValidity,
    pub soa_ms: u64,
}

impl PosnerTrial {
    pub fn target_present(&self) -> bool {
        self.target_side.is_some()
    }
}

impl TaskTrial for PosnerTrial {
    fn correct_response(&self) -> Option<&str> {
        self.target_present().then_some(keys::SPACE)
    }

    fn judge(&self, response: &Response) -> Option<bool> {
        Some(match self.correct_response() {
            Some(expected) => response.as_str() == expected,
            None => response.is_timeout(),
        })
    }
}

/// Mental rotation: decide whether the rotated figure is the same or mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentalRotationTrial {
    pub angle_deg: u32,
    pub mirrored: bool,
}

impl TaskTrial for MentalRotationTrial {
    fn correct_response(&self) -> Option<&str> {
        Some(if self.mirrored {
            keys::MIRROR
        } else {
            keys::SAME
        })
    }
}

/// Change detection: memory array, retention gap, then a test array that
/// either matches or has one item changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetectionTrial {
    pub set_size: usize,
    pub change_present: bool,
}

impl TaskTrial for ChangeDetectionTrial {
    fn correct_response(&self) -> Option<&str> {
        Some(if self.change_present {
            keys::DIFFERENT
        } else {
            keys::SAME
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flanker_expects_the_target_direction() {
        let trial = FlankerTrial {
            target: Direction::Left,
            stimulus_type: Congruency::Incongruent,
        };
        assert_eq!(trial.judge(&Response::key("left")), Some(true));
        assert_eq!(trial.judge(&Response::key("right")), Some(false));
        assert_eq!(trial.judge(&Response::Timeout), Some(false));
    }

    #[test]
    fn nback_scores_any_keypress_against_target_status() {
        let target = NBackTrial {
            letter: 'K',
            n: 2,
            is_target: true,
            is_lure: false,
        };
        let filler = NBackTrial {
            is_target: false,
            ..target.clone()
        };
        assert_eq!(target.judge(&Response::key("match")), Some(true));
        assert_eq!(target.judge(&Response::Timeout), Some(false));
        assert_eq!(filler.judge(&Response::key("match")), Some(false));
        assert_eq!(filler.judge(&Response::Timeout), Some(true));
    }

    #[test]
    fn posner_catch_trial_wants_no_response() {
        let catch = PosnerTrial {
            cue_side: Some(Direction::Left),
            target_side: None,
            cue_validity: CueValidity::Neutral,
            soa_ms: 300,
        };
        assert_eq!(catch.judge(&Response::Timeout), Some(true));
        assert_eq!(catch.judge(&Response::key("space")), Some(false));

        let valid = PosnerTrial {
            target_side: Some(Direction::Left),
            cue_validity: CueValidity::Valid,
            ..catch
        };
        assert_eq!(valid.judge(&Response::key("space")), Some(true));
        assert_eq!(valid.judge(&Response::Timeout), Some(false));
    }
}
