pub mod phase;
pub mod session;
pub mod stimulus;
pub mod trial;

pub use phase::{Block, BlockPhase, PhaseSpec};
pub use session::SessionContext;
pub use stimulus::keys;
pub use stimulus::{
    ChangeDetectionTrial, Congruency, CueValidity, Direction, FlankerTrial, InkColor,
    MentalRotationTrial, NBackTrial, PosnerTrial, SearchType, StroopTrial, VisualSearchTrial,
};
pub use trial::{Response, TaskKind, TaskTrial, TrialDefinition, TrialResult, TIMEOUT_RESPONSE};
