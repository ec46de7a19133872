pub mod config;
pub mod error;
pub mod hooks;
pub mod state;
pub mod trial;
pub use config::{ExperimentConfig, InterTrialDelay, OnsetMode};
pub use error::{ConfigError, EngineError, HookError};
pub use hooks::{HookResult, NoHooks, TrialHooks};
pub use state::{ExperimentEvent, ExperimentStateMachine, IgnoreReason, Resolution};
pub use trial::{TrialCatalog, TrialRunState, TrialTimestamps};
