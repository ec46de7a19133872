use std::path::PathBuf;

use cogtrial_core::Block;
use thiserror::Error;

/// Problems with an experiment configuration, found at load or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("a trial needs at least one phase")]
    NoPhases,

    #[error("no phase accepts responses, so trials could never resolve")]
    NoResponsePhase,

    #[error("phase `{name}` neither accepts responses nor has a duration")]
    StalledPhase { name: String },

    #[error("phase `{name}` waits for a response but is not the last phase, so it could never time out")]
    UntimedWindowNotLast { name: String },

    #[error("response timeout must be greater than zero")]
    ZeroTimeout,
}

/// Engine logic errors. These are reported, never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no {block} trial at index {index}; the block should already have ended")]
    MissingTrial { block: Block, index: usize },
}

/// Failure raised by a task hook. The engine logs it and carries on.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HookError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl HookError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_error_shows_its_source() {
        let err = HookError::new("disk full");
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn missing_trial_names_block_and_index() {
        let err = EngineError::MissingTrial {
            block: Block::Practice,
            index: 4,
        };
        assert_eq!(
            err.to_string(),
            "no practice trial at index 4; the block should already have ended"
        );
    }
}
