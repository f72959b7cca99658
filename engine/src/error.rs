use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine was not started")]
    NotStarted,

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("failed to launch '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for engine: {0}")]
    Wait(#[source] std::io::Error),

    #[error("reconstruction failed: engine exited with {status}")]
    Failed { status: ExitStatus },

    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
