use std::path::PathBuf;
use thiserror::Error;

use colmap_neural_components::{ComponentError, Stage};
use colmap_neural_engine::EngineError;

use crate::{OrchestratorState, PipelineMode};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: OrchestratorState,
    },

    #[error("{mode} reconstruction failed: {source}")]
    RunFailed {
        mode: PipelineMode,
        #[source]
        source: RunError,
    },
}

/// What went wrong inside the dispatched pipeline
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read images from {}: {source}", path.display())]
    Images {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ComponentError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
