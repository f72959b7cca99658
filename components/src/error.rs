use std::path::PathBuf;
use thiserror::Error;

/// Why a component could not be initialized.
///
/// Contained at the slot level: the orchestrator records it and falls back,
/// it never aborts a reconstruction.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("model weights for '{component}' not found at {} (download from {url})", path.display())]
    MissingWeights {
        component: String,
        path: PathBuf,
        url: String,
    },

    #[error("invalid configuration for '{component}': {reason}")]
    InvalidConfig { component: String, reason: String },

    #[error("'{component}' requires an accelerator but none is available")]
    UnsupportedHardware { component: String },

    #[error("I/O error while loading '{component}': {source}")]
    Io {
        component: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Errors raised by a component while it runs
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("component '{0}' was used before initialization")]
    NotInitialized(String),

    #[error("'{component}' failed: {reason}")]
    Inference { component: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ComponentError>;
