//! COLMAP Neural Engine
//!
//! Contract for the external structure-from-motion / multi-view-stereo
//! engine, and the adapter that drives a COLMAP installation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use colmap_neural_engine::*;
//!
//! let request = ReconstructionRequest::new("scene/images", "scene/out")
//!     .with_quality(Quality::Medium)
//!     .with_dense(false);
//!
//! let mut engine = ColmapEngine::default();
//! engine.start(&request)?;
//! let report = engine.wait()?;
//! println!("done in {:?}", report.elapsed);
//! # Ok::<(), EngineError>(())
//! ```

use serde::Serialize;
use std::time::Duration;

pub mod colmap;
pub mod error;
pub mod request;

pub use colmap::ColmapEngine;
pub use error::{EngineError, Result};
pub use request::{DataType, Quality, ReconstructionRequest, DATABASE_FILE};

/// Outcome of a finished reconstruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub engine: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

/// An external reconstruction engine.
///
/// `start` launches the whole automatic pipeline for a request and `wait`
/// blocks until it finishes. One job at a time.
pub trait ReconstructionEngine {
    fn name(&self) -> &str;

    fn start(&mut self, request: &ReconstructionRequest) -> Result<()>;

    /// Block until the running job ends. [`EngineError::NotStarted`] if
    /// there is none.
    fn wait(&mut self) -> Result<EngineReport>;
}
