//! COLMAP Neural Orchestrator
//!
//! Decides, once per run, whether the pluggable components can be used and
//! dispatches the reconstruction accordingly. The pipeline always ends up in
//! a runnable mode:
//!
//! - **Enhanced**: every configured stage initialized; the components run
//!   first and the engine finishes the job.
//! - **Standard**: no stage configured, or at least one failed; the engine's
//!   own algorithms do everything.
//!
//! # Lifecycle
//!
//! ```text
//! Created -> ProbingCapability -> InitializingStages -> Initialized(mode)
//!         -> Running -> Completed | RunFailed
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use colmap_neural_components::{register_builtin, BuiltinSettings, ComponentCatalog};
//! use colmap_neural_engine::{ColmapEngine, ReconstructionRequest};
//! use colmap_neural_hardware::SystemProbe;
//! use colmap_neural_orchestrator::{Orchestrator, StageSelection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = ComponentCatalog::new();
//! register_builtin(&mut catalog, &BuiltinSettings::default())?;
//!
//! let selection = StageSelection::new()
//!     .with_extractor("superpoint")
//!     .with_matcher("superglue");
//! let mut orchestrator = Orchestrator::new(catalog, selection);
//! orchestrator.initialize(&SystemProbe::new())?;
//!
//! let request = ReconstructionRequest::new("scene/images", "scene/out");
//! orchestrator.run(&request, &mut ColmapEngine::default())?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod selection;
pub mod slot;

pub use error::{OrchestratorError, Result, RunError};
pub use orchestrator::Orchestrator;
pub use report::{EnhancedSummary, InitializationReport, RunReport, StageReport};
pub use selection::{NeuralPolicy, StageSelection};
pub use slot::{ComponentSlot, FailurePhase, SlotFailure, SlotStatus};

/// Derived from slot outcomes, never stored on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    Enhanced,
    Standard,
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enhanced => f.write_str("enhanced"),
            Self::Standard => f.write_str("standard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Created,
    ProbingCapability,
    InitializingStages,
    Initialized(PipelineMode),
    Running,
    Completed,
    RunFailed,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::ProbingCapability => f.write_str("probing capability"),
            Self::InitializingStages => f.write_str("initializing stages"),
            Self::Initialized(mode) => write!(f, "initialized ({})", mode),
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::RunFailed => f.write_str("run failed"),
        }
    }
}
