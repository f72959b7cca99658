use serde::Serialize;

use colmap_neural_components::{DenseSummary, Stage};
use colmap_neural_engine::EngineReport;
use colmap_neural_hardware::CapabilitySnapshot;

use crate::selection::NeuralPolicy;
use crate::slot::{SlotFailure, SlotStatus};
use crate::PipelineMode;

/// One stage as seen after initialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub component: Option<String>,
    pub status: SlotStatus,
    pub failure: Option<SlotFailure>,
}

/// Outcome of [`crate::Orchestrator::initialize`], for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializationReport {
    pub policy: NeuralPolicy,
    /// `None` until the probe has run
    pub capability: Option<CapabilitySnapshot>,
    /// Fixed stage order
    pub stages: Vec<StageReport>,
    pub mode: PipelineMode,
}

impl InitializationReport {
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|s| s.status == SlotStatus::Failed)
    }
}

/// What the enhanced chain produced before handing off to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedSummary {
    pub images: usize,
    pub keypoints: usize,
    pub matched_pairs: usize,
    pub dense: Option<DenseSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mode: PipelineMode,
    /// Present only for enhanced runs
    pub enhanced: Option<EnhancedSummary>,
    pub engine: EngineReport,
}
