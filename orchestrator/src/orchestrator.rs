//! Initialization protocol and run dispatch.

use tracing::{debug, error, info, warn};

use colmap_neural_components::{
    ComponentCatalog, DenseReconstruction, DenseReconstructor, Extraction, FeatureExtractor,
    FeatureMatcher, FeatureSet, ImageFeatures, ImageSet, MatchSet, Matching, Stage,
};
use colmap_neural_engine::{EngineReport, ReconstructionEngine, ReconstructionRequest};
use colmap_neural_hardware::{CapabilityProbe, CapabilitySnapshot};

use crate::error::{OrchestratorError, Result, RunError};
use crate::report::{EnhancedSummary, InitializationReport, RunReport, StageReport};
use crate::selection::StageSelection;
use crate::slot::{ComponentSlot, SlotFailure, SlotStatus};
use crate::{OrchestratorState, PipelineMode};

/// Label used for stage inputs the engine will compute itself
const ENGINE_PROVIDED: &str = "engine";

/// Drives one reconstruction: probe, initialize stages, dispatch.
pub struct Orchestrator {
    catalog: ComponentCatalog,
    selection: StageSelection,
    state: OrchestratorState,
    capability: Option<CapabilitySnapshot>,
    extraction: ComponentSlot<Extraction>,
    matching: ComponentSlot<Matching>,
    dense: ComponentSlot<DenseReconstruction>,
}

impl Orchestrator {
    /// Take ownership of the catalog and close it to registration.
    pub fn new(mut catalog: ComponentCatalog, selection: StageSelection) -> Self {
        catalog.freeze();

        let slot_name = |stage| selection.component_for(stage).map(str::to_string);
        let extraction = ComponentSlot::new(slot_name(Stage::Extraction));
        let matching = ComponentSlot::new(slot_name(Stage::Matching));
        let dense = ComponentSlot::new(slot_name(Stage::DenseReconstruction));

        Self {
            catalog,
            selection,
            state: OrchestratorState::Created,
            capability: None,
            extraction,
            matching,
            dense,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn selection(&self) -> &StageSelection {
        &self.selection
    }

    pub fn capability(&self) -> Option<&CapabilitySnapshot> {
        self.capability.as_ref()
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Enhanced iff at least one stage is configured and every configured
    /// stage is Ready.
    pub fn mode(&self) -> PipelineMode {
        let slots = [
            (self.extraction.is_configured(), self.extraction.status()),
            (self.matching.is_configured(), self.matching.status()),
            (self.dense.is_configured(), self.dense.status()),
        ];
        let mut configured = slots.iter().filter(|(configured, _)| *configured).peekable();

        if configured.peek().is_none() {
            return PipelineMode::Standard;
        }
        if configured.all(|(_, status)| *status == SlotStatus::Ready) {
            PipelineMode::Enhanced
        } else {
            PipelineMode::Standard
        }
    }

    pub fn status(&self, stage: Stage) -> SlotStatus {
        match stage {
            Stage::Extraction => self.extraction.status(),
            Stage::Matching => self.matching.status(),
            Stage::DenseReconstruction => self.dense.status(),
        }
    }

    pub fn failure(&self, stage: Stage) -> Option<&SlotFailure> {
        match stage {
            Stage::Extraction => self.extraction.failure(),
            Stage::Matching => self.matching.failure(),
            Stage::DenseReconstruction => self.dense.failure(),
        }
    }

    /// Probe capability once, then attempt every configured stage in order.
    ///
    /// Stage failures are recorded on their slots and only affect the mode.
    /// A second call is an [`OrchestratorError::InvalidState`].
    pub fn initialize(&mut self, probe: &dyn CapabilityProbe) -> Result<PipelineMode> {
        if self.state != OrchestratorState::Created {
            return Err(OrchestratorError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }

        self.state = OrchestratorState::ProbingCapability;
        let capability = probe.detect();
        info!(
            "Capability: accelerator {} on {}",
            capability.describe_accelerator(),
            capability.platform_class
        );

        self.state = OrchestratorState::InitializingStages;
        if self.selection.is_enabled() {
            for stage in Stage::ALL {
                let status = match stage {
                    Stage::Extraction => self
                        .extraction
                        .initialize(self.catalog.registry::<Extraction>(), &capability),
                    Stage::Matching => self
                        .matching
                        .initialize(self.catalog.registry::<Matching>(), &capability),
                    Stage::DenseReconstruction => self
                        .dense
                        .initialize(self.catalog.registry::<DenseReconstruction>(), &capability),
                };
                debug!("{} stage: {}", stage, status);
            }
        } else {
            info!("Neural components disabled by configuration");
        }
        self.capability = Some(capability);

        let mode = self.mode();
        self.state = OrchestratorState::Initialized(mode);
        self.log_mode(mode);
        Ok(mode)
    }

    fn log_mode(&self, mode: PipelineMode) {
        match mode {
            PipelineMode::Enhanced => info!("Pipeline mode: {}", mode),
            PipelineMode::Standard => {
                let failed: Vec<String> = Stage::ALL
                    .into_iter()
                    .filter_map(|stage| {
                        self.failure(stage)
                            .map(|failure| format!("{} ({})", stage, failure.reason))
                    })
                    .collect();

                if failed.is_empty() {
                    info!("Pipeline mode: {} (no neural stage configured)", mode);
                } else {
                    warn!(
                        "Pipeline mode: {}, falling back because of failed stage(s): {}",
                        mode,
                        failed.join(", ")
                    );
                }
            }
        }
    }

    /// Per-stage outcome of initialization plus the resulting mode
    pub fn report(&self) -> InitializationReport {
        let stage_report = |stage, component: Option<&str>, status, failure: Option<&SlotFailure>| {
            StageReport {
                stage,
                component: component.map(str::to_string),
                status,
                failure: failure.cloned(),
            }
        };

        InitializationReport {
            policy: self.selection.policy,
            capability: self.capability.clone(),
            stages: vec![
                stage_report(
                    Stage::Extraction,
                    self.extraction.selected(),
                    self.extraction.status(),
                    self.extraction.failure(),
                ),
                stage_report(
                    Stage::Matching,
                    self.matching.selected(),
                    self.matching.status(),
                    self.matching.failure(),
                ),
                stage_report(
                    Stage::DenseReconstruction,
                    self.dense.selected(),
                    self.dense.status(),
                    self.dense.failure(),
                ),
            ],
            mode: self.mode(),
        }
    }

    /// Dispatch to exactly one target: the enhanced chain or the engine's
    /// standard controller. No retry and no fallback once running.
    pub fn run(
        &mut self,
        request: &ReconstructionRequest,
        engine: &mut dyn ReconstructionEngine,
    ) -> Result<RunReport> {
        let mode = match self.state {
            OrchestratorState::Initialized(mode) => mode,
            state => {
                return Err(OrchestratorError::InvalidState {
                    operation: "run",
                    state,
                })
            }
        };

        self.state = OrchestratorState::Running;
        info!("Running {} reconstruction with {}", mode, engine.name());

        let outcome = match mode {
            PipelineMode::Enhanced => self.run_enhanced(request, engine),
            PipelineMode::Standard => run_engine(request, engine).map(|report| (None, report)),
        };

        match outcome {
            Ok((enhanced, engine)) => {
                self.state = OrchestratorState::Completed;
                info!("Reconstruction completed");
                Ok(RunReport {
                    mode,
                    enhanced,
                    engine,
                })
            }
            Err(source) => {
                self.state = OrchestratorState::RunFailed;
                error!("Reconstruction failed: {}", source);
                Err(OrchestratorError::RunFailed { mode, source })
            }
        }
    }

    fn run_enhanced(
        &mut self,
        request: &ReconstructionRequest,
        engine: &mut dyn ReconstructionEngine,
    ) -> std::result::Result<(Option<EnhancedSummary>, EngineReport), RunError> {
        let images = ImageSet::scan(&request.image_path).map_err(|source| RunError::Images {
            path: request.image_path.clone(),
            source,
        })?;
        info!("Found {} image(s) in {}", images.len(), images.root.display());

        let features = match self.extraction.instance_mut() {
            Some(extractor) => extractor.extract(&images).map_err(|source| RunError::Stage {
                stage: Stage::Extraction,
                source,
            })?,
            None => FeatureSet {
                extractor: ENGINE_PROVIDED.to_string(),
                images: images.images.iter().map(ImageFeatures::empty).collect(),
            },
        };

        let matches = match self.matching.instance_mut() {
            Some(matcher) => matcher.match_features(&features).map_err(|source| RunError::Stage {
                stage: Stage::Matching,
                source,
            })?,
            None => MatchSet {
                matcher: ENGINE_PROVIDED.to_string(),
                images: images.images.clone(),
                pairs: Vec::new(),
            },
        };

        let dense = match (request.dense, self.dense.instance_mut()) {
            (true, Some(densifier)) => Some(
                densifier
                    .densify(&matches, &request.workspace_path)
                    .map_err(|source| RunError::Stage {
                        stage: Stage::DenseReconstruction,
                        source,
                    })?,
            ),
            _ => None,
        };

        let summary = EnhancedSummary {
            images: images.len(),
            keypoints: features.keypoint_count(),
            matched_pairs: matches.pairs.len(),
            dense,
        };
        debug!("Enhanced stages done: {:?}", summary);

        let report = run_engine(request, engine)?;
        Ok((Some(summary), report))
    }
}

/// The engine's standard controller: start, then block until done.
fn run_engine(
    request: &ReconstructionRequest,
    engine: &mut dyn ReconstructionEngine,
) -> std::result::Result<EngineReport, RunError> {
    engine.start(request)?;
    Ok(engine.wait()?)
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("selection", &self.selection)
            .field("extraction", &self.extraction)
            .field("matching", &self.matching)
            .field("dense", &self.dense)
            .finish_non_exhaustive()
    }
}
