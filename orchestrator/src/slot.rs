//! Per-stage holder of the configured component instance.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use colmap_neural_components::{NeuralComponent, Stage, StageCategory};
use colmap_neural_hardware::CapabilitySnapshot;
use colmap_neural_registry::Registry;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Empty,
    Initializing,
    Ready,
    Failed,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where a slot failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    /// The registry could not produce an instance
    Construction,
    /// The instance rejected `initialize`
    Initialization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFailure {
    pub phase: FailurePhase,
    pub reason: String,
}

/// Holds at most one component for a stage.
///
/// Moves `Empty -> Initializing -> Ready | Failed` at most once. A failed
/// instance is dropped right away; a ready one lives as long as the slot.
pub struct ComponentSlot<C: StageCategory> {
    selected: Option<String>,
    instance: Option<Box<C::Component>>,
    status: SlotStatus,
    failure: Option<SlotFailure>,
}

impl<C: StageCategory> ComponentSlot<C> {
    pub fn new(selected: Option<String>) -> Self {
        Self {
            selected,
            instance: None,
            status: SlotStatus::Empty,
            failure: None,
        }
    }

    pub fn stage(&self) -> Stage {
        C::STAGE
    }

    /// Component name this slot will ask the registry for
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.selected.is_some()
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&SlotFailure> {
        self.failure.as_ref()
    }

    /// The instance, only once the slot is Ready
    pub fn instance_mut(&mut self) -> Option<&mut C::Component> {
        self.instance.as_deref_mut()
    }

    fn fail(&mut self, phase: FailurePhase, reason: String) -> SlotStatus {
        warn!("{} stage failed ({:?}): {}", C::STAGE, phase, reason);
        self.status = SlotStatus::Failed;
        self.failure = Some(SlotFailure { phase, reason });
        self.status
    }
}

impl<C> ComponentSlot<C>
where
    C: StageCategory,
    C::Component: NeuralComponent,
{
    /// Construct the selected component and initialize it.
    ///
    /// Only acts on a configured, Empty slot; any other slot is left as is.
    /// Errors are recorded on the slot, never returned.
    pub fn initialize(
        &mut self,
        registry: &Registry<C>,
        capability: &CapabilitySnapshot,
    ) -> SlotStatus {
        let name = match (&self.selected, self.status) {
            (Some(name), SlotStatus::Empty) => name.clone(),
            _ => return self.status,
        };

        self.status = SlotStatus::Initializing;
        debug!("Initializing {} stage with '{}'", C::STAGE, name);

        let mut instance = match panic::catch_unwind(AssertUnwindSafe(|| registry.create(&name))) {
            Ok(Ok(instance)) => instance,
            Ok(Err(e)) => return self.fail(FailurePhase::Construction, e.to_string()),
            Err(payload) => return self.fail(FailurePhase::Construction, panic_reason(payload)),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| instance.initialize(capability))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return self.fail(FailurePhase::Initialization, e.to_string()),
            Err(payload) => return self.fail(FailurePhase::Initialization, panic_reason(payload)),
        }

        info!("{} stage ready with '{}'", C::STAGE, name);
        self.instance = Some(instance);
        self.status = SlotStatus::Ready;
        self.status
    }
}

/// Message carried by a caught panic
fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {}", message)
}

impl<C: StageCategory> fmt::Debug for ComponentSlot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("stage", &C::STAGE)
            .field("selected", &self.selected)
            .field("status", &self.status)
            .field("failure", &self.failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colmap_neural_components::{Extraction, FeatureExtractor, FeatureSet, ImageSet, InitError};
    use colmap_neural_hardware::PlatformClass;

    #[derive(Debug)]
    struct Stub {
        fail: bool,
        ready: bool,
    }

    impl NeuralComponent for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        fn initialize(&mut self, _: &CapabilitySnapshot) -> Result<(), InitError> {
            if self.fail {
                return Err(InitError::Other("no weights".into()));
            }
            self.ready = true;
            Ok(())
        }

        fn is_initialized(&self) -> bool {
            self.ready
        }
    }

    impl FeatureExtractor for Stub {
        fn extract(&mut self, _: &ImageSet) -> colmap_neural_components::Result<FeatureSet> {
            Ok(FeatureSet::default())
        }
    }

    fn registry() -> Registry<Extraction> {
        let mut registry = Registry::<Extraction>::new();
        registry
            .register("good", || Box::new(Stub { fail: false, ready: false }))
            .unwrap();
        registry
            .register("bad", || Box::new(Stub { fail: true, ready: false }))
            .unwrap();
        registry.freeze();
        registry
    }

    #[derive(Debug)]
    struct Exploding;

    impl NeuralComponent for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn initialize(&mut self, _: &CapabilitySnapshot) -> Result<(), InitError> {
            panic!("weights corrupted");
        }

        fn is_initialized(&self) -> bool {
            false
        }
    }

    impl FeatureExtractor for Exploding {
        fn extract(&mut self, _: &ImageSet) -> colmap_neural_components::Result<FeatureSet> {
            Ok(FeatureSet::default())
        }
    }

    fn snapshot() -> CapabilitySnapshot {
        CapabilitySnapshot::cpu_only(PlatformClass::Linux)
    }

    #[test]
    fn test_ready_slot_owns_instance() {
        let mut slot = ComponentSlot::<Extraction>::new(Some("good".into()));
        assert_eq!(slot.status(), SlotStatus::Empty);

        assert_eq!(slot.initialize(&registry(), &snapshot()), SlotStatus::Ready);
        assert!(slot.instance_mut().unwrap().is_initialized());
        assert!(slot.failure().is_none());
    }

    #[test]
    fn test_initialization_failure_recorded() {
        let mut slot = ComponentSlot::<Extraction>::new(Some("bad".into()));
        assert_eq!(slot.initialize(&registry(), &snapshot()), SlotStatus::Failed);

        let failure = slot.failure().unwrap();
        assert_eq!(failure.phase, FailurePhase::Initialization);
        assert_eq!(failure.reason, "no weights");
        assert!(slot.instance_mut().is_none());
    }

    #[test]
    fn test_unknown_name_is_construction_failure() {
        let mut slot = ComponentSlot::<Extraction>::new(Some("missing".into()));
        slot.initialize(&registry(), &snapshot());

        let failure = slot.failure().unwrap();
        assert_eq!(failure.phase, FailurePhase::Construction);
        assert!(failure.reason.contains("missing"));
    }

    #[test]
    fn test_transition_happens_once() {
        let registry = registry();
        let mut slot = ComponentSlot::<Extraction>::new(Some("bad".into()));
        slot.initialize(&registry, &snapshot());
        let first = slot.failure().cloned();

        assert_eq!(slot.initialize(&registry, &snapshot()), SlotStatus::Failed);
        assert_eq!(slot.failure().cloned(), first);
    }

    #[test]
    fn test_panics_are_recorded_as_failures() {
        let mut registry = Registry::<Extraction>::new();
        registry
            .register("factory_panics", || -> Box<dyn FeatureExtractor> {
                panic!("factory exploded")
            })
            .unwrap();
        registry
            .register("init_panics", || Box::new(Exploding))
            .unwrap();

        let mut slot = ComponentSlot::<Extraction>::new(Some("factory_panics".into()));
        assert_eq!(slot.initialize(&registry, &snapshot()), SlotStatus::Failed);
        let failure = slot.failure().unwrap();
        assert_eq!(failure.phase, FailurePhase::Construction);
        assert!(failure.reason.contains("factory exploded"));

        let mut slot = ComponentSlot::<Extraction>::new(Some("init_panics".into()));
        assert_eq!(slot.initialize(&registry, &snapshot()), SlotStatus::Failed);
        let failure = slot.failure().unwrap();
        assert_eq!(failure.phase, FailurePhase::Initialization);
        assert!(failure.reason.contains("weights corrupted"));
        assert!(slot.instance_mut().is_none());
    }

    #[test]
    fn test_unconfigured_slot_stays_empty() {
        let mut slot = ComponentSlot::<Extraction>::new(None);
        assert_eq!(slot.initialize(&registry(), &snapshot()), SlotStatus::Empty);
        assert_eq!(slot.stage(), Stage::Extraction);
    }
}
