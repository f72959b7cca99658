//! COLMAP Neural Components
//!
//! Stage contracts, the data handed between stages, and the built-in
//! model-backed components (`superpoint`, `netvlad`, `superglue`, `mvsnet`).
//!
//! # Examples
//!
//! ```rust
//! use colmap_neural_components::*;
//!
//! let mut catalog = ComponentCatalog::new();
//! register_builtin(&mut catalog, &BuiltinSettings::default()).unwrap();
//! catalog.freeze();
//!
//! let extractor = catalog.create::<Extraction>("superpoint").unwrap();
//! assert_eq!(extractor.name(), "superpoint");
//! assert!(!extractor.is_initialized());
//! ```

pub mod catalog;
pub mod category;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod types;

// Built-in components
pub mod mvsnet;
pub mod netvlad;
pub mod superglue;
pub mod superpoint;

pub use catalog::{register_builtin, BuiltinSettings, CategoryRegistry, ComponentCatalog};
pub use category::{
    DenseReconstruction, DenseReconstructor, Extraction, FeatureExtractor, FeatureMatcher,
    Matching, NeuralComponent, Stage, StageCategory,
};
pub use colmap_neural_hardware::CapabilitySnapshot;
pub use config::ComponentConfig;
pub use error::{ComponentError, InitError, Result};
pub use models::{AssetKind, Device, LoadedModel, ModelAsset, ModelStore};
pub use types::{DenseSummary, FeatureSet, ImageFeatures, ImageSet, Keypoint, MatchPair, MatchSet};

pub use mvsnet::MvsNet;
pub use netvlad::NetVlad;
pub use superglue::SuperGlue;
pub use superpoint::SuperPoint;

/// Macro to reduce boilerplate for model-backed components.
///
/// The struct must have `config: ComponentConfig`, `store: ModelStore` and
/// `model: Option<LoadedModel>` fields and a `validate_config` method.
#[macro_export]
macro_rules! impl_component_base {
    ($struct_name:ident, $name:expr, $asset:expr, $contract:ident) => {
        impl $struct_name {
            pub fn new(store: $crate::ModelStore) -> Self {
                Self {
                    config: $crate::ComponentConfig::new(),
                    store,
                    model: None,
                }
            }

            pub fn build(self) -> Box<dyn $crate::$contract> {
                Box::new(self)
            }

            /// Fail initialization if no accelerator is available
            pub fn with_require_accelerator(mut self, require: bool) -> Self {
                self.config.set($crate::constants::REQUIRE_ACCELERATOR, require);
                self
            }

            pub fn config(&self) -> &$crate::ComponentConfig {
                &self.config
            }

            pub fn model(&self) -> Option<&$crate::LoadedModel> {
                self.model.as_ref()
            }

            fn loaded(&self) -> $crate::Result<&$crate::LoadedModel> {
                self.model
                    .as_ref()
                    .ok_or_else(|| $crate::ComponentError::NotInitialized($name.to_string()))
            }

            fn invalid_config(reason: impl Into<String>) -> $crate::InitError {
                $crate::InitError::InvalidConfig {
                    component: $name.to_string(),
                    reason: reason.into(),
                }
            }
        }

        impl $crate::NeuralComponent for $struct_name {
            fn name(&self) -> &str {
                $name
            }

            fn initialize(
                &mut self,
                capability: &$crate::CapabilitySnapshot,
            ) -> std::result::Result<(), $crate::InitError> {
                self.validate_config()?;
                let require = self
                    .config
                    .get_or($crate::constants::REQUIRE_ACCELERATOR, false)
                    .map_err(Self::invalid_config)?;

                let model = self.store.load(&$asset, capability, require)?;
                tracing::info!("'{}' ready on {:?}", $name, model.device);
                self.model = Some(model);
                Ok(())
            }

            fn is_initialized(&self) -> bool {
                self.model.is_some()
            }
        }
    };
}
