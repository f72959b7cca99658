//! SuperGlue feature matcher
//!
//! Attention-based matcher over SuperPoint features. Only the outdoor
//! weights (`superglue_outdoor.pth`) are part of the model manifest.

use tracing::debug;

use crate::constants::*;
use crate::models::SUPERGLUE_ASSET;
use crate::{
    impl_component_base, ComponentConfig, FeatureMatcher, FeatureSet, InitError, LoadedModel,
    MatchPair, MatchSet, ModelStore, Result,
};

#[derive(Debug, Clone)]
pub struct SuperGlue {
    config: ComponentConfig,
    store: ModelStore,
    model: Option<LoadedModel>,
}

impl_component_base!(SuperGlue, SUPERGLUE, SUPERGLUE_ASSET, FeatureMatcher);

impl SuperGlue {
    /// Minimum matching score in [0, 1]
    pub fn with_match_threshold(mut self, threshold: f32) -> Self {
        self.config.set(MATCH_THRESHOLD, threshold);
        self
    }

    pub fn with_sinkhorn_iterations(mut self, iterations: u32) -> Self {
        self.config.set(SINKHORN_ITERATIONS, iterations);
        self
    }

    /// "outdoor" (default) or "indoor"
    pub fn with_weights(mut self, variant: &str) -> Self {
        self.config.set(WEIGHTS_VARIANT, variant);
        self
    }

    fn validate_config(&self) -> std::result::Result<(), InitError> {
        let threshold: f32 = self
            .config
            .get_or(MATCH_THRESHOLD, DEFAULT_MATCH_THRESHOLD)
            .map_err(Self::invalid_config)?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Self::invalid_config(format!(
                "match threshold {} outside [0, 1]",
                threshold
            )));
        }

        let iterations: u32 = self
            .config
            .get_or(SINKHORN_ITERATIONS, DEFAULT_SINKHORN_ITERATIONS)
            .map_err(Self::invalid_config)?;
        if iterations == 0 {
            return Err(Self::invalid_config("sinkhorn iterations must be positive"));
        }

        match self.config.get(WEIGHTS_VARIANT).unwrap_or(DEFAULT_WEIGHTS_VARIANT) {
            DEFAULT_WEIGHTS_VARIANT => Ok(()),
            other => Err(Self::invalid_config(format!(
                "no '{}' weights available, only '{}'",
                other, DEFAULT_WEIGHTS_VARIANT
            ))),
        }
    }
}

impl FeatureMatcher for SuperGlue {
    fn match_features(&mut self, features: &FeatureSet) -> Result<MatchSet> {
        let model = self.loaded()?;
        let count = features.images.len();

        // exhaustive pairing
        let pairs: Vec<MatchPair> = (0..count)
            .flat_map(|query| {
                (query + 1..count).map(move |train| MatchPair {
                    query,
                    train,
                    matches: Vec::new(),
                })
            })
            .collect();

        debug!(
            "SuperGlue matching {} pair(s) from '{}' features on {:?}",
            pairs.len(),
            features.extractor,
            model.device
        );

        Ok(MatchSet {
            matcher: SUPERGLUE.to_string(),
            images: features.images.iter().map(|i| i.image.clone()).collect(),
            pairs,
        })
    }
}
