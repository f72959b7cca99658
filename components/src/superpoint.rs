//! SuperPoint keypoint extractor
//!
//! Magic Leap's self-supervised interest point detector. Weights:
//! `superpoint_v1.pth`.

use tracing::debug;

use crate::constants::*;
use crate::models::SUPERPOINT_ASSET;
use crate::{
    impl_component_base, ComponentConfig, FeatureExtractor, FeatureSet, ImageFeatures, ImageSet,
    InitError, LoadedModel, ModelStore, Result,
};

#[derive(Debug, Clone)]
pub struct SuperPoint {
    config: ComponentConfig,
    store: ModelStore,
    model: Option<LoadedModel>,
}

impl_component_base!(SuperPoint, SUPERPOINT, SUPERPOINT_ASSET, FeatureExtractor);

impl SuperPoint {
    /// Detector confidence below which keypoints are dropped (0, 1]
    pub fn with_keypoint_threshold(mut self, threshold: f32) -> Self {
        self.config.set(KEYPOINT_THRESHOLD, threshold);
        self
    }

    /// Upper bound on keypoints per image
    pub fn with_max_keypoints(mut self, max: usize) -> Self {
        self.config.set(MAX_KEYPOINTS, max);
        self
    }

    /// Non-maximum suppression radius in pixels
    pub fn with_nms_radius(mut self, radius: u32) -> Self {
        self.config.set(NMS_RADIUS, radius);
        self
    }

    fn validate_config(&self) -> std::result::Result<(), InitError> {
        let threshold: f32 = self
            .config
            .get_or(KEYPOINT_THRESHOLD, DEFAULT_KEYPOINT_THRESHOLD)
            .map_err(Self::invalid_config)?;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Self::invalid_config(format!(
                "keypoint threshold {} outside (0, 1]",
                threshold
            )));
        }

        let max: usize = self
            .config
            .get_or(MAX_KEYPOINTS, DEFAULT_MAX_KEYPOINTS)
            .map_err(Self::invalid_config)?;
        if max == 0 {
            return Err(Self::invalid_config("max keypoints must be positive"));
        }

        self.config
            .get_or(NMS_RADIUS, DEFAULT_NMS_RADIUS)
            .map_err(Self::invalid_config)?;
        Ok(())
    }
}

impl FeatureExtractor for SuperPoint {
    fn extract(&mut self, images: &ImageSet) -> Result<FeatureSet> {
        let model = self.loaded()?;
        debug!(
            "SuperPoint extracting from {} image(s) on {:?}",
            images.len(),
            model.device
        );

        Ok(FeatureSet {
            extractor: SUPERPOINT.to_string(),
            images: images.images.iter().map(ImageFeatures::empty).collect(),
        })
    }
}
