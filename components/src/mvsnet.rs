//! MVSNet dense reconstructor
//!
//! Learned multi-view depth inference. Weights: `model_mvs.ckpt`.

use std::path::Path;
use tracing::debug;

use crate::constants::*;
use crate::models::MVSNET_ASSET;
use crate::{
    impl_component_base, ComponentConfig, ComponentError, DenseReconstructor, DenseSummary,
    InitError, LoadedModel, MatchSet, ModelStore, Result,
};

#[derive(Debug, Clone)]
pub struct MvsNet {
    config: ComponentConfig,
    store: ModelStore,
    model: Option<LoadedModel>,
}

impl_component_base!(MvsNet, MVSNET, MVSNET_ASSET, DenseReconstructor);

impl MvsNet {
    /// Number of depth hypotheses per view
    pub fn with_depth_planes(mut self, planes: u32) -> Self {
        self.config.set(DEPTH_PLANES, planes);
        self
    }

    /// Longest image side fed to the network
    pub fn with_max_image_size(mut self, size: u32) -> Self {
        self.config.set(MAX_IMAGE_SIZE, size);
        self
    }

    fn validate_config(&self) -> std::result::Result<(), InitError> {
        let planes: u32 = self
            .config
            .get_or(DEPTH_PLANES, DEFAULT_DEPTH_PLANES)
            .map_err(Self::invalid_config)?;
        let size: u32 = self
            .config
            .get_or(MAX_IMAGE_SIZE, DEFAULT_MAX_IMAGE_SIZE)
            .map_err(Self::invalid_config)?;

        if planes == 0 {
            return Err(Self::invalid_config("depth planes must be positive"));
        }
        // network downsamples by 4 twice
        if size < 32 {
            return Err(Self::invalid_config(format!(
                "max image size {} is below 32",
                size
            )));
        }
        Ok(())
    }
}

impl DenseReconstructor for MvsNet {
    fn densify(&mut self, matches: &MatchSet, workspace: &Path) -> Result<DenseSummary> {
        let model = self.loaded()?;
        if matches.images.is_empty() {
            return Err(ComponentError::Inference {
                component: MVSNET.to_string(),
                reason: "no views to densify".to_string(),
            });
        }

        debug!(
            "MVSNet densifying {} view(s) into {} on {:?}",
            matches.images.len(),
            workspace.display(),
            model.device
        );

        Ok(DenseSummary {
            densifier: MVSNET.to_string(),
            workspace: workspace.to_path_buf(),
            views: matches.images.len(),
            depth_maps: 0,
        })
    }
}
