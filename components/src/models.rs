//! Model weights lookup.
//!
//! Built-in components do not download anything; they expect their weights
//! under a model directory and fail initialization when the asset is missing.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use colmap_neural_hardware::{CapabilitySnapshot, ComputeBackend};

use crate::constants::*;
use crate::error::InitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssetKind {
    /// A single checkpoint file
    File,
    /// An extracted archive
    Directory,
}

/// Entry of the model manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelAsset {
    pub component: &'static str,
    pub location: &'static str,
    pub kind: AssetKind,
    pub url: &'static str,
}

pub const SUPERPOINT_ASSET: ModelAsset = ModelAsset {
    component: SUPERPOINT,
    location: SUPERPOINT_WEIGHTS,
    kind: AssetKind::File,
    url: SUPERPOINT_URL,
};

pub const SUPERGLUE_ASSET: ModelAsset = ModelAsset {
    component: SUPERGLUE,
    location: SUPERGLUE_WEIGHTS,
    kind: AssetKind::File,
    url: SUPERGLUE_URL,
};

pub const NETVLAD_ASSET: ModelAsset = ModelAsset {
    component: NETVLAD,
    location: NETVLAD_WEIGHTS_DIR,
    kind: AssetKind::Directory,
    url: NETVLAD_URL,
};

pub const MVSNET_ASSET: ModelAsset = ModelAsset {
    component: MVSNET,
    location: MVSNET_WEIGHTS,
    kind: AssetKind::File,
    url: MVSNET_URL,
};

/// Every asset the built-in components know about
pub const MANIFEST: [ModelAsset; 4] = [SUPERPOINT_ASSET, NETVLAD_ASSET, SUPERGLUE_ASSET, MVSNET_ASSET];

/// Where a loaded model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Device {
    Cpu,
    Accelerator(ComputeBackend),
}

/// Weights located and checked, device chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModel {
    pub asset: ModelAsset,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub device: Device,
}

/// Directory holding model weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, asset: &ModelAsset) -> PathBuf {
        self.root.join(asset.location)
    }

    /// Manifest entries with nothing on disk at their location
    pub fn missing_assets(&self) -> Vec<&'static ModelAsset> {
        let manifest: &'static [ModelAsset] = &MANIFEST;
        manifest
            .iter()
            .filter(|asset| !self.path_for(asset).exists())
            .collect()
    }

    /// Locate `asset`, check it is usable and pick a device.
    pub fn load(
        &self,
        asset: &ModelAsset,
        capability: &CapabilitySnapshot,
        require_accelerator: bool,
    ) -> Result<LoadedModel, InitError> {
        let device = match (capability.accelerator_present, capability.backend) {
            (true, Some(backend)) => Device::Accelerator(backend),
            _ if require_accelerator => {
                return Err(InitError::UnsupportedHardware {
                    component: asset.component.to_string(),
                });
            }
            _ => {
                warn!("No accelerator available, '{}' will run on CPU", asset.component);
                Device::Cpu
            }
        };

        let path = self.path_for(asset);
        let missing = || InitError::MissingWeights {
            component: asset.component.to_string(),
            path: path.clone(),
            url: asset.url.to_string(),
        };

        let size_bytes = match asset.kind {
            AssetKind::File => {
                let metadata = fs::metadata(&path).map_err(|_| missing())?;
                if !metadata.is_file() || metadata.len() == 0 {
                    return Err(missing());
                }
                metadata.len()
            }
            AssetKind::Directory => directory_size(&path).map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => missing(),
                _ => InitError::Io {
                    component: asset.component.to_string(),
                    source,
                },
            })?,
        };

        if size_bytes == 0 {
            return Err(missing());
        }

        debug!(
            "Loaded '{}' weights from {} ({} bytes, {:?})",
            asset.component,
            path.display(),
            size_bytes,
            device
        );

        Ok(LoadedModel {
            asset: *asset,
            path,
            size_bytes,
            device,
        })
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_DIR)
    }
}

fn directory_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        total += if metadata.is_dir() {
            directory_size(&entry.path())?
        } else {
            metadata.len()
        };
    }
    Ok(total)
}
