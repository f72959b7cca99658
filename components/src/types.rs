//! Data passed between stages of the enhanced chain.
//!
//! The schema is deliberately thin: it carries what the orchestrator needs to
//! hand work from one stage to the next, not a full descriptor format.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::IMAGE_EXTENSIONS;

/// Images of one reconstruction job, sorted by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    pub root: PathBuf,
    pub images: Vec<PathBuf>,
}

impl ImageSet {
    /// Collect supported images directly under `root` (not recursive).
    pub fn scan(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let mut images = Vec::new();

        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                images.push(path);
            }
        }
        images.sort();

        Ok(Self {
            root: root.to_path_buf(),
            images,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    pub image: PathBuf,
    pub keypoints: Vec<Keypoint>,
    /// One row per keypoint
    pub descriptors: Vec<Vec<f32>>,
    /// Whole-image descriptor for retrieval, if the extractor produces one
    pub global_descriptor: Option<Vec<f32>>,
}

impl ImageFeatures {
    pub fn empty(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            keypoints: Vec::new(),
            descriptors: Vec::new(),
            global_descriptor: None,
        }
    }
}

/// Extractor output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Component that produced the features
    pub extractor: String,
    pub images: Vec<ImageFeatures>,
}

impl FeatureSet {
    pub fn keypoint_count(&self) -> usize {
        self.images.iter().map(|i| i.keypoints.len()).sum()
    }
}

/// Matches between two images, by index into the [`FeatureSet`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub query: usize,
    pub train: usize,
    /// (query keypoint, train keypoint)
    pub matches: Vec<(u32, u32)>,
}

/// Matcher output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSet {
    pub matcher: String,
    pub images: Vec<PathBuf>,
    pub pairs: Vec<MatchPair>,
}

impl MatchSet {
    pub fn match_count(&self) -> usize {
        self.pairs.iter().map(|p| p.matches.len()).sum()
    }
}

/// Dense stage output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseSummary {
    pub densifier: String,
    pub workspace: PathBuf,
    /// Views considered for depth estimation
    pub views: usize,
    pub depth_maps: usize,
}
