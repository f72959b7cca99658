//! Pipeline stages, their registry categories and the contracts a pluggable
//! component must satisfy.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::Path;

use colmap_neural_hardware::CapabilitySnapshot;
use colmap_neural_registry::Category;

use crate::constants::*;
use crate::error::{InitError, Result};
use crate::types::{DenseSummary, FeatureSet, ImageSet, MatchSet};

/// One step of the reconstruction pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Matching,
    DenseReconstruction,
}

impl Stage {
    /// Fixed initialization order. Later stages consume earlier outputs.
    pub const ALL: [Stage; 3] = [Stage::Extraction, Stage::Matching, Stage::DenseReconstruction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Matching => "matching",
            Self::DenseReconstruction => "dense_reconstruction",
        }
    }

    /// Registry category serving this stage
    pub fn category_name(&self) -> &'static str {
        match self {
            Self::Extraction => CATEGORY_EXTRACTOR,
            Self::Matching => CATEGORY_MATCHER,
            Self::DenseReconstruction => CATEGORY_DENSIFIER,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract shared by every pluggable component.
pub trait NeuralComponent: Send + Debug {
    /// Registered name (e.g. "superpoint")
    fn name(&self) -> &str;

    /// Prepare the component for use: load weights, pick a device.
    ///
    /// The snapshot is advisory; a component may choose a CPU path when no
    /// accelerator is present.
    fn initialize(&mut self, capability: &CapabilitySnapshot) -> std::result::Result<(), InitError>;

    fn is_initialized(&self) -> bool;
}

/// Keypoints and descriptors per image
pub trait FeatureExtractor: NeuralComponent {
    fn extract(&mut self, images: &ImageSet) -> Result<FeatureSet>;
}

/// Correspondences between image pairs
pub trait FeatureMatcher: NeuralComponent {
    fn match_features(&mut self, features: &FeatureSet) -> Result<MatchSet>;
}

/// Depth estimation / fusion over matched views
pub trait DenseReconstructor: NeuralComponent {
    fn densify(&mut self, matches: &MatchSet, workspace: &Path) -> Result<DenseSummary>;
}

/// A registry category bound to a pipeline stage
pub trait StageCategory: Category {
    const STAGE: Stage;
}

/// Feature extractor category
#[derive(Debug, Clone, Copy)]
pub struct Extraction;

impl Category for Extraction {
    type Component = dyn FeatureExtractor;
    const NAME: &'static str = CATEGORY_EXTRACTOR;
}

impl StageCategory for Extraction {
    const STAGE: Stage = Stage::Extraction;
}

/// Feature matcher category
#[derive(Debug, Clone, Copy)]
pub struct Matching;

impl Category for Matching {
    type Component = dyn FeatureMatcher;
    const NAME: &'static str = CATEGORY_MATCHER;
}

impl StageCategory for Matching {
    const STAGE: Stage = Stage::Matching;
}

/// Dense reconstruction category
#[derive(Debug, Clone, Copy)]
pub struct DenseReconstruction;

impl Category for DenseReconstruction {
    type Component = dyn DenseReconstructor;
    const NAME: &'static str = CATEGORY_DENSIFIER;
}

impl StageCategory for DenseReconstruction {
    const STAGE: Stage = Stage::DenseReconstruction;
}
