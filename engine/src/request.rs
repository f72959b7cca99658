use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::EngineError;

/// Database file the engine writes inside the workspace
pub const DATABASE_FILE: &str = "database.db";

/// Reconstruction quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
    Extreme,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "extreme" => Ok(Self::Extreme),
            _ => Err(EngineError::InvalidValue {
                field: "quality",
                value: s.to_string(),
            }),
        }
    }
}

/// How the input images were captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Individual,
    Video,
    Internet,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Video => "video",
            Self::Internet => "internet",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "image" => Ok(Self::Individual),
            "video" => Ok(Self::Video),
            "internet" => Ok(Self::Internet),
            _ => Err(EngineError::InvalidValue {
                field: "data type",
                value: s.to_string(),
            }),
        }
    }
}

/// Everything the engine needs for one reconstruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionRequest {
    pub image_path: PathBuf,
    pub workspace_path: PathBuf,
    pub database_path: PathBuf,
    pub quality: Quality,
    pub dense: bool,
    pub data_type: DataType,
    pub use_gpu: bool,
    /// `None` lets the engine pick
    pub num_threads: Option<usize>,
}

impl ReconstructionRequest {
    /// Request with default settings; the database lives in the workspace.
    pub fn new(image_path: impl Into<PathBuf>, workspace_path: impl Into<PathBuf>) -> Self {
        let workspace_path = workspace_path.into();
        Self {
            image_path: image_path.into(),
            database_path: workspace_path.join(DATABASE_FILE),
            workspace_path,
            quality: Quality::default(),
            dense: true,
            data_type: DataType::default(),
            use_gpu: true,
            num_threads: None,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_dense(mut self, dense: bool) -> Self {
        self.dense = dense;
        self
    }

    pub fn with_use_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }

    pub fn with_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parsing() {
        assert_eq!("LOW".parse::<Quality>().unwrap(), Quality::Low);
        assert_eq!(" Extreme ".parse::<Quality>().unwrap(), Quality::Extreme);
        assert!("ultra".parse::<Quality>().is_err());
        assert_eq!(Quality::default(), Quality::High);
    }

    #[test]
    fn test_data_type_aliases() {
        assert_eq!("image".parse::<DataType>().unwrap(), DataType::Individual);
        assert_eq!("Individual".parse::<DataType>().unwrap(), DataType::Individual);
        assert_eq!("VIDEO".parse::<DataType>().unwrap(), DataType::Video);
        assert_eq!("internet".parse::<DataType>().unwrap(), DataType::Internet);
        assert!(matches!(
            "drone".parse::<DataType>(),
            Err(EngineError::InvalidValue { field: "data type", .. })
        ));
    }

    #[test]
    fn test_request_defaults() {
        let request = ReconstructionRequest::new("/data/images", "/data/out");
        assert_eq!(request.database_path, PathBuf::from("/data/out/database.db"));
        assert!(request.dense);
        assert!(request.use_gpu);
        assert_eq!(request.num_threads, None);
        assert_eq!(request.data_type, DataType::Individual);
    }
}
