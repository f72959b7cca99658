//! Configuration file.
//!
//! INI-like format: `[Section]` headers, `key = value` lines, full-line
//! comments starting with `;` or `#`, and trailing `;` comments. Unknown
//! sections and keys are ignored.
//!
//! ```text
//! [Input]
//! source = video
//! video_path = capture.mp4
//!
//! [Colmap]
//! image_path = scene/images
//! output_path = scene/out   ; created if missing
//! quality = medium
//!
//! [Neural]
//! matcher = none
//! ```

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use colmap_neural_components::constants::{DEFAULT_MODEL_DIR, MVSNET, SUPERGLUE, SUPERPOINT};
use colmap_neural_components::BuiltinSettings;
use colmap_neural_engine::{colmap::DEFAULT_BINARY, DataType, Quality, ReconstructionRequest};
use colmap_neural_orchestrator::{NeuralPolicy, StageSelection};

/// Stage value that leaves the stage unconfigured
pub const STAGE_NONE: &str = "none";
pub const MODEL_EXTENSION: &str = ".onnx";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model path '{0}': file must have {MODEL_EXTENSION} extension")]
    InvalidModelPath(String),

    #[error("invalid number for [{section}] {key}: '{value}'")]
    InvalidNumber {
        section: String,
        key: String,
        value: String,
    },

    #[error("neither input source nor video path specified")]
    MissingInput,

    #[error("video source selected but no valid video path provided")]
    MissingVideoPath,

    #[error("{0} not specified in [Colmap] section")]
    MissingColmapPath(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Video,
    Camera,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
    pub confidence_threshold: f32,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputConfig {
    pub source: InputSource,
    pub video_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingConfig {
    pub iou_threshold: f32,
    pub max_frames_to_skip: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColmapConfig {
    pub image_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub dense: bool,
    pub data_type: DataType,
    pub quality: Quality,
    /// Engine executable
    pub binary: PathBuf,
    pub num_threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuralConfig {
    pub enabled: bool,
    pub use_gpu: bool,
    pub extractor: Option<String>,
    pub matcher: Option<String>,
    pub densifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub input: InputConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
    pub colmap: ColmapConfig,
    pub neural: NeuralConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: None,
                confidence_threshold: 0.5,
                dir: None,
            },
            input: InputConfig::default(),
            tracking: TrackingConfig {
                iou_threshold: 0.5,
                max_frames_to_skip: 10,
            },
            logging: LoggingConfig::default(),
            colmap: ColmapConfig {
                image_path: None,
                output_path: None,
                dense: true,
                data_type: DataType::default(),
                quality: Quality::default(),
                binary: PathBuf::from(DEFAULT_BINARY),
                num_threads: None,
            },
            neural: NeuralConfig {
                enabled: true,
                use_gpu: true,
                extractor: Some(SUPERPOINT.to_string()),
                matcher: Some(SUPERGLUE.to_string()),
                densifier: Some(MVSNET.to_string()),
            },
        }
    }
}

impl AppConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    fn apply(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        let number_error = || ConfigError::InvalidNumber {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        };

        match (section, key) {
            ("Model", "path") => {
                self.model.path = match non_empty(value) {
                    Some(path) if !path.ends_with(MODEL_EXTENSION) => {
                        return Err(ConfigError::InvalidModelPath(path.to_string()));
                    }
                    path => path.map(PathBuf::from),
                };
            }
            ("Model", "confidence_threshold") => {
                self.model.confidence_threshold = value.parse().map_err(|_| number_error())?;
            }
            ("Model", "dir") => self.model.dir = non_empty(value).map(PathBuf::from),

            ("Input", "source") => {
                self.input.source = match value.to_ascii_lowercase().as_str() {
                    "camera" => InputSource::Camera,
                    "video" => InputSource::Video,
                    _ => {
                        warn!("Invalid input source: '{}'. Using default (video).", value);
                        InputSource::Video
                    }
                };
            }
            ("Input", "video_path") => self.input.video_path = non_empty(value).map(PathBuf::from),

            ("Tracking", "iou_threshold") => {
                self.tracking.iou_threshold = value.parse().map_err(|_| number_error())?;
            }
            ("Tracking", "max_frames_to_skip") => {
                self.tracking.max_frames_to_skip = value.parse().map_err(|_| number_error())?;
            }

            ("Logging", "debug") => self.logging.debug = parse_flag(value),

            ("Colmap", "image_path") => self.colmap.image_path = non_empty(value).map(PathBuf::from),
            ("Colmap", "output_path") => {
                self.colmap.output_path = non_empty(value).map(PathBuf::from)
            }
            ("Colmap", "dense") => self.colmap.dense = parse_flag(value),
            ("Colmap", "data_type") => match value.parse() {
                Ok(data_type) => self.colmap.data_type = data_type,
                Err(_) => warn!(
                    "Invalid COLMAP data type: '{}'. Using default ({}).",
                    value,
                    DataType::default()
                ),
            },
            ("Colmap", "quality") => match value.parse() {
                Ok(quality) => self.colmap.quality = quality,
                Err(_) => warn!(
                    "Invalid COLMAP quality setting: '{}'. Using default ({}).",
                    value,
                    Quality::default()
                ),
            },
            ("Colmap", "binary") => {
                if let Some(binary) = non_empty(value) {
                    self.colmap.binary = PathBuf::from(binary);
                }
            }
            ("Colmap", "num_threads") => {
                let threads: i64 = value.parse().map_err(|_| number_error())?;
                // -1 means automatic
                self.colmap.num_threads = usize::try_from(threads).ok().filter(|t| *t > 0);
            }

            ("Neural", "enabled") => self.neural.enabled = parse_flag(value),
            ("Neural", "use_gpu") => self.neural.use_gpu = parse_flag(value),
            ("Neural", "extractor") => self.neural.extractor = stage_component(value),
            ("Neural", "matcher") => self.neural.matcher = stage_component(value),
            ("Neural", "densifier") => self.neural.densifier = stage_component(value),

            _ => {}
        }
        Ok(())
    }

    fn validate_input(&mut self, source_specified: bool) -> Result<()> {
        let has_video = self.input.video_path.is_some();

        if !source_specified {
            if !has_video {
                return Err(ConfigError::MissingInput);
            }
            warn!("Input source not specified. Using default (video) because video path is present.");
            self.input.source = InputSource::Video;
        }

        match self.input.source {
            InputSource::Video if !has_video => Err(ConfigError::MissingVideoPath),
            InputSource::Camera if has_video => {
                warn!("Camera input selected but video path also specified. Video path will be ignored.");
                self.input.video_path = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// `[Model] dir`, else the directory of `[Model] path`, else `models`
    pub fn model_dir(&self) -> PathBuf {
        if let Some(dir) = &self.model.dir {
            return dir.clone();
        }
        self.model
            .path
            .as_deref()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR))
    }

    pub fn output_path(&self) -> Result<&Path> {
        self.colmap
            .output_path
            .as_deref()
            .ok_or(ConfigError::MissingColmapPath("output_path"))
    }

    pub fn image_path(&self) -> Result<&Path> {
        self.colmap
            .image_path
            .as_deref()
            .ok_or(ConfigError::MissingColmapPath("image_path"))
    }

    /// Engine request; the database goes to `<output_path>/database.db`
    pub fn request(&self) -> Result<ReconstructionRequest> {
        Ok(ReconstructionRequest::new(self.image_path()?, self.output_path()?)
            .with_quality(self.colmap.quality)
            .with_data_type(self.colmap.data_type)
            .with_dense(self.colmap.dense)
            .with_use_gpu(self.neural.use_gpu)
            .with_num_threads(self.colmap.num_threads))
    }

    /// Stage selection. The densifier only applies to dense runs.
    pub fn selection(&self) -> StageSelection {
        let policy = if self.neural.enabled {
            NeuralPolicy::Enabled
        } else {
            NeuralPolicy::Disabled
        };

        StageSelection {
            policy,
            extractor: self.neural.extractor.clone(),
            matcher: self.neural.matcher.clone(),
            densifier: self.neural.densifier.clone().filter(|_| self.colmap.dense),
        }
    }

    pub fn builtin_settings(&self) -> BuiltinSettings {
        BuiltinSettings {
            model_dir: self.model_dir(),
            keypoint_threshold: self.model.confidence_threshold,
            ..BuiltinSettings::default()
        }
    }
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section = String::new();
        let mut source_specified = false;

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = strip_comment(value).trim();

            if section == "Input" && key == "source" {
                source_specified = true;
            }
            config.apply(&section, key, value)?;
        }

        config.validate_input(source_specified)?;
        Ok(config)
    }
}

fn strip_comment(value: &str) -> &str {
    value.split_once(';').map_or(value, |(before, _)| before)
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn stage_component(value: &str) -> Option<String> {
    non_empty(value)
        .filter(|name| !name.eq_ignore_ascii_case(STAGE_NONE))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "[Input]\nsource = video\nvideo_path = in.mp4\n";

    #[test]
    fn test_comments_and_whitespace() {
        let config: AppConfig = format!(
            "{}\n; full line comment\n# another\n[Colmap]\n  image_path =  imgs ; trailing\n",
            MINIMAL
        )
        .parse()
        .unwrap();
        assert_eq!(config.colmap.image_path, Some(PathBuf::from("imgs")));
    }

    #[test]
    fn test_empty_model_path_is_unset() {
        let config: AppConfig = format!("[Model]\npath =\n{}", MINIMAL).parse().unwrap();
        assert_eq!(config.model.path, None);
        assert_eq!(config.model_dir(), PathBuf::from(DEFAULT_MODEL_DIR));
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag("YES"));
        assert!(parse_flag("1"));
        assert!(parse_flag("True"));
        assert!(!parse_flag("on"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_stage_component() {
        assert_eq!(stage_component("NONE"), None);
        assert_eq!(stage_component(""), None);
        assert_eq!(stage_component("netvlad"), Some("netvlad".to_string()));
    }

    #[test]
    fn test_model_dir_resolution() {
        let mut config = AppConfig::default();
        assert_eq!(config.model_dir(), PathBuf::from(DEFAULT_MODEL_DIR));

        config.model.path = Some(PathBuf::from("detector.onnx"));
        assert_eq!(config.model_dir(), PathBuf::from(DEFAULT_MODEL_DIR));

        config.model.path = Some(PathBuf::from("weights/detector.onnx"));
        assert_eq!(config.model_dir(), PathBuf::from("weights"));

        config.model.dir = Some(PathBuf::from("/opt/models"));
        assert_eq!(config.model_dir(), PathBuf::from("/opt/models"));
    }

    #[test]
    fn test_num_threads() {
        let config: AppConfig = format!("{}[Colmap]\nnum_threads = -1\n", MINIMAL).parse().unwrap();
        assert_eq!(config.colmap.num_threads, None);

        let config: AppConfig = format!("{}[Colmap]\nnum_threads = 6\n", MINIMAL).parse().unwrap();
        assert_eq!(config.colmap.num_threads, Some(6));

        let err = format!("{}[Colmap]\nnum_threads = many\n", MINIMAL)
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key, .. } if key == "num_threads"));
    }
}
