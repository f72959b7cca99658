//! Component names, option keys and model manifest entries.

// ========== Built-in component names ==========
pub const SUPERPOINT: &str = "superpoint";
pub const NETVLAD: &str = "netvlad";
pub const SUPERGLUE: &str = "superglue";
pub const MVSNET: &str = "mvsnet";

// ========== Category names ==========
pub const CATEGORY_EXTRACTOR: &str = "extractor";
pub const CATEGORY_MATCHER: &str = "matcher";
pub const CATEGORY_DENSIFIER: &str = "densifier";

// ========== Shared option keys ==========
pub const REQUIRE_ACCELERATOR: &str = "require_accelerator";

// SuperPoint
pub const KEYPOINT_THRESHOLD: &str = "keypoint_threshold";
pub const MAX_KEYPOINTS: &str = "max_keypoints";
pub const NMS_RADIUS: &str = "nms_radius";

// NetVLAD
pub const NUM_CLUSTERS: &str = "num_clusters";
pub const RETRIEVAL_TOP_K: &str = "retrieval_top_k";

// SuperGlue
pub const MATCH_THRESHOLD: &str = "match_threshold";
pub const SINKHORN_ITERATIONS: &str = "sinkhorn_iterations";
pub const WEIGHTS_VARIANT: &str = "weights";

// MVSNet
pub const DEPTH_PLANES: &str = "depth_planes";
pub const MAX_IMAGE_SIZE: &str = "max_image_size";

// ========== Defaults ==========
pub const DEFAULT_KEYPOINT_THRESHOLD: f32 = 0.005;
pub const DEFAULT_MAX_KEYPOINTS: usize = 4096;
pub const DEFAULT_NMS_RADIUS: u32 = 4;
pub const DEFAULT_NUM_CLUSTERS: u32 = 64;
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 20;
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.2;
pub const DEFAULT_SINKHORN_ITERATIONS: u32 = 20;
pub const DEFAULT_WEIGHTS_VARIANT: &str = "outdoor";
pub const DEFAULT_DEPTH_PLANES: u32 = 192;
pub const DEFAULT_MAX_IMAGE_SIZE: u32 = 1600;

// ========== Model manifest ==========
pub const SUPERPOINT_WEIGHTS: &str = "superpoint_v1.pth";
pub const SUPERPOINT_URL: &str =
    "https://github.com/magicleap/SuperPointPretrainedNetwork/raw/master/superpoint_v1.pth";

pub const SUPERGLUE_WEIGHTS: &str = "superglue_outdoor.pth";
pub const SUPERGLUE_URL: &str =
    "https://github.com/magicleap/SuperGluePretrainedNetwork/raw/master/models/weights/superglue_outdoor.pth";

pub const NETVLAD_WEIGHTS_DIR: &str = "netvlad";
pub const NETVLAD_URL: &str =
    "https://github.com/QVPR/Patch-NetVLAD/releases/download/v1.0/patchnetvlad-model.zip";

pub const MVSNET_WEIGHTS: &str = "model_mvs.ckpt";
pub const MVSNET_URL: &str = "https://github.com/YoYo000/MVSNet/raw/master/model/model_mvs.ckpt";

/// Default model directory, relative to the working directory
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Image extensions the scanner accepts (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp"];
