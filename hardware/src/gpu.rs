/*!
GPU Detection

Detects GPU vendor and compute capabilities for acceleration selection.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capability::ComputeBackend;
use crate::constants::*;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Apple,
    Unknown,
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nvidia => write!(f, "{}", GPU_VENDOR_NVIDIA),
            Self::Amd => write!(f, "{}", GPU_VENDOR_AMD),
            Self::Intel => write!(f, "{}", GPU_VENDOR_INTEL),
            Self::Apple => write!(f, "{}", GPU_VENDOR_APPLE),
            Self::Unknown => write!(f, "{}", GPU_VENDOR_UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub vendor: GpuVendor,
    pub name: String,
    pub vram_mb: Option<u64>,
    pub driver_version: Option<String>,
}

impl GpuInfo {
    /// Compute backend a reconstruction engine can drive on this GPU.
    ///
    /// Intel and unidentified adapters are listed for diagnostics but are not
    /// treated as usable accelerators.
    pub fn compute_backend(&self) -> Option<ComputeBackend> {
        match self.vendor {
            GpuVendor::Nvidia => Some(ComputeBackend::Cuda),
            GpuVendor::Amd if cfg!(target_os = "linux") => Some(ComputeBackend::Rocm),
            GpuVendor::Apple => Some(ComputeBackend::Metal),
            _ => None,
        }
    }
}

/// Classify a GPU vendor from a free-form adapter description.
pub fn classify_vendor(description: &str) -> GpuVendor {
    let lower = description.to_lowercase();
    if [GPU_KEYWORD_NVIDIA, GPU_KEYWORD_GEFORCE, GPU_KEYWORD_QUADRO, GPU_KEYWORD_TESLA]
        .iter()
        .any(|k| lower.contains(k))
    {
        GpuVendor::Nvidia
    } else if lower.contains(GPU_KEYWORD_AMD) || lower.contains(GPU_KEYWORD_RADEON) {
        GpuVendor::Amd
    } else if lower.contains(GPU_KEYWORD_INTEL) {
        GpuVendor::Intel
    } else if lower.contains(GPU_KEYWORD_APPLE) {
        GpuVendor::Apple
    } else {
        GpuVendor::Unknown
    }
}

/// Detect GPUs using platform-specific methods
pub fn detect_gpus() -> Result<Vec<GpuInfo>> {
    #[cfg(target_os = "windows")]
    {
        crate::platform_windows::detect_gpus()
    }

    #[cfg(target_os = "linux")]
    {
        crate::platform_linux::detect_gpus()
    }

    #[cfg(target_os = "macos")]
    {
        crate::platform_macos::detect_gpus()
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        Err(crate::HardwareError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_vendor() {
        assert_eq!(classify_vendor("NVIDIA GeForce RTX 3090"), GpuVendor::Nvidia);
        assert_eq!(classify_vendor("Tesla T4"), GpuVendor::Nvidia);
        assert_eq!(classify_vendor("Advanced Micro Devices, Inc. [AMD/ATI] Navi 21"), GpuVendor::Amd);
        assert_eq!(classify_vendor("Radeon Pro 5500M"), GpuVendor::Amd);
        assert_eq!(classify_vendor("Intel Corporation UHD Graphics 630"), GpuVendor::Intel);
        assert_eq!(classify_vendor("Apple M4 Pro"), GpuVendor::Apple);
        assert_eq!(classify_vendor("Matrox G200eR2"), GpuVendor::Unknown);
    }

    #[test]
    fn test_compute_backend_mapping() {
        let gpu = |vendor| GpuInfo {
            vendor,
            name: "test".to_string(),
            vram_mb: None,
            driver_version: None,
        };

        assert_eq!(gpu(GpuVendor::Nvidia).compute_backend(), Some(ComputeBackend::Cuda));
        assert_eq!(gpu(GpuVendor::Apple).compute_backend(), Some(ComputeBackend::Metal));
        assert_eq!(gpu(GpuVendor::Intel).compute_backend(), None);
        assert_eq!(gpu(GpuVendor::Unknown).compute_backend(), None);
    }
}
