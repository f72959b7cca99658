/*!
# COLMAP Neural Hardware Detection

Answers one question, once per process: can accelerated compute be used?

## Features

- GPU vendor detection (NVIDIA, AMD, Intel, Apple)
- Compute backend mapping (CUDA, ROCm, Metal)
- Platform classification (Apple Silicon, Apple Intel, Linux, Windows)
- Immutable, serializable [`CapabilitySnapshot`] for diagnostics

Detection never fails the caller: a platform query that errors out simply
yields a snapshot with `accelerator_present = false`.

## Example

```rust,no_run
use colmap_neural_hardware::{CapabilityProbe, SystemProbe};

let snapshot = SystemProbe::new().detect();
println!("Accelerator: {}", snapshot.describe_accelerator());
println!("Platform: {}", snapshot.platform_class);
```
*/

use serde::{Deserialize, Serialize};
use sysinfo::System;
use thiserror::Error;

mod capability;
mod gpu;
pub mod constants;

#[cfg(target_os = "windows")]
mod platform_windows;

#[cfg(target_os = "linux")]
mod platform_linux;

#[cfg(target_os = "macos")]
mod platform_macos;

pub use capability::{
    CapabilityProbe, CapabilitySnapshot, ComputeBackend, FixedProbe, PlatformClass, SystemProbe,
};
pub use gpu::{classify_vendor, detect_gpus, GpuInfo, GpuVendor};

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("GPU query failed: {0}")]
    GpuDetection(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Operating system information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub name: String,
    pub version: String,
    pub arch: String,
}

impl OsInfo {
    /// Name, version and architecture of the running OS.
    ///
    /// Uses `sysinfo` for cross-platform OS version detection.
    pub fn detect() -> Self {
        let os_version = System::long_os_version()
            .or_else(System::os_version)
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            name: std::env::consts::OS.to_string(),
            version: os_version,
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Total system RAM in MB, for diagnostics only.
pub fn detect_total_ram_mb() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.total_memory() / 1024 / 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_info_matches_build_target() {
        let os = OsInfo::detect();
        assert_eq!(os.name, std::env::consts::OS);
        assert_eq!(os.arch, std::env::consts::ARCH);
        assert!(!os.version.is_empty());
    }
}
