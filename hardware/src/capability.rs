/*!
Capability Probe

Turns raw GPU detection into the immutable [`CapabilitySnapshot`] the rest of
the system reads. Detection failures are folded into "no accelerator".
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::constants::*;
use crate::gpu::{detect_gpus, GpuInfo};
use crate::{detect_total_ram_mb, OsInfo};

/// Compute API a detected accelerator exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeBackend {
    Cuda,
    Rocm,
    Metal,
}

impl fmt::Display for ComputeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cuda => write!(f, "{}", BACKEND_CUDA),
            Self::Rocm => write!(f, "{}", BACKEND_ROCM),
            Self::Metal => write!(f, "{}", BACKEND_METAL),
        }
    }
}

/// Coarse platform classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformClass {
    AppleSilicon,
    AppleIntel,
    Linux,
    Windows,
    Other,
}

impl PlatformClass {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            if cfg!(target_arch = "aarch64") {
                Self::AppleSilicon
            } else {
                Self::AppleIntel
            }
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppleSilicon => PLATFORM_APPLE_SILICON,
            Self::AppleIntel => PLATFORM_APPLE_INTEL,
            Self::Linux => PLATFORM_LINUX,
            Self::Windows => PLATFORM_WINDOWS,
            Self::Other => PLATFORM_OTHER,
        }
    }
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of detected acceleration hardware.
///
/// Computed once per process and shared by reference afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub accelerator_present: bool,
    /// Adapter name, or `"none"`. Kept even when the accelerator is masked.
    pub accelerator_name: String,
    pub platform_class: PlatformClass,
    pub backend: Option<ComputeBackend>,

    // Diagnostics
    pub gpus: Vec<GpuInfo>,
    pub os: OsInfo,
    pub total_ram_mb: u64,
}

impl CapabilitySnapshot {
    /// Snapshot for a machine without any usable accelerator.
    pub fn cpu_only(platform_class: PlatformClass) -> Self {
        Self {
            accelerator_present: false,
            accelerator_name: NO_ACCELERATOR.to_string(),
            platform_class,
            backend: None,
            gpus: Vec::new(),
            os: OsInfo::detect(),
            total_ram_mb: 0,
        }
    }

    /// Snapshot with an accelerator, for hosts where detection is known in advance.
    pub fn with_accelerator(
        platform_class: PlatformClass,
        name: impl Into<String>,
        backend: ComputeBackend,
    ) -> Self {
        Self {
            accelerator_present: true,
            accelerator_name: name.into(),
            backend: Some(backend),
            ..Self::cpu_only(platform_class)
        }
    }

    /// Build a snapshot from detected GPUs. The first GPU with a usable
    /// compute backend wins.
    pub fn from_gpus(platform_class: PlatformClass, gpus: Vec<GpuInfo>) -> Self {
        let accelerator = gpus
            .iter()
            .find_map(|gpu| gpu.compute_backend().map(|backend| (gpu.name.clone(), backend)));

        let (accelerator_present, accelerator_name, backend) = match accelerator {
            Some((name, backend)) => (true, name, Some(backend)),
            None => (false, NO_ACCELERATOR.to_string(), None),
        };

        Self {
            accelerator_present,
            accelerator_name,
            platform_class,
            backend,
            gpus,
            os: OsInfo::detect(),
            total_ram_mb: detect_total_ram_mb(),
        }
    }

    /// Human-readable accelerator summary for logs.
    pub fn describe_accelerator(&self) -> String {
        match (self.accelerator_present, self.backend) {
            (true, Some(backend)) => format!("{} ({})", self.accelerator_name, backend),
            (true, None) => self.accelerator_name.clone(),
            (false, _) if self.accelerator_name != NO_ACCELERATOR => {
                format!("{} (disabled)", self.accelerator_name)
            }
            (false, _) => NO_ACCELERATOR.to_string(),
        }
    }
}

/// Answers "can accelerated compute be used", without side effects.
pub trait CapabilityProbe {
    fn detect(&self) -> CapabilitySnapshot;
}

/// Probe backed by real platform queries
#[derive(Debug, Clone)]
pub struct SystemProbe {
    allow_accelerator: bool,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            allow_accelerator: true,
        }
    }

    /// When `false`, a detected accelerator is reported as absent.
    pub fn with_accelerator_allowed(mut self, allowed: bool) -> Self {
        self.allow_accelerator = allowed;
        self
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityProbe for SystemProbe {
    fn detect(&self) -> CapabilitySnapshot {
        let platform_class = PlatformClass::current();

        let mut snapshot = match detect_gpus() {
            Ok(gpus) => {
                debug!("Detected {} display adapter(s)", gpus.len());
                CapabilitySnapshot::from_gpus(platform_class, gpus)
            }
            Err(e) => {
                warn!("GPU detection failed, assuming no accelerator: {}", e);
                CapabilitySnapshot {
                    total_ram_mb: detect_total_ram_mb(),
                    ..CapabilitySnapshot::cpu_only(platform_class)
                }
            }
        };

        if !self.allow_accelerator && snapshot.accelerator_present {
            debug!("Accelerator {} masked by configuration", snapshot.accelerator_name);
            snapshot.accelerator_present = false;
            snapshot.backend = None;
        }

        snapshot
    }
}

/// Probe returning a fixed snapshot
#[derive(Debug, Clone)]
pub struct FixedProbe {
    snapshot: CapabilitySnapshot,
}

impl FixedProbe {
    pub fn new(snapshot: CapabilitySnapshot) -> Self {
        Self { snapshot }
    }
}

impl CapabilityProbe for FixedProbe {
    fn detect(&self) -> CapabilitySnapshot {
        self.snapshot.clone()
    }
}
