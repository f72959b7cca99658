/*!
Hardware Detection Constants

Centralized keywords and display strings so platform parsers share one vocabulary.
*/

// ========== GPU Vendors ==========
pub const GPU_VENDOR_NVIDIA: &str = "NVIDIA";
pub const GPU_VENDOR_AMD: &str = "AMD";
pub const GPU_VENDOR_INTEL: &str = "Intel";
pub const GPU_VENDOR_APPLE: &str = "Apple";
pub const GPU_VENDOR_UNKNOWN: &str = "Unknown";

// ========== Compute Backends ==========
pub const BACKEND_CUDA: &str = "CUDA";
pub const BACKEND_ROCM: &str = "ROCm";
pub const BACKEND_METAL: &str = "Metal";

// ========== Platform Classes ==========
pub const PLATFORM_APPLE_SILICON: &str = "apple-silicon";
pub const PLATFORM_APPLE_INTEL: &str = "apple-intel";
pub const PLATFORM_LINUX: &str = "linux";
pub const PLATFORM_WINDOWS: &str = "windows";
pub const PLATFORM_OTHER: &str = "other";

// ========== GPU Detection Keywords ==========
// NVIDIA
pub const GPU_KEYWORD_NVIDIA: &str = "nvidia";
pub const GPU_KEYWORD_GEFORCE: &str = "geforce";
pub const GPU_KEYWORD_QUADRO: &str = "quadro";
pub const GPU_KEYWORD_TESLA: &str = "tesla";

// AMD
pub const GPU_KEYWORD_AMD: &str = "amd";
pub const GPU_KEYWORD_RADEON: &str = "radeon";

// Intel
pub const GPU_KEYWORD_INTEL: &str = "intel";

// Apple
pub const GPU_KEYWORD_APPLE: &str = "apple";

// ========== Display Adapter Keywords ==========
pub const KEYWORD_BASIC_DISPLAY: &str = "basic display";
pub const KEYWORD_VGA: &str = "vga";
pub const KEYWORD_3D: &str = "3d controller";
pub const KEYWORD_DISPLAY_CONTROLLER: &str = "display controller";

// ========== Platform Query Tools ==========
pub const TOOL_NVIDIA_SMI: &str = "nvidia-smi";
pub const TOOL_LSPCI: &str = "lspci";
pub const TOOL_SYSTEM_PROFILER: &str = "system_profiler";
pub const TOOL_POWERSHELL: &str = "powershell";

/// Shown when no accelerator was found.
pub const NO_ACCELERATOR: &str = "none";
