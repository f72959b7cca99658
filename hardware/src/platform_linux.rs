/*!
Linux-specific GPU detection using nvidia-smi and lspci
*/

use std::process::Command;

use crate::constants::*;
use crate::gpu::{classify_vendor, GpuInfo, GpuVendor};
use crate::{HardwareError, Result};

/// Detect GPUs on Linux using nvidia-smi, falling back to lspci
pub fn detect_gpus() -> Result<Vec<GpuInfo>> {
    // Try nvidia-smi first: it also proves the driver is loaded
    if let Ok(output) = Command::new(TOOL_NVIDIA_SMI)
        .args([
            "--query-gpu=name,memory.total,driver_version",
            "--format=csv,noheader,nounits",
        ])
        .output()
    {
        if output.status.success() {
            let gpus = parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout));
            if !gpus.is_empty() {
                return Ok(gpus);
            }
        }
    }

    let output = Command::new(TOOL_LSPCI)
        .output()
        .map_err(|e| HardwareError::GpuDetection(format!("{} failed: {}", TOOL_LSPCI, e)))?;

    if !output.status.success() {
        return Err(HardwareError::GpuDetection(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(parse_lspci(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `nvidia-smi --format=csv,noheader,nounits` output
pub(crate) fn parse_nvidia_smi(stdout: &str) -> Vec<GpuInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
            if parts.len() < 3 || parts[0].is_empty() {
                return None;
            }
            Some(GpuInfo {
                vendor: GpuVendor::Nvidia,
                name: parts[0].to_string(),
                vram_mb: parts[1].parse().ok(),
                driver_version: Some(parts[2].to_string()),
            })
        })
        .collect()
}

/// Parse plain `lspci` output, keeping display adapters only
pub(crate) fn parse_lspci(stdout: &str) -> Vec<GpuInfo> {
    stdout
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains(KEYWORD_VGA)
                || lower.contains(KEYWORD_3D)
                || lower.contains(KEYWORD_DISPLAY_CONTROLLER)
        })
        .map(|line| {
            // "00:02.0 VGA compatible controller: Intel Corporation ..." -> text after the class
            let name = line
                .splitn(3, ':')
                .nth(2)
                .unwrap_or(line)
                .trim()
                .to_string();
            GpuInfo {
                vendor: classify_vendor(&name),
                name,
                vram_mb: None, // lspci doesn't provide VRAM
                driver_version: None,
            }
        })
        .collect()
}
