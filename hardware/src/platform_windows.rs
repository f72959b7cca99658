/*!
Windows-specific GPU detection using PowerShell and WMI
*/

use std::process::Command;

use crate::constants::*;
use crate::gpu::{classify_vendor, GpuInfo};
use crate::{HardwareError, Result};

/// Detect GPUs on Windows using PowerShell and WMI
pub fn detect_gpus() -> Result<Vec<GpuInfo>> {
    let output = Command::new(TOOL_POWERSHELL)
        .args([
            "-NoProfile",
            "-Command",
            "Get-CimInstance -ClassName Win32_VideoController | Select-Object Name, AdapterRAM, DriverVersion | ConvertTo-Json",
        ])
        .output()
        .map_err(|e| HardwareError::GpuDetection(format!("PowerShell failed: {}", e)))?;

    if !output.status.success() {
        return Err(HardwareError::GpuDetection(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    parse_video_controllers(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `Win32_VideoController` JSON (single object or array)
pub(crate) fn parse_video_controllers(json: &str) -> Result<Vec<GpuInfo>> {
    let data: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| HardwareError::GpuDetection(format!("JSON parse failed: {}", e)))?;

    let entries = match data {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let name = entry["Name"].as_str()?.trim().to_string();
            if name.to_lowercase().contains(KEYWORD_BASIC_DISPLAY) {
                return None;
            }
            Some(GpuInfo {
                vendor: classify_vendor(&name),
                vram_mb: entry["AdapterRAM"].as_u64().map(|b| b / 1024 / 1024),
                driver_version: entry["DriverVersion"].as_str().map(str::to_string),
                name,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuVendor;

    #[test]
    fn test_parse_single_controller() {
        let json = r#"{"Name":"NVIDIA GeForce RTX 4080","AdapterRAM":4293918720,"DriverVersion":"31.0.15.3623"}"#;
        let gpus = parse_video_controllers(json).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].vendor, GpuVendor::Nvidia);
        assert_eq!(gpus[0].vram_mb, Some(4095));
    }

    #[test]
    fn test_parse_skips_basic_display() {
        let json = r#"[{"Name":"Microsoft Basic Display Adapter"},{"Name":"AMD Radeon RX 7900 XTX"}]"#;
        let gpus = parse_video_controllers(json).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].vendor, GpuVendor::Amd);
    }
}
