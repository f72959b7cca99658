/*!
macOS-specific GPU detection using system_profiler
*/

use std::process::Command;

use crate::constants::*;
use crate::gpu::{classify_vendor, GpuInfo, GpuVendor};
use crate::{HardwareError, Result};

pub fn detect_gpus() -> Result<Vec<GpuInfo>> {
    let output = Command::new(TOOL_SYSTEM_PROFILER)
        .args(["SPDisplaysDataType", "-json"])
        .output()
        .map_err(|e| {
            HardwareError::GpuDetection(format!("{} failed: {}", TOOL_SYSTEM_PROFILER, e))
        })?;

    if !output.status.success() {
        return Err(HardwareError::GpuDetection(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_system_profiler(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `system_profiler SPDisplaysDataType -json`
pub(crate) fn parse_system_profiler(json: &str) -> Result<Vec<GpuInfo>> {
    let data: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| HardwareError::GpuDetection(format!("JSON parse failed: {}", e)))?;

    let displays = data["SPDisplaysDataType"].as_array().cloned().unwrap_or_default();

    Ok(displays
        .iter()
        .filter_map(|entry| {
            let name = entry["sppci_model"]
                .as_str()
                .or_else(|| entry["_name"].as_str())?
                .trim()
                .to_string();

            // Apple Silicon reports the SoC, e.g. "Apple M4 Pro"
            let vendor = match entry["spdisplays_vendor"].as_str() {
                Some(v) if v.to_lowercase().contains(GPU_KEYWORD_APPLE) => GpuVendor::Apple,
                Some(v) => classify_vendor(v),
                None => classify_vendor(&name),
            };

            let vram_mb = entry["spdisplays_vram"].as_str().and_then(parse_vram_mb);

            Some(GpuInfo {
                vendor,
                name,
                vram_mb,
                driver_version: entry["spdisplays_mtlgpufamilysupport"]
                    .as_str()
                    .map(str::to_string),
            })
        })
        .collect())
}

/// "4 GB" or "1536 MB" to megabytes
fn parse_vram_mb(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let amount = parts.next()?.parse::<u64>().ok()?;
    match parts.next().map(str::to_ascii_uppercase).as_deref() {
        Some("GB") => Some(amount * 1024),
        Some("MB") => Some(amount),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apple_silicon() {
        let json = r#"{"SPDisplaysDataType":[{"_name":"Apple M4 Pro","sppci_model":"Apple M4 Pro","spdisplays_vendor":"sppci_vendor_Apple","spdisplays_mtlgpufamilysupport":"spdisplays_metal3"}]}"#;
        let gpus = parse_system_profiler(json).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].vendor, GpuVendor::Apple);
        assert_eq!(gpus[0].name, "Apple M4 Pro");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(parse_system_profiler("not json").is_err());
    }

    #[test]
    fn test_vram_units() {
        assert_eq!(parse_vram_mb("4 GB"), Some(4096));
        assert_eq!(parse_vram_mb("1536 MB"), Some(1536));
        assert_eq!(parse_vram_mb("8"), None);
    }

    #[test]
    fn test_discrete_vram_in_megabytes() {
        let json = r#"{"SPDisplaysDataType":[{"_name":"AMD Radeon Pro 555X","spdisplays_vendor":"sppci_vendor_amd","spdisplays_vram":"1536 MB"}]}"#;
        let gpus = parse_system_profiler(json).unwrap();
        assert_eq!(gpus[0].vram_mb, Some(1536));
    }
}
