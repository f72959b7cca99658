/// Capability probe tests
///
/// These query the real host. They only assert what must hold on any
/// machine, with or without a GPU.
use colmap_neural_hardware::{
    constants::NO_ACCELERATOR, CapabilityProbe, CapabilitySnapshot, ComputeBackend, FixedProbe,
    PlatformClass, SystemProbe,
};

#[test]
fn test_system_probe_never_panics() {
    let snapshot = SystemProbe::new().detect();
    println!("Capability snapshot: {:#?}", snapshot);

    assert_eq!(snapshot.platform_class, PlatformClass::current());
    if snapshot.accelerator_present {
        assert!(snapshot.backend.is_some());
        assert_ne!(snapshot.accelerator_name, NO_ACCELERATOR);
    } else {
        assert!(snapshot.backend.is_none());
    }
}

#[test]
fn test_masked_probe_reports_no_accelerator() {
    let snapshot = SystemProbe::new().with_accelerator_allowed(false).detect();

    assert!(!snapshot.accelerator_present);
    assert!(snapshot.backend.is_none());
}

#[test]
fn test_platform_class_matches_target() {
    let class = PlatformClass::current();

    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    assert_eq!(class, PlatformClass::AppleSilicon);

    #[cfg(target_os = "linux")]
    assert_eq!(class, PlatformClass::Linux);

    #[cfg(target_os = "windows")]
    assert_eq!(class, PlatformClass::Windows);

    assert!(!class.as_str().is_empty());
}

#[test]
fn test_snapshot_serializes_for_diagnostics() {
    let snapshot = CapabilitySnapshot::with_accelerator(
        PlatformClass::Linux,
        "NVIDIA GeForce RTX 3090",
        ComputeBackend::Cuda,
    );
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["accelerator_present"], true);
    assert_eq!(json["accelerator_name"], "NVIDIA GeForce RTX 3090");
    assert_eq!(json["platform_class"], "linux");
    assert_eq!(json["backend"], "Cuda");
}

#[test]
fn test_fixed_probe_is_repeatable() {
    let probe = FixedProbe::new(CapabilitySnapshot::cpu_only(PlatformClass::Linux));
    assert_eq!(probe.detect(), probe.detect());
}
