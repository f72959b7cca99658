//! Built-in components driven through the catalog

use std::fs;
use std::path::Path;

use colmap_neural_components::constants::*;
use colmap_neural_components::*;
use colmap_neural_hardware::{ComputeBackend, PlatformClass};

fn write_models(dir: &Path) {
    fs::write(dir.join(SUPERPOINT_WEIGHTS), b"superpoint").unwrap();
    fs::write(dir.join(SUPERGLUE_WEIGHTS), b"superglue").unwrap();
    fs::write(dir.join(MVSNET_WEIGHTS), b"mvsnet").unwrap();
    fs::create_dir_all(dir.join(NETVLAD_WEIGHTS_DIR)).unwrap();
    fs::write(dir.join(NETVLAD_WEIGHTS_DIR).join("vgg16.pth"), b"netvlad").unwrap();
}

fn frozen_catalog(model_dir: &Path) -> ComponentCatalog {
    let mut catalog = ComponentCatalog::new();
    let settings = BuiltinSettings {
        model_dir: model_dir.to_path_buf(),
        ..BuiltinSettings::default()
    };
    register_builtin(&mut catalog, &settings).unwrap();
    catalog.freeze();
    catalog
}

#[test]
fn test_builtin_chain_runs_end_to_end() {
    let models = tempfile::tempdir().unwrap();
    let images = tempfile::tempdir().unwrap();
    write_models(models.path());
    for name in ["0001.jpg", "0002.jpg", "0003.png"] {
        fs::write(images.path().join(name), b"img").unwrap();
    }

    let catalog = frozen_catalog(models.path());
    let snapshot = CapabilitySnapshot::cpu_only(PlatformClass::Linux);

    let mut extractor = catalog.create::<Extraction>(SUPERPOINT).unwrap();
    let mut matcher = catalog.create::<Matching>(SUPERGLUE).unwrap();
    let mut densifier = catalog.create::<DenseReconstruction>(MVSNET).unwrap();
    extractor.initialize(&snapshot).unwrap();
    matcher.initialize(&snapshot).unwrap();
    densifier.initialize(&snapshot).unwrap();

    let image_set = ImageSet::scan(images.path()).unwrap();
    let features = extractor.extract(&image_set).unwrap();
    assert_eq!(features.images.len(), 3);
    assert_eq!(features.extractor, SUPERPOINT);

    let matches = matcher.match_features(&features).unwrap();
    assert_eq!(matches.pairs.len(), 3);

    let summary = densifier.densify(&matches, images.path()).unwrap();
    assert_eq!(summary.views, 3);
    assert_eq!(summary.densifier, MVSNET);
}

#[test]
fn test_missing_weights_fail_initialization() {
    let models = tempfile::tempdir().unwrap();
    let catalog = frozen_catalog(models.path());
    let snapshot = CapabilitySnapshot::cpu_only(PlatformClass::Linux);

    for name in [SUPERPOINT, NETVLAD] {
        let mut extractor = catalog.create::<Extraction>(name).unwrap();
        let err = extractor.initialize(&snapshot).unwrap_err();
        assert!(matches!(err, InitError::MissingWeights { .. }), "{}: {}", name, err);
        assert!(!extractor.is_initialized());
    }
}

#[test]
fn test_netvlad_emits_global_descriptors() {
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());
    let catalog = frozen_catalog(models.path());

    let mut extractor = catalog.create::<Extraction>(NETVLAD).unwrap();
    extractor
        .initialize(&CapabilitySnapshot::with_accelerator(
            PlatformClass::Linux,
            "NVIDIA RTX A4000",
            ComputeBackend::Cuda,
        ))
        .unwrap();

    let images = ImageSet {
        root: models.path().to_path_buf(),
        images: vec![models.path().join("a.jpg")],
    };
    let features = extractor.extract(&images).unwrap();
    assert!(features.images[0].global_descriptor.is_some());
}

#[test]
fn test_instances_are_independent() {
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());
    let catalog = frozen_catalog(models.path());

    let mut first = catalog.create::<Matching>(SUPERGLUE).unwrap();
    let second = catalog.create::<Matching>(SUPERGLUE).unwrap();
    first
        .initialize(&CapabilitySnapshot::cpu_only(PlatformClass::Linux))
        .unwrap();

    assert!(first.is_initialized());
    assert!(!second.is_initialized());
}

#[test]
fn test_required_accelerator_missing() {
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());

    let mut catalog = ComponentCatalog::new();
    let settings = BuiltinSettings {
        model_dir: models.path().to_path_buf(),
        require_accelerator: true,
        ..BuiltinSettings::default()
    };
    register_builtin(&mut catalog, &settings).unwrap();

    let mut extractor = catalog.create::<Extraction>(SUPERPOINT).unwrap();
    let err = extractor
        .initialize(&CapabilitySnapshot::cpu_only(PlatformClass::AppleIntel))
        .unwrap_err();
    assert!(matches!(err, InitError::UnsupportedHardware { .. }));
}

#[test]
fn test_features_serialize() {
    let features = FeatureSet {
        extractor: SUPERPOINT.to_string(),
        images: vec![ImageFeatures::empty("a.jpg")],
    };
    let json = serde_json::to_string(&features).unwrap();
    assert!(json.contains("\"extractor\":\"superpoint\""));

    let back: FeatureSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, features);
}
