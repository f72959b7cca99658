//! Process handling, using `true` and `false` as stand-in engine binaries

use colmap_neural_engine::*;

fn request() -> ReconstructionRequest {
    let dir = std::env::temp_dir();
    ReconstructionRequest::new(dir.join("images"), dir.join("out"))
}

#[cfg(unix)]
#[test]
fn test_successful_run() {
    let mut engine = ColmapEngine::new("true");
    engine.start(&request()).unwrap();
    assert!(engine.is_running());

    let report = engine.wait().unwrap();
    assert_eq!(report.exit_code, Some(0));
    assert!(report.command.starts_with("true automatic_reconstructor"));
    assert!(!engine.is_running());
}

#[cfg(unix)]
#[test]
fn test_non_zero_exit_is_failure() {
    let mut engine = ColmapEngine::new("false");
    engine.start(&request()).unwrap();

    match engine.wait() {
        Err(EngineError::Failed { status }) => assert_eq!(status.code(), Some(1)),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_start_twice() {
    let mut engine = ColmapEngine::new("true");
    engine.start(&request()).unwrap();
    assert!(matches!(engine.start(&request()), Err(EngineError::AlreadyRunning)));
    engine.wait().unwrap();

    // engine is reusable once the job is collected
    engine.start(&request()).unwrap();
    engine.wait().unwrap();
}

#[test]
fn test_missing_binary() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = ColmapEngine::new(dir.path().join("no-such-colmap"));

    let err = engine.start(&request()).unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }));
    assert!(err.to_string().contains("no-such-colmap"));
    assert!(matches!(engine.wait(), Err(EngineError::NotStarted)));
}

#[test]
fn test_request_serializes() {
    let json = serde_json::to_value(request().with_quality(Quality::Extreme)).unwrap();
    assert_eq!(json["quality"], "extreme");
    assert_eq!(json["data_type"], "individual");
    assert_eq!(json["num_threads"], serde_json::Value::Null);
}
