//! colmap-neural entry point
//!
//! Wires the configuration file to the orchestrator: register the built-in
//! components, probe capability, initialize the configured stages and run
//! the reconstruction in whichever mode initialization settled on.

use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, info};

use colmap_neural_components::{register_builtin, ComponentCatalog, ModelStore};
use colmap_neural_engine::{ColmapEngine, ReconstructionEngine};
use colmap_neural_hardware::{CapabilityProbe, SystemProbe};
use colmap_neural_orchestrator::{Orchestrator, RunReport};

pub mod cli;
pub mod config;
pub mod logging;

pub use cli::CliArgs;
pub use config::{AppConfig, ConfigError};
pub use logging::LogHandle;

/// Run one reconstruction with an explicit probe and engine.
pub fn run_with(
    config: &AppConfig,
    probe: &dyn CapabilityProbe,
    engine: &mut dyn ReconstructionEngine,
) -> Result<RunReport> {
    let output_path = config.output_path()?;
    fs::create_dir_all(output_path).with_context(|| {
        format!("failed to create output directory {}", output_path.display())
    })?;
    let request = config.request()?;

    let mut catalog = ComponentCatalog::new();
    register_builtin(&mut catalog, &config.builtin_settings())
        .context("failed to register built-in components")?;
    for (category, names) in catalog.summary() {
        debug!("Registered {} components: {:?}", category, names);
    }
    let store = ModelStore::new(config.model_dir());
    for asset in store.missing_assets() {
        debug!(
            "No weights for '{}' at {}, download from {}",
            asset.component,
            store.path_for(asset).display(),
            asset.url
        );
    }

    let mut orchestrator = Orchestrator::new(catalog, config.selection());
    orchestrator.initialize(probe)?;
    debug!(
        "Initialization report: {}",
        serde_json::to_string(&orchestrator.report())?
    );

    let report = orchestrator.run(&request, engine)?;
    info!(
        "Reconstruction written to {} ({} mode)",
        request.workspace_path.display(),
        report.mode
    );
    Ok(report)
}

/// Run against the real platform and the configured engine binary.
pub fn run(config: &AppConfig) -> Result<RunReport> {
    let probe = SystemProbe::new().with_accelerator_allowed(config.neural.use_gpu);
    let mut engine = ColmapEngine::new(&config.colmap.binary);
    run_with(config, &probe, &mut engine)
}

/// Load the config named on the command line and run it.
pub fn execute(args: &CliArgs, log: Option<&LogHandle>) -> Result<RunReport> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("invalid configuration {}", args.config.display()))?;

    if config.logging.debug {
        if let Some(log) = log {
            log.enable_debug()?;
        }
        debug!("Debug logging enabled");
    }
    debug!("Configuration: {:?}", config);

    run(&config)
}
