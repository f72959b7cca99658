//! Tracing setup.
//!
//! The filter comes from `RUST_LOG` when set, else `info`. It sits behind a
//! reload layer so `[Logging] debug = true` can raise it once the config
//! file has been read.

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

pub const DEFAULT_FILTER: &str = "info";
pub const DEBUG_FILTER: &str = "debug";

/// Handle to the installed filter
#[derive(Clone)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    pub fn enable_debug(&self) -> Result<()> {
        self.handle
            .reload(EnvFilter::new(DEBUG_FILTER))
            .context("failed to raise log level to debug")
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init() -> Result<LogHandle> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(LogHandle { handle })
}
