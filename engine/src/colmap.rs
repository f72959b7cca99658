//! COLMAP subprocess adapter
//!
//! Runs `colmap automatic_reconstructor` as a child process. The child's
//! stdout and stderr are inherited so the engine's own progress output
//! reaches the user unchanged.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::{EngineReport, ReconstructionEngine, ReconstructionRequest};

/// Default executable name, resolved through `PATH`
pub const DEFAULT_BINARY: &str = "colmap";
pub const AUTOMATIC_RECONSTRUCTOR: &str = "automatic_reconstructor";

struct RunningJob {
    child: Child,
    command: String,
    started: Instant,
}

impl RunningJob {
    /// Kill the child and reap it
    fn terminate(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct ColmapEngine {
    binary: PathBuf,
    job: Option<RunningJob>,
}

impl ColmapEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            job: None,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Arguments passed to the executable for `request`
    pub fn arguments(&self, request: &ReconstructionRequest) -> Vec<OsString> {
        let flag = |on: bool| OsString::from(if on { "1" } else { "0" });

        let mut args: Vec<OsString> = vec![
            AUTOMATIC_RECONSTRUCTOR.into(),
            "--image_path".into(),
            request.image_path.clone().into_os_string(),
            "--workspace_path".into(),
            request.workspace_path.clone().into_os_string(),
            "--data_type".into(),
            request.data_type.as_str().into(),
            "--quality".into(),
            request.quality.as_str().into(),
            "--dense".into(),
            flag(request.dense),
            "--use_gpu".into(),
            flag(request.use_gpu),
        ];

        if let Some(threads) = request.num_threads {
            args.push("--num_threads".into());
            args.push(threads.to_string().into());
        }
        args
    }

    /// Full command line, for logs
    pub fn command_line(&self, request: &ReconstructionRequest) -> String {
        std::iter::once(self.binary.as_os_str().to_os_string())
            .chain(self.arguments(request))
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ColmapEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl std::fmt::Debug for ColmapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColmapEngine")
            .field("binary", &self.binary)
            .field("running", &self.is_running())
            .finish()
    }
}

impl ReconstructionEngine for ColmapEngine {
    fn name(&self) -> &str {
        DEFAULT_BINARY
    }

    fn start(&mut self, request: &ReconstructionRequest) -> Result<()> {
        if self.job.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let command = self.command_line(request);
        info!("Launching: {}", command);

        let child = Command::new(&self.binary)
            .args(self.arguments(request))
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        debug!("Engine started with pid {}", child.id());
        self.job = Some(RunningJob {
            child,
            command,
            started: Instant::now(),
        });
        Ok(())
    }

    fn wait(&mut self) -> Result<EngineReport> {
        let mut job = self.job.take().ok_or(EngineError::NotStarted)?;
        let status = match job.child.wait() {
            Ok(status) => status,
            Err(e) => {
                warn!("Lost track of engine pid {}, terminating it", job.child.id());
                job.terminate();
                return Err(EngineError::Wait(e));
            }
        };
        let elapsed = job.started.elapsed();

        if !status.success() {
            return Err(EngineError::Failed { status });
        }

        info!("Engine finished in {:.1}s", elapsed.as_secs_f64());
        Ok(EngineReport {
            engine: DEFAULT_BINARY.to_string(),
            command: job.command,
            exit_code: status.code(),
            elapsed,
        })
    }
}

impl Drop for ColmapEngine {
    fn drop(&mut self) {
        if let Some(mut job) = self.job.take() {
            warn!("Engine dropped while running, terminating pid {}", job.child.id());
            job.terminate();
        }
    }
}
