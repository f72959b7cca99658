use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use colmap_neural::{execute, logging, CliArgs};

fn main() -> ExitCode {
    let log = match logging::init() {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: {:#}", e);
            None
        }
    };

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    info!("Starting colmap-neural v{}", env!("CARGO_PKG_VERSION"));

    match execute(&args, log.as_ref()) {
        Ok(report) => {
            info!("Finished in {} mode", report.mode);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
