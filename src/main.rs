//! `circlefit`: interactive smallest-enclosing-circle workbench.

mod config;
mod shell;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    info!(
        scene = %config.scene_path.display(),
        seed_points = config.seed_points,
        seeded = config.rng_seed.is_some(),
        "circlefit starting"
    );

    match shell::run(config) {
        Ok(()) => {
            info!("circlefit closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), "graphics initialisation failed");
            ExitCode::FAILURE
        }
    }
}
