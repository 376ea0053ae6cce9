mod app_dir;
mod canvas;
mod colourers;
mod config;
mod engine_worker;
mod export;
mod fractals;
mod tour;

use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};

use brotview_bridge::Viewer;

use config::ViewerConfig;
use tour::Tour;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting brotview");

    let config = ViewerConfig::load();
    let (engine, events) = engine_worker::spawn_engine();

    let mut viewer = match Viewer::new(
        engine,
        config.engine_params(),
        config.window_width,
        config.window_height,
        config.tile_size,
    ) {
        Ok(viewer) => viewer,
        Err(e) => {
            error!("Cannot create viewer: {e}");
            return ExitCode::FAILURE;
        }
    };
    viewer.refresh_catalogue();

    let out_dir = config.snapshot_directory();
    let mut tour = Tour::new(
        viewer,
        events,
        Duration::from_millis(config.settle_timeout_ms),
        out_dir.clone(),
    );
    let failures = tour.run(&config.tour);

    // Written back so the defaults can be edited for the next run.
    config.save();

    if failures > 0 {
        warn!(failures, "Tour finished with failures");
        return ExitCode::FAILURE;
    }
    info!("Tour finished, output in {}", out_dir.display());
    ExitCode::SUCCESS
}
