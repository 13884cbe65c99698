//! Algoscope playback server
//!
//! Load a starter run and serve the playback API.

use algoscope_steps::sorting::SortAlgorithm;
use algoscope_vis::{AppState, RunRequest, VisConfig, VisServer};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = VisConfig::from_args(env::args().skip(1));
    let port = config.port;

    println!("Algoscope");
    println!("=========");
    println!();
    println!("  Seed: {}", config.seed);
    println!("  Speed: {}ms per step", config.playback.speed_ms);

    let state = AppState::new(config);
    let starter = RunRequest::Sorting {
        algorithm: SortAlgorithm::Bubble,
        input: vec![5, 2, 8, 1, 9, 3],
    };
    let status = state.run(&starter).await?;
    println!("  Loaded bubble sort: {} steps", status.total_steps);
    println!();
    println!("Starting playback server on http://localhost:{}", port);
    println!();

    VisServer::new(state).serve(port).await?;

    Ok(())
}
