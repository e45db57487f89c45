use anyhow::{Context, Result};
use gaze_daemon::{
    collector::SysinfoProvider,
    config::Config,
    logging,
    server::{shutdown_signal, AppState, HttpServer},
};
use std::sync::Arc;
use tracing::{info, warn};

fn load_config() -> Config {
    let config_path = Config::config_path();
    if config_path.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!(
                "Failed to load config {:?}: {}, using defaults",
                config_path, e
            );
            Config::default()
        })
    } else {
        info!("No config file found, using defaults");
        Config::default()
    }
}

fn print_banner(port: u16) {
    println!("------------------------------------");
    println!(" GAZE ENGINE IS RUNNING ");
    println!(" URL: http://localhost:{}", port);
    println!("------------------------------------");
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    info!("Gaze daemon starting...");

    let config = load_config();
    let addr = config.server.addr();

    let state = AppState::new(Arc::new(SysinfoProvider::new()), &config);
    let server = HttpServer::bind(addr, state)
        .await
        .with_context(|| format!("binding {}", addr))?;

    print_banner(config.server.port);
    server
        .serve(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Gaze daemon stopped");
    Ok(())
}
