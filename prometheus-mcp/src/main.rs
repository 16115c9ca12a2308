use args::Args;
use clap::Parser;
use config::Config;
use logger::Output;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    // Configuration errors are reported like stdio-mode logs, on stderr.
    let output = match &config {
        Ok(config) if config.server.transport.is_network() => Output::Stdout,
        _ => Output::Stderr,
    };

    logger::init(&args, output);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    if let Err(e) = server::serve(ServeConfig { config, shutdown }).await {
        log::error!("Server failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Received Ctrl-C, shutting down");
            shutdown.cancel();
        }
        Err(e) => log::warn!("Unable to listen for Ctrl-C, graceful shutdown is disabled: {e}"),
    }
}
