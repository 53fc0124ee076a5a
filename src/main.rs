use std::process::ExitCode;

use clap::Parser;

use httpr::config::Cli;
use httpr::lifecycle::{signals, Shutdown};
use httpr::net::listener;
use httpr::observability::logging;
use httpr::{Error, HttpServer, SharedState};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("httpr: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let Some(config) = cli.into_config()? else {
        println!("httpr (HTTP Rake) version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    logging::init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        mode = if config.is_proxy() { "proxy" } else { "log" },
        upstream = ?config.upstream.as_ref().map(|u| u.as_str()),
        log_format = ?config.log_format,
        response_code = config.response_code,
        delay_ms = config.delay_ms,
        simulate_failure = config.failure.enabled,
        "Configuration loaded"
    );

    let listener = listener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(SharedState::new(config))?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on(signals::wait_for_signal());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
