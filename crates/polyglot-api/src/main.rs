//! Polyglot CLI and webhook server entry point.
//!
//! Binary name: `polyglot`
//!
//! Parses CLI arguments, loads configuration, wires the relay, then either
//! serves the webhook endpoint or runs a one-shot command.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use polyglot_infra::config::load_config;
use polyglot_observe::TracingOptions;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::for_verbosity(cli.verbose);
    tracing_options.otel = cli.otel;
    tracing_options.json = cli.json_logs;
    polyglot_observe::init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    polyglot_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config).await;

    match cli.command {
        Commands::Config => {
            cli::config::show_config(&config, cli.json)?;
        }

        Commands::Results { limit, exceptions } => {
            cli::results::show_results(&config, limit, exceptions, cli.json).await?;
        }

        Commands::Replay { file } => {
            let state = AppState::init(config).await?;
            cli::replay::replay(&state, &file, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            let addr = format!("{}:{}", config.server.host, config.server.port);

            let state = AppState::init(config).await?;
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Polyglot listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/webhooks/intercom")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
