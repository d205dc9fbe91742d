//! eiffelactory - bridge daemon entry point.
//!
//! Loads configuration, sets up logging, connects to RabbitMQ and
//! Artifactory, then consumes until SIGINT or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::info;

use eiffelactory::adapters::{ArtifactoryClient, RabbitMqConnection};
use eiffelactory::application::PublishArtifactHandler;
use eiffelactory::config::AppConfig;
use eiffelactory::domain::eiffel::EventFilter;
use eiffelactory::telemetry;

/// eiffelactory - publish ArtifactPublished events for artifacts stored in Artifactory
#[derive(Parser, Debug)]
#[command(name = "eiffelactory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "eiffelactory.config")]
    config: PathBuf,

    /// Console log filter (overrides RUST_LOG and the configured level)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_from(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    config.validate().context("invalid configuration")?;

    telemetry::init(&config.logging, args.log_level.as_deref())
        .context("failed to initialise logging")?;

    info!(config = %args.config.display(), "Starting eiffelactory");

    let repository = Arc::new(
        ArtifactoryClient::new(&config.artifactory).context("failed to build Artifactory client")?,
    );

    let connection = RabbitMqConnection::connect(&config.rabbitmq)
        .await
        .context("failed to connect to RabbitMQ")?;
    let publisher = match connection.publisher().await {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            connection.close().await;
            return Err(e).context("failed to open publish channel");
        }
    };

    let filter = EventFilter::with_allowed_sources(config.eiffelactory.event_sources_list());
    if !filter.has_allow_list() {
        info!("No event sources configured, trusting every sender");
    }

    let handler = Arc::new(
        PublishArtifactHandler::new(filter, repository, publisher)
            .with_purl_format(config.eiffelactory.purl_format)
            .with_source_name(config.eiffelactory.source_name.clone()),
    );

    let subscription = connection
        .subscribe()
        .await
        .context("failed to subscribe")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sigterm = signal(SignalKind::terminate()).context("failed to register SIGTERM")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to register SIGINT")?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
        let _ = shutdown_tx.send(true);
    });

    let stats = subscription
        .run(handler, shutdown_rx)
        .await
        .context("consumer stopped unexpectedly")?;

    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "eiffelactory stopped"
    );
    Ok(())
}
