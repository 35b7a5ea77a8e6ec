// Horizon live aircraft feed - Main Entry Point
// Copyright (C) 2024 - Horizon live map client
// Licensed under AGPL v3

use std::path::PathBuf;

use clap::Parser;
use horizon_feed::config::Config;
use horizon_feed::display::MarkerLayer;
use horizon_feed::net::FeedClient;
use horizon_feed::notify::TracingNotifier;
use horizon_feed::status::{status_line, StatusReporter};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    let endpoint = config.feed_endpoint()?;
    if endpoint != config.feed_url.trim() {
        info!("Using {} for feed URL {}", endpoint, config.feed_url);
    }
    let policy = config.reconnect_policy()?;

    // One client per session; the layer handle is shared with the reporter
    let layer = MarkerLayer::new();
    let client = FeedClient::new(endpoint, policy, layer.clone(), TracingNotifier::new());
    let status = client.subscribe();

    let shutdown = CancellationToken::new();

    let reporter = StatusReporter {
        log_every: config.status_period(),
        work_dir: config.work_dir.as_ref().map(PathBuf::from),
    };
    let reporter_task = tokio::spawn(reporter.run(status.clone(), layer, shutdown.clone()));
    let mut client_task = tokio::spawn(client.run(shutdown.clone()));

    // Giving up on the feed is not fatal: keep reporting until Ctrl+C
    let mut finished = None;
    tokio::select! {
        result = signal::ctrl_c() => log_signal(result),
        joined = &mut client_task => {
            warn!("Aircraft tracking unavailable for this session; press Ctrl+C to exit");
            finished = Some(joined);
            log_signal(signal::ctrl_c().await);
        }
    }

    // Teardown: closes the socket and drops any pending reconnect
    info!("Shutting down...");
    shutdown.cancel();
    let client = match finished {
        Some(joined) => joined?,
        None => client_task.await?,
    };
    if let Err(e) = reporter_task.await {
        warn!("Status reporter ended abnormally: {}", e);
    }

    info!("Stopped. {}", status_line(&client.status()));

    Ok(())
}

fn log_signal(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
