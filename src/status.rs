// Status reporting
// Periodic status log and aircraft.json snapshot for the running client

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::constants::SNAPSHOT_INTERVAL_SECS;
use crate::display::MarkerLayer;
use crate::net::FeedStatus;

/// One status line, e.g. "Status: connected, 12 aircraft, 0 reconnect attempts"
pub fn status_line(status: &FeedStatus) -> String {
    format!(
        "Status: {}, {} aircraft, {} reconnect attempts",
        status.state, status.aircraft_count, status.reconnect_attempts
    )
}

/// JSON document written to aircraft.json
pub fn snapshot_json(status: &FeedStatus, layer: &MarkerLayer, now: DateTime<Utc>) -> serde_json::Value {
    let markers: Vec<serde_json::Value> = layer
        .snapshot()
        .into_iter()
        .map(|(id, placement)| {
            serde_json::json!({
                "marker": id,
                "title": placement.title,
                "lat": placement.latitude,
                "lon": placement.longitude,
                "rotation": placement.rotation,
                "popup": placement.popup,
            })
        })
        .collect();

    serde_json::json!({
        "generated_at": now.to_rfc3339(),
        "state": status.state.as_str(),
        "reconnect_attempts": status.reconnect_attempts,
        "aircraft": markers,
    })
}

/// Replace `dir/aircraft.json` via a temp file so readers never see a partial write
pub async fn write_snapshot(dir: &Path, value: &serde_json::Value) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    let tmp = dir.join("aircraft.json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, dir.join("aircraft.json")).await
}

/// Status reporter settings
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    /// Status log period; None disables the log line
    pub log_every: Option<Duration>,
    /// Where aircraft.json goes; None disables the snapshot
    pub work_dir: Option<PathBuf>,
}

impl StatusReporter {
    /// Run until shutdown, then write one final snapshot.
    pub async fn run(
        self,
        status: watch::Receiver<FeedStatus>,
        layer: MarkerLayer,
        shutdown: CancellationToken,
    ) {
        if let Some(dir) = &self.work_dir {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                warn!("Cannot create work dir {}: {}", dir.display(), e);
            }
        }

        let mut log_tick = self.log_every.map(|period| {
            let mut t = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            t
        });
        let mut snapshot_tick = tokio::time::interval(Duration::from_secs(SNAPSHOT_INTERVAL_SECS));
        snapshot_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = async {
                    match log_tick.as_mut() {
                        Some(t) => { t.tick().await; }
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    info!("{}", status_line(&status.borrow()));
                }
                _ = snapshot_tick.tick(), if self.work_dir.is_some() => {
                    self.snapshot(&status, &layer).await;
                }
            }
        }

        // Capture the cleared state left behind by teardown
        self.snapshot(&status, &layer).await;
    }

    async fn snapshot(&self, status: &watch::Receiver<FeedStatus>, layer: &MarkerLayer) {
        let Some(dir) = &self.work_dir else {
            return;
        };
        let current = *status.borrow();
        let value = snapshot_json(&current, layer, Utc::now());
        match write_snapshot(dir, &value).await {
            Ok(()) => debug!("Wrote aircraft.json ({} aircraft)", layer.len()),
            Err(e) => warn!("Failed to write aircraft.json: {}", e),
        }
    }
}
