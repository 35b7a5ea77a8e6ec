// Aircraft feed client
// Connection lifecycle, message dispatch and reconnect loop

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::ReconnectPolicy;
use super::connection::{FeedConnection, Inbound};
use super::messages::FeedMessage;
use crate::display::DisplaySurface;
use crate::error::FeedError;
use crate::notify::{Notification, Notifier};
use crate::reconciler::Reconciler;

/// State of the feed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Reconnect attempts exhausted; stays disconnected for the session
    GaveUp,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::GaveUp => "gave_up",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the client, published on every change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatus {
    pub state: ConnectionState,
    pub aircraft_count: usize,
    pub reconnect_attempts: u32,
}

/// How a pumped connection ended
#[derive(Debug, PartialEq, Eq)]
enum PumpExit {
    Closed,
    Shutdown,
}

/// Live aircraft feed client.
///
/// Owns the connection, the marker reconciler and the reconnect policy.
/// Construct one per session, drive it with [`run`](Self::run) and cancel
/// the token to tear it down.
pub struct FeedClient<S: DisplaySurface, N: Notifier> {
    endpoint: String,
    reconciler: Reconciler<S>,
    notifier: N,
    policy: ReconnectPolicy,
    state: ConnectionState,
    status_tx: watch::Sender<FeedStatus>,
}

impl<S: DisplaySurface, N: Notifier> FeedClient<S, N> {
    pub fn new(endpoint: impl Into<String>, policy: ReconnectPolicy, surface: S, notifier: N) -> Self {
        let (status_tx, _) = watch::channel(FeedStatus {
            state: ConnectionState::Disconnected,
            aircraft_count: 0,
            reconnect_attempts: 0,
        });
        FeedClient {
            endpoint: endpoint.into(),
            reconciler: Reconciler::new(surface),
            notifier,
            policy,
            state: ConnectionState::Disconnected,
            status_tx,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn aircraft_count(&self) -> usize {
        self.reconciler.aircraft_count()
    }

    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            state: self.state,
            aircraft_count: self.reconciler.aircraft_count(),
            reconnect_attempts: self.policy.attempts(),
        }
    }

    /// Watch status changes from another task
    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.status_tx.subscribe()
    }

    /// Run until the token is cancelled or reconnection gives up.
    ///
    /// Only one connection exists at a time: it lives in this loop and is
    /// dropped before the next one is opened. Cancelling the token closes the
    /// socket and abandons any pending reconnect delay. Returns the client so
    /// its final state can be inspected.
    pub async fn run(mut self, shutdown: CancellationToken) -> Self {
        info!("Connecting to aircraft tracking: {}", self.endpoint);

        loop {
            let opened = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.connect() => result,
            };

            let reconnect = match opened {
                Ok(connection) => match self.pump(connection, &shutdown).await {
                    PumpExit::Shutdown => break,
                    PumpExit::Closed => self.on_close(),
                },
                Err(e) => {
                    self.on_error(&e);
                    self.on_close()
                }
            };

            let Some(delay) = reconnect else {
                break;
            };

            let cancelled = tokio::select! {
                biased;
                _ = shutdown.cancelled() => true,
                _ = tokio::time::sleep(delay) => false,
            };
            if cancelled {
                break;
            }
        }

        self.dispose();
        self
    }

    /// Open a connection to the endpoint
    pub async fn connect(&mut self) -> Result<FeedConnection, FeedError> {
        self.set_state(ConnectionState::Connecting);
        let connection = FeedConnection::open(&self.endpoint).await?;
        self.on_open();
        Ok(connection)
    }

    async fn pump(&mut self, mut connection: FeedConnection, shutdown: &CancellationToken) -> PumpExit {
        loop {
            let inbound = tokio::select! {
                biased;
                _ = shutdown.cancelled() => None,
                inbound = connection.next_inbound() => Some(inbound),
            };

            match inbound {
                None => {
                    connection.close().await;
                    return PumpExit::Shutdown;
                }
                Some(Inbound::Payload(Ok(text))) => self.on_message(&text),
                Some(Inbound::Payload(Err(e))) => {
                    error!("Error parsing WebSocket message: {}", e);
                }
                Some(Inbound::Closed) => return PumpExit::Closed,
                Some(Inbound::Error(e)) => {
                    self.on_error(&FeedError::from(e));
                    return PumpExit::Closed;
                }
            }
        }
    }

    /// Connection established
    pub fn on_open(&mut self) {
        info!("Connected to aircraft tracking server");
        self.policy.reset();
        self.set_state(ConnectionState::Connected);
        self.notifier
            .notify(Notification::success("Connected to live aircraft tracking"));
    }

    /// Handle one raw payload. Never fails: malformed input is logged and dropped.
    pub fn on_message(&mut self, raw: &str) {
        match FeedMessage::parse(raw) {
            Ok(message) => self.handle_message(message),
            Err(e) => error!("Error parsing WebSocket message: {}", e),
        }
    }

    /// Apply a decoded message to the tracked aircraft
    pub fn handle_message(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::InitialData(aircraft) => {
                info!("Received initial aircraft data: {} aircraft", aircraft.len());
                self.reconciler.upsert_all(aircraft);
            }
            FeedMessage::AircraftUpdate(aircraft) => {
                debug!("Aircraft update: {} aircraft", aircraft.len());
                self.reconciler.upsert_all(aircraft);
            }
            FeedMessage::AircraftRemoved(id) => {
                debug!("Aircraft removed: {}", id);
                self.reconciler.remove(&id);
            }
            FeedMessage::ServerShutdown => {
                self.reconciler.clear();
                self.notifier
                    .notify(Notification::warning("Server is shutting down"));
            }
            FeedMessage::Unknown(kind) => {
                warn!("Unknown message type: {}", kind);
                return;
            }
        }
        self.publish();
    }

    /// Transport error. Close handling always follows, so no reconnect here.
    pub fn on_error(&mut self, err: &FeedError) {
        error!("WebSocket error: {}", err);
        self.notifier
            .notify(Notification::error("Aircraft tracking connection error"));
    }

    /// Connection gone: drop every aircraft and schedule a reconnect.
    /// Returns the delay before the next attempt, None if giving up.
    pub fn on_close(&mut self) -> Option<Duration> {
        info!("Disconnected from aircraft tracking server");
        self.notifier
            .notify(Notification::warning("Aircraft tracking disconnected"));
        self.reconciler.clear();
        self.set_state(ConnectionState::Disconnected);
        self.schedule_reconnect()
    }

    /// Next reconnect delay per the backoff policy
    pub fn schedule_reconnect(&mut self) -> Option<Duration> {
        match self.policy.next_delay() {
            Some(delay) => {
                info!(
                    "Scheduling reconnect attempt {} in {}ms",
                    self.policy.attempts(),
                    delay.as_millis()
                );
                self.publish();
                Some(delay)
            }
            None => {
                error!(
                    "Giving up on aircraft tracking after {} reconnect attempts",
                    self.policy.max_attempts()
                );
                self.set_state(ConnectionState::GaveUp);
                self.notifier
                    .notify(Notification::error("Failed to reconnect to aircraft tracking"));
                None
            }
        }
    }

    /// Teardown: forget all aircraft and settle the state
    fn dispose(&mut self) {
        self.reconciler.clear();
        if self.state != ConnectionState::GaveUp {
            self.set_state(ConnectionState::Disconnected);
        } else {
            self.publish();
        }
        info!("Aircraft feed client stopped");
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }
}
