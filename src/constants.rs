// Shared constants for the aircraft feed client

/// Tracking backend the live map connects to when no URL is given.
pub const DEFAULT_FEED_URL: &str = "wss://horizon-backend-4f8h.onrender.com";

/// First reconnect delay (ms). Doubles on every consecutive attempt.
pub const RECONNECT_BASE_MS: u64 = 1000;

/// Upper bound on a single reconnect delay (ms).
pub const RECONNECT_MAX_DELAY_MS: u64 = 30_000;

/// Reconnect attempts allowed before the session gives up for good.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// How long an on-screen notification stays visible (s).
pub const NOTIFICATION_DISMISS_SECS: u64 = 4;

/// Interval between aircraft.json rewrites when a work dir is configured (s).
pub const SNAPSHOT_INTERVAL_SECS: u64 = 5;

/// Value shown in a popup for a missing attribute.
pub const UNKNOWN: &str = "Unknown";
