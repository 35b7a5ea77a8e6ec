use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_FEED_URL, MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS, RECONNECT_MAX_DELAY_MS,
};
use crate::error::ConfigError;
use crate::net::ReconnectPolicy;

/// Live aircraft feed client configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Aircraft tracking endpoint. http(s):// is rewritten to ws(s)://.
    #[arg(long, value_name = "URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Reconnect attempts before giving up for the session
    #[arg(long, default_value_t = MAX_RECONNECT_ATTEMPTS)]
    pub max_reconnect_attempts: u32,

    /// First reconnect delay in milliseconds (doubles per attempt)
    #[arg(long, value_name = "MS", default_value_t = RECONNECT_BASE_MS)]
    pub backoff_base_ms: u64,

    /// Longest reconnect delay in milliseconds
    #[arg(long, value_name = "MS", default_value_t = RECONNECT_MAX_DELAY_MS)]
    pub backoff_max_ms: u64,

    /// Status logging interval in seconds, <= 0 to disable
    #[arg(long, default_value_t = 15, allow_negative_numbers = true)]
    pub status_interval: i32,

    /// Directory to keep an aircraft.json marker snapshot in
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<String>,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Endpoint with a scheme a WebSocket client can dial
    pub fn feed_endpoint(&self) -> Result<String, ConfigError> {
        normalize_feed_url(&self.feed_url)
    }

    pub fn reconnect_policy(&self) -> Result<ReconnectPolicy, ConfigError> {
        if self.backoff_base_ms == 0 {
            return Err(ConfigError::InvalidBackoff {
                reason: "base delay must be at least 1ms".to_string(),
            });
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(ConfigError::InvalidBackoff {
                reason: format!(
                    "max delay {}ms is below base delay {}ms",
                    self.backoff_max_ms, self.backoff_base_ms
                ),
            });
        }
        Ok(ReconnectPolicy::new(
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_max_ms),
            self.max_reconnect_attempts,
        ))
    }

    /// Status log period, None when disabled
    pub fn status_period(&self) -> Option<Duration> {
        (self.status_interval > 0).then(|| Duration::from_secs(self.status_interval as u64))
    }
}

/// Map http(s) to ws(s); keep ws(s); reject everything else.
pub fn normalize_feed_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();

    for (from, to) in [("https://", "wss://"), ("http://", "ws://")] {
        if lower.starts_with(from) {
            return Ok(format!("{}{}", to, &trimmed[from.len()..]));
        }
    }
    if lower.starts_with("wss://") || lower.starts_with("ws://") {
        return Ok(trimmed.to_string());
    }
    Err(ConfigError::UnsupportedScheme {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["horizon-feed"]);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.status_period(), Some(Duration::from_secs(15)));
        assert!(config.work_dir.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_https_becomes_wss() {
        assert_eq!(
            normalize_feed_url("https://horizon-backend-4f8h.onrender.com").unwrap(),
            "wss://horizon-backend-4f8h.onrender.com"
        );
        assert_eq!(
            normalize_feed_url("HTTP://localhost:8080/feed").unwrap(),
            "ws://localhost:8080/feed"
        );
    }

    #[test]
    fn test_ws_passes_through() {
        assert_eq!(normalize_feed_url(" ws://127.0.0.1:3000 ").unwrap(), "ws://127.0.0.1:3000");
        assert_eq!(normalize_feed_url("wss://example.org").unwrap(), "wss://example.org");
    }

    #[test]
    fn test_other_scheme_rejected() {
        assert!(matches!(
            normalize_feed_url("ftp://example.org"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(normalize_feed_url("example.org").is_err());
    }

    #[test]
    fn test_policy_from_flags() {
        let config = Config::parse_from([
            "horizon-feed",
            "--max-reconnect-attempts",
            "2",
            "--backoff-base-ms",
            "10",
            "--backoff-max-ms",
            "15",
        ]);
        let mut policy = config.reconnect_policy().unwrap();
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(15)));
        assert_eq!(policy.next_delay(), None);
    }

    #[test]
    fn test_invalid_backoff() {
        let config = Config::parse_from(["horizon-feed", "--backoff-base-ms", "0"]);
        assert!(config.reconnect_policy().is_err());

        let config = Config::parse_from([
            "horizon-feed",
            "--backoff-base-ms",
            "500",
            "--backoff-max-ms",
            "100",
        ]);
        assert!(config.reconnect_policy().is_err());
    }

    #[test]
    fn test_status_disabled() {
        let config = Config::parse_from(["horizon-feed", "--status-interval", "-1"]);
        assert_eq!(config.status_period(), None);
    }
}
