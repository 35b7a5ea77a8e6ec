// Aircraft records as pushed by the tracking backend

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN;

/// One aircraft as it appears on the feed.
///
/// Every attribute may change between updates; only `id` is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Opaque identifier, unique among live aircraft
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Degrees, 0-360
    pub heading: f64,
    /// Feet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Knots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,
}

impl Aircraft {
    /// Minimal record with only the required attributes set.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, heading: f64) -> Self {
        Aircraft {
            id: id.into(),
            callsign: None,
            latitude,
            longitude,
            heading,
            altitude: None,
            speed: None,
            aircraft_type: None,
        }
    }

    /// Label used for marker titles and popup headlines: callsign, else id.
    pub fn label(&self) -> &str {
        self.callsign.as_deref().unwrap_or(&self.id)
    }

    /// Marker rotation in degrees (the raw heading).
    pub fn rotation(&self) -> f64 {
        self.heading
    }

    /// Detail popup shown when a marker is selected.
    pub fn popup(&self) -> Popup {
        Popup {
            title: self.label().to_string(),
            aircraft_type: self
                .aircraft_type
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            altitude: self
                .altitude
                .map(|ft| format!("{} ft", ft.round() as i64))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            speed: self
                .speed
                .map(|kts| format!("{} kts", kts.round() as i64))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            heading: format!("{}°", self.heading.round() as i64),
            position: format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// Rendered popup fields, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub aircraft_type: String,
    pub altitude: String,
    pub speed: String,
    pub heading: String,
    pub position: String,
}

impl std::fmt::Display for Popup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | Type: {} | Altitude: {} | Speed: {} | Heading: {} | Position: {}",
            self.title, self.aircraft_type, self.altitude, self.speed, self.heading, self.position
        )
    }
}
