// Aircraft reconciliation
// Keeps one display marker per live aircraft id

use std::collections::HashMap;

use tracing::debug;

use crate::aircraft::Aircraft;
use crate::display::{DisplaySurface, MarkerId, MarkerPlacement};

/// A live aircraft and the marker drawn for it
#[derive(Debug, Clone)]
pub struct TrackedAircraft {
    pub marker: MarkerId,
    /// Most recent record received for this id
    pub aircraft: Aircraft,
}

/// Aircraft reconciler - owns the id -> marker mapping
pub struct Reconciler<S: DisplaySurface> {
    /// Map of aircraft id -> tracked marker
    aircraft: HashMap<String, TrackedAircraft>,
    surface: S,
}

impl<S: DisplaySurface> Reconciler<S> {
    pub fn new(surface: S) -> Self {
        Reconciler {
            aircraft: HashMap::new(),
            surface,
        }
    }

    /// Number of tracked aircraft
    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.aircraft.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TrackedAircraft> {
        self.aircraft.get(id)
    }

    /// Create or refresh the marker for one aircraft
    pub fn upsert(&mut self, aircraft: Aircraft) {
        let placement = MarkerPlacement::for_aircraft(&aircraft);

        match self.aircraft.get_mut(&aircraft.id) {
            Some(tracked) => {
                self.surface.update_marker(tracked.marker, placement);
                tracked.aircraft = aircraft;
            }
            None => {
                let marker = self.surface.place_marker(placement);
                debug!("Added new aircraft: {}", aircraft.label());
                self.aircraft
                    .insert(aircraft.id.clone(), TrackedAircraft { marker, aircraft });
            }
        }
    }

    /// Upsert a batch in order; a later record for the same id wins
    pub fn upsert_all(&mut self, batch: Vec<Aircraft>) {
        for aircraft in batch {
            self.upsert(aircraft);
        }
    }

    /// Drop one aircraft. Returns false if it was not tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.aircraft.remove(id) {
            Some(tracked) => {
                self.surface.remove_marker(tracked.marker);
                debug!("Removed aircraft: {}", id);
                true
            }
            None => false,
        }
    }

    /// Detach every marker and forget every aircraft
    pub fn clear(&mut self) {
        if self.aircraft.is_empty() {
            return;
        }
        for (_, tracked) in self.aircraft.drain() {
            self.surface.remove_marker(tracked.marker);
        }
        debug!("Cleared all aircraft markers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MarkerLayer;

    fn reconciler() -> (Reconciler<MarkerLayer>, MarkerLayer) {
        let layer = MarkerLayer::new();
        (Reconciler::new(layer.clone()), layer)
    }

    #[test]
    fn test_upsert_creates_marker() {
        let (mut rec, layer) = reconciler();
        rec.upsert(Aircraft::new("A1", 10.0, 20.0, 90.0));

        assert_eq!(rec.aircraft_count(), 1);
        let marker = rec.get("A1").unwrap().marker;
        let placed = layer.get(marker).unwrap();
        assert_eq!((placed.latitude, placed.longitude, placed.rotation), (10.0, 20.0, 90.0));
        assert_eq!(placed.title, "A1");
        assert_eq!(placed.popup.heading, "90°");
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let (mut rec, layer) = reconciler();
        rec.upsert(Aircraft::new("A1", 10.0, 20.0, 90.0));
        let marker = rec.get("A1").unwrap().marker;

        let mut update = Aircraft::new("A1", 11.0, 21.0, 95.0);
        update.altitude = Some(12000.0);
        rec.upsert(update);

        assert_eq!(rec.aircraft_count(), 1);
        assert_eq!(rec.get("A1").unwrap().marker, marker);
        let placed = layer.get(marker).unwrap();
        assert_eq!((placed.latitude, placed.longitude, placed.rotation), (11.0, 21.0, 95.0));
        assert_eq!(placed.popup.altitude, "12000 ft");
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_batch_last_write_wins() {
        let (mut rec, layer) = reconciler();
        rec.upsert_all(vec![
            Aircraft::new("A1", 1.0, 1.0, 10.0),
            Aircraft::new("A2", 2.0, 2.0, 20.0),
            Aircraft::new("A1", 3.0, 3.0, 30.0),
        ]);

        assert_eq!(rec.aircraft_count(), 2);
        let a1 = layer.get(rec.get("A1").unwrap().marker).unwrap();
        assert_eq!((a1.latitude, a1.rotation), (3.0, 30.0));
    }

    #[test]
    fn test_count_matches_distinct_ids() {
        let (mut rec, layer) = reconciler();
        let ids = ["A", "B", "A", "C", "B", "D", "A"];
        for (i, id) in ids.iter().enumerate() {
            rec.upsert(Aircraft::new(*id, i as f64, i as f64, 0.0));
        }
        assert_eq!(rec.aircraft_count(), 4);
        assert_eq!(layer.len(), 4);
    }

    #[test]
    fn test_remove() {
        let (mut rec, layer) = reconciler();
        rec.upsert(Aircraft::new("A1", 0.0, 0.0, 0.0));
        rec.upsert(Aircraft::new("A2", 0.0, 0.0, 0.0));

        assert!(rec.remove("A1"));
        assert!(!rec.contains("A1"));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut rec, layer) = reconciler();
        rec.upsert(Aircraft::new("A1", 5.0, 6.0, 7.0));
        let before = layer.snapshot();

        assert!(!rec.remove("ZZZ"));
        assert_eq!(rec.aircraft_count(), 1);
        assert_eq!(layer.snapshot(), before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut rec, layer) = reconciler();
        for id in ["A1", "A2", "A3"] {
            rec.upsert(Aircraft::new(id, 0.0, 0.0, 0.0));
        }
        rec.clear();
        assert_eq!(rec.aircraft_count(), 0);
        assert!(layer.is_empty());

        rec.clear();
        assert_eq!(rec.aircraft_count(), 0);
    }

    #[test]
    fn test_readd_after_clear_gets_new_marker() {
        let (mut rec, layer) = reconciler();
        rec.upsert(Aircraft::new("A1", 0.0, 0.0, 0.0));
        let first = rec.get("A1").unwrap().marker;
        rec.clear();
        rec.upsert(Aircraft::new("A1", 0.0, 0.0, 0.0));
        assert_ne!(rec.get("A1").unwrap().marker, first);
        assert_eq!(layer.len(), 1);
    }
}
