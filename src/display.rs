// Display surface abstraction
// The map library is external; markers are driven through the DisplaySurface trait

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::aircraft::{Aircraft, Popup};

/// Handle to a marker owned by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(pub u64);

/// Where and how a marker is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub latitude: f64,
    pub longitude: f64,
    /// Icon rotation in degrees
    pub rotation: f64,
    /// Hover title
    pub title: String,
    pub popup: Popup,
}

impl MarkerPlacement {
    /// Placement for an aircraft: its position, heading as rotation, label as title
    pub fn for_aircraft(aircraft: &Aircraft) -> Self {
        MarkerPlacement {
            latitude: aircraft.latitude,
            longitude: aircraft.longitude,
            rotation: aircraft.rotation(),
            title: aircraft.label().to_string(),
            popup: aircraft.popup(),
        }
    }
}

/// Trait for anything that can show aircraft markers
pub trait DisplaySurface: Send {
    /// Place a new marker and return its handle
    fn place_marker(&mut self, placement: MarkerPlacement) -> MarkerId;

    /// Move/rotate an existing marker and refresh its popup
    fn update_marker(&mut self, marker: MarkerId, placement: MarkerPlacement);

    /// Detach a marker from the surface
    fn remove_marker(&mut self, marker: MarkerId);
}

#[derive(Debug, Default)]
struct LayerInner {
    next_id: u64,
    markers: BTreeMap<MarkerId, MarkerPlacement>,
}

/// In-memory marker layer.
///
/// Clones share the same markers, so one handle can be given to the feed
/// client while another is read for status output.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    inner: Arc<Mutex<LayerInner>>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers currently on the layer
    pub fn len(&self) -> usize {
        self.lock().markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of a single marker's placement
    pub fn get(&self, marker: MarkerId) -> Option<MarkerPlacement> {
        self.lock().markers.get(&marker).cloned()
    }

    /// Copy of every marker, ordered by handle
    pub fn snapshot(&self) -> Vec<(MarkerId, MarkerPlacement)> {
        self.lock()
            .markers
            .iter()
            .map(|(id, placement)| (*id, placement.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LayerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplaySurface for MarkerLayer {
    fn place_marker(&mut self, placement: MarkerPlacement) -> MarkerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = MarkerId(inner.next_id);
        inner.markers.insert(id, placement);
        id
    }

    fn update_marker(&mut self, marker: MarkerId, placement: MarkerPlacement) {
        if let Some(existing) = self.lock().markers.get_mut(&marker) {
            *existing = placement;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.lock().markers.remove(&marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(ac: &Aircraft) -> MarkerPlacement {
        MarkerPlacement::for_aircraft(ac)
    }

    #[test]
    fn test_place_update_remove() {
        let mut layer = MarkerLayer::new();
        let id = layer.place_marker(placement(&Aircraft::new("A1", 10.0, 20.0, 90.0)));
        assert_eq!(layer.len(), 1);

        layer.update_marker(id, placement(&Aircraft::new("A1", 11.0, 21.0, 95.0)));
        let moved = layer.get(id).unwrap();
        assert_eq!((moved.latitude, moved.longitude, moved.rotation), (11.0, 21.0, 95.0));

        layer.remove_marker(id);
        assert!(layer.is_empty());
        assert!(layer.get(id).is_none());
    }

    #[test]
    fn test_handles_are_unique() {
        let mut layer = MarkerLayer::new();
        let a = layer.place_marker(placement(&Aircraft::new("A1", 0.0, 0.0, 0.0)));
        let b = layer.place_marker(placement(&Aircraft::new("A2", 0.0, 0.0, 0.0)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clones_share_markers() {
        let mut layer = MarkerLayer::new();
        let reader = layer.clone();
        layer.place_marker(placement(&Aircraft::new("A1", 0.0, 0.0, 0.0)));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.snapshot()[0].1.title, "A1");
    }

    #[test]
    fn test_update_unknown_marker_is_ignored() {
        let mut layer = MarkerLayer::new();
        layer.update_marker(MarkerId(42), placement(&Aircraft::new("A1", 0.0, 0.0, 0.0)));
        assert!(layer.is_empty());
    }
}
