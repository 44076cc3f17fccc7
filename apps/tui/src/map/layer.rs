use crate::domain::{ComplaintRecord, Coordinates, HotspotRecord};
use crate::map::tiers::{hotspot_radius, hotspot_tier, urgency_color};
use ratatui::style::Color;
use std::sync::Arc;

/// Fixed display radius of a single complaint.
pub const COMPLAINT_MARKER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub color: Color,
    pub radius: f64,
    pub pulsing: bool,
    pub label: String,
}

/// Anything the map can draw.
pub trait MapFeature {
    fn marker(&self) -> Marker;
}

impl MapFeature for ComplaintRecord {
    fn marker(&self) -> Marker {
        Marker {
            position: self.coordinates,
            color: urgency_color(self.urgency),
            radius: COMPLAINT_MARKER_RADIUS,
            pulsing: self.urgency.is_priority(),
            label: format!("{} · {}", self.category.label(), self.area),
        }
    }
}

impl MapFeature for HotspotRecord {
    fn marker(&self) -> Marker {
        Marker {
            position: self.coordinates,
            color: hotspot_tier(self.count).color(),
            radius: hotspot_radius(self.count),
            pulsing: self.avg_urgency.is_priority(),
            label: format!("{} ({})", self.area, self.count),
        }
    }
}

/// Markers built from one snapshot of records.
///
/// The layer remembers which snapshot it was built from. Syncing with a
/// different snapshot drops every marker and rebuilds from scratch; syncing
/// with the same one is a no-op.
#[derive(Debug)]
pub struct MarkerLayer<T> {
    snapshot: Option<Arc<[T]>>,
    markers: Vec<Marker>,
    rebuilds: u64,
}

impl<T> Default for MarkerLayer<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            markers: Vec::new(),
            rebuilds: 0,
        }
    }
}

impl<T: MapFeature> MarkerLayer<T> {
    /// Returns `true` when the markers were rebuilt.
    pub fn sync(&mut self, snapshot: &Arc<[T]>) -> bool {
        if self
            .snapshot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, snapshot))
        {
            return false;
        }

        self.markers.clear();
        self.markers
            .extend(snapshot.iter().map(MapFeature::marker));
        self.snapshot = Some(Arc::clone(snapshot));
        self.rebuilds += 1;
        true
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn records(&self) -> &[T] {
        self.snapshot.as_deref().unwrap_or(&[])
    }

    pub const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, RecordId, RecordSource, Urgency};
    use crate::map::tiers::SeverityTier;

    fn hotspot(area: &str, count: u32, urgency: Urgency) -> HotspotRecord {
        HotspotRecord {
            area: area.to_string(),
            coordinates: Coordinates {
                latitude: 15.36,
                longitude: 75.12,
            },
            count,
            avg_urgency: urgency,
            avg_urgency_score: None,
            sample_text: String::new(),
        }
    }

    #[test]
    fn same_snapshot_is_not_rebuilt() {
        let snapshot: Arc<[HotspotRecord]> = vec![hotspot("A", 3, Urgency::Low)].into();
        let mut layer = MarkerLayer::default();

        assert!(layer.sync(&snapshot));
        assert!(!layer.sync(&snapshot));
        assert_eq!(layer.rebuilds(), 1);
    }

    #[test]
    fn new_snapshot_replaces_all_markers() {
        let first: Arc<[HotspotRecord]> = vec![
            hotspot("A", 3, Urgency::Low),
            hotspot("B", 30, Urgency::High),
        ]
        .into();
        let second: Arc<[HotspotRecord]> = vec![hotspot("C", 7, Urgency::Medium)].into();
        let mut layer = MarkerLayer::default();

        layer.sync(&first);
        assert_eq!(layer.markers().len(), 2);
        assert!(layer.sync(&second));

        assert_eq!(layer.markers().len(), 1);
        assert_eq!(layer.markers()[0].label, "C (7)");
        assert_eq!(layer.records().len(), 1);
    }

    #[test]
    fn equal_contents_in_a_new_allocation_still_rebuild() {
        let first: Arc<[HotspotRecord]> = vec![hotspot("A", 3, Urgency::Low)].into();
        let copy: Arc<[HotspotRecord]> = first.to_vec().into();
        let mut layer = MarkerLayer::default();

        layer.sync(&first);
        assert!(layer.sync(&copy));
        assert_eq!(layer.rebuilds(), 2);
    }

    #[test]
    fn hotspot_marker_uses_tier_and_priority() {
        let marker = hotspot("Market", 25, Urgency::High).marker();
        assert_eq!(marker.color, SeverityTier::Severe.color());
        assert!(marker.pulsing);

        let quiet = hotspot("Lane", 1, Urgency::Low).marker();
        assert_eq!(quiet.color, SeverityTier::Minimal.color());
        assert!(!quiet.pulsing);
    }

    #[test]
    fn complaint_marker_uses_urgency() {
        let record = ComplaintRecord {
            id: RecordId::Number(1),
            coordinates: Coordinates {
                latitude: 15.3,
                longitude: 75.1,
            },
            category: Category::Drainage,
            urgency: Urgency::Critical,
            area: "Hubli West".to_string(),
            text: "Waterlogging".to_string(),
            source: RecordSource::LiveMap,
        };
        let marker = record.marker();
        assert_eq!(marker.color, Color::Magenta);
        assert!(marker.pulsing);
        assert_eq!(marker.label, "Drainage · Hubli West");
    }
}
