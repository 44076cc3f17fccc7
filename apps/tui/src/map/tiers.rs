use crate::domain::{Category, Urgency};
use ratatui::style::Color;

/// Five colour tiers for hotspot volume, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityTier {
    Minimal,
    Low,
    Medium,
    High,
    Severe,
}

/// Lower bound of each tier, checked from the top.
pub const TIER_THRESHOLDS: [(u32, SeverityTier); 5] = [
    (25, SeverityTier::Severe),
    (12, SeverityTier::High),
    (6, SeverityTier::Medium),
    (3, SeverityTier::Low),
    (0, SeverityTier::Minimal),
];

pub const MAX_MARKER_RADIUS: f64 = 40.0;

impl SeverityTier {
    pub const ALL: [Self; 5] = [
        Self::Severe,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Minimal,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Severe => "Severe",
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::Severe => Color::Rgb(239, 68, 68),
            Self::High => Color::Rgb(249, 115, 22),
            Self::Medium => Color::Rgb(234, 179, 8),
            Self::Low => Color::Rgb(34, 197, 94),
            Self::Minimal => Color::Rgb(59, 130, 246),
        }
    }
}

pub fn hotspot_tier(count: u32) -> SeverityTier {
    TIER_THRESHOLDS
        .iter()
        .find(|(floor, _)| count >= *floor)
        .map_or(SeverityTier::Minimal, |(_, tier)| *tier)
}

/// Display radius for a hotspot: grows logarithmically and caps at
/// [`MAX_MARKER_RADIUS`].
pub fn hotspot_radius(count: u32) -> f64 {
    (f64::from(count) + 1.0)
        .log2()
        .mul_add(4.0, 8.0)
        .min(MAX_MARKER_RADIUS)
}

pub const fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Critical => Color::Magenta,
        Urgency::High => Color::Red,
        Urgency::Medium => Color::Yellow,
        Urgency::Low => Color::Green,
    }
}

pub const fn category_color(category: &Category) -> Color {
    match category {
        Category::Pothole => Color::Red,
        Category::Garbage => Color::Green,
        Category::Drainage => Color::Blue,
        Category::Hazard => Color::Rgb(249, 115, 22),
        Category::Electricity => Color::Cyan,
        Category::Unknown | Category::Other(_) => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(hotspot_tier(0), SeverityTier::Minimal);
        assert_eq!(hotspot_tier(2), SeverityTier::Minimal);
        assert_eq!(hotspot_tier(3), SeverityTier::Low);
        assert_eq!(hotspot_tier(6), SeverityTier::Medium);
        assert_eq!(hotspot_tier(11), SeverityTier::Medium);
        assert_eq!(hotspot_tier(12), SeverityTier::High);
        assert_eq!(hotspot_tier(24), SeverityTier::High);
        assert_eq!(hotspot_tier(25), SeverityTier::Severe);
        assert_eq!(hotspot_tier(u32::MAX), SeverityTier::Severe);
    }

    #[test]
    fn tier_is_monotonic_in_count() {
        let mut previous = hotspot_tier(0);
        for count in 1..=60 {
            let tier = hotspot_tier(count);
            assert!(tier >= previous, "tier dropped at count {count}");
            previous = tier;
        }
    }

    #[test]
    fn every_tier_has_a_distinct_color() {
        let mut colors: Vec<_> = SeverityTier::ALL.iter().map(|t| t.color()).collect();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    #[test]
    fn radius_grows_and_caps() {
        assert!((hotspot_radius(0) - 8.0).abs() < 1e-9);
        assert!((hotspot_radius(3) - 16.0).abs() < 1e-9);
        assert!(hotspot_radius(10) < hotspot_radius(100));
        assert!((hotspot_radius(u32::MAX) - MAX_MARKER_RADIUS).abs() < 1e-9);
    }
}
