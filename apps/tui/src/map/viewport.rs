use crate::domain::Coordinates;

/// Metres per degree of latitude, close enough at city scale.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

const MIN_SPAN_DEGREES: f64 = 0.02;
const PADDING_RATIO: f64 = 0.1;

/// Geographic window drawn by the map widget: x is longitude, y is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Viewport {
    pub fn around(center: Coordinates, span: f64) -> Self {
        let half = span.max(MIN_SPAN_DEGREES) / 2.0;
        Self {
            west: center.longitude - half,
            east: center.longitude + half,
            south: center.latitude - half,
            north: center.latitude + half,
        }
    }

    /// Smallest padded window containing every point, or a default window
    /// around `fallback` when there are none.
    pub fn fit<I>(points: I, fallback: Coordinates) -> Self
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::around(fallback, MIN_SPAN_DEGREES * 4.0);
        };

        let mut bounds = Self {
            west: first.longitude,
            east: first.longitude,
            south: first.latitude,
            north: first.latitude,
        };
        for point in points {
            bounds.west = bounds.west.min(point.longitude);
            bounds.east = bounds.east.max(point.longitude);
            bounds.south = bounds.south.min(point.latitude);
            bounds.north = bounds.north.max(point.latitude);
        }

        let span = (bounds.east - bounds.west)
            .max(bounds.north - bounds.south)
            .max(MIN_SPAN_DEGREES)
            * PADDING_RATIO.mul_add(2.0, 1.0);
        let center = Coordinates {
            latitude: (bounds.south + bounds.north) / 2.0,
            longitude: (bounds.west + bounds.east) / 2.0,
        };
        Self::around(center, span)
    }

    pub const fn x_bounds(&self) -> [f64; 2] {
        [self.west, self.east]
    }

    pub const fn y_bounds(&self) -> [f64; 2] {
        [self.south, self.north]
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: (self.south + self.north) / 2.0,
            longitude: (self.west + self.east) / 2.0,
        }
    }

    pub fn span(&self) -> f64 {
        (self.east - self.west).max(self.north - self.south)
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.west..=self.east).contains(&point.longitude)
            && (self.south..=self.north).contains(&point.latitude)
    }

    /// Converts a display radius (marker units, where 40 is the largest
    /// marker) into degrees for this window.
    pub fn marker_radius(&self, display_radius: f64) -> f64 {
        self.span() * display_radius / 1000.0
    }
}

pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Coordinates = Coordinates {
        latitude: 15.3647,
        longitude: 75.1239,
    };

    #[test]
    fn empty_set_centres_on_fallback() {
        let viewport = Viewport::fit(std::iter::empty(), CENTER);
        assert!(viewport.contains(CENTER));
        assert!((viewport.center().latitude - CENTER.latitude).abs() < 1e-9);
    }

    #[test]
    fn fit_contains_every_point() {
        let points = [
            Coordinates { latitude: 15.3547, longitude: 75.1339 },
            Coordinates { latitude: 15.3947, longitude: 75.1039 },
            Coordinates { latitude: 15.3847, longitude: 75.1439 },
        ];
        let viewport = Viewport::fit(points, CENTER);
        assert!(points.iter().all(|p| viewport.contains(*p)));
        assert!(viewport.span() >= 0.04);
    }

    #[test]
    fn single_point_gets_minimum_span() {
        let viewport = Viewport::fit([CENTER], CENTER);
        assert!(viewport.span() >= MIN_SPAN_DEGREES);
    }

    #[test]
    fn meters_convert_to_degrees() {
        assert!((meters_to_degrees(METERS_PER_DEGREE) - 1.0).abs() < 1e-12);
    }
}
