use serde::{Deserialize, Serialize};
use std::fmt::Display;

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns the coordinate only if both components are finite and in range.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let c = Self::new(lat, lng);
        c.is_valid().then_some(c)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let c = Coordinate::new(19.78, -70.68);
        assert_eq!(c.distance_to(&c), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
        assert!((d - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_checked_rejects_out_of_range_and_nan() {
        assert!(Coordinate::checked(19.78, -70.68).is_some());
        assert!(Coordinate::checked(91.0, 0.0).is_none());
        assert!(Coordinate::checked(0.0, -180.5).is_none());
        assert!(Coordinate::checked(f64::NAN, 0.0).is_none());
    }
}
