//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in miles
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Miles per meter, for converting routing engine responses
pub const MILES_PER_METER: f64 = 0.000_621_371;

/// Calculate great-circle (Haversine) distance between two points in miles
pub fn great_circle_miles(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// Convert meters to miles
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago() -> Coordinates {
        Coordinates { lat: 41.8781, lng: -87.6298 }
    }

    fn dallas() -> Coordinates {
        Coordinates { lat: 32.7767, lng: -96.7970 }
    }

    #[test]
    fn test_great_circle_chicago_dallas() {
        let distance = great_circle_miles(&chicago(), &dallas());

        // Chicago to Dallas is approximately 800 miles as the crow flies
        assert!((distance - 800.0).abs() < 15.0, "got {} miles", distance);
    }

    #[test]
    fn test_great_circle_same_point() {
        let distance = great_circle_miles(&chicago(), &chicago());
        assert!(distance.abs() < 0.001);
    }

    #[test]
    fn test_great_circle_is_symmetric() {
        let there = great_circle_miles(&chicago(), &dallas());
        let back = great_circle_miles(&dallas(), &chicago());
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_meters_to_miles() {
        assert!((meters_to_miles(1609.344) - 1.0).abs() < 0.001);
        assert_eq!(meters_to_miles(0.0), 0.0);
    }
}
