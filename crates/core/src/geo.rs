use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
    #[error("coordinate component is not a finite number")]
    NotFinite,
}

/// A validated point in signed decimal degrees. Out-of-range input is a
/// caller error and is rejected here rather than silently coerced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Circular boundary around the office reference point. Pure and
/// deterministic: no I/O, no retries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geofence {
    center: Coordinate,
    radius_m: f64,
}

impl Geofence {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Great-circle distance from the office reference point, in meters.
    pub fn distance_m(&self, point: Coordinate) -> f64 {
        haversine_m(self.center, point)
    }

    /// True iff the point lies within the radius (inclusive boundary).
    pub fn contains(&self, point: Coordinate) -> bool {
        self.distance_m(point) <= self.radius_m
    }
}

fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, CoordinateError, Geofence};

    fn office() -> Coordinate {
        Coordinate::new(57.1521, 65.5921).expect("valid office point")
    }

    #[test]
    fn office_point_is_inside_for_any_nonnegative_radius() {
        let point = office();
        assert!(Geofence::new(office(), 0.0).contains(point));
        assert!(Geofence::new(office(), 100.0).contains(point));
    }

    #[test]
    fn containment_is_monotonic_in_radius() {
        // ~500m north of the office.
        let away = Coordinate::new(57.1566, 65.5921).expect("valid point");
        let distance = Geofence::new(office(), 0.0).distance_m(away);
        assert!(distance > 400.0 && distance < 600.0, "unexpected distance {distance}");

        assert!(!Geofence::new(office(), 100.0).contains(away));
        assert!(Geofence::new(office(), 1_000.0).contains(away));
    }

    #[test]
    fn boundary_is_inclusive() {
        let away = Coordinate::new(57.1566, 65.5921).expect("valid point");
        let distance = Geofence::new(office(), 0.0).distance_m(away);
        assert!(Geofence::new(office(), distance).contains(away));
    }

    #[test]
    fn known_city_pair_distance_is_plausible() {
        // Minneapolis to St. Paul, roughly 16 km.
        let minneapolis = Coordinate::new(44.98, -93.27).expect("valid point");
        let st_paul = Coordinate::new(44.95, -93.09).expect("valid point");
        let distance = Geofence::new(minneapolis, 0.0).distance_m(st_paul);
        assert!(distance > 15_000.0 && distance < 17_000.0);
    }

    #[test]
    fn longitude_wrap_needs_no_special_casing() {
        let west = Coordinate::new(0.0, 179.9).expect("valid point");
        let east = Coordinate::new(0.0, -179.9).expect("valid point");
        let distance = Geofence::new(west, 0.0).distance_m(east);
        // 0.2 degrees across the antimeridian, ~22 km, not ~40000 km.
        assert!(distance < 30_000.0, "wrap distance {distance}");
    }

    #[test]
    fn rejects_out_of_range_and_non_finite_input() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NotFinite));
    }
}
