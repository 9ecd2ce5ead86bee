use crate::domain::coordinate::Coordinate;

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub distance_km: f64,
    pub deliverable: bool,
}

/// Great-circle distance between two coordinates in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let half_chord = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let angular_distance = 2.0 * half_chord.sqrt().asin();

    EARTH_RADIUS_KM * angular_distance
}

/// Classifies a product location against the buyer position.
///
/// The boundary is inclusive: a product exactly at its delivery radius is
/// still deliverable.
pub fn classify(buyer: Coordinate, product: Coordinate, delivery_radius_km: f64) -> Classification {
    let distance = distance_km(buyer, product);
    Classification { distance_km: distance, deliverable: distance <= delivery_radius_km }
}
