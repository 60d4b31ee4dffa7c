//! Spherical ↔ Cartesian conversion on a Y-up unit sphere.
//!
//! Latitude is measured from the XZ plane toward +Y; longitude is measured in
//! the XZ plane from +X toward +Z:
//!
//! - `lat = asin(y / r)`
//! - `lon = atan2(z, x)`

use crate::Vector3;

/// Convert a direction to `(latitude, longitude)` in degrees.
///
/// Latitude lies in `[-90, 90]`, longitude in `(-180, 180]`. Returns `None`
/// for a zero-length or non-finite vector, where the angles are undefined.
pub fn cartesian_to_spherical(v: Vector3) -> Option<(f64, f64)> {
    let r = v.length();
    if r == 0.0 || !r.is_finite() {
        return None;
    }
    let latitude = (v.y / r).clamp(-1.0, 1.0).asin().to_degrees();
    let longitude = v.z.atan2(v.x).to_degrees();
    Some((latitude, longitude))
}

/// Unit vector for a `(latitude, longitude)` pair in degrees.
pub fn spherical_to_cartesian(latitude_deg: f64, longitude_deg: f64) -> Vector3 {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    Vector3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin())
}
