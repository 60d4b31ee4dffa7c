//! Angle wrapping helpers.

use std::f64::consts::TAU;

/// Wrap an angle in radians into `[0, 2π)`.
///
/// `rem_euclid` can round tiny negative inputs up to exactly `2π`; those are
/// folded back to `0` so the half-open range always holds.
pub fn normalize_angle(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn signed_degrees(degrees: f64) -> f64 {
    let wrapped = normalize_degrees(degrees);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
