//! Illumination geometry in a body's own rotating frame: sun direction,
//! subsolar point, sun angle, day/night and terminator classification.
//!
//! Everything is evaluated after undoing the body's tilt and spin, so a fixed
//! surface point sees the light sweep across it as the body turns.

use orrery_math::{Matrix4, Vector3, cartesian_to_spherical, spherical_to_cartesian};
use serde::{Deserialize, Serialize};

use crate::body::BodyDescriptor;
use crate::error::{MechanicsError, Result, finite, finite_vector};
use crate::rotation::rotation_state_at;

/// Angle between the surface normal and the star at which the star sets.
pub const HORIZON_DEG: f64 = 90.0;

/// A location on a body's surface, in degrees.
///
/// Latitude is measured toward the body's spin axis (local +Y); longitude is
/// measured in the equatorial plane from local +X toward local +Z.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl SurfacePoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Outward unit normal in the body-fixed frame.
    pub fn normal(self) -> Vector3 {
        spherical_to_cartesian(self.latitude, self.longitude)
    }

    /// Point under a body-frame direction; `None` for a zero vector.
    pub fn from_direction(direction: Vector3) -> Option<Self> {
        cartesian_to_spherical(direction).map(|(latitude, longitude)| Self { longitude, latitude })
    }
}

/// Illumination classification of one surface point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Illumination {
    /// Angle between the local vertical and the star, in degrees `[0, 180]`.
    pub sun_angle_deg: f64,
    pub daylight: bool,
    pub in_terminator: bool,
}

/// Direction to the star in a body's rotating frame.
///
/// `rotation` is the body's rotation-only transform (tilt and spin, no
/// translation). The world-space direction is taken through its inverse.
///
/// # Errors
///
/// Returns [`MechanicsError::Computation`] if the body and star coincide or a
/// non-finite value appears.
pub fn sun_direction_body_frame(
    body_world_pos: Vector3,
    star_world_pos: Vector3,
    rotation: &Matrix4,
) -> Result<Vector3> {
    let to_star = finite_vector(star_world_pos - body_world_pos, "sun direction")?.normalize();
    if to_star == Vector3::ZERO {
        return Err(MechanicsError::Computation {
            quantity: "sun direction (body at star position)",
        });
    }
    let local = rotation.without_translation().inverse().transform_vector(to_star);
    finite_vector(local.normalize(), "body-frame sun direction")
}

/// Direction to the star in `body`'s rotating frame at time `t`.
///
/// `world_position_of` resolves a body's world position; it is how the caller
/// supplies the parent chain. The orientation is taken relative to the
/// ecliptic; moons on parent-equator orbits go through
/// [`crate::BodySystem::sun_direction_in_body_frame`].
pub fn sun_direction_in_body_frame<F>(
    body: &BodyDescriptor,
    t: f64,
    star_world_pos: Vector3,
    world_position_of: F,
) -> Result<Vector3>
where
    F: Fn(&BodyDescriptor, f64) -> Result<Vector3>,
{
    let body_world_pos = world_position_of(body, t)?;
    let rotation = rotation_state_at(body, t)?;
    sun_direction_body_frame(body_world_pos, star_world_pos, &rotation.matrix)
}

/// Surface point where the star is directly overhead.
///
/// `lat = asin(y/r)`, `lon = atan2(z, x)` of the body-frame sun direction.
pub fn find_subsolar_point(sun_dir_body: Vector3) -> Result<SurfacePoint> {
    SurfacePoint::from_direction(sun_dir_body).ok_or(MechanicsError::Computation {
        quantity: "subsolar point",
    })
}

/// Angle in degrees between the surface normal at `point` and the star.
pub fn sun_angle_at(point: SurfacePoint, sun_dir_body: Vector3) -> f64 {
    let cos_angle = point.normal().dot(sun_dir_body.normalize());
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
}

/// The star is above the horizon at `point`.
pub fn is_daylight(point: SurfacePoint, sun_dir_body: Vector3) -> bool {
    sun_angle_at(point, sun_dir_body) < HORIZON_DEG
}

/// `point` lies within `width_deg / 2` of the day/night boundary.
pub fn is_in_terminator(point: SurfacePoint, sun_dir_body: Vector3, width_deg: f64) -> bool {
    (sun_angle_at(point, sun_dir_body) - HORIZON_DEG).abs() < width_deg / 2.0
}

/// Classify `point` against a body-frame sun direction.
pub fn illuminate(point: SurfacePoint, sun_dir_body: Vector3, terminator_width_deg: f64) -> Illumination {
    let sun_angle_deg = sun_angle_at(point, sun_dir_body);
    Illumination {
        sun_angle_deg,
        daylight: sun_angle_deg < HORIZON_DEG,
        in_terminator: (sun_angle_deg - HORIZON_DEG).abs() < terminator_width_deg / 2.0,
    }
}

/// Angular width of a terminator band `width_km` wide on a sphere of radius
/// `radius_km`, in degrees of arc.
pub fn terminator_width_deg(width_km: f64, radius_km: f64) -> Result<f64> {
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(MechanicsError::invalid(
            "radius_km",
            format!("must be positive and finite, got {radius_km}"),
        ));
    }
    if !(width_km.is_finite() && width_km >= 0.0) {
        return Err(MechanicsError::invalid(
            "terminator_width_km",
            format!("must be non-negative and finite, got {width_km}"),
        ));
    }
    finite((width_km / radius_km).to_degrees(), "terminator width")
}
