//! f64 vectors, 4×4 transforms, angle helpers and spherical coordinates for the orrery engine.

mod angle;
mod matrix;
mod spherical;
mod vector;

pub use angle::{normalize_angle, normalize_degrees, signed_degrees};
pub use matrix::{Matrix4, SINGULAR_DETERMINANT};
pub use spherical::{cartesian_to_spherical, spherical_to_cartesian};
pub use vector::Vector3;
