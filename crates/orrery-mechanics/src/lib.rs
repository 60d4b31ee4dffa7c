//! Celestial mechanics engine: orbital position, rotational orientation and
//! body-relative illumination for any configured body at any simulation time.
//!
//! Every query is a pure function of immutable [`BodyDescriptor`]s and a
//! simulation time `t` in days since J2000.0. No derived state is cached, so
//! time may run backwards or jump arbitrarily and concurrent callers need no
//! locking.

mod body;
mod error;
pub mod illumination;
pub mod kepler;
pub mod orbit;
pub mod rotation;
mod system;
pub mod time;

pub use body::{ABSOLUTE_ZERO_C, BodyDescriptor, BodyId, BodyKind, SurfaceConditions};
pub use error::{MechanicsError, Result};
pub use illumination::{
    Illumination, SurfacePoint, find_subsolar_point, is_daylight, is_in_terminator, sun_angle_at,
    sun_direction_body_frame, sun_direction_in_body_frame, terminator_width_deg,
};
pub use kepler::{Eccentricity, KeplerSolution, solve_eccentric_anomaly};
pub use orbit::{
    KM_PER_AU, LengthUnit, OrbitalElements, OrbitalState, ReferencePlane, compute_orbital_state,
};
pub use rotation::{
    Resonance, RotationMode, RotationParameters, RotationState, compute_rotation_state,
    compute_rotation_state_in, equator_frame, rotation_count, rotation_state_at,
};
pub use system::{BodySnapshot, BodySystem, terminator_width_for};
pub use time::{
    J2000_UNIX_SECONDS, calendar_date_to_simulation_time, julian_date, reference_epoch,
    simulation_time_to_calendar_date,
};
