//! Orbital elements, epoch-anchored mean anomaly, and the orbital frame
//! transform into world space.
//!
//! The solver works in the classical ecliptic frame (+Z = ecliptic north).
//! World space is Y-up, reached by the fixed rotation `Rx(−90°)`:
//! `(x, y, z)_ecliptic → (x, z, −y)_world`.

use std::f64::consts::TAU;

use orrery_math::{Matrix4, Vector3, normalize_angle};
use serde::{Deserialize, Serialize};

use crate::body::BodyDescriptor;
use crate::error::{MechanicsError, Result, finite, finite_vector};
use crate::kepler::{self, Eccentricity};

/// Kilometres per astronomical unit (IAU 2012).
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Unit of a semi-major axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    /// Astronomical units, the world-space unit.
    #[default]
    Au,
    /// Kilometres, typical for moons.
    Kilometers,
}

/// The plane a body's inclination and node are measured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferencePlane {
    /// The parent's orbital reference frame (ecliptic-aligned). Moons of
    /// strongly tilted planets are placed relative to the ecliptic, not the
    /// planet's equator.
    #[default]
    ParentOrbit,
    /// The parent's equatorial plane: the offset is additionally rotated by the
    /// parent's equator frame (its orbit plane, pole and tilt; spin excluded).
    ParentEquator,
}

/// Fixed rotation from the ecliptic frame (Z-up) into world space (Y-up).
pub fn ecliptic_to_world(v: Vector3) -> Vector3 {
    Vector3::new(v.x, v.z, -v.y)
}

/// Classical Keplerian elements of a body's orbit around its parent.
///
/// Angles are configured in degrees. Construction and deserialization validate
/// every field, so a value of this type is always usable by the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrbitalElementsDef", into = "OrbitalElementsDef")]
pub struct OrbitalElements {
    semi_major_axis: f64,
    unit: LengthUnit,
    eccentricity: Eccentricity,
    inclination_deg: f64,
    longitude_ascending_node_deg: f64,
    argument_periapsis_deg: f64,
    period_days: f64,
    mean_anomaly_epoch_deg: f64,
    epoch_days: f64,
    reference_plane: ReferencePlane,
}

impl OrbitalElements {
    /// Create an orbit with zero inclination, node, periapsis argument and
    /// mean anomaly at epoch.
    ///
    /// # Errors
    ///
    /// Returns [`MechanicsError::InvalidParameter`] if the semi-major axis is
    /// not positive and finite, or the period is not positive and finite.
    pub fn new(semi_major_axis: f64, eccentricity: f64, period_days: f64) -> Result<Self> {
        if !(semi_major_axis.is_finite() && semi_major_axis > 0.0) {
            return Err(MechanicsError::invalid(
                "semi_major_axis",
                format!("must be positive and finite, got {semi_major_axis}"),
            ));
        }
        if !(period_days.is_finite() && period_days > 0.0) {
            return Err(MechanicsError::invalid(
                "orbital_period_days",
                format!("must be positive and finite, got {period_days}"),
            ));
        }
        Ok(Self {
            semi_major_axis,
            unit: LengthUnit::Au,
            eccentricity: Eccentricity::new(eccentricity)?,
            inclination_deg: 0.0,
            longitude_ascending_node_deg: 0.0,
            argument_periapsis_deg: 0.0,
            period_days,
            mean_anomaly_epoch_deg: 0.0,
            epoch_days: 0.0,
            reference_plane: ReferencePlane::ParentOrbit,
        })
    }

    /// Set inclination, longitude of ascending node and argument of periapsis
    /// (degrees).
    pub fn with_orientation(
        mut self,
        inclination_deg: f64,
        longitude_ascending_node_deg: f64,
        argument_periapsis_deg: f64,
    ) -> Result<Self> {
        self.inclination_deg = finite_angle("inclination", inclination_deg)?;
        self.longitude_ascending_node_deg =
            finite_angle("longitude_ascending_node", longitude_ascending_node_deg)?;
        self.argument_periapsis_deg = finite_angle("argument_periapsis", argument_periapsis_deg)?;
        Ok(self)
    }

    /// Set the mean anomaly (degrees) at the reference epoch.
    pub fn with_mean_anomaly_at_epoch(mut self, degrees: f64) -> Result<Self> {
        self.mean_anomaly_epoch_deg = finite_angle("mean_anomaly_epoch", degrees)?;
        Ok(self)
    }

    /// Set the simulation time (days) at which the epoch mean anomaly holds.
    pub fn with_epoch(mut self, epoch_days: f64) -> Result<Self> {
        self.epoch_days = finite_angle("epoch_days", epoch_days)?;
        Ok(self)
    }

    /// Set the unit of the semi-major axis.
    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the plane the orientation angles are measured against.
    pub fn with_reference_plane(mut self, plane: ReferencePlane) -> Self {
        self.reference_plane = plane;
        self
    }

    /// Semi-major axis as configured, in [`Self::unit`].
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Semi-major axis in AU (world units).
    pub fn semi_major_axis_au(&self) -> f64 {
        match self.unit {
            LengthUnit::Au => self.semi_major_axis,
            LengthUnit::Kilometers => self.semi_major_axis / KM_PER_AU,
        }
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn eccentricity(&self) -> Eccentricity {
        self.eccentricity
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn longitude_ascending_node_deg(&self) -> f64 {
        self.longitude_ascending_node_deg
    }

    pub fn argument_periapsis_deg(&self) -> f64 {
        self.argument_periapsis_deg
    }

    /// Orbital period in days, always positive.
    pub fn period_days(&self) -> f64 {
        self.period_days
    }

    pub fn mean_anomaly_epoch_deg(&self) -> f64 {
        self.mean_anomaly_epoch_deg
    }

    pub fn epoch_days(&self) -> f64 {
        self.epoch_days
    }

    pub fn reference_plane(&self) -> ReferencePlane {
        self.reference_plane
    }

    /// Mean motion `n = 2π / period` in radians per day.
    pub fn mean_motion(&self) -> f64 {
        TAU / self.period_days
    }

    /// Mean anomaly `M(t) = M₀ + n·(t − t₀)`, wrapped into `[0, 2π)`.
    ///
    /// The elapsed fraction of an orbit is reduced before scaling by 2π, so a
    /// whole number of periods lands exactly back on `M₀`.
    pub fn mean_anomaly_at(&self, t: f64) -> f64 {
        let orbits = (t - self.epoch_days) / self.period_days;
        normalize_angle(self.mean_anomaly_epoch_deg.to_radians() + TAU * orbits.rem_euclid(1.0))
    }

    /// Rotation `R = Rz(Ω) · Rx(i) · Rz(ω)` from the orbital plane into the
    /// parent's ecliptic-aligned frame.
    pub fn orbital_frame(&self) -> Matrix4 {
        Matrix4::rotation_z(self.longitude_ascending_node_deg.to_radians())
            * Matrix4::rotation_x(self.inclination_deg.to_radians())
            * Matrix4::rotation_z(self.argument_periapsis_deg.to_radians())
    }

    /// Orientation of the orbit plane in world axes: `Rz(Ω) · Rx(i)` carried
    /// into the Y-up frame, which is `Ry(Ω) · Rx(i)`. Its +Y is the orbit
    /// normal and its +X points at the ascending node. The argument of
    /// periapsis is left out.
    pub fn plane_frame(&self) -> Matrix4 {
        Matrix4::rotation_y(self.longitude_ascending_node_deg.to_radians())
            * Matrix4::rotation_x(self.inclination_deg.to_radians())
    }

    /// Solve the orbit at simulation time `t` (days).
    pub fn state_at(&self, t: f64) -> Result<OrbitalState> {
        let t = finite(t, "simulation time")?;
        let mean_anomaly = self.mean_anomaly_at(t);
        let solution = kepler::solve(mean_anomaly, self.semi_major_axis_au(), self.eccentricity)?;
        let ecliptic = self.orbital_frame().transform_vector(solution.plane_position);
        let position = finite_vector(ecliptic_to_world(ecliptic), "orbital position")?;
        Ok(OrbitalState {
            mean_anomaly,
            eccentric_anomaly: solution.eccentric_anomaly,
            true_anomaly: solution.true_anomaly,
            radius: solution.radius,
            position,
        })
    }
}

fn finite_angle(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MechanicsError::invalid(name, format!("must be finite, got {value}")))
    }
}

/// Serialized form of [`OrbitalElements`], named after the catalog columns.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct OrbitalElementsDef {
    semi_major_axis: f64,
    #[serde(default)]
    unit: LengthUnit,
    eccentricity: f64,
    #[serde(default)]
    inclination: f64,
    #[serde(default)]
    longitude_ascending_node: f64,
    #[serde(default)]
    argument_periapsis: f64,
    orbital_period_days: f64,
    #[serde(default)]
    mean_anomaly_epoch: f64,
    #[serde(default)]
    epoch_days: f64,
    #[serde(default)]
    reference_plane: ReferencePlane,
}

impl TryFrom<OrbitalElementsDef> for OrbitalElements {
    type Error = MechanicsError;

    fn try_from(def: OrbitalElementsDef) -> Result<Self> {
        Ok(
            OrbitalElements::new(def.semi_major_axis, def.eccentricity, def.orbital_period_days)?
                .with_orientation(
                    def.inclination,
                    def.longitude_ascending_node,
                    def.argument_periapsis,
                )?
                .with_mean_anomaly_at_epoch(def.mean_anomaly_epoch)?
                .with_epoch(def.epoch_days)?
                .with_unit(def.unit)
                .with_reference_plane(def.reference_plane),
        )
    }
}

impl From<OrbitalElements> for OrbitalElementsDef {
    fn from(el: OrbitalElements) -> Self {
        Self {
            semi_major_axis: el.semi_major_axis,
            unit: el.unit,
            eccentricity: el.eccentricity.value(),
            inclination: el.inclination_deg,
            longitude_ascending_node: el.longitude_ascending_node_deg,
            argument_periapsis: el.argument_periapsis_deg,
            orbital_period_days: el.period_days,
            mean_anomaly_epoch: el.mean_anomaly_epoch_deg,
            epoch_days: el.epoch_days,
            reference_plane: el.reference_plane,
        }
    }
}

/// Orbit solved at one instant. Created per query and never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalState {
    /// Mean anomaly in radians, `[0, 2π)`.
    pub mean_anomaly: f64,
    /// Eccentric anomaly in radians.
    pub eccentric_anomaly: f64,
    /// True anomaly in radians, `[0, 2π)`.
    pub true_anomaly: f64,
    /// Distance from the parent in AU.
    pub radius: f64,
    /// Offset from the parent in world axes (AU).
    pub position: Vector3,
}

impl OrbitalState {
    /// State of a root body, which rests at its parent-less origin.
    pub const STATIONARY: OrbitalState = OrbitalState {
        mean_anomaly: 0.0,
        eccentric_anomaly: 0.0,
        true_anomaly: 0.0,
        radius: 0.0,
        position: Vector3::ZERO,
    };
}

/// Solve a body's orbit at time `t`: `{position, true_anomaly, radius}`.
///
/// The position is relative to the body's parent, in world axes. Bodies
/// without orbital elements are roots and return [`OrbitalState::STATIONARY`].
pub fn compute_orbital_state(body: &BodyDescriptor, t: f64) -> Result<OrbitalState> {
    match body.orbit() {
        Some(orbit) => orbit.state_at(t),
        None => Ok(OrbitalState::STATIONARY),
    }
}
