//! Rotational state: simple or retrograde spin, integer spin-orbit resonance,
//! tidal locking, axial tilt, libration and solar-day length.
//!
//! Bodies spin about their local +Y axis. The orientation is
//! `plane · Ry(pole_azimuth) · Rz(axial_tilt) · Ry(spin_angle)`: spin first,
//! lean the pole over by the tilt, swing the lean around the orbit normal,
//! then carry the result into world axes with the orbit plane frame. Tilt is
//! therefore measured from the orbit normal, and the lean direction stays
//! fixed in space while the body goes round.

use std::f64::consts::TAU;

use orrery_math::{Matrix4, Vector3, normalize_angle};
use serde::{Deserialize, Serialize};

use crate::body::BodyDescriptor;
use crate::error::{MechanicsError, Result, finite};
use crate::orbit::compute_orbital_state;

/// Integer spin-orbit resonance: `rotations` spins every `orbits` orbits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resonance {
    pub rotations: u32,
    pub orbits: u32,
}

impl Resonance {
    /// # Errors
    ///
    /// Returns [`MechanicsError::InvalidParameter`] if either term is zero.
    pub fn new(rotations: u32, orbits: u32) -> Result<Self> {
        if rotations == 0 || orbits == 0 {
            return Err(MechanicsError::invalid(
                "resonance",
                format!("terms must be non-zero, got {rotations}:{orbits}"),
            ));
        }
        Ok(Self { rotations, orbits })
    }

    /// `p / q`: spins per orbit.
    pub fn spins_per_orbit(self) -> f64 {
        f64::from(self.rotations) / f64::from(self.orbits)
    }

    /// `q / p`: rotation period as a fraction of the orbital period.
    pub fn period_fraction(self) -> f64 {
        f64::from(self.orbits) / f64::from(self.rotations)
    }
}

/// How a body's spin angle evolves. Chosen once at configuration time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationMode {
    /// Constant sidereal spin; a negative period is retrograde.
    Simple { period_days: f64 },
    /// `p:q` spin-orbit resonance coupled to the true anomaly.
    Resonant(Resonance),
    /// 1:1 lock: the spin angle is the true anomaly.
    TidallyLocked,
}

impl RotationMode {
    /// Resonant and locked spins are defined relative to an orbit.
    pub fn needs_orbit(&self) -> bool {
        !matches!(self, RotationMode::Simple { .. })
    }
}

/// Validated rotation configuration of a body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RotationParametersDef", into = "RotationParametersDef")]
pub struct RotationParameters {
    mode: RotationMode,
    axial_tilt_deg: f64,
    pole_direction_deg: Option<f64>,
}

impl RotationParameters {
    /// Constant spin with a signed sidereal period in days.
    ///
    /// # Errors
    ///
    /// Returns [`MechanicsError::InvalidParameter`] for a zero or non-finite
    /// period, or a non-finite tilt.
    pub fn simple(period_days: f64, axial_tilt_deg: f64) -> Result<Self> {
        if !(period_days.is_finite() && period_days != 0.0) {
            return Err(MechanicsError::invalid(
                "rotation_period_days",
                format!("must be non-zero and finite, got {period_days}"),
            ));
        }
        Self::with_mode(RotationMode::Simple { period_days }, axial_tilt_deg)
    }

    /// `rotations : orbits` spin-orbit resonance.
    pub fn resonant(rotations: u32, orbits: u32, axial_tilt_deg: f64) -> Result<Self> {
        Self::with_mode(
            RotationMode::Resonant(Resonance::new(rotations, orbits)?),
            axial_tilt_deg,
        )
    }

    /// 1:1 tidal lock.
    pub fn tidally_locked(axial_tilt_deg: f64) -> Result<Self> {
        Self::with_mode(RotationMode::TidallyLocked, axial_tilt_deg)
    }

    fn with_mode(mode: RotationMode, axial_tilt_deg: f64) -> Result<Self> {
        if !axial_tilt_deg.is_finite() {
            return Err(MechanicsError::invalid(
                "axial_tilt",
                format!("must be finite, got {axial_tilt_deg}"),
            ));
        }
        Ok(Self {
            mode,
            axial_tilt_deg,
            pole_direction_deg: None,
        })
    }

    /// Set the azimuth (degrees about the orbit normal, from the ascending
    /// node) the pole leans towards.
    pub fn with_pole_direction(mut self, degrees: f64) -> Result<Self> {
        if !degrees.is_finite() {
            return Err(MechanicsError::invalid(
                "pole_direction",
                format!("must be finite, got {degrees}"),
            ));
        }
        self.pole_direction_deg = Some(degrees);
        Ok(self)
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn axial_tilt_deg(&self) -> f64 {
        self.axial_tilt_deg
    }

    pub fn pole_direction_deg(&self) -> Option<f64> {
        self.pole_direction_deg
    }

    /// Orientation of the spin axis relative to the orbit plane, without the
    /// spin itself: `Ry(pole_azimuth) · Rz(axial_tilt)`.
    pub fn pole_frame(&self) -> Matrix4 {
        let azimuth = self.pole_direction_deg.unwrap_or(0.0).to_radians();
        Matrix4::rotation_y(azimuth) * Matrix4::rotation_z(self.axial_tilt_deg.to_radians())
    }

    /// Unit spin axis in orbit-plane axes (+Y is the orbit normal).
    pub fn spin_axis(&self) -> Vector3 {
        self.pole_frame().transform_vector(Vector3::Y).normalize()
    }

    /// Signed sidereal spin period in days.
    ///
    /// Resonant bodies spin every `(q/p)·T`, locked bodies every `T`.
    pub fn spin_period_days(&self, orbital_period_days: Option<f64>) -> Result<f64> {
        match self.mode {
            RotationMode::Simple { period_days } => Ok(period_days),
            RotationMode::Resonant(resonance) => {
                Ok(resonance.period_fraction() * require_orbital_period(orbital_period_days)?)
            }
            RotationMode::TidallyLocked => require_orbital_period(orbital_period_days),
        }
    }

    /// Length of the solar day in days, or `None` when the star never moves
    /// across the sky (tidal lock).
    ///
    /// `1/S = 1/|P| − sign(P)/T`, with `P` the signed sidereal period and `T`
    /// the orbital period. Bodies without an orbit have `S = |P|`.
    pub fn solar_day_days(&self, orbital_period_days: Option<f64>) -> Result<Option<f64>> {
        let spin = self.spin_period_days(orbital_period_days)?;
        let sidereal_rate = 1.0 / spin.abs();
        let orbital_rate = orbital_period_days.map_or(0.0, |t| spin.signum() / t);
        let solar_rate = sidereal_rate - orbital_rate;
        if solar_rate.abs() <= sidereal_rate * 1e-9 {
            return Ok(None);
        }
        finite(1.0 / solar_rate.abs(), "solar day").map(Some)
    }
}

fn require_orbital_period(orbital_period_days: Option<f64>) -> Result<f64> {
    match orbital_period_days {
        Some(t) if t.is_finite() && t > 0.0 => Ok(t),
        Some(t) => Err(MechanicsError::invalid(
            "orbital_period_days",
            format!("must be positive and finite, got {t}"),
        )),
        None => Err(MechanicsError::invalid(
            "orbital_period_days",
            "resonant and tidally locked spin need an orbit",
        )),
    }
}

/// Serialized form of [`RotationParameters`], one optional field per mode.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RotationParametersDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation_period_days: Option<f64>,
    axial_tilt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    resonance: Option<Resonance>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    tidally_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pole_direction: Option<f64>,
}

impl TryFrom<RotationParametersDef> for RotationParameters {
    type Error = MechanicsError;

    fn try_from(def: RotationParametersDef) -> Result<Self> {
        let params = match (def.resonance, def.tidally_locked, def.rotation_period_days) {
            (Some(_), true, _) => {
                return Err(MechanicsError::invalid(
                    "rotation",
                    "resonance and tidally_locked are mutually exclusive",
                ));
            }
            (Some(r), false, _) => Self::resonant(r.rotations, r.orbits, def.axial_tilt)?,
            (None, true, _) => Self::tidally_locked(def.axial_tilt)?,
            (None, false, Some(period)) => Self::simple(period, def.axial_tilt)?,
            (None, false, None) => {
                return Err(MechanicsError::invalid(
                    "rotation_period_days",
                    "required unless resonance or tidally_locked is set",
                ));
            }
        };
        match def.pole_direction {
            Some(deg) => params.with_pole_direction(deg),
            None => Ok(params),
        }
    }
}

impl From<RotationParameters> for RotationParametersDef {
    fn from(params: RotationParameters) -> Self {
        let mut def = RotationParametersDef {
            axial_tilt: params.axial_tilt_deg,
            pole_direction: params.pole_direction_deg,
            ..Default::default()
        };
        match params.mode {
            RotationMode::Simple { period_days } => def.rotation_period_days = Some(period_days),
            RotationMode::Resonant(r) => def.resonance = Some(r),
            RotationMode::TidallyLocked => def.tidally_locked = true,
        }
        def
    }
}

/// Orientation of a body at one instant. Created per query, never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    /// Accumulated spin angle in radians (not wrapped).
    pub angle: f64,
    /// Unit spin axis in world axes.
    pub axis: Vector3,
    /// Rotation-only body-to-world transform (orbit plane, tilt and spin, no
    /// translation).
    pub matrix: Matrix4,
    /// Libration offset in radians; zero for simple spin.
    pub libration: f64,
    /// Signed sidereal spin period in days.
    pub spin_period_days: f64,
}

/// Spin angle at `t` for the given mode, in radians.
///
/// `true_anomaly` is wrapped into `[0, 2π)` before use, so resonant and locked
/// angles are a pure function of the orbital phase plus whole spins.
pub fn spin_angle(
    params: &RotationParameters,
    t: f64,
    true_anomaly: f64,
    orbital_period_days: Option<f64>,
) -> Result<f64> {
    let nu = normalize_angle(finite(true_anomaly, "true anomaly")?);
    let angle = match params.mode {
        RotationMode::Simple { period_days } => TAU * t / period_days,
        RotationMode::Resonant(resonance) => {
            let orbital_period = require_orbital_period(orbital_period_days)?;
            let rotation_period = resonance.period_fraction() * orbital_period;
            TAU * t / rotation_period + nu * (1.0 - resonance.period_fraction())
        }
        RotationMode::TidallyLocked => nu,
    };
    finite(angle, "spin angle")
}

/// Libration `2e·(p/q − 1)·sin ν` in radians; zero for simple spin.
pub fn libration(params: &RotationParameters, eccentricity: f64, true_anomaly: f64) -> f64 {
    let spins_per_orbit = match params.mode {
        RotationMode::Simple { .. } => return 0.0,
        RotationMode::Resonant(resonance) => resonance.spins_per_orbit(),
        RotationMode::TidallyLocked => 1.0,
    };
    2.0 * eccentricity * (spins_per_orbit - 1.0) * true_anomaly.sin()
}

/// The body's equator orientation in world axes, spin excluded:
/// `reference · plane · Ry(pole_azimuth) · Rz(axial_tilt)`.
///
/// `reference` is the frame the orbital elements are measured in: identity
/// for the ecliptic, or the parent's equator frame for
/// [`ReferencePlane::ParentEquator`](crate::orbit::ReferencePlane) orbits.
/// Roots have no orbit plane.
pub fn equator_frame(body: &BodyDescriptor, reference: &Matrix4) -> Matrix4 {
    let pole_frame = body.rotation().pole_frame();
    match body.orbit() {
        Some(orbit) => *reference * orbit.plane_frame() * pole_frame,
        None => *reference * pole_frame,
    }
}

/// Orientation of `body` at time `t`: `{angle, axis, matrix}`, with the
/// orbital elements measured against the ecliptic.
///
/// `true_anomaly` and `orbital_period_days` come from the body's own orbit
/// (see [`compute_orbital_state`]); the period is ignored for simple spin.
pub fn compute_rotation_state(
    body: &BodyDescriptor,
    t: f64,
    true_anomaly: f64,
    orbital_period_days: Option<f64>,
) -> Result<RotationState> {
    compute_rotation_state_in(body, t, true_anomaly, orbital_period_days, &Matrix4::IDENTITY)
}

/// [`compute_rotation_state`] for orbital elements measured in `reference`.
pub fn compute_rotation_state_in(
    body: &BodyDescriptor,
    t: f64,
    true_anomaly: f64,
    orbital_period_days: Option<f64>,
    reference: &Matrix4,
) -> Result<RotationState> {
    let params = body.rotation();
    let t = finite(t, "simulation time")?;
    let angle = spin_angle(params, t, true_anomaly, orbital_period_days)?;

    let frame = equator_frame(body, reference);
    let axis = frame.transform_vector(Vector3::Y).normalize();
    // R_axis(θ) · F == F · Ry(θ) for axis = F·Y.
    let matrix = Matrix4::from_axis_angle(axis, angle) * frame;
    if !matrix.is_finite() {
        return Err(MechanicsError::Computation {
            quantity: "rotation matrix",
        });
    }

    let eccentricity = body.orbit().map_or(0.0, |o| o.eccentricity().value());
    Ok(RotationState {
        angle,
        axis,
        matrix,
        libration: libration(params, eccentricity, true_anomaly),
        spin_period_days: params.spin_period_days(orbital_period_days)?,
    })
}

/// Solve the body's own orbit at `t` and return its rotation state.
pub fn rotation_state_at(body: &BodyDescriptor, t: f64) -> Result<RotationState> {
    let orbit = compute_orbital_state(body, t)?;
    compute_rotation_state(body, t, orbit.true_anomaly, body.orbital_period_days())
}

/// Spins completed between `t0` and `t1` (negative when running backwards).
pub fn rotation_count(body: &BodyDescriptor, t0: f64, t1: f64) -> Result<f64> {
    let start = rotation_state_at(body, t0)?.angle;
    let end = rotation_state_at(body, t1)?.angle;
    Ok((end - start) / TAU)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::body::BodyKind;
    use crate::orbit::OrbitalElements;

    fn orbiting(rotation: RotationParameters, e: f64, period: f64) -> BodyDescriptor {
        let orbit = OrbitalElements::new(1.0, e, period).unwrap();
        BodyDescriptor::orbiting("test", BodyKind::Planet, "sun", orbit, rotation).unwrap()
    }

    #[test]
    fn test_rejects_zero_period_and_zero_resonance() {
        assert!(RotationParameters::simple(0.0, 0.0).is_err());
        assert!(RotationParameters::simple(f64::NAN, 0.0).is_err());
        assert!(RotationParameters::resonant(0, 2, 0.0).is_err());
        assert!(RotationParameters::resonant(3, 0, 0.0).is_err());
    }

    #[test]
    fn test_resonance_and_lock_are_exclusive() {
        let ron_str = "(resonance: Some((rotations: 3, orbits: 2)), tidally_locked: true)";
        let err = ron::from_str::<RotationParameters>(ron_str).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"), "{err}");
    }

    #[test]
    fn test_missing_period_is_rejected() {
        assert!(ron::from_str::<RotationParameters>("(axial_tilt: 10.0)").is_err());
    }

    #[test]
    fn test_deserialize_modes() {
        let simple: RotationParameters =
            ron::from_str("(rotation_period_days: Some(-243.025), axial_tilt: 2.64)").unwrap();
        assert_eq!(simple.mode(), RotationMode::Simple { period_days: -243.025 });

        let resonant: RotationParameters =
            serde_json::from_str(r#"{"resonance": {"rotations": 3, "orbits": 2}}"#).unwrap();
        assert_eq!(resonant.mode(), RotationMode::Resonant(Resonance { rotations: 3, orbits: 2 }));

        let locked: RotationParameters = serde_json::from_str(r#"{"tidally_locked": true}"#).unwrap();
        assert_eq!(locked.mode(), RotationMode::TidallyLocked);
    }

    #[test]
    fn test_simple_spin_angle() {
        let earthish = RotationParameters::simple(1.0, 0.0).unwrap();
        let a = spin_angle(&earthish, 0.25, 0.0, None).unwrap();
        assert!((a - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_tilt_axis_is_world_up() {
        let params = RotationParameters::simple(1.0, 0.0).unwrap();
        assert!(params.spin_axis().abs_diff_eq(Vector3::Y, 1e-15));
    }

    #[test]
    fn test_tilt_leans_axis() {
        let params = RotationParameters::simple(1.0, 90.0).unwrap();
        let axis = params.spin_axis();
        assert!(axis.abs_diff_eq(-Vector3::X, 1e-12), "axis = {axis}");

        let swung = params.with_pole_direction(90.0).unwrap().spin_axis();
        assert!(swung.abs_diff_eq(Vector3::Z, 1e-12), "axis = {swung}");
    }

    #[test]
    fn test_tilt_angle_matches_configuration() {
        let params = RotationParameters::simple(1.0, 23.44)
            .unwrap()
            .with_pole_direction(37.0)
            .unwrap();
        let cos_tilt = params.spin_axis().dot(Vector3::Y);
        assert!((cos_tilt.acos().to_degrees() - 23.44).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_matches_composed_order() {
        let body = orbiting(
            RotationParameters::simple(0.7, 30.0)
                .unwrap()
                .with_pole_direction(50.0)
                .unwrap(),
            0.1,
            100.0,
        );
        let t = 3.3;
        let state = rotation_state_at(&body, t).unwrap();
        let expected = Matrix4::rotation_y(50f64.to_radians())
            * Matrix4::rotation_z(30f64.to_radians())
            * Matrix4::rotation_y(TAU * t / 0.7);
        assert!(state.matrix.abs_diff_eq(&expected, 1e-12));
        // Spin never moves the axis.
        let axis = state.matrix.transform_vector(Vector3::Y);
        assert!(axis.abs_diff_eq(state.axis, 1e-12));
    }

    #[test]
    fn test_tilt_is_measured_from_orbit_normal() {
        let orbit = OrbitalElements::new(1.0, 0.0, 100.0)
            .unwrap()
            .with_orientation(40.0, 65.0, 10.0)
            .unwrap();
        let plane = orbit.plane_frame();
        let body = BodyDescriptor::orbiting(
            "test",
            BodyKind::Planet,
            "sun",
            orbit,
            RotationParameters::simple(0.7, 0.0).unwrap(),
        )
        .unwrap();
        let t = 2.0;
        let state = rotation_state_at(&body, t).unwrap();
        let normal = plane.transform_vector(Vector3::Y);
        assert!(state.axis.abs_diff_eq(normal, 1e-12), "{} vs {normal}", state.axis);
        let expected = plane * Matrix4::rotation_y(TAU * t / 0.7);
        assert!(state.matrix.abs_diff_eq(&expected, 1e-12));
    }

    #[test]
    fn test_reference_frame_is_applied_first() {
        let body = orbiting(
            RotationParameters::simple(1.3, 20.0)
                .unwrap()
                .with_pole_direction(30.0)
                .unwrap(),
            0.1,
            50.0,
        );
        let reference = Matrix4::rotation_x(0.4) * Matrix4::rotation_y(1.1);
        let plain = compute_rotation_state(&body, 4.0, 1.0, Some(50.0)).unwrap();
        let carried = compute_rotation_state_in(&body, 4.0, 1.0, Some(50.0), &reference).unwrap();
        assert_eq!(plain.angle, carried.angle);
        assert!(carried.matrix.abs_diff_eq(&(reference * plain.matrix), 1e-12));
        assert!(carried.axis.abs_diff_eq(reference.transform_vector(plain.axis), 1e-12));
    }

    #[test]
    fn test_tidal_lock_angle_is_true_anomaly() {
        let body = orbiting(RotationParameters::tidally_locked(0.0).unwrap(), 0.3, 27.0);
        for i in 0..30 {
            let t = i as f64 * 1.7 - 10.0;
            let orbit = compute_orbital_state(&body, t).unwrap();
            let state = compute_rotation_state(&body, t, orbit.true_anomaly, Some(27.0)).unwrap();
            assert_eq!(state.angle, orbit.true_anomaly);
            assert_eq!(state.libration, 0.0);
        }
    }

    #[test]
    fn test_resonant_needs_orbital_period() {
        let params = RotationParameters::resonant(3, 2, 0.0).unwrap();
        assert!(spin_angle(&params, 1.0, 0.0, None).is_err());
        assert!(spin_angle(&params, 1.0, 0.0, Some(-5.0)).is_err());
    }

    #[test]
    fn test_resonant_spin_period() {
        let params = RotationParameters::resonant(3, 2, 0.0).unwrap();
        let p = params.spin_period_days(Some(87.969)).unwrap();
        assert!((p - 58.646).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_libration_amplitude() {
        let params = RotationParameters::resonant(3, 2, 0.0).unwrap();
        let lib = libration(&params, 0.2, FRAC_PI_2);
        assert!((lib - 0.2).abs() < 1e-12, "2·0.2·(1.5 − 1) = 0.2, got {lib}");
        assert!(libration(&params, 0.2, PI).abs() < 1e-12);
    }

    #[test]
    fn test_solar_day_prograde_and_retrograde() {
        let earth = RotationParameters::simple(0.99727, 23.44).unwrap();
        let day = earth.solar_day_days(Some(365.256)).unwrap().unwrap();
        assert!((day - 1.0).abs() < 1e-3, "earth solar day {day}");

        let venus = RotationParameters::simple(-243.025, 2.64).unwrap();
        let day = venus.solar_day_days(Some(224.701)).unwrap().unwrap();
        assert!((day - 116.75).abs() < 0.1, "venus solar day {day}");
    }

    #[test]
    fn test_solar_day_mercury_is_two_years() {
        let mercury = RotationParameters::resonant(3, 2, 0.0).unwrap();
        let day = mercury.solar_day_days(Some(87.969)).unwrap().unwrap();
        assert!((day - 2.0 * 87.969).abs() < 1e-6, "mercury solar day {day}");
    }

    #[test]
    fn test_solar_day_tidal_lock_is_infinite() {
        let locked = RotationParameters::tidally_locked(0.0).unwrap();
        assert_eq!(locked.solar_day_days(Some(27.3)).unwrap(), None);
    }

    #[test]
    fn test_solar_day_without_orbit_is_sidereal() {
        let sun = RotationParameters::simple(25.38, 7.25).unwrap();
        let day = sun.solar_day_days(None).unwrap().unwrap();
        assert!((day - 25.38).abs() < 1e-12, "sun solar day {day}");
    }

    #[test]
    fn test_rotation_count_simple() {
        let body = orbiting(RotationParameters::simple(2.0, 0.0).unwrap(), 0.0, 100.0);
        let count = rotation_count(&body, 0.0, 10.0).unwrap();
        assert!((count - 5.0).abs() < 1e-12);
        let back = rotation_count(&body, 10.0, 0.0).unwrap();
        assert!((back + 5.0).abs() < 1e-12);
    }
}
