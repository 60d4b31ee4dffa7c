//! Kepler's equation: mean → eccentric → true anomaly, radius, and
//! orbital-plane position.
//!
//! Newton–Raphson is tried first. When it fails to converge (possible as
//! `e → 1`), the solver falls back to bisection over `[0, 2π]`, which always
//! brackets the root because `f(E) = E − e·sin(E) − M` is monotonic for
//! `e < 1`.

use std::f64::consts::TAU;

use orrery_math::{Vector3, normalize_angle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MechanicsError, Result, finite};

/// Newton–Raphson step size below which the iteration counts as converged.
pub const KEPLER_TOLERANCE: f64 = 1e-6;

/// Newton–Raphson iteration cap before bisection takes over.
pub const MAX_NEWTON_ITERATIONS: usize = 50;

/// Bisection halvings; 2π / 2¹⁰⁰ is far below f64 resolution.
const MAX_BISECTION_ITERATIONS: usize = 100;

/// Largest |f(E)| accepted from a converged Newton step.
const RESIDUAL_TOLERANCE: f64 = 1e-9;

/// Orbital eccentricity, validated to lie in `[0, 1)`.
///
/// Parabolic and hyperbolic orbits are not supported. Validation happens once,
/// when the value is constructed or deserialized; the solver never re-checks.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Eccentricity(f64);

impl Eccentricity {
    /// A circular orbit.
    pub const CIRCULAR: Eccentricity = Eccentricity(0.0);

    /// Validate an eccentricity.
    ///
    /// # Errors
    ///
    /// Returns [`MechanicsError::InvalidParameter`] unless `0 ≤ e < 1`.
    pub fn new(e: f64) -> Result<Self> {
        if (0.0..1.0).contains(&e) {
            Ok(Self(e))
        } else {
            Err(MechanicsError::invalid(
                "eccentricity",
                format!("must be in [0, 1), got {e}"),
            ))
        }
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Eccentricity {
    type Error = MechanicsError;

    fn try_from(e: f64) -> Result<Self> {
        Self::new(e)
    }
}

impl From<Eccentricity> for f64 {
    fn from(e: Eccentricity) -> Self {
        e.0
    }
}

/// Everything Kepler's equation yields for one mean anomaly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly `E` in radians.
    pub eccentric_anomaly: f64,
    /// True anomaly `ν` in radians, `[0, 2π)`.
    pub true_anomaly: f64,
    /// Distance from the focus, in the unit of the semi-major axis.
    pub radius: f64,
    /// Position in the orbital plane, periapsis along +X, plane normal +Z.
    pub plane_position: Vector3,
}

/// Solve `M = E − e·sin(E)` for the eccentric anomaly `E`.
///
/// `mean_anomaly` may be any finite real; it is wrapped into `[0, 2π)` first.
///
/// # Errors
///
/// Returns [`MechanicsError::Computation`] if the mean anomaly is not finite or
/// if bisection cannot bracket a root (unreachable for a valid eccentricity).
pub fn solve_eccentric_anomaly(mean_anomaly: f64, e: Eccentricity) -> Result<f64> {
    let m = normalize_angle(finite(mean_anomaly, "mean anomaly")?);
    match newton_raphson(m, e.value()) {
        Some(ecc_anomaly) => Ok(ecc_anomaly),
        None => {
            debug!(
                mean_anomaly = m,
                eccentricity = e.value(),
                "Newton-Raphson did not converge, falling back to bisection"
            );
            solve_by_bisection(m, e)
        }
    }
}

fn newton_raphson(m: f64, e: f64) -> Option<f64> {
    let mut ecc_anomaly = m;
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = ecc_anomaly - e * ecc_anomaly.sin() - m;
        let derivative = 1.0 - e * ecc_anomaly.cos();
        let next = ecc_anomaly - residual / derivative;
        if !next.is_finite() {
            return None;
        }
        let step = (next - ecc_anomaly).abs();
        ecc_anomaly = next;
        if step < KEPLER_TOLERANCE && kepler_residual(ecc_anomaly, e, m).abs() <= RESIDUAL_TOLERANCE
        {
            return Some(ecc_anomaly);
        }
    }
    None
}

fn kepler_residual(ecc_anomaly: f64, e: f64, m: f64) -> f64 {
    ecc_anomaly - e * ecc_anomaly.sin() - m
}

/// Solve Kepler's equation by bisection over `[0, 2π]`.
///
/// `mean_anomaly` is wrapped into `[0, 2π)` so that `f(0) ≤ 0 < f(2π)`.
///
/// # Errors
///
/// Returns [`MechanicsError::Computation`] if the interval does not bracket a
/// root, which only happens for non-finite input.
pub fn solve_by_bisection(mean_anomaly: f64, e: Eccentricity) -> Result<f64> {
    let m = normalize_angle(finite(mean_anomaly, "mean anomaly")?);
    let e = e.value();

    let (mut lo, mut hi) = (0.0_f64, TAU);
    let f_lo = kepler_residual(lo, e, m);
    let f_hi = kepler_residual(hi, e, m);
    if !(f_lo <= 0.0 && f_hi >= 0.0) {
        return Err(MechanicsError::Computation {
            quantity: "eccentric anomaly bracket",
        });
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if kepler_residual(mid, e, m) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    finite(0.5 * (lo + hi), "eccentric anomaly")
}

/// True anomaly `ν = 2·atan2(√(1+e)·sin(E/2), √(1−e)·cos(E/2))`, in `[0, 2π)`.
pub fn true_anomaly(eccentric_anomaly: f64, e: Eccentricity) -> f64 {
    let e = e.value();
    let half = 0.5 * eccentric_anomaly;
    let nu = 2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos());
    normalize_angle(nu)
}

/// Distance from the focus `r = a·(1 − e·cos E)`.
pub fn orbital_radius(semi_major_axis: f64, e: Eccentricity, eccentric_anomaly: f64) -> f64 {
    semi_major_axis * (1.0 - e.value() * eccentric_anomaly.cos())
}

/// Orbital-plane position `(r·cos ν, r·sin ν, 0)` with periapsis on +X.
pub fn orbital_plane_position(radius: f64, true_anomaly: f64) -> Vector3 {
    let (s, c) = true_anomaly.sin_cos();
    Vector3::new(radius * c, radius * s, 0.0)
}

/// Run the full mean-anomaly pipeline for an orbit of size `semi_major_axis`.
pub fn solve(mean_anomaly: f64, semi_major_axis: f64, e: Eccentricity) -> Result<KeplerSolution> {
    let eccentric_anomaly = solve_eccentric_anomaly(mean_anomaly, e)?;
    let true_anomaly = finite(true_anomaly(eccentric_anomaly, e), "true anomaly")?;
    let radius = finite(
        orbital_radius(semi_major_axis, e, eccentric_anomaly),
        "orbital radius",
    )?;
    Ok(KeplerSolution {
        eccentric_anomaly,
        true_anomaly,
        radius,
        plane_position: orbital_plane_position(radius, true_anomaly),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn ecc(e: f64) -> Eccentricity {
        Eccentricity::new(e).unwrap()
    }

    #[test]
    fn test_eccentricity_validation() {
        assert!(Eccentricity::new(0.0).is_ok());
        assert!(Eccentricity::new(0.999).is_ok());
        assert!(Eccentricity::new(1.0).is_err());
        assert!(Eccentricity::new(-0.1).is_err());
        assert!(Eccentricity::new(f64::NAN).is_err());
    }

    #[test]
    fn test_eccentricity_deserialization_rejects_out_of_range() {
        let ok: Eccentricity = ron::from_str("0.25").unwrap();
        assert_eq!(ok.value(), 0.25);
        let bad: std::result::Result<Eccentricity, _> = ron::from_str("1.5");
        assert!(bad.is_err());
    }

    #[test]
    fn test_circular_orbit_eccentric_equals_mean() {
        for i in 0..16 {
            let m = i as f64 * TAU / 16.0;
            let e_anom = solve_eccentric_anomaly(m, Eccentricity::CIRCULAR).unwrap();
            assert!((e_anom - m).abs() < 1e-12, "M={m} E={e_anom}");
        }
    }

    #[test]
    fn test_mean_anomaly_is_wrapped() {
        let e = ecc(0.3);
        let a = solve_eccentric_anomaly(1.0, e).unwrap();
        let b = solve_eccentric_anomaly(1.0 + 3.0 * TAU, e).unwrap();
        let c = solve_eccentric_anomaly(1.0 - 2.0 * TAU, e).unwrap();
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        assert!((a - c).abs() < 1e-9, "{a} vs {c}");
    }

    #[test]
    fn test_bisection_agrees_with_newton() {
        for &e in &[0.0, 0.2, 0.7, 0.95, 0.999] {
            for i in 0..12 {
                let m = 0.05 + i as f64 * 0.5;
                let newton = solve_eccentric_anomaly(m, ecc(e)).unwrap();
                let bisect = solve_by_bisection(m, ecc(e)).unwrap();
                assert!((newton - bisect).abs() < 1e-8, "e={e} M={m}: {newton} vs {bisect}");
            }
        }
    }

    #[test]
    fn test_near_parabolic_small_mean_anomaly() {
        let e = ecc(0.9999);
        let m = 1e-4;
        let e_anom = solve_eccentric_anomaly(m, e).unwrap();
        let residual = e_anom - e.value() * e_anom.sin() - m;
        assert!(residual.abs() < 1e-9, "residual {residual}");
    }

    #[test]
    fn test_non_finite_mean_anomaly_is_computation_error() {
        let err = solve_eccentric_anomaly(f64::NAN, ecc(0.1)).unwrap_err();
        assert!(matches!(err, MechanicsError::Computation { .. }));
    }

    #[test]
    fn test_true_anomaly_at_apsides() {
        let e = ecc(0.5);
        assert!(true_anomaly(0.0, e).abs() < 1e-12);
        assert!((true_anomaly(PI, e) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_true_anomaly_leads_mean_after_periapsis() {
        let e = ecc(0.3);
        let m = 0.5;
        let sol = solve(m, 1.0, e).unwrap();
        assert!(sol.true_anomaly > sol.eccentric_anomaly);
        assert!(sol.eccentric_anomaly > m);
    }

    #[test]
    fn test_radius_at_apsides() {
        let e = ecc(0.2);
        assert!((orbital_radius(2.0, e, 0.0) - 1.6).abs() < 1e-12, "periapsis a(1-e)");
        assert!((orbital_radius(2.0, e, PI) - 2.4).abs() < 1e-12, "apoapsis a(1+e)");
    }

    #[test]
    fn test_plane_position_lies_in_plane() {
        let sol = solve(2.0, 1.5, ecc(0.4)).unwrap();
        assert_eq!(sol.plane_position.z, 0.0);
        assert!((sol.plane_position.length() - sol.radius).abs() < 1e-12);
    }
}
