//! Per-body report lines.

use std::fmt;

use orrery_mechanics::{
    BodySnapshot, BodySystem, Illumination, KM_PER_AU, Result, SurfaceConditions, SurfacePoint,
};

/// Surface sample used for every reported body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub point: SurfacePoint,
    /// Terminator width for bodies without their own.
    pub default_width_deg: f64,
}

/// One printed line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyReport {
    pub name: String,
    pub snapshot: BodySnapshot,
    /// Distance to the parent in AU; `None` for a root.
    pub parent_distance_au: Option<f64>,
    /// Sample classification; `None` for a root.
    pub sample: Option<Illumination>,
    pub surface: SurfaceConditions,
}

impl BodyReport {
    /// Build the report for a snapshot taken at `t`.
    pub fn new(
        system: &BodySystem,
        snapshot: BodySnapshot,
        t: f64,
        sample: Sample,
    ) -> Result<Self> {
        let body = system.get(snapshot.id.as_str())?;
        let (parent_distance_au, illumination) = if body.is_root() {
            (None, None)
        } else {
            let illumination = system.illumination_at(
                body.id().as_str(),
                t,
                sample.point,
                sample.default_width_deg,
            )?;
            (Some(snapshot.orbit.radius), Some(illumination))
        };
        Ok(Self {
            name: body.name().to_string(),
            snapshot,
            parent_distance_au,
            sample: illumination,
            surface: *body.surface(),
        })
    }
}

/// Reports for every snapshot whose id is in `selected` (all when empty).
pub fn build_reports(
    system: &BodySystem,
    t: f64,
    selected: &[String],
    sample: Sample,
) -> Result<Vec<BodyReport>> {
    for id in selected {
        system.get(id)?;
    }
    system
        .snapshot(t)?
        .into_iter()
        .filter(|snap| selected.is_empty() || selected.iter().any(|id| id == snap.id.as_str()))
        .map(|snap| BodyReport::new(system, snap, t, sample))
        .collect()
}

impl fmt::Display for BodyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = &self.snapshot;
        write!(f, "{:<10} pos {} AU", self.name, snap.world_position)?;
        if let Some(distance) = self.parent_distance_au {
            write!(
                f,
                "  r {distance:.6} AU ({:.0} km)  nu {:7.2}°",
                distance * KM_PER_AU,
                snap.orbit.true_anomaly.to_degrees()
            )?;
        }
        write!(f, "  spin {:7.2}°", snap.rotation.angle.to_degrees())?;
        match snap.solar_day_days {
            Some(day) => write!(f, "  day {day:.4} d")?,
            None => write!(f, "  day never")?,
        }
        if let Some(point) = snap.subsolar_point {
            write!(f, "  subsolar ({:.2}°, {:.2}°)", point.longitude, point.latitude)?;
        }
        if let Some(sample) = self.sample {
            let light = if sample.in_terminator {
                "terminator"
            } else if sample.daylight {
                "day"
            } else {
                "night"
            };
            write!(f, "  sample {light} (sun {:.1}°)", sample.sun_angle_deg)?;
        }
        if let (Some(min), Some(max)) = (self.surface.min_temp_c, self.surface.max_temp_c) {
            write!(f, "  temp {min:.0}..{max:.0} °C")?;
        }
        if let Some(pressure) = self.surface.atmosphere_pressure_bar {
            write!(f, "  {pressure:.3e} bar")?;
        }
        Ok(())
    }
}
