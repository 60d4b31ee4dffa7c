//! Immutable body descriptors loaded once from configuration.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MechanicsError, Result};
use crate::orbit::OrbitalElements;
use crate::rotation::{RotationMode, RotationParameters};

/// Stable string identifier of a body, e.g. `"earth"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BodyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BodyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BodyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Broad classification of a body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Star,
    #[default]
    Planet,
    DwarfPlanet,
    Moon,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::DwarfPlanet => "dwarf planet",
            BodyKind::Moon => "moon",
        };
        f.write_str(name)
    }
}

/// Lowest surface temperature the catalog accepts, in °C.
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Descriptive surface data. Carried through catalogs and reports; the
/// mechanics never read it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp_c: Option<f64>,
    /// Typical temperature along the day/night boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminator_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere_pressure_bar: Option<f64>,
}

impl SurfaceConditions {
    /// Temperatures must be finite and above absolute zero with `min <= max`;
    /// pressure must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_temp_c", self.min_temp_c),
            ("max_temp_c", self.max_temp_c),
            ("terminator_temp_c", self.terminator_temp_c),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v >= ABSOLUTE_ZERO_C) {
                    return Err(MechanicsError::invalid(
                        name,
                        format!("must be a finite temperature above {ABSOLUTE_ZERO_C} °C, got {v}"),
                    ));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_temp_c, self.max_temp_c) {
            if min > max {
                return Err(MechanicsError::invalid(
                    "min_temp_c",
                    format!("{min} exceeds max_temp_c {max}"),
                ));
            }
        }
        if let Some(p) = self.atmosphere_pressure_bar {
            if !(p.is_finite() && p >= 0.0) {
                return Err(MechanicsError::invalid(
                    "atmosphere_pressure_bar",
                    format!("must be non-negative and finite, got {p}"),
                ));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the engine knows about one body.
///
/// Descriptors are validated when built or deserialized and never mutated
/// afterwards, so they can be shared freely between concurrent queries.
/// A descriptor without orbital elements is a root: it rests at the origin of
/// its chain and illuminates everything below it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyDescriptorDef", into = "BodyDescriptorDef")]
pub struct BodyDescriptor {
    id: BodyId,
    name: String,
    kind: BodyKind,
    parent: Option<BodyId>,
    orbit: Option<OrbitalElements>,
    rotation: RotationParameters,
    radius_km: Option<f64>,
    terminator_width_km: Option<f64>,
    surface: SurfaceConditions,
}

impl BodyDescriptor {
    /// Describe a root body (no parent, no orbit).
    pub fn root(id: impl Into<BodyId>, kind: BodyKind, rotation: RotationParameters) -> Result<Self> {
        let id = id.into();
        let descriptor = Self {
            name: id.to_string(),
            id,
            kind,
            parent: None,
            orbit: None,
            rotation,
            radius_km: None,
            terminator_width_km: None,
            surface: SurfaceConditions::default(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Describe a body orbiting `parent`.
    pub fn orbiting(
        id: impl Into<BodyId>,
        kind: BodyKind,
        parent: impl Into<BodyId>,
        orbit: OrbitalElements,
        rotation: RotationParameters,
    ) -> Result<Self> {
        let id = id.into();
        let descriptor = Self {
            name: id.to_string(),
            id,
            kind,
            parent: Some(parent.into()),
            orbit: Some(orbit),
            rotation,
            radius_km: None,
            terminator_width_km: None,
            surface: SurfaceConditions::default(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the mean radius in kilometres.
    pub fn with_radius_km(mut self, radius_km: f64) -> Result<Self> {
        self.radius_km = Some(positive("radius_km", radius_km)?);
        Ok(self)
    }

    /// Set the width of the twilight band in kilometres along the surface.
    pub fn with_terminator_width_km(mut self, width_km: f64) -> Result<Self> {
        self.terminator_width_km = Some(positive("terminator_width_km", width_km)?);
        Ok(self)
    }

    /// Attach surface temperatures and pressure.
    pub fn with_surface(mut self, surface: SurfaceConditions) -> Result<Self> {
        surface.validate()?;
        self.surface = surface;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(MechanicsError::invalid("id", "must not be empty"));
        }
        if self.parent.is_some() != self.orbit.is_some() {
            return Err(MechanicsError::invalid(
                "orbit",
                format!(
                    "body `{}` must have orbital elements exactly when it has a parent",
                    self.id
                ),
            ));
        }
        if self.parent.as_ref() == Some(&self.id) {
            return Err(MechanicsError::ParentCycle(self.id.to_string()));
        }
        if self.orbit.is_none() && self.rotation.mode().needs_orbit() {
            return Err(MechanicsError::invalid(
                "rotation",
                format!("body `{}` is resonant or tidally locked but has no orbit", self.id),
            ));
        }
        if let Some(r) = self.radius_km {
            positive("radius_km", r)?;
        }
        if let Some(w) = self.terminator_width_km {
            positive("terminator_width_km", w)?;
        }
        self.surface.validate()
    }

    pub fn id(&self) -> &BodyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&BodyId> {
        self.parent.as_ref()
    }

    pub fn orbit(&self) -> Option<&OrbitalElements> {
        self.orbit.as_ref()
    }

    pub fn rotation(&self) -> &RotationParameters {
        &self.rotation
    }

    pub fn radius_km(&self) -> Option<f64> {
        self.radius_km
    }

    pub fn terminator_width_km(&self) -> Option<f64> {
        self.terminator_width_km
    }

    pub fn surface(&self) -> &SurfaceConditions {
        &self.surface
    }

    /// Orbital period in days, if the body orbits anything.
    pub fn orbital_period_days(&self) -> Option<f64> {
        self.orbit.as_ref().map(OrbitalElements::period_days)
    }

    /// True for bodies without a parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True for tidally locked bodies.
    pub fn is_tidally_locked(&self) -> bool {
        matches!(self.rotation.mode(), RotationMode::TidallyLocked)
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MechanicsError::invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BodyDescriptorDef {
    id: BodyId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: BodyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<BodyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orbit: Option<OrbitalElements>,
    rotation: RotationParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    terminator_width_km: Option<f64>,
    #[serde(default, skip_serializing_if = "SurfaceConditions::is_empty")]
    surface: SurfaceConditions,
}

impl TryFrom<BodyDescriptorDef> for BodyDescriptor {
    type Error = MechanicsError;

    fn try_from(def: BodyDescriptorDef) -> Result<Self> {
        let descriptor = BodyDescriptor {
            name: def.name.unwrap_or_else(|| def.id.to_string()),
            id: def.id,
            kind: def.kind,
            parent: def.parent,
            orbit: def.orbit,
            rotation: def.rotation,
            radius_km: def.radius_km,
            terminator_width_km: def.terminator_width_km,
            surface: def.surface,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl From<BodyDescriptor> for BodyDescriptorDef {
    fn from(body: BodyDescriptor) -> Self {
        Self {
            id: body.id,
            name: Some(body.name),
            kind: body.kind,
            parent: body.parent,
            orbit: body.orbit,
            rotation: body.rotation,
            radius_km: body.radius_km,
            terminator_width_km: body.terminator_width_km,
            surface: body.surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circular(a: f64, period: f64) -> OrbitalElements {
        OrbitalElements::new(a, 0.0, period).unwrap()
    }

    fn solar_spin() -> RotationParameters {
        RotationParameters::simple(25.38, 7.25).unwrap()
    }

    #[test]
    fn test_root_has_no_orbit() {
        let sun = BodyDescriptor::root("sun", BodyKind::Star, solar_spin()).unwrap();
        assert!(sun.is_root());
        assert!(sun.orbital_period_days().is_none());
        assert_eq!(sun.name(), "sun");
    }

    #[test]
    fn test_tidally_locked_root_is_rejected() {
        let locked = RotationParameters::tidally_locked(0.0).unwrap();
        let err = BodyDescriptor::root("rogue", BodyKind::Moon, locked).unwrap_err();
        assert!(matches!(err, MechanicsError::InvalidParameter { name: "rotation", .. }));
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let err = BodyDescriptor::orbiting(
            "loop",
            BodyKind::Planet,
            "loop",
            circular(1.0, 10.0),
            solar_spin(),
        )
        .unwrap_err();
        assert_eq!(err, MechanicsError::ParentCycle("loop".into()));
    }

    #[test]
    fn test_radius_must_be_positive() {
        let sun = BodyDescriptor::root("sun", BodyKind::Star, solar_spin()).unwrap();
        assert!(sun.clone().with_radius_km(0.0).is_err());
        assert_eq!(sun.with_radius_km(695_700.0).unwrap().radius_km(), Some(695_700.0));
    }

    #[test]
    fn test_surface_conditions_are_validated() {
        let sun = BodyDescriptor::root("sun", BodyKind::Star, solar_spin()).unwrap();
        let inverted = SurfaceConditions {
            min_temp_c: Some(400.0),
            max_temp_c: Some(-100.0),
            ..Default::default()
        };
        assert!(sun.clone().with_surface(inverted).is_err());
        let colder_than_nothing = SurfaceConditions {
            terminator_temp_c: Some(-300.0),
            ..Default::default()
        };
        assert!(sun.clone().with_surface(colder_than_nothing).is_err());
        let vacuum = SurfaceConditions {
            atmosphere_pressure_bar: Some(0.0),
            ..Default::default()
        };
        let airless = sun.with_surface(vacuum).unwrap();
        assert_eq!(airless.surface().atmosphere_pressure_bar, Some(0.0));
    }

    #[test]
    fn test_deserialize_surface_block() {
        let ron_str = r#"(
            id: "venus",
            rotation: (rotation_period_days: Some(-243.025)),
            surface: (min_temp_c: Some(462.0), atmosphere_pressure_bar: Some(92.0)),
        )"#;
        let venus: BodyDescriptor = ron::from_str(ron_str).unwrap();
        assert_eq!(venus.surface().min_temp_c, Some(462.0));
        assert_eq!(venus.surface().max_temp_c, None);

        let bad = r#"{"id": "x", "rotation": {"rotation_period_days": 1.0},
            "surface": {"atmosphere_pressure_bar": -1.0}}"#;
        assert!(serde_json::from_str::<BodyDescriptor>(bad).is_err());

        let bare = BodyDescriptor::root("sun", BodyKind::Star, solar_spin()).unwrap();
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("surface"), "{json}");
    }

    #[test]
    fn test_deserialize_moon() {
        let ron_str = r#"(
            id: "moon",
            name: Some("Moon"),
            kind: Moon,
            parent: Some("earth"),
            orbit: Some((
                semi_major_axis: 384400.0,
                unit: Kilometers,
                eccentricity: 0.0549,
                inclination: 5.145,
                orbital_period_days: 27.321661,
            )),
            rotation: (tidally_locked: true, axial_tilt: 1.5424),
            radius_km: Some(1737.4),
        )"#;
        let moon: BodyDescriptor = ron::from_str(ron_str).unwrap();
        assert_eq!(moon.id().as_str(), "moon");
        assert_eq!(moon.name(), "Moon");
        assert_eq!(moon.kind(), BodyKind::Moon);
        assert!(moon.is_tidally_locked());
        assert_eq!(moon.parent(), Some(&BodyId::new("earth")));
    }

    #[test]
    fn test_deserialize_rejects_parent_without_orbit() {
        let json = r#"{"id": "stray", "parent": "sun", "rotation": {"rotation_period_days": 1.0}}"#;
        assert!(serde_json::from_str::<BodyDescriptor>(json).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let earth = BodyDescriptor::orbiting(
            "earth",
            BodyKind::Planet,
            "sun",
            circular(1.0, 365.256),
            RotationParameters::simple(0.99727, 23.44).unwrap(),
        )
        .unwrap()
        .with_name("Earth")
        .with_radius_km(6371.0)
        .unwrap()
        .with_terminator_width_km(500.0)
        .unwrap()
        .with_surface(SurfaceConditions {
            min_temp_c: Some(-89.2),
            max_temp_c: Some(56.7),
            terminator_temp_c: Some(5.0),
            atmosphere_pressure_bar: Some(1.01325),
        })
        .unwrap();
        let json = serde_json::to_string(&earth).unwrap();
        let back: BodyDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, earth);
    }
}
