//! Body system: the validated parent forest and the per-body queries that need
//! more than one descriptor (world position, illumination).

use std::collections::{HashMap, VecDeque};

use orrery_math::{Matrix4, Vector3};
use tracing::{debug, info};

use crate::body::{BodyDescriptor, BodyId};
use crate::error::{MechanicsError, Result};
use crate::illumination::{
    self, Illumination, SurfacePoint, find_subsolar_point, illuminate, terminator_width_deg,
};
use crate::orbit::{OrbitalState, ReferencePlane, compute_orbital_state};
use crate::rotation::{RotationState, compute_rotation_state_in, equator_frame};

/// Immutable set of bodies whose parent links form a forest.
///
/// Bodies are stored parents-first, so a single forward pass sees every
/// parent before its children. The system holds no simulation state; every
/// query is a pure function of the descriptors and `t`.
#[derive(Clone, Debug)]
pub struct BodySystem {
    bodies: Vec<BodyDescriptor>,
    parent_index: Vec<Option<usize>>,
    index: HashMap<BodyId, usize>,
}

impl BodySystem {
    /// Validate and order a set of descriptors. Input order is irrelevant.
    ///
    /// # Errors
    ///
    /// - [`MechanicsError::DuplicateBody`] if two descriptors share an id.
    /// - [`MechanicsError::MissingParent`] if a parent id is not in the set.
    /// - [`MechanicsError::ParentCycle`] if parent links loop.
    pub fn new(descriptors: impl IntoIterator<Item = BodyDescriptor>) -> Result<Self> {
        let input: Vec<BodyDescriptor> = descriptors.into_iter().collect();

        let mut by_id: HashMap<BodyId, usize> = HashMap::with_capacity(input.len());
        for (i, body) in input.iter().enumerate() {
            if by_id.insert(body.id().clone(), i).is_some() {
                return Err(MechanicsError::DuplicateBody(body.id().to_string()));
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); input.len()];
        let mut roots = VecDeque::new();
        for (i, body) in input.iter().enumerate() {
            match body.parent() {
                Some(parent) => {
                    let &p = by_id.get(parent).ok_or_else(|| MechanicsError::MissingParent {
                        body: body.id().to_string(),
                        parent: parent.to_string(),
                    })?;
                    children[p].push(i);
                }
                None => roots.push_back(i),
            }
        }
        let root_count = roots.len();

        // Breadth-first from the roots; whatever is never reached sits on a cycle.
        let mut order = Vec::with_capacity(input.len());
        while let Some(i) = roots.pop_front() {
            order.push(i);
            roots.extend(children[i].iter().copied());
        }
        if order.len() != input.len() {
            let mut reached = vec![false; input.len()];
            for &i in &order {
                reached[i] = true;
            }
            let mut stuck: Vec<&BodyId> = input
                .iter()
                .enumerate()
                .filter(|(i, _)| !reached[*i])
                .map(|(_, b)| b.id())
                .collect();
            stuck.sort();
            let first = stuck.first().map(|id| id.to_string()).unwrap_or_default();
            return Err(MechanicsError::ParentCycle(first));
        }

        let mut slots: Vec<Option<BodyDescriptor>> = input.into_iter().map(Some).collect();
        let mut bodies = Vec::with_capacity(order.len());
        let mut index = HashMap::with_capacity(order.len());
        for &i in &order {
            if let Some(body) = slots[i].take() {
                index.insert(body.id().clone(), bodies.len());
                bodies.push(body);
            }
        }
        let parent_index = bodies
            .iter()
            .map(|b| b.parent().and_then(|p| index.get(p).copied()))
            .collect();

        info!(bodies = bodies.len(), roots = root_count, "Body system assembled");
        Ok(Self {
            bodies,
            parent_index,
            index,
        })
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if the system has no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over all bodies, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &BodyDescriptor> {
        self.bodies.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a body by id.
    pub fn get(&self, id: &str) -> Result<&BodyDescriptor> {
        self.position_of(id).map(|i| &self.bodies[i])
    }

    fn position_of(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| MechanicsError::UnknownBody(id.to_string()))
    }

    /// Direct children of a body. Unknown ids have none.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a BodyDescriptor> + 'a {
        self.bodies
            .iter()
            .filter(move |b| b.parent().is_some_and(|p| p.as_str() == id))
    }

    /// The root of a body's chain: the star that illuminates it.
    pub fn root_of(&self, id: &str) -> Result<&BodyDescriptor> {
        let mut i = self.position_of(id)?;
        while let Some(p) = self.parent_index[i] {
            i = p;
        }
        Ok(&self.bodies[i])
    }

    /// The frame body `i`'s orbital elements are measured in: the parent's
    /// equator for [`ReferencePlane::ParentEquator`], otherwise the ecliptic.
    fn reference_frame(&self, i: usize) -> Matrix4 {
        match (self.bodies[i].orbit(), self.parent_index[i]) {
            (Some(orbit), Some(p)) if orbit.reference_plane() == ReferencePlane::ParentEquator => {
                self.equator_frame_of(p)
            }
            _ => Matrix4::IDENTITY,
        }
    }

    fn equator_frame_of(&self, i: usize) -> Matrix4 {
        equator_frame(&self.bodies[i], &self.reference_frame(i))
    }

    /// The body's offset from its parent in world axes, honouring its
    /// reference plane.
    fn relative_state(&self, i: usize, t: f64) -> Result<OrbitalState> {
        let mut state = compute_orbital_state(&self.bodies[i], t)?;
        state.position = self.reference_frame(i).transform_vector(state.position);
        Ok(state)
    }

    fn rotation_state_of(&self, i: usize, t: f64, true_anomaly: f64) -> Result<RotationState> {
        let body = &self.bodies[i];
        compute_rotation_state_in(
            body,
            t,
            true_anomaly,
            body.orbital_period_days(),
            &self.reference_frame(i),
        )
    }

    /// Orbital state relative to the parent at `t`.
    pub fn orbital_state(&self, id: &str, t: f64) -> Result<OrbitalState> {
        self.relative_state(self.position_of(id)?, t)
    }

    /// World position at `t`: the sum of orbital offsets up the parent chain.
    pub fn world_position(&self, id: &str, t: f64) -> Result<Vector3> {
        let mut i = self.position_of(id)?;
        let mut position = Vector3::ZERO;
        loop {
            position += self.relative_state(i, t)?.position;
            match self.parent_index[i] {
                Some(p) => i = p,
                None => return Ok(position),
            }
        }
    }

    /// Rotation state at `t`, driven by the body's own orbit and carried into
    /// its reference plane.
    pub fn rotation_state(&self, id: &str, t: f64) -> Result<RotationState> {
        let i = self.position_of(id)?;
        let orbit = compute_orbital_state(&self.bodies[i], t)?;
        self.rotation_state_of(i, t, orbit.true_anomaly)
    }

    /// Direction to the body's star in its own rotating frame.
    ///
    /// # Errors
    ///
    /// Returns [`MechanicsError::InvalidParameter`] for a root body, which is
    /// its own star.
    pub fn sun_direction_in_body_frame(&self, id: &str, t: f64) -> Result<Vector3> {
        let body = self.get(id)?;
        let star = self.root_of(id)?;
        if star.id() == body.id() {
            return Err(MechanicsError::invalid(
                "body",
                format!("`{id}` is a root and has no illuminating star"),
            ));
        }
        let star_pos = self.world_position(star.id().as_str(), t)?;
        let body_pos = self.world_position(id, t)?;
        let rotation = self.rotation_state(id, t)?;
        illumination::sun_direction_body_frame(body_pos, star_pos, &rotation.matrix)
    }

    /// Point on the body's surface under its star at `t`.
    pub fn subsolar_point(&self, id: &str, t: f64) -> Result<SurfacePoint> {
        find_subsolar_point(self.sun_direction_in_body_frame(id, t)?)
    }

    /// Classify a surface point of `id` at `t`.
    ///
    /// The terminator width comes from the body's own radius and twilight band
    /// when both are known, otherwise `default_width_deg` is used.
    pub fn illumination_at(
        &self,
        id: &str,
        t: f64,
        point: SurfacePoint,
        default_width_deg: f64,
    ) -> Result<Illumination> {
        let body = self.get(id)?;
        let width = terminator_width_for(body, default_width_deg)?;
        let sun = self.sun_direction_in_body_frame(id, t)?;
        Ok(illuminate(point, sun, width))
    }

    /// State of one body at `t`.
    pub fn snapshot_of(&self, id: &str, t: f64) -> Result<BodySnapshot> {
        let i = self.position_of(id)?;
        let world_position = self.world_position(id, t)?;
        self.build_snapshot(i, t, world_position)
    }

    /// State of every body at `t`, parents before children.
    ///
    /// World positions are accumulated in one forward pass over the ordered
    /// bodies; nothing outlives the call.
    pub fn snapshot(&self, t: f64) -> Result<Vec<BodySnapshot>> {
        let mut world = Vec::with_capacity(self.bodies.len());
        let mut out = Vec::with_capacity(self.bodies.len());
        for i in 0..self.bodies.len() {
            let offset = self.relative_state(i, t)?.position;
            let position = match self.parent_index[i] {
                Some(p) => world[p] + offset,
                None => offset,
            };
            world.push(position);
            out.push(self.build_snapshot(i, t, position)?);
        }
        debug!(t, bodies = out.len(), "Snapshot computed");
        Ok(out)
    }

    fn build_snapshot(&self, i: usize, t: f64, world_position: Vector3) -> Result<BodySnapshot> {
        let body = &self.bodies[i];
        let orbit = self.relative_state(i, t)?;
        let period = body.orbital_period_days();
        let rotation = self.rotation_state_of(i, t, orbit.true_anomaly)?;
        let solar_day_days = body.rotation().solar_day_days(period)?;

        let (sun_direction, subsolar_point) = if self.parent_index[i].is_some() {
            let star = self.root_of(body.id().as_str())?;
            let star_pos = self.world_position(star.id().as_str(), t)?;
            let sun =
                illumination::sun_direction_body_frame(world_position, star_pos, &rotation.matrix)?;
            (Some(sun), Some(find_subsolar_point(sun)?))
        } else {
            (None, None)
        };

        Ok(BodySnapshot {
            id: body.id().clone(),
            world_position,
            orbit,
            rotation,
            solar_day_days,
            sun_direction,
            subsolar_point,
        })
    }
}

/// Terminator width in degrees for `body`, falling back to `default_deg`.
pub fn terminator_width_for(body: &BodyDescriptor, default_deg: f64) -> Result<f64> {
    match (body.terminator_width_km(), body.radius_km()) {
        (Some(width), Some(radius)) => terminator_width_deg(width, radius),
        _ => Ok(default_deg),
    }
}

/// Everything a renderer needs for one body in one frame. Read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    /// World position in AU.
    pub world_position: Vector3,
    /// Orbit relative to the parent.
    pub orbit: OrbitalState,
    pub rotation: RotationState,
    /// Solar day in days; `None` when infinite.
    pub solar_day_days: Option<f64>,
    /// Direction to the star in the body frame; `None` for stars.
    pub sun_direction: Option<Vector3>,
    /// Subsolar point; `None` for stars.
    pub subsolar_point: Option<SurfacePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use crate::orbit::{LengthUnit, OrbitalElements};
    use crate::rotation::RotationParameters;

    fn star(id: &str) -> BodyDescriptor {
        BodyDescriptor::root(id, BodyKind::Star, RotationParameters::simple(25.0, 0.0).unwrap())
            .unwrap()
    }

    fn planet(id: &str, parent: &str, a: f64, period: f64) -> BodyDescriptor {
        BodyDescriptor::orbiting(
            id,
            BodyKind::Planet,
            parent,
            OrbitalElements::new(a, 0.0, period).unwrap(),
            RotationParameters::simple(1.0, 0.0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let system = BodySystem::new(vec![
            planet("moon", "earth", 0.01, 27.0),
            planet("earth", "sun", 1.0, 365.0),
            star("sun"),
        ])
        .unwrap();
        let order: Vec<&str> = system.iter().map(|b| b.id().as_str()).collect();
        assert_eq!(order, ["sun", "earth", "moon"]);
        assert_eq!(system.root_of("moon").unwrap().id().as_str(), "sun");
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = BodySystem::new(vec![star("sun"), star("sun")]).unwrap_err();
        assert_eq!(err, MechanicsError::DuplicateBody("sun".into()));
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let err = BodySystem::new(vec![planet("earth", "sun", 1.0, 365.0)]).unwrap_err();
        assert_eq!(
            err,
            MechanicsError::MissingParent {
                body: "earth".into(),
                parent: "sun".into(),
            }
        );
    }

    #[test]
    fn test_cycles_are_rejected() {
        let err = BodySystem::new(vec![
            star("sun"),
            planet("a", "b", 1.0, 10.0),
            planet("b", "a", 1.0, 10.0),
        ])
        .unwrap_err();
        assert_eq!(err, MechanicsError::ParentCycle("a".into()));
    }

    #[test]
    fn test_unknown_body() {
        let system = BodySystem::new(vec![star("sun")]).unwrap();
        assert_eq!(
            system.world_position("vulcan", 0.0).unwrap_err(),
            MechanicsError::UnknownBody("vulcan".into())
        );
    }

    #[test]
    fn test_world_position_sums_parent_chain() {
        let system = BodySystem::new(vec![
            star("sun"),
            planet("earth", "sun", 1.0, 365.0),
            planet("moon", "earth", 0.01, 27.0),
        ])
        .unwrap();
        let moon = system.world_position("moon", 0.0).unwrap();
        assert!(moon.abs_diff_eq(Vector3::new(1.01, 0.0, 0.0), 1e-12), "moon at {moon}");
        assert_eq!(system.world_position("sun", 5.0).unwrap(), Vector3::ZERO);
    }

    #[test]
    fn test_children() {
        let system = BodySystem::new(vec![
            star("sun"),
            planet("earth", "sun", 1.0, 365.0),
            planet("mars", "sun", 1.5, 687.0),
            planet("moon", "earth", 0.01, 27.0),
        ])
        .unwrap();
        let mut names: Vec<&str> = system.children("sun").map(|b| b.id().as_str()).collect();
        names.sort();
        assert_eq!(names, ["earth", "mars"]);
        assert_eq!(system.children("moon").count(), 0);
    }

    #[test]
    fn test_root_has_no_sun_direction() {
        let system = BodySystem::new(vec![star("sun")]).unwrap();
        assert!(system.sun_direction_in_body_frame("sun", 0.0).is_err());
    }

    #[test]
    fn test_parent_equator_plane_follows_parent_tilt() {
        let tilted = BodyDescriptor::orbiting(
            "uranus",
            BodyKind::Planet,
            "sun",
            OrbitalElements::new(19.2, 0.0, 30_688.5).unwrap(),
            RotationParameters::simple(-0.718, 90.0).unwrap(),
        )
        .unwrap();
        let moon_orbit = OrbitalElements::new(100_000.0, 0.0, 2.0)
            .unwrap()
            .with_unit(LengthUnit::Kilometers)
            .with_mean_anomaly_at_epoch(90.0)
            .unwrap();
        let ecliptic_moon = BodyDescriptor::orbiting(
            "ecliptic",
            BodyKind::Moon,
            "uranus",
            moon_orbit.clone(),
            RotationParameters::tidally_locked(0.0).unwrap(),
        )
        .unwrap();
        let equator_moon = BodyDescriptor::orbiting(
            "equatorial",
            BodyKind::Moon,
            "uranus",
            moon_orbit.with_reference_plane(ReferencePlane::ParentEquator),
            RotationParameters::tidally_locked(0.0).unwrap(),
        )
        .unwrap();
        let system =
            BodySystem::new(vec![star("sun"), tilted, ecliptic_moon, equator_moon]).unwrap();

        let flat = system.orbital_state("ecliptic", 0.0).unwrap().position;
        let leaning = system.orbital_state("equatorial", 0.0).unwrap().position;
        // At t = 0 the moon sits on the parent's tilt axis (world −Z), which
        // both planes share.
        assert!(flat.y.abs() < 1e-15);
        assert!((flat.length() - leaning.length()).abs() < 1e-15);

        let flat0 = system.orbital_state("ecliptic", 1.5).unwrap().position;
        let leaning0 = system.orbital_state("equatorial", 1.5).unwrap().position;
        assert!(flat0.y.abs() < 1e-15);
        assert!(leaning0.y.abs() > 0.5 * leaning0.length(), "{leaning0}");
    }

    #[test]
    fn test_parent_equator_moon_spins_about_parent_pole() {
        let tilted = BodyDescriptor::orbiting(
            "uranus",
            BodyKind::Planet,
            "sun",
            OrbitalElements::new(19.2, 0.0, 30_688.5).unwrap(),
            RotationParameters::simple(-0.718, 97.77)
                .unwrap()
                .with_pole_direction(40.0)
                .unwrap(),
        )
        .unwrap();
        let moon = BodyDescriptor::orbiting(
            "miranda",
            BodyKind::Moon,
            "uranus",
            OrbitalElements::new(129_390.0, 0.0, 1.413479)
                .unwrap()
                .with_unit(LengthUnit::Kilometers)
                .with_reference_plane(ReferencePlane::ParentEquator),
            RotationParameters::tidally_locked(0.0).unwrap(),
        )
        .unwrap();
        let system = BodySystem::new(vec![star("sun"), tilted, moon]).unwrap();

        let pole = system.rotation_state("uranus", 0.0).unwrap().axis;
        let spin_axis = system.rotation_state("miranda", 0.3).unwrap().axis;
        assert!(spin_axis.abs_diff_eq(pole, 1e-12), "{spin_axis} vs {pole}");

        // Locked to its parent: the parent stays at a fixed body-frame direction.
        let facing = |t: f64| {
            let rotation = system.rotation_state("miranda", t).unwrap().matrix;
            let to_parent = -system.orbital_state("miranda", t).unwrap().position;
            rotation.inverse().transform_vector(to_parent).normalize()
        };
        let first = facing(0.0);
        for i in 1..10 {
            let t = i as f64 * 0.37;
            assert!(facing(t).abs_diff_eq(first, 1e-9), "t = {t}");
        }
    }

    #[test]
    fn test_snapshot_matches_single_queries() {
        let system = BodySystem::new(vec![
            star("sun"),
            planet("earth", "sun", 1.0, 365.0),
            planet("moon", "earth", 0.01, 27.0),
        ])
        .unwrap();
        let t = 123.4;
        let snapshot = system.snapshot(t).unwrap();
        assert_eq!(snapshot.len(), 3);
        for snap in &snapshot {
            let single = system.snapshot_of(snap.id.as_str(), t).unwrap();
            assert!(snap.world_position.abs_diff_eq(single.world_position, 1e-12));
            match (snap.subsolar_point, single.subsolar_point) {
                (Some(a), Some(b)) => {
                    assert!((a.latitude - b.latitude).abs() < 1e-9);
                    assert!((a.longitude - b.longitude).abs() < 1e-9);
                }
                (None, None) => {}
                other => panic!("subsolar mismatch for {}: {other:?}", snap.id),
            }
        }
        assert!(snapshot[0].sun_direction.is_none());
        assert!(snapshot[2].sun_direction.is_some());
    }

    #[test]
    fn test_illumination_uses_body_terminator_width() {
        let earth = planet("earth", "sun", 1.0, 365.0)
            .with_radius_km(6371.0)
            .unwrap()
            .with_terminator_width_km(1111.9)
            .unwrap();
        assert!((terminator_width_for(&earth, 2.0).unwrap() - 10.0).abs() < 0.01);
        let bare = planet("mars", "sun", 1.5, 687.0);
        assert_eq!(terminator_width_for(&bare, 2.0).unwrap(), 2.0);

        let system = BodySystem::new(vec![star("sun"), earth]).unwrap();
        let subsolar = system.subsolar_point("earth", 0.0).unwrap();
        let lit = system.illumination_at("earth", 0.0, subsolar, 2.0).unwrap();
        assert!(lit.daylight && !lit.in_terminator);
        assert!(lit.sun_angle_deg < 1e-6);
    }
}
