//! Render-side entities for the bodies.
//!
//! The simulation owns the physical state. Each body also has an entity in a
//! `hecs` world carrying what the renderer needs: a [`Transform`], a
//! [`BodyVisual`] and a [`Tracks`] tag naming the simulated body it mirrors.
//! [`Scene::sync`] copies drawn positions and spin angles across once per
//! frame; nothing flows the other way.

use glam::Quat;
use hecs::{Entity, World};

use crate::mesh::Transform;
use crate::sim::{BodyRole, Orrery};

/// Index of a mesh in the renderer's mesh list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Index of a material bind group in the renderer's list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Which simulated body an entity follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tracks(pub BodyRole);

/// How a body's sphere is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyVisual {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub radius: f32,
    pub tint: [f32; 4],
}

impl BodyVisual {
    pub fn new(mesh: MeshId, material: MaterialId, radius: f32) -> Self {
        Self {
            mesh,
            material,
            radius,
            tint: [1.0; 4],
        }
    }
}

/// The entity world for the rendered bodies.
#[derive(Default)]
pub struct Scene {
    pub world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the entity that mirrors `role`.
    pub fn spawn_body(&mut self, role: BodyRole, visual: BodyVisual) -> Entity {
        self.world.spawn((
            Tracks(role),
            visual,
            Transform::new().uniform_scale(visual.radius),
        ))
    }

    /// Copy drawn positions and spin angles from the simulation onto
    /// transforms.
    ///
    /// Positions come from [`Orrery::drawn_position`], so they are blended
    /// between physics steps. The simulation runs in `f64`; transforms are
    /// `f32`. Each body spins about the world Y axis.
    pub fn sync(&mut self, orrery: &Orrery) {
        for (_, (Tracks(role), visual, transform)) in self
            .world
            .query_mut::<(&Tracks, &BodyVisual, &mut Transform)>()
        {
            *transform = Transform::new()
                .position(orrery.drawn_position(*role).as_vec3())
                .rotation(Quat::from_rotation_y(orrery.spin(*role)))
                .uniform_scale(visual.radius);
        }
    }

    /// Transform of the entity mirroring `role`, if one was spawned.
    pub fn transform_of(&self, role: BodyRole) -> Option<Transform> {
        self.world
            .query::<(&Tracks, &Transform)>()
            .iter()
            .find(|(_, (tracks, _))| tracks.0 == role)
            .map(|(_, (_, transform))| *transform)
    }

    /// Everything the body pass needs, in spawn order.
    pub fn visuals(&self) -> Vec<(Transform, BodyVisual)> {
        let mut visuals: Vec<_> = self
            .world
            .query::<(&Transform, &BodyVisual)>()
            .iter()
            .map(|(entity, (transform, visual))| (entity, *transform, *visual))
            .collect();
        visuals.sort_by_key(|(entity, _, _)| entity.id());
        visuals.into_iter().map(|(_, t, v)| (t, v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrreryConfig;
    use crate::controls::mass_channel;
    use glam::Vec3;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.spawn_body(BodyRole::Orbiter, BodyVisual::new(MeshId(0), MaterialId(0), 1.0));
        scene.spawn_body(BodyRole::Primary, BodyVisual::new(MeshId(0), MaterialId(1), 10.0));
        scene
    }

    #[test]
    fn sync_copies_positions() {
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
        let mut scene = scene();

        for _ in 0..10 {
            orrery.step_once().unwrap();
        }
        scene.sync(&orrery);

        let earth = scene.transform_of(BodyRole::Orbiter).unwrap();
        let expected = orrery.drawn_position(BodyRole::Orbiter).as_vec3();
        assert_eq!(earth.position, expected);
        assert_eq!(earth.scale, Vec3::ONE);

        let sun = scene.transform_of(BodyRole::Primary).unwrap();
        assert_eq!(sun.position, Vec3::ZERO);
        assert_eq!(sun.scale, Vec3::splat(10.0));
    }

    #[test]
    fn sync_places_orbiter_between_steps() {
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
        let mut scene = scene();
        let start = orrery.body(BodyRole::Orbiter).position;

        orrery.tick(1.5 / 60.0);
        scene.sync(&orrery);

        let after = orrery.body(BodyRole::Orbiter).position;
        let midway = start.lerp(after, 0.5).as_vec3();
        let earth = scene.transform_of(BodyRole::Orbiter).unwrap();
        assert!((earth.position - midway).length() < 1e-5);
    }

    #[test]
    fn sync_applies_spin() {
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
        let mut scene = scene();

        orrery.tick(1.0);
        scene.sync(&orrery);

        let sun = scene.transform_of(BodyRole::Primary).unwrap();
        let (axis, angle) = sun.rotation.to_axis_angle();
        assert!((axis - Vec3::Y).length() < 1e-4);
        assert!((angle - orrery.spin(BodyRole::Primary)).abs() < 1e-4);
    }

    #[test]
    fn visuals_keep_spawn_order() {
        let scene = scene();
        let radii: Vec<f32> = scene.visuals().iter().map(|(_, v)| v.radius).collect();
        assert_eq!(radii, vec![1.0, 10.0]);
    }

    #[test]
    fn missing_body_has_no_transform() {
        let mut scene = Scene::new();
        scene.spawn_body(BodyRole::Primary, BodyVisual::new(MeshId(0), MaterialId(0), 10.0));
        assert!(scene.transform_of(BodyRole::Orbiter).is_none());
    }
}
