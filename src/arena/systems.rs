//! Systems spawning the arena: environment, orbit centers, movers, and orbiters.
use std::collections::HashMap;

use bevy::{
    math::primitives::{Cuboid, Plane3d, Sphere},
    prelude::*,
};
use bevy_rapier3d::prelude::{Collider, GravityScale, RigidBody, Sensor};

use crate::arena::config::ArenaLayout;
use crate::motion::{
    components::{DynamicBody, LinearMotion, OrbitAnimator, OrbitalMotion},
    config::MotionSettings,
};

const GROUND_SCALE: f32 = 80.0;
const CAMERA_START_POS: Vec3 = Vec3::new(-14.0, 18.0, 22.0);

/// Spawns the ground plane, a light, and a camera looking at the arena center.
pub fn spawn_arena_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(Plane3d::default()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(60, 64, 78),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(GROUND_SCALE)),
        Name::new("Arena Floor"),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 15_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(16.0, 32.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_START_POS).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Spawns every body described by the [`ArenaLayout`] and links orbiters to their centers.
pub fn spawn_arena_bodies(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    layout: Res<ArenaLayout>,
    settings: Res<MotionSettings>,
) {
    let mut named: HashMap<String, Entity> = HashMap::new();

    for anchor in &layout.anchors {
        let entity = commands
            .spawn((
                Mesh3d(meshes.add(Mesh::from(Sphere::new(anchor.size)))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb_u8(240, 190, 80),
                    emissive: LinearRgba::rgb(4.0, 2.5, 0.6),
                    ..default()
                })),
                Transform::from_translation(anchor.position),
                Name::new(anchor.name.clone()),
            ))
            .id();
        named.insert(anchor.name.clone(), entity);
    }

    for mover in &layout.movers {
        let entity = commands
            .spawn((
                Mesh3d(meshes.add(Mesh::from(Sphere::new(mover.size)))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb_u8(150, 200, 240),
                    ..default()
                })),
                Transform::from_translation(mover.position),
                LinearMotion::new(mover.direction, mover.speed),
                Name::new(mover.name.clone()),
            ))
            .id();
        named.insert(mover.name.clone(), entity);
    }

    // Reserve orbiter entities first so orbiters can circle each other.
    let orbiter_entities: Vec<Entity> = layout
        .orbiters
        .iter()
        .map(|orbiter| {
            let entity = commands.spawn(Name::new(orbiter.name.clone())).id();
            named.insert(orbiter.name.clone(), entity);
            entity
        })
        .collect();

    for (orbiter, entity) in layout.orbiters.iter().zip(orbiter_entities) {
        let center = orbiter
            .center
            .as_ref()
            .and_then(|name| named.get(name).copied());
        if center.is_none() {
            warn!(
                "Orbiter '{}' refers to unknown center {:?}",
                orbiter.name, orbiter.center
            );
        }

        let color = if orbiter.dynamic {
            Color::srgb_u8(200, 110, 90)
        } else {
            Color::srgb_u8(110, 190, 120)
        };

        let mut spawned = commands.entity(entity);
        spawned.insert((
            Mesh3d(meshes.add(Mesh::from(Cuboid::from_length(orbiter.size * 2.0)))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })),
            Transform::default(),
            OrbitalMotion {
                config: orbiter.config.clone(),
                center,
                enabled: orbiter.auto_start,
            },
        ));
        if orbiter.dynamic {
            // Sensor colliders keep orbiters from knocking each other off their circles.
            spawned.insert((
                RigidBody::Dynamic,
                GravityScale(0.0),
                Collider::ball(orbiter.size),
                Sensor,
                DynamicBody::with_turn_rate(settings.steering.max_turn_rate),
            ));
        }
        if orbiter.animated {
            spawned.insert(OrbitAnimator);
        }
    }

    info!(
        "Arena spawned: {} anchor(s), {} mover(s), {} orbiter(s)",
        layout.anchors.len(),
        layout.movers.len(),
        layout.orbiters.len()
    );
}
