//! Fixed-step systems binding orbit controllers to ECS transforms and rapier bodies.
use std::collections::HashSet;

use bevy::prelude::*;
use bevy_rapier3d::dynamics::Velocity;

use super::{
    capabilities::{AnimationSink, BodyBinding, KinematicBody, MotionTarget, PhysicsBinding},
    components::{DynamicBody, LinearMotion, OrbitAnimator, OrbitController, OrbitalMotion},
    controller::OrbitalMotionController,
    errors::{MotionDiagnostic, OrbitDirection},
    events::{AnimationTriggerEvent, MotionDiagnosticEvent},
};
use crate::core::plugin::SimulationClock;
use crate::input::axes::InputAxes;

struct TransformBody<'a>(&'a mut Transform);

impl KinematicBody for TransformBody<'_> {
    fn set_position(&mut self, position: Vec3) {
        self.0.translation = position;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.0.rotation = rotation;
    }
}

struct RapierBody<'a> {
    transform: &'a mut Transform,
    velocity: &'a mut Velocity,
    body: &'a mut DynamicBody,
}

impl PhysicsBinding for RapierBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn place(&mut self, position: Vec3) {
        self.transform.translation = position;
        *self.velocity = Velocity::zero();
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity.linvel = velocity;
    }

    fn rotate_toward(&mut self, rotation: Quat) {
        self.body.rotation_target = Some(rotation);
    }
}

struct TriggerCollector {
    entity: Entity,
    fired: Vec<String>,
}

impl AnimationSink for TriggerCollector {
    fn fire_trigger(&mut self, name: &str) {
        self.fired.push(name.to_string());
    }
}

/// Binds newly added orbiters to their center and body, placing them on the orbit.
#[allow(clippy::type_complexity)]
pub fn initialize_orbiters(
    mut commands: Commands,
    pending: Query<(Entity, &OrbitalMotion), Without<OrbitController>>,
    mut bodies: ParamSet<(
        Query<&Transform>,
        Query<(&mut Transform, Option<(&mut DynamicBody, &mut Velocity)>)>,
    )>,
    clock: Res<SimulationClock>,
    mut diagnostics: MessageWriter<MotionDiagnosticEvent>,
) {
    for (entity, motion) in binding_order(pending.iter()) {
        let center = motion
            .center
            .and_then(|center| bodies.p0().get(center).ok().map(|t| t.translation));
        let target = center.as_ref().map(|center| center as &dyn MotionTarget);

        let mut body_query = bodies.p1();
        let Ok((mut transform, dynamic)) = body_query.get_mut(entity) else {
            continue;
        };

        let mut controller = match dynamic {
            Some((mut dynamic, mut velocity)) => {
                let mut physics = RapierBody {
                    transform: &mut transform,
                    velocity: &mut velocity,
                    body: &mut dynamic,
                };
                OrbitalMotionController::initialize(
                    motion.config.clone(),
                    target,
                    BodyBinding::Dynamic(&mut physics),
                )
            }
            None => {
                let mut body = TransformBody(&mut transform);
                OrbitalMotionController::initialize(
                    motion.config.clone(),
                    target,
                    BodyBinding::Kinematic(&mut body),
                )
            }
        };

        if controller.is_active() {
            debug!(
                "Orbiter {} bound ({} body, radius {:.2})",
                entity,
                controller.body_kind(),
                motion.config.radius
            );
        }
        report_diagnostics(
            entity,
            controller.take_diagnostics(),
            &clock,
            &mut diagnostics,
        );
        commands.entity(entity).insert(OrbitController(controller));
    }
}

/// Orders pending orbiters so a center that is itself pending is placed first.
///
/// Cycles are bound in arbitrary order once no further progress can be made.
fn binding_order<'a>(
    pending: impl Iterator<Item = (Entity, &'a OrbitalMotion)>,
) -> Vec<(Entity, &'a OrbitalMotion)> {
    let mut queue: Vec<_> = pending.collect();
    let pending_entities: HashSet<Entity> = queue.iter().map(|(entity, _)| *entity).collect();
    let mut placed: HashSet<Entity> = HashSet::new();
    let mut order = Vec::with_capacity(queue.len());

    while !queue.is_empty() {
        let (ready, waiting): (Vec<_>, Vec<_>) =
            queue.into_iter().partition(|(entity, motion)| {
                motion.center.is_none_or(|center| {
                    center == *entity
                        || !pending_entities.contains(&center)
                        || placed.contains(&center)
                })
            });
        if ready.is_empty() {
            order.extend(waiting);
            break;
        }
        placed.extend(ready.iter().map(|(entity, _)| *entity));
        order.extend(ready);
        queue = waiting;
    }

    order
}

/// Advances every bound orbiter by one fixed step; disabled orbits hold in place.
#[allow(clippy::type_complexity)]
pub fn step_orbiters(
    time: Res<Time>,
    axes: Res<InputAxes>,
    clock: Res<SimulationClock>,
    mut orbiters: Query<(Entity, &OrbitalMotion, &mut OrbitController, Has<OrbitAnimator>)>,
    mut bodies: ParamSet<(
        Query<&Transform>,
        Query<(&mut Transform, Option<(&mut DynamicBody, &mut Velocity)>)>,
    )>,
    mut triggers: MessageWriter<AnimationTriggerEvent>,
    mut diagnostics: MessageWriter<MotionDiagnosticEvent>,
) {
    let dt = time.delta_secs();

    for (entity, motion, mut controller, animated) in orbiters.iter_mut() {
        if !controller.0.is_active() {
            continue;
        }

        let center = motion
            .center
            .and_then(|center| bodies.p0().get(center).ok().map(|t| t.translation));
        let target = center.as_ref().map(|center| center as &dyn MotionTarget);

        let mut body_query = bodies.p1();
        let Ok((mut transform, dynamic)) = body_query.get_mut(entity) else {
            continue;
        };

        if !motion.enabled {
            match dynamic {
                Some((mut dynamic, mut velocity)) => {
                    let mut physics = RapierBody {
                        transform: &mut transform,
                        velocity: &mut velocity,
                        body: &mut dynamic,
                    };
                    controller.0.hold(target, BodyBinding::Dynamic(&mut physics));
                }
                None => {
                    let mut body = TransformBody(&mut transform);
                    controller.0.hold(target, BodyBinding::Kinematic(&mut body));
                }
            }
            report_diagnostics(entity, controller.0.take_diagnostics(), &clock, &mut diagnostics);
            continue;
        }

        let mut sink = TriggerCollector {
            entity,
            fired: Vec::new(),
        };
        let animation = animated.then_some(&mut sink as &mut dyn AnimationSink);

        let sample = match dynamic {
            Some((mut dynamic, mut velocity)) => {
                let mut physics = RapierBody {
                    transform: &mut transform,
                    velocity: &mut velocity,
                    body: &mut dynamic,
                };
                controller.0.step(
                    dt,
                    target,
                    &*axes,
                    BodyBinding::Dynamic(&mut physics),
                    animation,
                )
            }
            None => {
                let mut body = TransformBody(&mut transform);
                controller.0.step(
                    dt,
                    target,
                    &*axes,
                    BodyBinding::Kinematic(&mut body),
                    animation,
                )
            }
        };

        if let Some(direction) = sample.and_then(|sample| sample.trigger) {
            for trigger in sink.fired.drain(..) {
                triggers.write(AnimationTriggerEvent {
                    entity: sink.entity,
                    trigger,
                    direction,
                });
            }
        }
        report_diagnostics(entity, controller.0.take_diagnostics(), &clock, &mut diagnostics);
    }
}

/// Sets each dynamic body's angular velocity so rapier turns it toward its
/// requested rotation, capped at the body's turn rate.
pub fn steer_dynamic_bodies(
    time: Res<Time>,
    mut bodies: Query<(&Transform, &DynamicBody, &mut Velocity)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (transform, body, mut velocity) in bodies.iter_mut() {
        velocity.angvel = match body.rotation_target {
            Some(target) => turn_rate_toward(transform.rotation, target, body.max_turn_rate, dt),
            None => Vec3::ZERO,
        };
    }
}

/// World-space angular velocity reaching `target` within `dt`, clamped to `max_rate` rad/s.
fn turn_rate_toward(current: Quat, target: Quat, max_rate: f32, dt: f32) -> Vec3 {
    let delta = (target * current.inverse()).normalize();
    // Shortest arc.
    let delta = if delta.w < 0.0 { -delta } else { delta };
    let (axis, angle) = delta.to_axis_angle();
    if angle <= f32::EPSILON {
        return Vec3::ZERO;
    }
    axis * (angle / dt).min(max_rate)
}

/// Moves linear movers along their direction.
pub fn apply_linear_motion(time: Res<Time>, mut movers: Query<(&mut Transform, &LinearMotion)>) {
    let dt = time.delta_secs();
    for (mut transform, motion) in movers.iter_mut() {
        let velocity = motion.velocity();
        if velocity != Vec3::ZERO {
            transform.translation += velocity * dt;
        }
    }
}

/// Logs animation triggers; stands in for an animation graph consumer.
pub fn log_animation_triggers(mut triggers: MessageReader<AnimationTriggerEvent>) {
    for event in triggers.read() {
        let arrow = match event.direction {
            OrbitDirection::Clockwise => "cw",
            OrbitDirection::Counterclockwise => "ccw",
        };
        debug!("Orbiter {} fired '{}' ({})", event.entity, event.trigger, arrow);
    }
}

fn report_diagnostics(
    entity: Entity,
    drained: Vec<MotionDiagnostic>,
    clock: &SimulationClock,
    writer: &mut MessageWriter<MotionDiagnosticEvent>,
) {
    for diagnostic in drained {
        match &diagnostic {
            MotionDiagnostic::Error(error) => error!(
                "Orbiter {} disabled at step {} ({:.2}s): {}",
                entity,
                clock.steps(),
                clock.elapsed().as_secs_f32(),
                error
            ),
            MotionDiagnostic::Warning(warning) => warn!(
                "Orbiter {} at step {}: {}",
                entity,
                clock.steps(),
                warning
            ),
        }
        writer.write(MotionDiagnosticEvent { entity, diagnostic });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::motion::controller::{ControllerStatus, DriveMode, OrbitConfig};
    use crate::motion::errors::MotionError;

    const STEP: Duration = Duration::from_millis(20);

    #[derive(Resource)]
    struct Collected<T: Message>(Vec<T>);

    impl<T: Message> Default for Collected<T> {
        fn default() -> Self {
            Self(Vec::new())
        }
    }

    fn collect<T: Message + Clone>(
        mut reader: MessageReader<T>,
        mut collected: ResMut<Collected<T>>,
    ) {
        collected.0.extend(reader.read().cloned());
    }

    /// Stands in for the rapier step: integrates commanded velocities into transforms.
    fn advance_rigid_bodies(time: Res<Time>, mut bodies: Query<(&mut Transform, &Velocity)>) {
        let dt = time.delta_secs();
        for (mut transform, velocity) in bodies.iter_mut() {
            transform.translation += velocity.linvel * dt;
            transform.rotation =
                (Quat::from_scaled_axis(velocity.angvel * dt) * transform.rotation).normalize();
        }
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<InputAxes>()
            .init_resource::<SimulationClock>()
            .init_resource::<Collected<AnimationTriggerEvent>>()
            .init_resource::<Collected<MotionDiagnosticEvent>>()
            .add_message::<AnimationTriggerEvent>()
            .add_message::<MotionDiagnosticEvent>()
            .add_systems(
                Update,
                (
                    apply_linear_motion,
                    initialize_orbiters,
                    step_orbiters,
                    steer_dynamic_bodies,
                    advance_rigid_bodies,
                    collect::<AnimationTriggerEvent>,
                    collect::<MotionDiagnosticEvent>,
                )
                    .chain(),
            );
        app.world_mut().resource_mut::<Time>().advance_by(STEP);
        app
    }

    fn collected<T: Message + Clone>(app: &App) -> Vec<T> {
        app.world().resource::<Collected<T>>().0.clone()
    }

    #[test]
    fn kinematic_orbiter_circles_its_center() {
        let mut app = test_app();
        let center = app
            .world_mut()
            .spawn(Transform::from_xyz(1.0, 0.0, 1.0))
            .id();
        let orbiter = app
            .world_mut()
            .spawn((
                Transform::default(),
                OrbitalMotion::new(OrbitConfig::default(), center),
            ))
            .id();

        for _ in 0..10 {
            app.update();
            let position = app.world().get::<Transform>(orbiter).unwrap().translation;
            assert!((position.distance(Vec3::new(1.0, 0.0, 1.0)) - 5.0).abs() < 1e-4);
        }

        let controller = app.world().get::<OrbitController>(orbiter).unwrap();
        assert!(controller.0.state().current_angle_deg > 0.0);
    }

    #[test]
    fn orbiter_without_center_is_disabled_and_reported() {
        let mut app = test_app();
        let orbiter = app
            .world_mut()
            .spawn((
                Transform::from_xyz(7.0, 0.0, 0.0),
                OrbitalMotion {
                    config: OrbitConfig::default(),
                    center: None,
                    enabled: true,
                },
            ))
            .id();

        app.update();
        app.update();

        let reported = collected::<MotionDiagnosticEvent>(&app);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].entity, orbiter);
        assert_eq!(
            reported[0].diagnostic,
            MotionDiagnostic::Error(MotionError::MissingTarget)
        );
        let controller = app.world().get::<OrbitController>(orbiter).unwrap();
        assert_eq!(
            controller.0.status(),
            &ControllerStatus::Disabled(MotionError::MissingTarget)
        );
        assert_eq!(
            app.world().get::<Transform>(orbiter).unwrap().translation,
            Vec3::new(7.0, 0.0, 0.0)
        );
    }

    #[test]
    fn dynamic_orbiter_follows_moving_center() {
        let mut app = test_app();
        let center = app
            .world_mut()
            .spawn((
                Transform::default(),
                LinearMotion::new(Vec3::X, 2.0),
            ))
            .id();
        let orbiter = app
            .world_mut()
            .spawn((
                Transform::default(),
                DynamicBody::with_turn_rate(std::f32::consts::PI),
                OrbitalMotion::new(
                    OrbitConfig {
                        auto_angular_speed_deg: 0.0,
                        ..Default::default()
                    },
                    center,
                ),
            ))
            .id();

        // First update binds; later ones track the center's velocity.
        for _ in 0..5 {
            app.update();
        }

        let velocity = app.world().get::<Velocity>(orbiter).unwrap();
        assert!((velocity.linvel - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-3);
        let body = app.world().get::<DynamicBody>(orbiter).unwrap();
        assert!(body.rotation_target.is_some());

        let center_position = app.world().get::<Transform>(center).unwrap().translation;
        let orbiter_position = app.world().get::<Transform>(orbiter).unwrap().translation;
        assert!((orbiter_position.distance(center_position) - 5.0).abs() < 0.1);
    }

    #[test]
    fn input_driven_orbiter_emits_triggers() {
        let mut app = test_app();
        app.world_mut()
            .resource_mut::<InputAxes>()
            .record("orbit", Some(-1.0));
        let center = app.world_mut().spawn(Transform::default()).id();
        let orbiter = app
            .world_mut()
            .spawn((
                Transform::default(),
                OrbitAnimator,
                OrbitalMotion::new(
                    OrbitConfig {
                        drive_mode: DriveMode::InputDriven {
                            axis: "orbit".into(),
                        },
                        ..Default::default()
                    },
                    center,
                ),
            ))
            .id();

        app.update();
        let fired = collected::<AnimationTriggerEvent>(&app);
        assert_eq!(
            fired,
            vec![AnimationTriggerEvent {
                entity: orbiter,
                trigger: "OrbitingClockwise".into(),
                direction: OrbitDirection::Clockwise,
            }]
        );
    }

    #[test]
    fn nested_orbiter_binds_after_its_center() {
        let mut app = test_app();
        let core = app.world_mut().spawn(Transform::default()).id();
        let planet = app.world_mut().spawn_empty().id();
        let moon = app
            .world_mut()
            .spawn((
                Transform::default(),
                DynamicBody::with_turn_rate(std::f32::consts::PI),
                OrbitalMotion::new(
                    OrbitConfig {
                        radius: 1.0,
                        ..Default::default()
                    },
                    planet,
                ),
            ))
            .id();
        app.world_mut().entity_mut(planet).insert((
            Transform::default(),
            OrbitalMotion::new(
                OrbitConfig {
                    radius: 10.0,
                    auto_angular_speed_deg: 0.0,
                    ..Default::default()
                },
                core,
            ),
        ));

        app.update();
        app.update();

        let planet_position = app.world().get::<Transform>(planet).unwrap().translation;
        let moon_position = app.world().get::<Transform>(moon).unwrap().translation;
        assert!((planet_position - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
        assert!((moon_position.distance(planet_position) - 1.0).abs() < 0.05);

        let velocity = app.world().get::<Velocity>(moon).unwrap();
        assert!(velocity.linvel.length() < 1.0);
    }

    #[test]
    fn paused_orbiter_holds_and_resumes_smoothly() {
        let mut app = test_app();
        let center = app
            .world_mut()
            .spawn((Transform::default(), LinearMotion::new(Vec3::X, 2.0)))
            .id();
        let orbiter = app
            .world_mut()
            .spawn((
                Transform::default(),
                DynamicBody::with_turn_rate(std::f32::consts::PI),
                OrbitalMotion::new(OrbitConfig::default(), center),
            ))
            .id();

        app.update();
        app.update();
        app.world_mut()
            .get_mut::<OrbitalMotion>(orbiter)
            .unwrap()
            .enabled = false;
        app.update();

        let angle = app
            .world()
            .get::<OrbitController>(orbiter)
            .unwrap()
            .0
            .state()
            .current_angle_deg;
        let position = app.world().get::<Transform>(orbiter).unwrap().translation;
        for _ in 0..5 {
            app.update();
        }

        let controller = app.world().get::<OrbitController>(orbiter).unwrap();
        assert_eq!(controller.0.state().current_angle_deg, angle);
        assert_eq!(
            app.world().get::<Transform>(orbiter).unwrap().translation,
            position
        );
        assert_eq!(
            app.world().get::<Velocity>(orbiter).unwrap().linvel,
            Vec3::ZERO
        );

        app.world_mut()
            .get_mut::<OrbitalMotion>(orbiter)
            .unwrap()
            .enabled = true;
        app.update();

        let controller = app.world().get::<OrbitController>(orbiter).unwrap();
        assert!(controller.0.state().current_angle_deg > angle);
        let velocity = app.world().get::<Velocity>(orbiter).unwrap().linvel;
        let orbital = crate::motion::controller::orbital_velocity(
            controller.0.state().current_angle_deg,
            5.0,
            30.0,
        );
        assert!((velocity - (orbital + Vec3::new(2.0, 0.0, 0.0))).length() < 1e-3);
    }

    #[test]
    fn steering_turns_gradually_toward_target() {
        let mut app = test_app();
        let target = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                DynamicBody {
                    rotation_target: Some(target),
                    max_turn_rate: std::f32::consts::PI,
                },
                Velocity::linear(Vec3::new(0.0, 0.0, 5.0)),
            ))
            .id();

        app.update();
        let velocity = app.world().get::<Velocity>(entity).unwrap();
        assert!((velocity.angvel - Vec3::Y * std::f32::consts::PI).length() < 1e-4);
        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!((transform.translation.z - 0.1).abs() < 1e-5);
        let turned = transform.rotation.angle_between(Quat::IDENTITY);
        assert!((turned - std::f32::consts::PI * 0.02).abs() < 1e-3);
    }

    #[test]
    fn steering_settles_without_overshoot() {
        let current = Quat::from_rotation_y(0.5);
        let target = Quat::from_rotation_y(0.51);
        let rate = turn_rate_toward(current, target, std::f32::consts::PI, 0.02);
        assert!((rate - Vec3::Y * 0.5).length() < 1e-2);
        assert_eq!(
            turn_rate_toward(target, target, std::f32::consts::PI, 0.02),
            Vec3::ZERO
        );
    }
}
