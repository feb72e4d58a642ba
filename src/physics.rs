// src/physics.rs

use rapier3d::prelude::*;
use rapier3d::prelude::{InteractionGroups, Group};
use std::collections::HashMap;
use serde::Serialize;

use crate::arcade::{
    ArcadeCar, ArcadeConfig, InputSnapshot, Pos3, RayHit, RaycastPort, RigidBodyPort, Vec3, WheelMount,
};
use crate::debug_builders::{DebugChassis, DebugOverlay, build_overlay};
use crate::settings::{ChassisConfig, Settings};

const GROUP_GROUND: Group  = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Bodies further than this from the origin (or non-finite) are reset.
const WORLD_BOUND: Real = 1_000.0;

#[inline] fn to_core(v: &Vector<Real>) -> Vec3 { Vec3::new(v.x, v.y, v.z) }
#[inline] fn to_core_point(p: &Point<Real>) -> Pos3 { Pos3::new(p.x, p.y, p.z) }
#[inline] fn to_rapier(v: &Vec3) -> Vector<Real> { vector![v.x, v.y, v.z] }
#[inline] fn to_rapier_point(p: &Pos3) -> Point<Real> { point![p.x, p.y, p.z] }

// --------------------------------------------------
// Ports over rapier
// --------------------------------------------------

/// Suspension raycasts through the query pipeline, ignoring the vehicle's own body.
struct QueryRaycast<'a> {
    query: &'a QueryPipeline,
    bodies: &'a RigidBodySet,
    colliders: &'a ColliderSet,
    exclude: RigidBodyHandle,
}

impl RaycastPort for QueryRaycast<'_> {
    fn cast(&self, origin: Pos3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let ray = Ray::new(to_rapier_point(&origin), to_rapier(&direction));
        let filter = QueryFilter::default().exclude_rigid_body(self.exclude);

        let (_hit, toi) = self.query.cast_ray(
            self.bodies,
            self.colliders,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        Some(RayHit { distance: toi, point: to_core_point(&ray.point_at(toi)) })
    }
}

/// Snapshot of a chassis body. Forces are collected here and applied to the
/// rapier body once the arcade pass is done.
struct ForceAccumulator {
    linvel: Vec3,
    mass: f32,
    forward: Vec3,
    up: Vec3,
    forces: Vec<(Vec3, Option<Pos3>)>,
    torques: Vec<Vec3>,
}

impl ForceAccumulator {
    fn from_body(body: &RigidBody) -> Self {
        let rot = body.position().rotation;
        Self {
            linvel: to_core(body.linvel()),
            mass: body.mass(),
            forward: to_core(&(rot * vector![0.0, 0.0, 1.0])),
            up: to_core(&(rot * vector![0.0, 1.0, 0.0])),
            forces: Vec::new(),
            torques: Vec::new(),
        }
    }

    /// Replaces last tick's user forces with this tick's.
    fn apply(self, body: &mut RigidBody) {
        body.reset_forces(false);
        body.reset_torques(false);

        for (force, point) in self.forces {
            match point {
                Some(p) => body.add_force_at_point(to_rapier(&force), to_rapier_point(&p), true),
                None => body.add_force(to_rapier(&force), true),
            }
        }
        for torque in self.torques {
            body.add_torque(to_rapier(&torque), true);
        }
    }
}

impl RigidBodyPort for ForceAccumulator {
    fn linear_velocity(&self) -> Vec3 { self.linvel }
    fn mass(&self) -> f32 { self.mass }
    fn forward(&self) -> Vec3 { self.forward }
    fn up(&self) -> Vec3 { self.up }

    fn add_force(&mut self, force: Vec3) { self.forces.push((force, None)); }
    fn add_force_at_point(&mut self, force: Vec3, point: Pos3) { self.forces.push((force, Some(point))); }
    fn add_torque(&mut self, torque: Vec3) { self.torques.push(torque); }
}

/// World-space wheel mounts for a chassis pose.
fn wheel_mounts(chassis: &ChassisConfig, iso: &Isometry<Real>) -> Vec<WheelMount> {
    let up = iso.rotation * vector![0.0, 1.0, 0.0];
    chassis
        .wheels
        .iter()
        .map(|w| {
            let [x, y, z] = w.offset;
            WheelMount {
                id: w.id,
                position: to_core_point(&(iso * point![x, y, z])),
                up: to_core(&up),
            }
        })
        .collect()
}

// --------------------------------------------------
// Vehicles
// --------------------------------------------------

pub struct Vehicle {
    pub body: RigidBodyHandle,  // the chassis body
    pub car: ArcadeCar,         // arcade tuning + sim state
    pub input: InputSnapshot,   // sampled once per tick
    pub overlay: DebugOverlay,  // last tick's telemetry, rendered
}

#[derive(Clone, Debug, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion (i, j, k, w)
    pub linvel: [f32; 3],
    pub grounded: bool,
    pub contacts: [bool; 4],
    pub acceleration_ramp: f32,
    pub wheel_offsets: [f32; 4],
    pub debug: DebugOverlay,
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet,// for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub chassis: ChassisConfig,
    pub arcade: ArcadeConfig,
    pub spawn_height: Real,
    pub vehicles: HashMap<String, Vehicle>, // playerId → vehicle
}

impl PhysicsWorld {

    pub fn new(settings: &Settings) -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Big static ground box whose top surface is exactly at y = 0.
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -1.0, 0.0])
            .build();

        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(
                GROUP_GROUND,
                GROUP_CHASSIS,
            ))
            .friction(1.2)
            .restitution(0.0)
            .build();

        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        log::info!(
            "Ground inserted. Bodies = {}, Colliders = {}",
            bodies.len(),
            colliders.len()
        );

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            chassis: settings.chassis.clone(),
            arcade: settings.arcade,
            spawn_height: settings.spawn_height,
            vehicles: HashMap::new(),
        }
    }

    /// Spawn a chassis for this player:
    /// - Dynamic rigid body with a box collider.
    /// - Dropped from `spawn_height` so the suspension catches it.
    pub fn spawn_vehicle_for_player(&mut self, id: &str, position: [f32; 3]) -> RigidBodyHandle {
        let config = &self.chassis;
        let [hx, hy, hz] = config.half_extents;
        let [cx, cy, cz] = config.com_offset;
        let volume = 8.0 * hx * hy * hz;
        let density = config.mass / volume; // ρ = m / V

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], self.spawn_height, position[2]])
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .translation(vector![cx, cy, cz])
            .collision_groups(InteractionGroups::new(
                GROUP_CHASSIS,
                GROUP_GROUND,
            ))
            .active_events(ActiveEvents::empty())
            .density(density)
            .friction(0.0) // grip comes from drag, not contact friction
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        self.vehicles.insert(
            id.to_string(),
            Vehicle {
                body: handle,
                car: ArcadeCar::new(self.arcade),
                input: InputSnapshot::default(),
                overlay: DebugOverlay::default(),
            },
        );

        log::info!("Spawned vehicle for player {id} at {position:?} (body = {handle:?})");
        handle
    }

    pub fn has_vehicle(&self, id: &str) -> bool {
        self.vehicles.contains_key(id)
    }

    pub fn remove_vehicle(&mut self, id: &str) -> bool {
        let Some(vehicle) = self.vehicles.remove(id) else { return false };
        self.bodies.remove(
            vehicle.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
        log::info!("Removed vehicle for player {id}");
        true
    }

    /// Drops every vehicle whose id fails `keep`.
    pub fn retain_vehicles(&mut self, keep: impl Fn(&str) -> bool) {
        let stale: Vec<String> = self.vehicles.keys().filter(|id| !keep(id)).cloned().collect();
        for id in stale {
            self.remove_vehicle(&id);
        }
    }

    pub fn set_input(&mut self, id: &str, input: InputSnapshot) {
        if let Some(v) = self.vehicles.get_mut(id) {
            v.input = input;
        }
    }

    pub fn vehicle_snapshot(&self, id: &str) -> Option<VehicleSnapshot> {
        let vehicle = self.vehicles.get(id)?;
        let body = self.bodies.get(vehicle.body)?;
        let iso = body.position();
        let state = &vehicle.car.state;

        Some(VehicleSnapshot {
            id: id.to_string(),
            position: iso.translation.vector.into(),
            rotation: [iso.rotation.i, iso.rotation.j, iso.rotation.k, iso.rotation.w],
            linvel: (*body.linvel()).into(),
            grounded: vehicle.car.is_grounded(),
            contacts: state.contacts,
            acceleration_ramp: state.acceleration_ramp,
            wheel_offsets: state.wheel_offsets,
            debug: vehicle.overlay.clone(),
        })
    }

    /// Runs the arcade pass for every vehicle and applies the resulting forces.
    fn apply_arcade_forces(&mut self, dt: Real) {
        self.query_pipeline.update(&self.colliders);

        for vehicle in self.vehicles.values_mut() {
            let Some(body) = self.bodies.get(vehicle.body) else { continue };

            let iso = *body.position();
            let mounts = wheel_mounts(&self.chassis, &iso);
            let mut port = ForceAccumulator::from_body(body);

            let ray = QueryRaycast {
                query: &self.query_pipeline,
                bodies: &self.bodies,
                colliders: &self.colliders,
                exclude: vehicle.body,
            };

            vehicle.car.step(&vehicle.input, dt, mounts.as_slice(), &ray, &mut port);

            build_overlay(
                &mut vehicle.overlay,
                DebugChassis {
                    position: iso.translation.vector.into(),
                    rotation: [iso.rotation.i, iso.rotation.j, iso.rotation.k, iso.rotation.w],
                    half_extents: self.chassis.half_extents,
                },
                vehicle.car.telemetry.events(),
            );

            if let Some(body) = self.bodies.get_mut(vehicle.body) {
                port.apply(body);
            }
        }
    }

    pub fn step(&mut self, dt: Real) {
        // 1) Suspension, drag, drive, steering -> user forces
        self.apply_arcade_forces(dt);

        // 2) Step physics.
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 3) Safety: prevent bodies from exploding to insane coordinates
        for (_, body) in self.bodies.iter_mut() {
            if body.is_fixed() {
                continue;
            }
            let pos = *body.translation();

            let bad =
                !pos.x.is_finite() || !pos.y.is_finite() || !pos.z.is_finite() ||
                pos.x.abs() > WORLD_BOUND || pos.y.abs() > WORLD_BOUND || pos.z.abs() > WORLD_BOUND;

            if bad {
                let reset = vector![0.0, self.spawn_height, 0.0];
                body.set_translation(reset, true);
                body.set_rotation(Rotation::identity(), true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
                body.reset_forces(true);
                body.reset_torques(true);

                log::warn!("Reset exploding body {pos:?} back to {reset:?}");
            }
        }
    }
}
