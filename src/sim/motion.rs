//! Per-tick motion integration and relation derivation
//!
//! One [`MotionSystem::update`] call is one tick:
//!
//! 1. Clear both spatial hashes
//! 2. Index `CanInteract` entities, pre-movement
//! 3. Clear stale `Colliding` edges and rederive them (pre-movement state)
//! 4. Index `Solid` entities, pre-movement
//! 5. For each mover: sweep-resolve or free-integrate, apply gravity and
//!    damping, cascade-destroy if out of bounds, re-index post-movement
//! 6. Rederive `TouchingSolid` via 1-unit cardinal probes (post-movement)
//! 7. Advance `AccelerateToPosition` seekers (affects next tick)
//!
//! Movers are deliberately indexed twice (pre- and post-movement) so later
//! sweeps within the same tick see a consistent, if slightly stale,
//! broad-phase snapshot; the sweep's self-exclusion keeps a mover's own
//! stale entry harmless.

use glam::Vec2;

use crate::consts;
use crate::sim::components::{
    AccelerateToPosition, CanInteract, Colliding, DestroyWhenOutOfBounds, DontMove, FallSpeed,
    ForceIntegerMovement, Holding, IntRect, MotionDamp, Position, Solid, TouchingSolid, Velocity,
};
use crate::sim::spatial_hash::SpatialHash;
use crate::sim::sweep::{first_solid_hit, sweep};
use crate::world::{Entity, World};

/// The movement-and-collision core of the simulation tick.
///
/// Owns the two broad-phase hashes and the playfield bounds. Everything
/// else lives in the [`World`]; destruction is only recorded here and
/// applied by the caller's end-of-tick [`World::commit`].
pub struct MotionSystem {
    interact_hash: SpatialHash,
    solid_hash: SpatialHash,
    bounds_width: i32,
    bounds_height: i32,
}

impl MotionSystem {
    pub fn new(width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            interact_hash: SpatialHash::new(0, 0, width, height, cell_size),
            solid_hash: SpatialHash::new(0, 0, width, height, cell_size),
            bounds_width: width,
            bounds_height: height,
        }
    }

    /// The standard playfield.
    pub fn with_default_bounds() -> Self {
        Self::new(consts::GAME_WIDTH, consts::GAME_HEIGHT, consts::CELL_SIZE)
    }

    fn world_rect(world: &World, entity: Entity) -> IntRect {
        let position = world.get::<Position>(entity);
        world.get::<IntRect>(entity).at(position.x(), position.y())
    }

    fn out_of_bounds(&self, position: Position) -> bool {
        let margin = consts::OUT_OF_BOUNDS_MARGIN;
        position.x() < -margin
            || position.x() > self.bounds_width + margin
            || position.y() < -margin
            || position.y() > self.bounds_height + margin
    }

    /// Advances the simulation by one fixed timestep.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        self.interact_hash.clear();
        self.solid_hash.clear();

        let interactables: Vec<Entity> =
            world.query::<(Position, IntRect, CanInteract)>().collect();
        for &entity in &interactables {
            self.interact_hash
                .insert(entity, Self::world_rect(world, entity));
        }

        // Overlap edges never persist across ticks.
        for &entity in &interactables {
            world.unrelate_all::<Colliding>(entity);
        }

        // Derive the overlap relation on pre-movement rects. Downstream
        // consumers run later this tick and treat it as current.
        for &entity in &interactables {
            let rect = Self::world_rect(world, entity);
            for (other, other_rect) in self.interact_hash.retrieve(rect) {
                if other != entity && rect.intersects(&other_rect) {
                    world.relate(entity, other, Colliding);
                }
            }
        }

        let solids: Vec<Entity> = world.query::<(Position, IntRect, Solid)>().collect();
        for &entity in &solids {
            self.solid_hash
                .insert(entity, Self::world_rect(world, entity));
        }

        let movers: Vec<Entity> = world.query::<(Position, Velocity)>().collect();
        for &entity in &movers {
            if world.has_out_relation::<DontMove>(entity) {
                continue;
            }

            let position = *world.get::<Position>(entity);
            let velocity = world.get::<Velocity>(entity).0;

            if world.has::<IntRect>(entity) && world.has::<Solid>(entity) {
                let rect = *world.get::<IntRect>(entity);
                let resolved = sweep(
                    &self.solid_hash,
                    entity,
                    position,
                    rect,
                    velocity,
                    dt,
                    |other| world.has::<Solid>(other),
                );
                world.set(entity, resolved);
            } else {
                let mut scaled = velocity * dt;
                if world.has::<ForceIntegerMovement>(entity) {
                    scaled = Vec2::new(scaled.x.trunc(), scaled.y.trunc());
                }
                world.set(entity, position + scaled);
            }

            if let Some(fall) = world.try_get::<FallSpeed>(entity).copied() {
                world.set(entity, Velocity(velocity + Vec2::Y * fall.speed));
            }

            if let Some(damp) = world.try_get::<MotionDamp>(entity).copied() {
                let speed = (velocity.length() - damp.damping).max(0.0);
                world.set(entity, Velocity(velocity.normalize_or_zero() * speed));
            }

            if world.has::<DestroyWhenOutOfBounds>(entity) && self.out_of_bounds(position) {
                log::debug!(
                    "entity {}@{} out of bounds at ({}, {}), cascading destroy",
                    entity.index(),
                    entity.generation(),
                    position.x(),
                    position.y()
                );
                let held: Vec<Entity> = world.out_relations::<Holding>(entity).collect();
                for held_entity in held {
                    world.destroy(held_entity);
                }
                world.destroy(entity);
            }

            // Re-index on the post-movement rect.
            if world.has::<CanInteract>(entity) {
                self.interact_hash
                    .insert(entity, Self::world_rect(world, entity));
            }
            if world.has::<Solid>(entity) {
                self.solid_hash
                    .insert(entity, Self::world_rect(world, entity));
            }
        }

        // Contact relation on post-movement state.
        let solids: Vec<Entity> = world.query::<(Position, IntRect, Solid)>().collect();
        for &entity in &solids {
            world.unrelate_all::<TouchingSolid>(entity);
        }
        for &entity in &solids {
            let position = *world.get::<Position>(entity);
            let rect = *world.get::<IntRect>(entity);
            // Left, right, up, down. Hits on the same neighbor from
            // several directions collapse to one edge.
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let probe = rect.at(position.x() + dx, position.y() + dy);
                if let Some(other) = first_solid_hit(&self.solid_hash, entity, probe) {
                    world.relate(entity, other, TouchingSolid);
                }
            }
        }

        // Steering last, after resolution; takes effect next tick.
        let seekers: Vec<Entity> = world
            .query::<(Position, AccelerateToPosition, Velocity)>()
            .collect();
        for &entity in &seekers {
            let mut velocity = world.get::<Velocity>(entity).0;
            let position = *world.get::<Position>(entity);
            let seek = *world.get::<AccelerateToPosition>(entity);

            let difference = seek.target - position.as_vec2();
            velocity /= seek.damp_factor * (1.0 + dt);
            velocity += difference.normalize_or_zero() * seek.acceleration * dt;
            world.set(entity, Velocity(velocity));
        }
    }
}
