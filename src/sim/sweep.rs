//! Swept integer-stepped movement
//!
//! The narrow-phase half of collision resolution: walk one integer unit
//! at a time toward the target so thin obstacles can never be tunneled
//! through, resolving X fully before Y so entities slide along walls
//! instead of sticking to them.

use glam::Vec2;

use crate::sim::components::{IntRect, Position};
use crate::sim::spatial_hash::SpatialHash;
use crate::world::Entity;

/// Walks the integers from `start` (exclusive) to `end` (inclusive),
/// stepping toward `end`. Equal endpoints yield nothing.
pub struct IntegerWalk {
    current: i32,
    end: i32,
    step: i32,
}

impl IntegerWalk {
    pub fn between(start: i32, end: i32) -> Self {
        Self {
            current: start,
            end,
            step: (end - start).signum(),
        }
    }
}

impl Iterator for IntegerWalk {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.step == 0 {
            return None;
        }
        self.current += self.step;
        let in_range = (self.step > 0 && self.current <= self.end)
            || (self.step < 0 && self.current >= self.end);
        in_range.then_some(self.current)
    }
}

/// First solid-hash candidate whose rect truly intersects `rect`, with the
/// mover itself excluded.
pub(crate) fn first_solid_hit(
    solid_hash: &SpatialHash,
    entity: Entity,
    rect: IntRect,
) -> Option<Entity> {
    solid_hash
        .retrieve_excluding(entity, rect)
        .into_iter()
        .find(|(_, other_rect)| rect.intersects(other_rect))
        .map(|(other, _)| other)
}

/// Moves a solid entity toward `position + velocity * dt` without ending
/// the tick overlapping another solid.
///
/// Each axis walks one integer unit at a time; on a true intersection the
/// axis stops at its last legal integer coordinate and drops that axis's
/// fractional carry. An unblocked axis keeps its full fractional movement
/// so slow velocities still accrue across ticks. X is fully resolved
/// before Y begins.
///
/// `blocker_is_solid` is the defensive re-check that the candidate really
/// blocks; the solid hash only ever holds solid entities, so in practice
/// it always passes.
pub(crate) fn sweep(
    solid_hash: &SpatialHash,
    entity: Entity,
    position: Position,
    rect: IntRect,
    velocity: Vec2,
    dt: f32,
    mut blocker_is_solid: impl FnMut(Entity) -> bool,
) -> Position {
    let mut movement = velocity * dt;
    let target = position + movement;
    let mut position = position;

    let mut last_valid_x = position.x();
    for x in IntegerWalk::between(position.x(), target.x()) {
        let candidate = rect.at(x, position.y());
        if let Some(other) = first_solid_hit(solid_hash, entity, candidate) {
            if blocker_is_solid(other) {
                movement.x = (last_valid_x - position.x()) as f32;
                position = position.truncate_x();
                break;
            }
        }
        last_valid_x = x;
    }

    let mut last_valid_y = position.y();
    for y in IntegerWalk::between(position.y(), target.y()) {
        let candidate = rect.at(last_valid_x, y);
        if let Some(other) = first_solid_hit(solid_hash, entity, candidate) {
            if blocker_is_solid(other) {
                movement.y = (last_valid_y - position.y()) as f32;
                position = position.truncate_y();
                break;
            }
        }
        last_valid_y = y;
    }

    position + movement
}
