//! Gridstep - fixed-timestep 2D movement and collision on an integer grid
//!
//! Core modules:
//! - `world`: Entity-component-relation substrate (components, relations,
//!   messages, deferred destruction with an end-of-tick commit)
//! - `sim`: The deterministic motion core (broad-phase spatial hashing,
//!   swept integer-stepped collision, overlap/contact relation derivation)
//!
//! The simulation is single-threaded and deterministic: identical world
//! state plus a fixed `dt` sequence yields bit-identical positions and
//! relation sets. One call to [`sim::MotionSystem::update`] advances one
//! tick; the embedding game calls [`world::World::commit`] at the end of
//! each tick to apply deferred destruction and clear message queues.

pub mod sim;
pub mod world;

pub use sim::{IntRect, MotionSystem, Position, SpatialHash, Velocity};
pub use world::{Entity, World};

/// Game configuration constants
pub mod consts {
    /// Playfield width in world units
    pub const GAME_WIDTH: i32 = 640;
    /// Playfield height in world units
    pub const GAME_HEIGHT: i32 = 360;
    /// Broad-phase cell size the tuning constants were calibrated against
    pub const CELL_SIZE: i32 = 32;
    /// How far outside the playfield an entity may drift before
    /// `DestroyWhenOutOfBounds` triggers
    pub const OUT_OF_BOUNDS_MARGIN: i32 = 100;
}
