//! Deterministic simulation core
//!
//! All movement and collision logic lives here. This module must be pure
//! and deterministic:
//! - Fixed timestep only (dt passed explicitly, never assumed)
//! - Stable iteration order (by entity slot, by bucket, by relation map)
//! - No rendering, audio, or platform dependencies
//!
//! Per-tick flow is documented on [`motion::MotionSystem`].

pub mod components;
pub mod motion;
pub mod spatial_hash;
pub mod sweep;

pub use components::{
    AccelerateToPosition, CanInteract, Colliding, DestroyWhenOutOfBounds, DontMove, FallSpeed,
    ForceIntegerMovement, Holding, IntRect, MotionDamp, Position, Solid, TouchingSolid, Velocity,
};
pub use motion::MotionSystem;
pub use spatial_hash::SpatialHash;
pub use sweep::IntegerWalk;
