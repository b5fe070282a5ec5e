//! Simulation components and relation types
//!
//! Plain data attached to entities by spawners and consumed by the motion
//! core. World rectangles are always computed fresh from position + local
//! rect, never cached.

use std::ops::Add;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer 2D position with fractional carry.
///
/// The coordinate the rest of the game sees is integral (`x()`/`y()`
/// truncate toward zero), but the raw floats keep sub-unit movement so
/// slow velocities still accrue across ticks. The sweep snaps an axis to
/// its integer stop point when it truncates movement there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// World X, truncated toward zero.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x as i32
    }

    /// World Y, truncated toward zero.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y as i32
    }

    /// Raw floats, fractional carry included.
    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Drops the fractional carry on X.
    pub fn truncate_x(self) -> Self {
        Self {
            x: self.x() as f32,
            y: self.y,
        }
    }

    /// Drops the fractional carry on Y.
    pub fn truncate_y(self) -> Self {
        Self {
            x: self.x,
            y: self.y() as f32,
        }
    }
}

impl Add<Vec2> for Position {
    type Output = Position;

    fn add(self, delta: Vec2) -> Position {
        Position::new(self.x + delta.x, self.y + delta.y)
    }
}

/// Axis-aligned integer rectangle: local offset plus size.
///
/// Combined with a [`Position`] via [`at`](Self::at) to form a world rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IntRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// World rect of this local rect placed at integer coordinates.
    pub fn at(&self, x: i32, y: i32) -> IntRect {
        IntRect {
            x: self.x + x,
            y: self.y + y,
            w: self.w,
            h: self.h,
        }
    }

    /// Strict overlap: rects that merely share an edge do not intersect.
    pub fn intersects(&self, other: &IntRect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Floating 2D velocity in world-units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

// ─── Behavior tags ───

/// Blocks movement and participates in the contact relation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Solid;

/// Participates in the overlap relation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CanInteract;

/// Quantizes free-integration displacement to whole units per axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ForceIntegerMovement;

/// Destroys this entity (and everything it `Holding`-owns) once its
/// position leaves the playfield margin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DestroyWhenOutOfBounds;

// ─── Behavior data ───

/// Per-tick downward velocity accumulation, applied after movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallSpeed {
    pub speed: f32,
}

/// Per-tick speed reduction, direction preserved, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionDamp {
    pub damping: f32,
}

/// Seek a world position: velocity is damped then accelerated toward the
/// target each tick, after collision resolution.
///
/// The damping term divides by `damp_factor * (1 + dt)`, a formula tuned
/// against the fixed ~1/60s tick rather than a dt-exact friction model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerateToPosition {
    pub target: Vec2,
    pub acceleration: f32,
    pub damp_factor: f32,
}

// ─── Relation types ───

/// Overlap-for-interaction: a `CanInteract` entity -> any entity whose
/// world rect it overlapped at the start of the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Colliding;

/// Contact-with-solid: a `Solid` entity -> a solid neighbor found by a
/// 1-unit cardinal probe after movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchingSolid;

/// Ownership: holder -> held. Created by gameplay, consumed by the
/// out-of-bounds cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Holding;

/// Pin: an entity with any outgoing `DontMove` edge skips integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DontMove;
