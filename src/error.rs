//! Error taxonomy for the compositor.
//!
//! None of these are fatal. Systems log them and skip the frame or drop the
//! stale operation.

use thiserror::Error;

use crate::types::SpriteId;

/// Failures raised by the ray caster, plane intersector and sprite registry.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompositorError {
    /// The pointer ray is parallel to the ground plane, or meets it behind
    /// the camera.
    #[error("pointer ray does not intersect the ground plane")]
    NoIntersection,
    /// The referenced sprite is no longer in the registry.
    #[error("sprite {0} not found")]
    NotFound(SpriteId),
    /// A pick was attempted while the registry holds no sprites.
    #[error("no sprites to pick from")]
    EmptyRegistry,
    /// A sprite with this id is already registered.
    #[error("sprite {0} already registered")]
    DuplicateId(SpriteId),
    /// The id allocator has reached its ceiling.
    #[error("sprite ids exhausted")]
    IdsExhausted,
    /// Scale factors must be finite and strictly positive.
    #[error("invalid scale factor {0}")]
    InvalidScaleFactor(f32),
    /// The camera matrices or rendering surface cannot produce a ray.
    #[error("camera cannot produce a pointer ray")]
    DegenerateCamera,
}
