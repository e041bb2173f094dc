//! Pointer ray casting.
//!
//! This module turns a pointer position on the rendering surface into a
//! world-space ray, given a snapshot of the camera's transform and
//! projection.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::error::CompositorError;

/// NDC depth of the near plane under Bevy's reverse-Z convention.
const NDC_NEAR: f32 = 1.0;

/// NDC depth used for the far sample. Zero would be at infinity for
/// infinite perspective projections.
const NDC_FAR: f32 = f32::EPSILON;

/// Precomputed matrices for a camera, enough to unproject pointer positions.
#[derive(Clone, Copy, Debug)]
pub struct CameraView {
    /// Camera transform as a matrix.
    pub world_from_view: Mat4,
    /// Projection matrix.
    pub clip_from_view: Mat4,
    world_from_clip: Mat4,
}

impl CameraView {
    /// Builds a view from a camera transform and a projection matrix.
    pub fn new(camera_transform: &GlobalTransform, clip_from_view: Mat4) -> Self {
        let world_from_view = Mat4::from(camera_transform.affine());
        let world_from_clip = world_from_view * clip_from_view.inverse();
        Self {
            world_from_view,
            clip_from_view,
            world_from_clip,
        }
    }

    /// Snapshot a live Bevy camera. The projection is the one computed by the
    /// camera systems for the current frame.
    pub fn from_camera(camera: &Camera, camera_transform: &GlobalTransform) -> Self {
        Self::new(camera_transform, camera.clip_from_view())
    }

    /// Orthographic view spanning `half_extents` in world units around the
    /// view axis.
    pub fn orthographic(
        camera_transform: &GlobalTransform,
        half_extents: Vec2,
        near: f32,
        far: f32,
    ) -> Self {
        // Near and far are swapped to get a [1, 0] depth range, as Bevy does.
        let clip_from_view = Mat4::orthographic_rh(
            -half_extents.x,
            half_extents.x,
            -half_extents.y,
            half_extents.y,
            far,
            near,
        );
        Self::new(camera_transform, clip_from_view)
    }

    /// Infinite reverse-Z perspective view.
    pub fn perspective(camera_transform: &GlobalTransform, fov_y: f32, aspect: f32, near: f32) -> Self {
        let clip_from_view = Mat4::perspective_infinite_reverse_rh(fov_y, aspect, near);
        Self::new(camera_transform, clip_from_view)
    }

    /// Unproject a normalized device coordinate into world space.
    pub fn ndc_to_world(&self, ndc: Vec3) -> Option<Vec3> {
        let point = self.world_from_clip.project_point3(ndc);
        point.is_finite().then_some(point)
    }

    /// Cast a ray through `ndc` (both axes in `[-1, 1]`, +Y up).
    ///
    /// The ray starts on the near plane.
    pub fn cast_ray(&self, ndc: Vec2) -> Result<Ray3d, CompositorError> {
        let near = self
            .ndc_to_world(ndc.extend(NDC_NEAR))
            .ok_or(CompositorError::DegenerateCamera)?;
        let far = self
            .ndc_to_world(ndc.extend(NDC_FAR))
            .ok_or(CompositorError::DegenerateCamera)?;
        let direction = Dir3::new(far - near).map_err(|_| CompositorError::DegenerateCamera)?;
        Ok(Ray3d {
            origin: near,
            direction,
        })
    }

    /// Cast a ray through a pointer position given in the same logical pixel
    /// space as `surface`.
    pub fn ray_from_pointer(&self, pointer: Vec2, surface: Rect) -> Result<Ray3d, CompositorError> {
        let ndc = pointer_to_ndc(pointer, surface).ok_or(CompositorError::DegenerateCamera)?;
        self.cast_ray(ndc)
    }
}

/// Normalize a pointer position to `[-1, 1]` on both axes relative to the
/// rendering surface, with the vertical axis flipped so that up is positive.
///
/// Returns `None` for an empty surface.
pub fn pointer_to_ndc(pointer: Vec2, surface: Rect) -> Option<Vec2> {
    let size = surface.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let local = (pointer - surface.min) / size;
    Some(Vec2::new(local.x * 2.0 - 1.0, -(local.y * 2.0) + 1.0))
}
