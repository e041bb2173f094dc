//! Core types for the sprite compositor plugin.
//!
//! This module contains the public data model, the messages exchanged with
//! host UI collaborators, and the configuration resource.

use bevy::prelude::*;
use std::fmt;

use crate::math::GroundPlane;

/// Stable identifier of a sprite.
///
/// Ids are handed out by the [`SpriteRegistry`](crate::SpriteRegistry) and are
/// never reused, even after the sprite they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpriteId(pub u64);

impl SpriteId {
    /// Allocator ceiling. Reserved, never assigned to a sprite.
    pub const MAX: SpriteId = SpriteId(u64::MAX);
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to the image content of a sprite (asset path or URL).
///
/// The image itself belongs to the asset collaborator; sprites only carry the
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(pub String);

impl ImageRef {
    /// Creates an image reference from any string-like value.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The raw path or URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of composition: one positioned, scaled image plane.
///
/// Paint order is not stored here. It is the sprite's index in the registry,
/// index 0 being painted first.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Stable identifier.
    pub id: SpriteId,
    /// Image drawn on the plane.
    pub image: ImageRef,
    /// World position. X and Y follow the pointer while dragging, Z (depth)
    /// is kept as-is.
    pub position: Vec3,
    /// Per-axis scale, starting at `(1, 1, 1)`.
    pub scale: Vec3,
}

impl Sprite {
    /// Creates a sprite at `position` with unit scale.
    pub fn new(id: SpriteId, image: ImageRef, position: Vec3) -> Self {
        Self {
            id,
            image,
            position,
            scale: Vec3::ONE,
        }
    }
}

/// How [`SpriteRegistry::update_position`](crate::SpriteRegistry::update_position)
/// treats the depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthPolicy {
    /// Keep the sprite's current Z and only write X and Y.
    #[default]
    Preserve,
    /// Write all three components.
    Overwrite,
}

/// Marker component for the camera used to cast pointer rays.
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     Camera3d::default(),
///     Projection::from(OrthographicProjection::default_3d()),
///     Transform::from_xyz(0.0, 0.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
///     CompositorCamera,
/// ));
/// ```
#[derive(Component)]
pub struct CompositorCamera;

/// Links a rendered entity to the sprite it displays.
///
/// Spawned and despawned by the plugin; hosts should treat it as read-only.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteVisual(pub SpriteId);

/// Toolbar commands acting on the currently selected sprite.
///
/// Every command is a no-op when nothing is selected.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionCommand {
    /// Grow the selected sprite by [`CompositorSettings::resize_up_factor`].
    ResizeUp,
    /// Shrink the selected sprite by [`CompositorSettings::resize_down_factor`].
    ResizeDown,
    /// Move the selected sprite one step towards the top of the paint order.
    LayerUp,
    /// Move the selected sprite one step towards the bottom of the paint order.
    LayerDown,
    /// Delete the selected sprite.
    Remove,
    /// Clear the selection.
    Deselect,
}

impl fmt::Display for CompositionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionCommand::ResizeUp => f.write_str("Resize Up"),
            CompositionCommand::ResizeDown => f.write_str("Resize Down"),
            CompositionCommand::LayerUp => f.write_str("Layer Up"),
            CompositionCommand::LayerDown => f.write_str("Layer Down"),
            CompositionCommand::Remove => f.write_str("Remove"),
            CompositionCommand::Deselect => f.write_str("Deselect"),
        }
    }
}

/// Fired on every successful pick and on every deselect.
///
/// `sprite` is `None` when the selection was cleared. `pickup_point` is the
/// ground-plane point under the pointer for picks and `None` otherwise.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SelectionChanged {
    /// The newly selected sprite, if any.
    pub sprite: Option<SpriteId>,
    /// World-space pickup point.
    pub pickup_point: Option<Vec3>,
}

impl SelectionChanged {
    /// A pick of `sprite` at `point`.
    pub fn picked(sprite: SpriteId, point: Vec3) -> Self {
        Self {
            sprite: Some(sprite),
            pickup_point: Some(point),
        }
    }

    /// The selection was cleared.
    pub fn cleared() -> Self {
        Self {
            sprite: None,
            pickup_point: None,
        }
    }
}

/// One asset supplied by the narrative-data collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAsset {
    /// Identifier of the asset on the narrative side.
    pub key: String,
    /// Image to display.
    pub image: ImageRef,
}

impl SeedAsset {
    /// Convenience constructor.
    pub fn new(key: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            image: ImageRef::new(image),
        }
    }
}

/// Asset list used to populate the registry when the composition mounts.
///
/// Insert this resource before the `Startup` schedule runs. It is consumed
/// once; later changes are ignored.
#[derive(Resource, Debug, Clone, Default)]
pub struct CompositionSeed {
    /// Assets in initial paint order.
    pub assets: Vec<SeedAsset>,
}

/// Tunables for interaction and display.
///
/// Modify this at runtime to change resize steps, highlight appearance or
/// the drag plane.
#[derive(Resource, Clone, Debug)]
pub struct CompositorSettings {
    // === Commands ===
    /// Scale multiplier applied by [`CompositionCommand::ResizeUp`].
    pub resize_up_factor: f32,
    /// Scale multiplier applied by [`CompositionCommand::ResizeDown`].
    pub resize_down_factor: f32,

    // === Seeding ===
    /// Distance between consecutive seeded sprites.
    pub seed_spacing: f32,
    /// Direction along which seeded sprites are spread.
    pub seed_axis: Vec3,

    // === Interaction ===
    /// Plane that pointer rays are intersected with.
    pub ground_plane: GroundPlane,

    // === Display ===
    /// Depth nudge per paint-order step, applied to rendered transforms only.
    pub layer_separation: f32,
    /// Size of the quad each sprite is drawn on, before sprite scale. Read
    /// when the first visual spawns.
    pub quad_size: Vec2,
    /// Whether to outline the selected sprite.
    pub show_highlight: bool,
    /// Outline color of the selected sprite.
    pub highlight_color: Color,
    /// Outline color of the selected sprite while it is being dragged.
    pub highlight_drag_color: Color,
    /// Line width for gizmo rendering (in pixels).
    pub highlight_line_width: f32,
    /// Depth bias for gizmo rendering. Negative values bring gizmos closer
    /// to the camera.
    pub gizmo_depth_bias: f32,
    /// Gap between the sprite quad and its outline.
    pub highlight_padding: f32,
    /// Draw the last pick ray for debugging.
    pub debug_ray: bool,
    /// Length of the drawn debug ray.
    pub debug_ray_length: f32,
    /// Color of the drawn debug ray.
    pub debug_ray_color: Color,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            resize_up_factor: 1.1,
            resize_down_factor: 0.9,

            seed_spacing: 0.1,
            seed_axis: Vec3::X,

            ground_plane: GroundPlane::default(),

            layer_separation: 1e-3,
            quad_size: Vec2::ONE,
            show_highlight: true,
            highlight_color: Color::srgb(1.0, 0.6, 0.2),
            highlight_drag_color: Color::srgb(1.0, 0.9, 0.8),
            highlight_line_width: 3.0,
            gizmo_depth_bias: -1.0,
            highlight_padding: 0.02,
            debug_ray: false,
            debug_ray_length: 5.0,
            debug_ray_color: Color::srgb(1.0, 0.0, 0.0),
        }
    }
}
