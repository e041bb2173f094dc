//! Sprite compositing plugin for Bevy 0.18.
//!
//! This crate lets users pick, drag, resize and re-order image sprites that
//! sit on a shared ground plane inside a 3D viewport. Pointer input is turned
//! into world coordinates by casting a ray through the compositor camera and
//! intersecting it with the plane.
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_sprite_compositor::{
//!     CompositionSeed, CompositorCamera, SeedAsset, SpriteCompositorPlugin,
//! };
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SpriteCompositorPlugin)
//!         .insert_resource(CompositionSeed {
//!             assets: vec![
//!                 SeedAsset::new("sky", "sprites/sky.png"),
//!                 SeedAsset::new("hero", "sprites/hero.png"),
//!             ],
//!         })
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         Camera3d::default(),
//!         Projection::from(OrthographicProjection::default_3d()),
//!         Transform::from_xyz(0.0, 0.0, 1.0),
//!         CompositorCamera,
//!     ));
//! }
//! ```
//!
//! # Features
//!
//! - **Dragging**: Sprites follow the pointer along the ground plane without
//!   jumping at pickup; depth is preserved
//! - **Selection**: Nearest-center picking behind a replaceable
//!   [`SpritePicker`]
//! - **Commands**: Resize, layer up/down, remove and deselect through
//!   [`CompositionCommand`] messages
//! - **Paint order**: The [`SpriteRegistry`] order decides which sprite draws
//!   on top
//!
//! # Configuration
//!
//! - [`CompositorSettings`]: Resize steps, seed layout, ground plane, and
//!   highlight appearance
//! - [`CompositionSeed`]: Assets to populate the composition with at startup
//! - [`ActivePicker`]: Picking strategy
//!
//! Read [`SpriteRegistry`] and [`InteractionState`] to render inspectors, and
//! listen for [`SelectionChanged`] messages to follow the active sprite.

#![warn(missing_docs)]

use bevy::prelude::*;

mod camera_view;
mod controller;
mod draw;
mod error;
mod interaction;
mod math;
mod picking;
mod registry;
mod types;

// Re-export all public types
pub use camera_view::{pointer_to_ndc, CameraView};
pub use controller::{DragPhase, InteractionState};
pub use draw::{highlight_corners, visual_transform};
pub use error::CompositorError;
pub use math::{ray_plane_intersection, GroundPlane};
pub use picking::{ActivePicker, NearestCenterPicker, SpritePicker};
pub use registry::SpriteRegistry;
pub use types::{
    CompositionCommand, CompositionSeed, CompositorCamera, CompositorSettings, DepthPolicy,
    ImageRef, SeedAsset, SelectionChanged, Sprite, SpriteId, SpriteVisual,
};

use crate::draw::{configure_gizmos, draw_debug_ray, draw_selection_highlight, sync_sprite_visuals};
use crate::interaction::{
    apply_composition_commands, begin_drag, drag_sprite, end_drag, seed_composition,
    teardown_composition,
};

/// System sets used by [`SpriteCompositorPlugin`] in the `Update` schedule.
///
/// `Interaction` runs before `Display`. Order your own systems against these
/// to observe or override registry changes within the same frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositorSet {
    /// Pointer handling and toolbar commands.
    Interaction,
    /// Sprite visuals and gizmo drawing.
    Display,
}

/// Plugin that enables sprite compositing.
///
/// Add this plugin to your Bevy app to register the registry, interaction
/// state, settings and picker resources, the command and selection messages,
/// and the systems that drive them. Resources inserted before the plugin is
/// added are kept.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_sprite_compositor::SpriteCompositorPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(SpriteCompositorPlugin)
///     .run();
/// ```
pub struct SpriteCompositorPlugin;

impl Plugin for SpriteCompositorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpriteRegistry>()
            .init_resource::<InteractionState>()
            .init_resource::<CompositorSettings>()
            .init_resource::<ActivePicker>()
            .add_message::<CompositionCommand>()
            .add_message::<SelectionChanged>()
            .configure_sets(
                Update,
                (CompositorSet::Interaction, CompositorSet::Display).chain(),
            )
            .add_systems(Startup, (configure_gizmos, seed_composition))
            .add_systems(
                Update,
                (begin_drag, drag_sprite, end_drag, apply_composition_commands)
                    .chain()
                    .in_set(CompositorSet::Interaction),
            )
            .add_systems(
                Update,
                (sync_sprite_visuals, draw_selection_highlight, draw_debug_ray)
                    .chain()
                    .in_set(CompositorSet::Display),
            )
            .add_systems(Last, teardown_composition);
    }
}
