//! Pointer and toolbar input handling.
//!
//! This module contains the systems that read mouse input through the tagged
//! camera, feed [`InteractionState`], apply toolbar commands, and seed or tear
//! down the composition.

use bevy::input::mouse::MouseButton;
use bevy::input::ButtonInput;
use bevy::math::Ray3d;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera_view::CameraView;
use crate::controller::InteractionState;
use crate::picking::ActivePicker;
use crate::registry::SpriteRegistry;
use crate::types::{
    CompositionCommand, CompositionSeed, CompositorCamera, CompositorSettings, SelectionChanged,
};

/// Cast a ray from the cursor through the compositor camera.
///
/// The cursor is normalized against the camera's viewport when it has one,
/// otherwise against the whole window.
fn cursor_ray(
    cameras: &Query<(&Camera, &GlobalTransform), With<CompositorCamera>>,
    windows: &Query<&Window, With<PrimaryWindow>>,
) -> Option<Ray3d> {
    let (camera, camera_transform) = cameras.iter().next()?;
    let window = windows.iter().next()?;
    let cursor_pos = window.cursor_position()?;
    let surface = camera
        .logical_viewport_rect()
        .unwrap_or_else(|| Rect::new(0.0, 0.0, window.width(), window.height()));

    match CameraView::from_camera(camera, camera_transform).ray_from_pointer(cursor_pos, surface) {
        Ok(ray) => Some(ray),
        Err(err) => {
            trace!(%err, "no pointer ray this frame");
            None
        }
    }
}

/// Populate the registry from the injected asset list.
pub fn seed_composition(
    seed: Option<Res<CompositionSeed>>,
    settings: Res<CompositorSettings>,
    mut registry: ResMut<SpriteRegistry>,
) {
    let Some(seed) = seed else {
        debug!("no composition seed, starting empty");
        return;
    };

    let ids = match registry.seed(
        seed.assets.iter().map(|asset| asset.image.clone()),
        settings.seed_spacing,
        settings.seed_axis,
    ) {
        Ok(ids) => ids,
        Err(err) => {
            warn!(%err, seeded = registry.len(), "composition only partially seeded");
            return;
        }
    };
    for (asset, id) in seed.assets.iter().zip(&ids) {
        debug!(sprite = %id, key = %asset.key, image = %asset.image, "seeded sprite");
    }
    info!(count = ids.len(), "composition seeded");
}

/// Start dragging the sprite under the cursor when the left button is pressed.
#[allow(clippy::too_many_arguments)]
pub fn begin_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<InteractionState>,
    settings: Res<CompositorSettings>,
    picker: Res<ActivePicker>,
    registry: Res<SpriteRegistry>,
    cameras: Query<(&Camera, &GlobalTransform), With<CompositorCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut selection_changed: MessageWriter<SelectionChanged>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }

    if state.is_dragging() {
        return;
    }

    let Some(ray) = cursor_ray(&cameras, &windows) else {
        return;
    };

    if let Some(changed) =
        state.pointer_down(ray, &settings.ground_plane, &registry, &*picker)
    {
        selection_changed.write(changed);
    }
}

/// Move the dragged sprite while the left button is held.
///
/// Only the latest cursor position per frame is used.
pub fn drag_sprite(
    buttons: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<InteractionState>,
    settings: Res<CompositorSettings>,
    mut registry: ResMut<SpriteRegistry>,
    cameras: Query<(&Camera, &GlobalTransform), With<CompositorCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if !state.is_dragging() {
        return;
    }

    if !buttons.pressed(MouseButton::Left) {
        return;
    }

    // Cursor outside the window: hold the sprite where it is.
    let Some(ray) = cursor_ray(&cameras, &windows) else {
        return;
    };

    state.pointer_move(ray, &settings.ground_plane, &mut registry);
}

/// Handle the left button going up.
///
/// A drag ends once the button is no longer held. Button state is
/// window-wide, so a release outside the rendering surface still ends it.
/// A release with no drag in progress clears the selection.
pub fn end_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<InteractionState>,
    mut selection_changed: MessageWriter<SelectionChanged>,
) {
    let released = if state.is_dragging() {
        !buttons.pressed(MouseButton::Left)
    } else {
        buttons.just_released(MouseButton::Left)
    };
    if !released {
        return;
    }

    if let Some(changed) = state.pointer_up() {
        selection_changed.write(changed);
    }
}

/// Apply queued toolbar commands in arrival order.
pub fn apply_composition_commands(
    mut commands: MessageReader<CompositionCommand>,
    mut state: ResMut<InteractionState>,
    mut registry: ResMut<SpriteRegistry>,
    settings: Res<CompositorSettings>,
    mut selection_changed: MessageWriter<SelectionChanged>,
) {
    for &command in commands.read() {
        if let Some(changed) = state.apply(command, &mut registry, &settings) {
            selection_changed.write(changed);
        }
    }
}

/// Clear the composition when the app exits.
pub fn teardown_composition(
    mut exit: MessageReader<AppExit>,
    mut state: ResMut<InteractionState>,
    mut registry: ResMut<SpriteRegistry>,
) {
    if exit.read().next().is_none() {
        return;
    }
    state.reset();
    registry.clear();
    debug!("composition torn down");
}
