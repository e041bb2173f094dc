//! Composition rendering.
//!
//! This module keeps one textured quad entity per registered sprite and draws
//! the selection outline and debug ray with Bevy's `Gizmos` API. It only ever
//! reads the registry.

use std::collections::HashSet;

use bevy::gizmos::config::{DefaultGizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::controller::InteractionState;
use crate::registry::SpriteRegistry;
use crate::types::{CompositorSettings, Sprite, SpriteId, SpriteVisual};

/// Configure Bevy's built-in gizmo renderer using our settings resource.
pub fn configure_gizmos(
    mut config_store: ResMut<GizmoConfigStore>,
    settings: Res<CompositorSettings>,
) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = settings.highlight_line_width;
    config.depth_bias = settings.gizmo_depth_bias;
}

/// Rendered translation of a sprite.
///
/// Sprites sharing a depth are separated by a small nudge along the ground
/// plane normal so that later entries in the registry draw on top. The
/// registry position itself is left untouched.
fn painted_translation(sprite: &Sprite, paint_index: usize, settings: &CompositorSettings) -> Vec3 {
    let nudge = paint_index as f32 * settings.layer_separation;
    sprite.position + *settings.ground_plane.normal * nudge
}

/// Transform of the quad entity that displays `sprite`.
pub fn visual_transform(
    sprite: &Sprite,
    paint_index: usize,
    settings: &CompositorSettings,
) -> Transform {
    Transform {
        translation: painted_translation(sprite, paint_index, settings),
        rotation: Quat::IDENTITY,
        scale: sprite.scale,
    }
}

/// Corners of the selection outline, counter-clockwise from bottom-left.
pub fn highlight_corners(
    sprite: &Sprite,
    paint_index: usize,
    settings: &CompositorSettings,
) -> [Vec3; 4] {
    let center = painted_translation(sprite, paint_index, settings);
    let half = settings.quad_size * sprite.scale.truncate() * 0.5
        + Vec2::splat(settings.highlight_padding);
    [
        center + Vec3::new(-half.x, -half.y, 0.0),
        center + Vec3::new(half.x, -half.y, 0.0),
        center + Vec3::new(half.x, half.y, 0.0),
        center + Vec3::new(-half.x, half.y, 0.0),
    ]
}

/// The shared sprite quad for `size`, rebuilt when the size changes.
///
/// Returns the handle and whether a new mesh was added.
fn cached_quad(
    cache: &mut Option<(Vec2, Handle<Mesh>)>,
    size: Vec2,
    meshes: &mut Assets<Mesh>,
) -> (Handle<Mesh>, bool) {
    if let Some((cached_size, handle)) = cache.as_ref() {
        if *cached_size == size {
            return (handle.clone(), false);
        }
    }
    let handle = meshes.add(Rectangle::from_size(size));
    *cache = Some((size, handle.clone()));
    (handle, true)
}

/// Spawn, update and despawn quad entities so they mirror the registry.
///
/// Geometry is written immediately; textures appear once the asset server
/// has loaded them.
#[allow(clippy::too_many_arguments)]
pub fn sync_sprite_visuals(
    mut commands: Commands,
    registry: Res<SpriteRegistry>,
    settings: Res<CompositorSettings>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: Query<(Entity, &SpriteVisual, &mut Transform, &mut Mesh3d)>,
    mut quad_cache: Local<Option<(Vec2, Handle<Mesh>)>>,
) {
    if !registry.is_changed() && !settings.is_changed() {
        return;
    }

    let (quad, resized) = cached_quad(&mut quad_cache, settings.quad_size, &mut meshes);
    if resized {
        debug!(size = ?settings.quad_size, "rebuilt sprite quad");
    }

    let mut shown: HashSet<SpriteId> = HashSet::new();
    for (entity, visual, mut transform, mut mesh) in &mut visuals {
        let (Ok(index), Some(sprite)) = (registry.index_of(visual.0), registry.get(visual.0))
        else {
            commands.entity(entity).despawn();
            continue;
        };
        *transform = visual_transform(sprite, index, &settings);
        if resized {
            mesh.0 = quad.clone();
        }
        shown.insert(visual.0);
    }

    for (index, sprite) in registry.iter().enumerate() {
        if shown.contains(&sprite.id) {
            continue;
        }
        let material = materials.add(StandardMaterial {
            base_color_texture: Some(asset_server.load(sprite.image.as_str().to_owned())),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            unlit: true,
            ..default()
        });
        commands.spawn((
            Mesh3d(quad.clone()),
            MeshMaterial3d(material),
            visual_transform(sprite, index, &settings),
            SpriteVisual(sprite.id),
        ));
        debug!(sprite = %sprite.id, image = %sprite.image, "spawned sprite visual");
    }
}

/// Outline the selected sprite.
pub fn draw_selection_highlight(
    state: Res<InteractionState>,
    registry: Res<SpriteRegistry>,
    settings: Res<CompositorSettings>,
    mut gizmos: Gizmos,
) {
    if !settings.show_highlight {
        return;
    }
    let Some(selected) = state.selected() else {
        return;
    };
    let (Ok(index), Some(sprite)) = (registry.index_of(selected), registry.get(selected)) else {
        return;
    };

    let color = if state.dragged() == Some(selected) {
        settings.highlight_drag_color
    } else {
        settings.highlight_color
    };

    let [p0, p1, p2, p3] = highlight_corners(sprite, index, &settings);
    gizmos.line(p0, p1, color);
    gizmos.line(p1, p2, color);
    gizmos.line(p2, p3, color);
    gizmos.line(p3, p0, color);
}

/// Draw the most recent pick ray when debugging is enabled.
pub fn draw_debug_ray(
    state: Res<InteractionState>,
    settings: Res<CompositorSettings>,
    mut gizmos: Gizmos,
) {
    if !settings.debug_ray {
        return;
    }
    let Some(ray) = state.last_pick_ray() else {
        return;
    };
    let end = ray.origin + *ray.direction * settings.debug_ray_length;
    gizmos.arrow(ray.origin, end, settings.debug_ray_color);
}
