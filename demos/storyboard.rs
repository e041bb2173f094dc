//! Storyboard composition example.
//!
//! Seeds a handful of sprites and lets you drag, resize and re-layer them.
//! Place PNG files under `assets/sprites/` with the names listed below to see
//! textures; outlines and picking work without them.
//!
//! Click and drag to move a sprite. `=`/`-` resize, `]`/`[` change layer,
//! Delete removes, Escape deselects, D toggles the pick ray.

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use bevy_sprite_compositor::{
    CompositionCommand, CompositionSeed, CompositorCamera, CompositorSettings, InteractionState,
    SeedAsset, SelectionChanged, SpriteCompositorPlugin, SpriteRegistry,
};

#[derive(Component)]
struct Hud;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(SpriteCompositorPlugin)
        .insert_resource(CompositionSeed {
            assets: vec![
                SeedAsset::new("backdrop", "sprites/backdrop.png"),
                SeedAsset::new("house", "sprites/house.png"),
                SeedAsset::new("tree", "sprites/tree.png"),
                SeedAsset::new("hero", "sprites/hero.png"),
            ],
        })
        .insert_resource(CompositorSettings {
            seed_spacing: 0.6,
            ..default()
        })
        .add_systems(Startup, setup)
        .add_systems(Update, (keyboard_controls, log_selection, update_hud))
        .run();
}

fn setup(mut commands: Commands) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Projection::from(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: 4.0,
            },
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_xyz(0.0, 0.0, 1.0),
        CompositorCamera,
    ));

    // HUD
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
    )).with_children(|p| {
        p.spawn((
            Text::new(""),
            TextFont { font_size: 14.0, ..default() },
            TextColor(Color::WHITE),
            Hud,
        ));
    });
}

fn keyboard_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<CompositorSettings>,
    mut toolbar: MessageWriter<CompositionCommand>,
) {
    let bindings = [
        (KeyCode::Equal, CompositionCommand::ResizeUp),
        (KeyCode::Minus, CompositionCommand::ResizeDown),
        (KeyCode::BracketRight, CompositionCommand::LayerUp),
        (KeyCode::BracketLeft, CompositionCommand::LayerDown),
        (KeyCode::Delete, CompositionCommand::Remove),
        (KeyCode::Escape, CompositionCommand::Deselect),
    ];
    for (key, command) in bindings {
        if keys.just_pressed(key) {
            toolbar.write(command);
        }
    }
    if keys.just_pressed(KeyCode::KeyD) {
        settings.debug_ray = !settings.debug_ray;
    }
}

fn log_selection(mut selection: MessageReader<SelectionChanged>) {
    for changed in selection.read() {
        match (changed.sprite, changed.pickup_point) {
            (Some(sprite), Some(point)) => info!("picked {sprite} at {point}"),
            _ => info!("selection cleared"),
        }
    }
}

fn update_hud(
    state: Res<InteractionState>,
    registry: Res<SpriteRegistry>,
    mut query: Query<&mut Text, With<Hud>>,
) {
    let Ok(mut text) = query.single_mut() else { return };

    let selected = match state.selected().and_then(|id| registry.get(id)) {
        Some(sprite) => format!(
            "{} {} | Layer: {} | Scale: {:.2}",
            sprite.id,
            sprite.image,
            registry.index_of(sprite.id).map_or(0, |i| i + 1),
            sprite.scale.x,
        ),
        None => "none".to_owned(),
    };

    text.0 = format!(
        "Sprites: {} | Selected: {}{}\n\n\
         [Drag] Move  [=/-] Resize\n\
         []] Layer up  [[] Layer down\n\
         [Del] Remove  [Esc] Deselect  [D] Pick ray",
        registry.len(),
        selected,
        if state.is_dragging() { " (dragging)" } else { "" },
    );
}
