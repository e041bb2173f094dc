//! Sprite picking strategies.

use bevy::prelude::*;

use crate::registry::SpriteRegistry;
use crate::types::SpriteId;

/// Chooses which sprite a ground-plane point refers to.
///
/// Implement this to replace the default nearest-center heuristic with a
/// bounds or alpha test. The interaction state machine only sees the returned
/// id.
pub trait SpritePicker: Send + Sync + 'static {
    /// Returns the sprite under `point`, or `None` if nothing qualifies.
    fn pick(&self, registry: &SpriteRegistry, point: Vec3) -> Option<SpriteId>;
}

/// Picks the sprite whose center is closest to the point.
///
/// This can select a sprite whose quad does not cover the point at all, as
/// long as no other center is closer. Ties go to the sprite painted first.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCenterPicker;

impl SpritePicker for NearestCenterPicker {
    fn pick(&self, registry: &SpriteRegistry, point: Vec3) -> Option<SpriteId> {
        registry.find_nearest(point).map(|sprite| sprite.id)
    }
}

/// The picker used by the interaction systems.
///
/// # Example
///
/// ```ignore
/// app.insert_resource(ActivePicker::new(MyBoundsPicker));
/// ```
#[derive(Resource)]
pub struct ActivePicker(pub Box<dyn SpritePicker>);

impl ActivePicker {
    /// Wraps a picker.
    pub fn new(picker: impl SpritePicker) -> Self {
        Self(Box::new(picker))
    }
}

impl Default for ActivePicker {
    fn default() -> Self {
        Self::new(NearestCenterPicker)
    }
}

impl SpritePicker for ActivePicker {
    fn pick(&self, registry: &SpriteRegistry, point: Vec3) -> Option<SpriteId> {
        self.0.pick(registry, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageRef;

    /// Picks only sprites whose unit quad contains the point.
    struct QuadPicker;

    impl SpritePicker for QuadPicker {
        fn pick(&self, registry: &SpriteRegistry, point: Vec3) -> Option<SpriteId> {
            registry
                .iter()
                .rev()
                .find(|s| {
                    let half = s.scale.truncate() * 0.5;
                    let d = (point - s.position).truncate().abs();
                    d.x <= half.x && d.y <= half.y
                })
                .map(|s| s.id)
        }
    }

    #[test]
    fn default_picker_is_nearest_center() {
        let mut registry = SpriteRegistry::new();
        let a = registry.spawn(ImageRef::new("a.png"), Vec3::ZERO).unwrap();
        registry.spawn(ImageRef::new("b.png"), Vec3::new(3.0, 0.0, 0.0)).unwrap();
        let picker = ActivePicker::default();
        assert_eq!(picker.pick(&registry, Vec3::new(1.4, 0.0, 0.0)), Some(a));
    }

    #[test]
    fn custom_picker_can_reject_far_points() {
        let mut registry = SpriteRegistry::new();
        registry.spawn(ImageRef::new("a.png"), Vec3::ZERO).unwrap();
        let picker = ActivePicker::new(QuadPicker);
        assert_eq!(picker.pick(&registry, Vec3::new(1.4, 0.0, 0.0)), None);
    }

    #[test]
    fn empty_registry_picks_nothing() {
        let registry = SpriteRegistry::new();
        assert_eq!(NearestCenterPicker.pick(&registry, Vec3::ZERO), None);
    }
}
