//! Selection and drag state machine.
//!
//! [`InteractionState`] owns the transient pointer state and turns pointer
//! lifecycle events and toolbar commands into [`SpriteRegistry`] mutations.
//! It has no ECS access of its own; the systems in `interaction.rs` feed it.
//!
//! Failures are never surfaced. A pointer event that misses the ground plane
//! is skipped, and operations that refer to a sprite that has since been
//! removed are dropped.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::error::CompositorError;
use crate::math::GroundPlane;
use crate::picking::SpritePicker;
use crate::registry::SpriteRegistry;
use crate::types::{
    CompositionCommand, CompositorSettings, DepthPolicy, SelectionChanged, SpriteId,
};

/// Whether a sprite is currently following the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    /// No drag in progress.
    #[default]
    Idle,
    /// `sprite` follows the pointer, kept `offset` away from the ground-plane
    /// intersection so it does not jump at pickup.
    Dragging {
        /// Sprite being moved.
        sprite: SpriteId,
        /// Sprite position at pickup minus the pickup point.
        offset: Vec3,
    },
}

/// Transient interaction state. Not persisted.
///
/// Selection and drag are independent: the selection survives the end of a
/// drag and is the target of every [`CompositionCommand`].
#[derive(Resource, Debug, Clone, Default)]
pub struct InteractionState {
    phase: DragPhase,
    selected: Option<SpriteId>,
    last_pick_ray: Option<Ray3d>,
}

impl InteractionState {
    /// Current drag phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Sprite targeted by toolbar commands.
    pub fn selected(&self) -> Option<SpriteId> {
        self.selected
    }

    /// Sprite being dragged, if any.
    pub fn dragged(&self) -> Option<SpriteId> {
        match self.phase {
            DragPhase::Dragging { sprite, .. } => Some(sprite),
            DragPhase::Idle => None,
        }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// The ray of the most recent pointer-down, for debug drawing.
    pub fn last_pick_ray(&self) -> Option<Ray3d> {
        self.last_pick_ray
    }

    /// Pointer pressed: intersect `ray` with the ground plane and pick up the
    /// sprite there.
    ///
    /// Returns the selection notification on a successful pick. Misses leave
    /// the state untouched.
    pub fn pointer_down(
        &mut self,
        ray: Ray3d,
        plane: &GroundPlane,
        registry: &SpriteRegistry,
        picker: &dyn SpritePicker,
    ) -> Option<SelectionChanged> {
        if self.is_dragging() {
            return None;
        }
        self.last_pick_ray = Some(ray);
        let point = match plane.intersect(&ray) {
            Ok(point) => point,
            Err(err) => {
                trace!(%err, "pointer down ignored");
                return None;
            }
        };
        self.pointer_down_at(point, registry, picker)
    }

    /// Pointer pressed with the ground-plane point already known.
    pub fn pointer_down_at(
        &mut self,
        point: Vec3,
        registry: &SpriteRegistry,
        picker: &dyn SpritePicker,
    ) -> Option<SelectionChanged> {
        if self.is_dragging() {
            return None;
        }
        if registry.is_empty() {
            trace!(err = %CompositorError::EmptyRegistry, "nothing picked");
            return None;
        }
        let Some(sprite) = picker.pick(registry, point) else {
            trace!(?point, "picker found no sprite");
            return None;
        };
        let Some(position) = registry.get(sprite).map(|s| s.position) else {
            debug!(sprite = %sprite, "picker returned an unknown sprite");
            return None;
        };

        let offset = position - point;
        self.selected = Some(sprite);
        self.phase = DragPhase::Dragging { sprite, offset };
        debug!(sprite = %sprite, ?point, "picked up sprite");
        Some(SelectionChanged::picked(sprite, point))
    }

    /// Pointer moved while held: re-intersect and move the dragged sprite.
    ///
    /// Returns the sprite's new position when it moved.
    pub fn pointer_move(
        &mut self,
        ray: Ray3d,
        plane: &GroundPlane,
        registry: &mut SpriteRegistry,
    ) -> Option<Vec3> {
        if !self.is_dragging() {
            return None;
        }
        let point = plane.intersect(&ray).ok()?;
        self.pointer_move_to(point, registry)
    }

    /// Pointer moved to a known ground-plane point.
    ///
    /// The dragged sprite lands at `point + offset` with its depth unchanged.
    /// If the sprite disappeared mid-drag, the drag ends silently.
    pub fn pointer_move_to(&mut self, point: Vec3, registry: &mut SpriteRegistry) -> Option<Vec3> {
        let DragPhase::Dragging { sprite, offset } = self.phase else {
            return None;
        };
        let target = point + offset;
        if let Err(err) = registry.update_position(sprite, target, DepthPolicy::Preserve) {
            debug!(%err, "dropping stale drag");
            self.phase = DragPhase::Idle;
            return None;
        }
        let position = registry.get(sprite).map(|s| s.position);
        trace!(sprite = %sprite, ?position, "dragged sprite");
        position
    }

    /// Pointer released.
    ///
    /// Ending a drag keeps the selection. A release with no drag in progress
    /// (the press missed the plane or picked nothing) clears the selection
    /// and returns the notification.
    pub fn pointer_up(&mut self) -> Option<SelectionChanged> {
        if let DragPhase::Dragging { sprite, .. } = self.phase {
            self.phase = DragPhase::Idle;
            debug!(sprite = %sprite, "drag ended");
            return None;
        }
        let sprite = self.selected.take()?;
        debug!(sprite = %sprite, "released without drag, selection cleared");
        Some(SelectionChanged::cleared())
    }

    /// Apply a toolbar command to the selected sprite.
    ///
    /// Returns a notification when the selection changed.
    pub fn apply(
        &mut self,
        command: CompositionCommand,
        registry: &mut SpriteRegistry,
        settings: &CompositorSettings,
    ) -> Option<SelectionChanged> {
        let selected = self.selected?;
        let result = match command {
            CompositionCommand::ResizeUp => registry
                .update_scale(selected, settings.resize_up_factor)
                .map(|_| ()),
            CompositionCommand::ResizeDown => registry
                .update_scale(selected, settings.resize_down_factor)
                .map(|_| ()),
            CompositionCommand::LayerUp => registry.swap_with_next(selected).map(|_| ()),
            CompositionCommand::LayerDown => registry.swap_with_previous(selected).map(|_| ()),
            CompositionCommand::Remove => registry.remove(selected).map(|_| ()),
            CompositionCommand::Deselect => Ok(()),
        };

        match result {
            Ok(()) => {
                debug!(sprite = %selected, %command, "applied command");
                match command {
                    CompositionCommand::Remove | CompositionCommand::Deselect => {
                        Some(self.clear_selection(selected))
                    }
                    _ => None,
                }
            }
            Err(CompositorError::NotFound(stale)) => {
                debug!(sprite = %stale, %command, "dropping command for missing sprite");
                Some(self.clear_selection(stale))
            }
            Err(err) => {
                warn!(%err, %command, "command rejected");
                None
            }
        }
    }

    fn clear_selection(&mut self, sprite: SpriteId) -> SelectionChanged {
        self.selected = None;
        if self.dragged() == Some(sprite) {
            self.phase = DragPhase::Idle;
        }
        SelectionChanged::cleared()
    }

    /// Forget all drag and selection state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::NearestCenterPicker;
    use crate::types::ImageRef;

    const EPS: f32 = 1e-5;

    fn down_ray(x: f32, y: f32) -> Ray3d {
        Ray3d {
            origin: Vec3::new(x, y, 1.0),
            direction: Dir3::NEG_Z,
        }
    }

    /// Registry `[A@(0,0,0), B@(1,0,0)]`.
    fn two_sprites() -> (SpriteRegistry, SpriteId, SpriteId) {
        let mut registry = SpriteRegistry::new();
        let a = registry.spawn(ImageRef::new("a.png"), Vec3::ZERO).unwrap();
        let b = registry.spawn(ImageRef::new("b.png"), Vec3::X).unwrap();
        (registry, a, b)
    }

    fn select(state: &mut InteractionState, registry: &SpriteRegistry, point: Vec3) {
        state.pointer_down_at(point, registry, &NearestCenterPicker);
        state.pointer_up();
    }

    #[test]
    fn pickup_then_move_keeps_offset() {
        let (mut registry, a, _) = two_sprites();
        let mut state = InteractionState::default();
        let plane = GroundPlane::default();

        let changed = state
            .pointer_down(down_ray(0.1, 0.0), &plane, &registry, &NearestCenterPicker)
            .unwrap();
        assert_eq!(changed.sprite, Some(a));
        assert!((changed.pickup_point.unwrap() - Vec3::new(0.1, 0.0, 0.0)).length() < EPS);
        let DragPhase::Dragging { sprite, offset } = state.phase() else {
            panic!("expected dragging");
        };
        assert_eq!(sprite, a);
        assert!((offset - Vec3::new(-0.1, 0.0, 0.0)).length() < EPS);

        state.pointer_move(down_ray(0.5, 0.0), &plane, &mut registry);
        let pos = registry.get(a).unwrap().position;
        assert!((pos - Vec3::new(0.4, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn drag_preserves_depth_and_pickup_offset() {
        let mut registry = SpriteRegistry::new();
        let p = Vec3::new(2.0, -1.0, 0.75);
        let id = registry.spawn(ImageRef::new("deep.png"), p).unwrap();
        let mut state = InteractionState::default();

        let i0 = Vec3::new(2.3, -0.6, 0.0);
        let i1 = Vec3::new(-4.0, 5.5, 0.0);
        state.pointer_down_at(i0, &registry, &NearestCenterPicker);
        state.pointer_move_to(i1, &mut registry);

        let pos = registry.get(id).unwrap().position;
        let expected = p - i0 + i1;
        assert!((pos.x - expected.x).abs() < EPS);
        assert!((pos.y - expected.y).abs() < EPS);
        assert_eq!(pos.z, 0.75);
    }

    #[test]
    fn release_ends_drag_but_keeps_selection() {
        let (mut registry, a, _) = two_sprites();
        let mut state = InteractionState::default();
        state.pointer_down_at(Vec3::ZERO, &registry, &NearestCenterPicker);
        assert_eq!(state.pointer_up(), None);
        assert_eq!(state.phase(), DragPhase::Idle);
        assert_eq!(state.selected(), Some(a));

        assert_eq!(state.pointer_move_to(Vec3::new(3.0, 3.0, 0.0), &mut registry), None);
        assert_eq!(registry.get(a).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn release_without_drag_clears_selection() {
        let (registry, a, _) = two_sprites();
        let mut state = InteractionState::default();
        select(&mut state, &registry, Vec3::ZERO);
        assert_eq!(state.selected(), Some(a));

        let parallel = Ray3d {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Dir3::X,
        };
        let missed =
            state.pointer_down(parallel, &GroundPlane::default(), &registry, &NearestCenterPicker);
        assert_eq!(missed, None);
        assert_eq!(state.selected(), Some(a));

        assert_eq!(state.pointer_up(), Some(SelectionChanged::cleared()));
        assert_eq!(state.selected(), None);
        assert_eq!(state.phase(), DragPhase::Idle);

        // Nothing left to clear.
        assert_eq!(state.pointer_up(), None);
    }

    #[test]
    fn layer_commands_swap_with_neighbours() {
        let (mut registry, a, b) = two_sprites();
        let settings = CompositorSettings::default();
        let mut state = InteractionState::default();
        select(&mut state, &registry, Vec3::new(0.9, 0.0, 0.0));
        assert_eq!(state.selected(), Some(b));

        state.apply(CompositionCommand::LayerUp, &mut registry, &settings);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![a, b]);

        state.apply(CompositionCommand::LayerDown, &mut registry, &settings);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn resize_compounds() {
        let (mut registry, a, _) = two_sprites();
        let settings = CompositorSettings::default();
        let mut state = InteractionState::default();
        select(&mut state, &registry, Vec3::ZERO);

        state.apply(CompositionCommand::ResizeUp, &mut registry, &settings);
        assert!((registry.get(a).unwrap().scale - Vec3::splat(1.1)).length() < EPS);
        state.apply(CompositionCommand::ResizeUp, &mut registry, &settings);
        assert!((registry.get(a).unwrap().scale - Vec3::splat(1.21)).length() < EPS);

        state.apply(CompositionCommand::ResizeDown, &mut registry, &settings);
        assert!((registry.get(a).unwrap().scale - Vec3::splat(1.089)).length() < EPS);
    }

    #[test]
    fn remove_deletes_selected_and_clears_selection() {
        let (mut registry, a, b) = two_sprites();
        let settings = CompositorSettings::default();
        let mut state = InteractionState::default();
        select(&mut state, &registry, Vec3::ZERO);

        let changed = state.apply(CompositionCommand::Remove, &mut registry, &settings);
        assert_eq!(changed, Some(SelectionChanged::cleared()));
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![b]);
        assert!(!registry.contains(a));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn remove_during_drag_returns_to_idle() {
        let (mut registry, _, b) = two_sprites();
        let settings = CompositorSettings::default();
        let mut state = InteractionState::default();
        state.pointer_down_at(Vec3::X, &registry, &NearestCenterPicker);
        assert_eq!(state.dragged(), Some(b));

        state.apply(CompositionCommand::Remove, &mut registry, &settings);
        assert_eq!(state.phase(), DragPhase::Idle);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn parallel_ray_leaves_state_idle() {
        let (registry, _, _) = two_sprites();
        let mut state = InteractionState::default();
        let parallel = Ray3d {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Dir3::X,
        };
        let changed =
            state.pointer_down(parallel, &GroundPlane::default(), &registry, &NearestCenterPicker);
        assert_eq!(changed, None);
        assert_eq!(state.phase(), DragPhase::Idle);
        assert_eq!(state.selected(), None);
        assert_eq!(state.last_pick_ray(), Some(parallel));
    }

    #[test]
    fn commands_without_selection_change_nothing() {
        let (mut registry, a, b) = two_sprites();
        let settings = CompositorSettings::default();
        let mut state = InteractionState::default();
        let before = registry.clone();

        for command in [
            CompositionCommand::ResizeUp,
            CompositionCommand::ResizeDown,
            CompositionCommand::LayerUp,
            CompositionCommand::LayerDown,
            CompositionCommand::Remove,
            CompositionCommand::Deselect,
        ] {
            assert_eq!(state.apply(command, &mut registry, &settings), None);
        }
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(registry.get(a), before.get(a));
        assert_eq!(registry.get(b), before.get(b));
        assert_eq!(state.phase(), DragPhase::Idle);
    }

    #[test]
    fn pointer_down_on_empty_registry_stays_idle() {
        let registry = SpriteRegistry::new();
        let mut state = InteractionState::default();
        let changed = state.pointer_down_at(Vec3::ZERO, &registry, &NearestCenterPicker);
        assert_eq!(changed, None);
        assert_eq!(state.phase(), DragPhase::Idle);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn second_pointer_down_during_drag_is_ignored() {
        let (registry, a, _) = two_sprites();
        let mut state = InteractionState::default();
        state.pointer_down_at(Vec3::ZERO, &registry, &NearestCenterPicker);
        let changed = state.pointer_down_at(Vec3::X, &registry, &NearestCenterPicker);
        assert_eq!(changed, None);
        assert_eq!(state.dragged(), Some(a));
    }

    #[test]
    fn sprite_removed_elsewhere_ends_drag_silently() {
        let (mut registry, a, _) = two_sprites();
        let mut state = InteractionState::default();
        state.pointer_down_at(Vec3::ZERO, &registry, &NearestCenterPicker);
        registry.remove(a).unwrap();

        assert_eq!(state.pointer_move_to(Vec3::ONE, &mut registry), None);
        assert_eq!(state.phase(), DragPhase::Idle);

        let changed = state.apply(
            CompositionCommand::ResizeUp,
            &mut registry,
            &CompositorSettings::default(),
        );
        assert_eq!(changed, Some(SelectionChanged::cleared()));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn deselect_notifies_and_clears() {
        let (registry, _, _) = two_sprites();
        let mut state = InteractionState::default();
        select(&mut state, &registry, Vec3::ZERO);
        let mut registry = registry;
        let changed = state.apply(
            CompositionCommand::Deselect,
            &mut registry,
            &CompositorSettings::default(),
        );
        assert_eq!(changed, Some(SelectionChanged::cleared()));
        assert_eq!(state.selected(), None);
        assert_eq!(registry.len(), 2);
    }
}
