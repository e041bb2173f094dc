//! Ordered sprite storage.
//!
//! The registry is an arena of sprites kept in paint order plus an id-keyed
//! index into it. Interaction code only ever refers to sprites by
//! [`SpriteId`], never by rendered entity.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::error::CompositorError;
use crate::types::{DepthPolicy, ImageRef, Sprite, SpriteId};

/// Ordered collection of sprites. Index 0 is painted first.
///
/// Invariants: ids are unique, removal keeps the relative order of the
/// remaining sprites, and swapping adjacent entries is the only way to
/// reorder.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpriteRegistry {
    sprites: Vec<Sprite>,
    index: HashMap<SpriteId, usize>,
    next_id: u64,
}

impl SpriteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and appends a unit-scale sprite on top of the
    /// paint order.
    ///
    /// Fails with [`CompositorError::IdsExhausted`] once the allocator has
    /// reached [`SpriteId::MAX`], which is never handed out.
    pub fn spawn(&mut self, image: ImageRef, position: Vec3) -> Result<SpriteId, CompositorError> {
        let id = SpriteId(self.next_id);
        if id >= SpriteId::MAX {
            return Err(CompositorError::IdsExhausted);
        }
        self.next_id += 1;
        self.push(Sprite::new(id, image, position));
        Ok(id)
    }

    /// Appends `sprite` on top of the paint order.
    ///
    /// [`SpriteId::MAX`] is reserved and rejected with
    /// [`CompositorError::IdsExhausted`].
    pub fn add(&mut self, sprite: Sprite) -> Result<(), CompositorError> {
        if sprite.id >= SpriteId::MAX {
            return Err(CompositorError::IdsExhausted);
        }
        if self.index.contains_key(&sprite.id) {
            return Err(CompositorError::DuplicateId(sprite.id));
        }
        // Keep spawned ids from colliding with externally chosen ones.
        self.next_id = self.next_id.max(sprite.id.0 + 1);
        self.push(sprite);
        Ok(())
    }

    fn push(&mut self, sprite: Sprite) {
        self.index.insert(sprite.id, self.sprites.len());
        self.sprites.push(sprite);
    }

    /// Spawns one sprite per image, spread `spacing` apart along `axis` so
    /// that no two start at the same position.
    ///
    /// Stops at the first allocation failure; sprites spawned before it stay.
    pub fn seed(
        &mut self,
        images: impl IntoIterator<Item = ImageRef>,
        spacing: f32,
        axis: Vec3,
    ) -> Result<Vec<SpriteId>, CompositorError> {
        images
            .into_iter()
            .enumerate()
            .map(|(i, image)| self.spawn(image, axis * (i as f32 * spacing)))
            .collect()
    }

    /// Deletes a sprite, returning it.
    pub fn remove(&mut self, id: SpriteId) -> Result<Sprite, CompositorError> {
        let idx = self.index_of(id)?;
        let sprite = self.sprites.remove(idx);
        self.index.remove(&id);
        for (i, shifted) in self.sprites.iter().enumerate().skip(idx) {
            self.index.insert(shifted.id, i);
        }
        Ok(sprite)
    }

    /// Moves a sprite. With [`DepthPolicy::Preserve`] the current Z is kept.
    pub fn update_position(
        &mut self,
        id: SpriteId,
        position: Vec3,
        depth: DepthPolicy,
    ) -> Result<(), CompositorError> {
        let idx = self.index_of(id)?;
        let sprite = &mut self.sprites[idx];
        sprite.position = match depth {
            DepthPolicy::Preserve => position.truncate().extend(sprite.position.z),
            DepthPolicy::Overwrite => position,
        };
        Ok(())
    }

    /// Multiplies every scale component by `factor` and returns the new scale.
    ///
    /// Repeated calls compound. There is no floor or ceiling.
    pub fn update_scale(&mut self, id: SpriteId, factor: f32) -> Result<Vec3, CompositorError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CompositorError::InvalidScaleFactor(factor));
        }
        let idx = self.index_of(id)?;
        let sprite = &mut self.sprites[idx];
        sprite.scale *= factor;
        Ok(sprite.scale)
    }

    /// Swaps a sprite with the one painted just before it.
    ///
    /// Returns `Ok(false)` when the sprite is already first.
    pub fn swap_with_previous(&mut self, id: SpriteId) -> Result<bool, CompositorError> {
        let idx = self.index_of(id)?;
        if idx == 0 {
            return Ok(false);
        }
        self.swap(idx, idx - 1);
        Ok(true)
    }

    /// Swaps a sprite with the one painted just after it.
    ///
    /// Returns `Ok(false)` when the sprite is already last.
    pub fn swap_with_next(&mut self, id: SpriteId) -> Result<bool, CompositorError> {
        let idx = self.index_of(id)?;
        if idx + 1 >= self.sprites.len() {
            return Ok(false);
        }
        self.swap(idx, idx + 1);
        Ok(true)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.sprites.swap(a, b);
        self.index.insert(self.sprites[a].id, a);
        self.index.insert(self.sprites[b].id, b);
    }

    /// The sprite whose position is closest to `point`.
    ///
    /// Ties go to the sprite painted first. This is a nearest-center test, not
    /// a hit test against the sprite's bounds.
    pub fn find_nearest(&self, point: Vec3) -> Option<&Sprite> {
        let mut best: Option<(&Sprite, f32)> = None;
        for sprite in &self.sprites {
            let d = sprite.position.distance_squared(point);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((sprite, d)),
            }
        }
        best.map(|(sprite, _)| sprite)
    }

    /// Paint-order index of a sprite.
    pub fn index_of(&self, id: SpriteId) -> Result<usize, CompositorError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(CompositorError::NotFound(id))
    }

    /// Looks up a sprite by id.
    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.index.get(&id).map(|&idx| &self.sprites[idx])
    }

    /// Whether a sprite with this id is registered.
    pub fn contains(&self, id: SpriteId) -> bool {
        self.index.contains_key(&id)
    }

    /// Sprites in paint order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sprite> {
        self.sprites.iter()
    }

    /// Ids in paint order.
    pub fn ids(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.sprites.iter().map(|s| s.id)
    }

    /// Number of sprites.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether the registry holds no sprites.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Drops every sprite. Ids already handed out stay retired.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.index.clear();
    }
}
