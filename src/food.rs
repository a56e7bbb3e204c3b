use std::fmt;

use bevy::math::Vec2;
use bevy::log::info;
use thiserror::Error;

use crate::boundary::{WaterRect, is_inside_water};
use crate::config::*;

/// Unique identifier of a dropped shrimp, also used as its draw tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(pub u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shrimp_{}", self.0)
    }
}

/// A shrimp waiting in the water
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodItem {
    pub id: FoodId,
    pub position: Vec2,
    /// Tick on which the shrimp was accepted
    pub enqueued_at: u64,
}

/// Why a drop was refused
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FoodRejected {
    #[error("({x}, {y}) is outside the water")]
    OutsideWater { x: f32, y: f32 },
    #[error("queue already holds {capacity} shrimp")]
    AtCapacity { capacity: usize },
    #[error("{distance:.1}px from {existing}, closer than the minimum separation")]
    TooClose { existing: FoodId, distance: f32 },
}

/// Pending shrimp; hunting order is nearest-first, not first-in-first-out
#[derive(Debug, Clone)]
pub struct FoodQueue {
    items: Vec<FoodItem>,
    next_id: u64,
    capacity: usize,
    min_separation: f32,
}

impl Default for FoodQueue {
    fn default() -> Self {
        Self::new(FOOD_CAPACITY, FOOD_MIN_SEPARATION)
    }
}

impl FoodQueue {
    pub fn new(capacity: usize, min_separation: f32) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            next_id: 0,
            capacity,
            min_separation,
        }
    }

    /// Validates and queues a shrimp dropped at `position`.
    ///
    /// The position is checked once against `rect`; queued items are not
    /// re-validated if the region later changes.
    pub fn enqueue(
        &mut self,
        position: Vec2,
        rect: &WaterRect,
        tick: u64,
    ) -> Result<FoodId, FoodRejected> {
        if !is_inside_water(position.x, position.y, rect) {
            return Err(FoodRejected::OutsideWater {
                x: position.x,
                y: position.y,
            });
        }
        if self.items.len() >= self.capacity {
            return Err(FoodRejected::AtCapacity {
                capacity: self.capacity,
            });
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|item| item.position.distance(position) < self.min_separation)
        {
            return Err(FoodRejected::TooClose {
                existing: item.id,
                distance: item.position.distance(position),
            });
        }

        self.next_id += 1;
        let id = FoodId(self.next_id);
        self.items.push(FoodItem {
            id,
            position,
            enqueued_at: tick,
        });
        info!(
            "{id} dropped at ({:.0}, {:.0}); queue size {}",
            position.x,
            position.y,
            self.items.len()
        );
        Ok(id)
    }

    /// Queued shrimp closest to `from`; ties go to the oldest
    pub fn select_nearest(&self, from: Vec2) -> Option<FoodId> {
        self.items
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(from)
                    .total_cmp(&b.position.distance_squared(from))
            })
            .map(|item| item.id)
    }

    /// Removes an eaten shrimp; the caller credits the score
    pub fn complete(&mut self, id: FoodId) -> Option<FoodItem> {
        let item = self.remove(id)?;
        info!("Om nom nom! {id} eaten, {} remaining", self.items.len());
        Some(item)
    }

    /// Drops every queued shrimp, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    fn remove(&mut self, id: FoodId) -> Option<FoodItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: FoodId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoodItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
