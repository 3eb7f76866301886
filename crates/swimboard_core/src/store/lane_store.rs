//! Ordered swim lane list.
//!
//! # Invariants
//! - Lane ids are unique within the list.
//! - List order is board column order.

use crate::model::swim_lane::{LaneId, LanePatch, SwimLane};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered lane definitions. Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwimLaneStore {
    lanes: Vec<SwimLane>,
}

impl SwimLaneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from lanes, keeping the first lane for each id.
    pub fn from_lanes(lanes: impl IntoIterator<Item = SwimLane>) -> Self {
        let mut store = Self::new();
        for lane in lanes {
            store.insert(lane);
        }
        store
    }

    pub fn lanes(&self) -> &[SwimLane] {
        &self.lanes
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn lane(&self, id: &str) -> Option<&SwimLane> {
        self.lanes.iter().find(|lane| lane.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lane(id).is_some()
    }

    pub fn first(&self) -> Option<&SwimLane> {
        self.lanes.first()
    }

    pub fn ids(&self) -> Vec<LaneId> {
        self.lanes.iter().map(|lane| lane.id.clone()).collect()
    }

    /// Appends a lane. Returns `false` and changes nothing if the id exists.
    pub fn insert(&mut self, lane: SwimLane) -> bool {
        if self.contains(&lane.id) {
            return false;
        }
        self.lanes.push(lane);
        true
    }

    /// Merges `patch` into the lane with `id`.
    pub fn update(&mut self, id: &str, patch: LanePatch) -> Option<SwimLane> {
        let lane = self.lanes.iter_mut().find(|lane| lane.id == id)?;
        patch.apply(lane);
        Some(lane.clone())
    }

    /// Removes the lane with `id`, returning it.
    ///
    /// Does not refuse removing the last lane; callers own that rule.
    pub fn remove(&mut self, id: &str) -> Option<SwimLane> {
        let position = self.lanes.iter().position(|lane| lane.id == id)?;
        Some(self.lanes.remove(position))
    }

    /// Drops invalid lanes and repeated ids, keeping the first occurrence.
    ///
    /// Returns the dropped lanes. Used on lanes read back from storage,
    /// which bypass `insert`.
    pub fn reconcile(&mut self) -> Vec<SwimLane> {
        let mut seen = HashSet::with_capacity(self.lanes.len());
        let mut dropped = Vec::new();
        for lane in std::mem::take(&mut self.lanes) {
            if lane.validate().is_ok() && seen.insert(lane.id.clone()) {
                self.lanes.push(lane);
            } else {
                dropped.push(lane);
            }
        }
        dropped
    }

    /// Re-sorts lanes to follow `order`.
    ///
    /// Ids not present in the store are ignored, as are repeats. Lanes that
    /// `order` leaves out keep their relative order after the listed ones.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        let mut remaining = std::mem::take(&mut self.lanes);
        let mut placed = HashSet::with_capacity(remaining.len());
        let mut sorted = Vec::with_capacity(remaining.len());

        for id in order {
            let id = id.as_ref();
            if !placed.insert(id.to_string()) {
                continue;
            }
            if let Some(position) = remaining.iter().position(|lane| lane.id == id) {
                sorted.push(remaining.remove(position));
            }
        }
        sorted.append(&mut remaining);
        self.lanes = sorted;
    }
}
