//! Brush coordinator
//!
//! One interval brush per active dimension, keyed by dimension so that
//! toggling unrelated dimensions leaves a brush untouched. Whenever any
//! brush moves, every polyline is re-classified against all active brushes;
//! brushes compose as a logical AND across dimensions.

use ahash::AHashMap;
use sv_core::{DimKey, UserRecord};

use super::layout::Layout;

/// Visual classification of one polyline under the current brushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// No brushes active anywhere: plain tier coloring, no dimming.
    Neutral,
    /// Satisfies every active brush.
    Active,
    /// Fails at least one active brush; rendered subdued, never removed.
    Inactive,
}

/// The set of active brushes, in each axis's normalized scale space.
#[derive(Debug, Clone, Default)]
pub struct BrushSet {
    intervals: AHashMap<DimKey, (f32, f32)>,
}

impl BrushSet {
    /// Set the brush on one dimension. Endpoint order does not matter.
    pub fn set(&mut self, key: DimKey, a: f32, b: f32) {
        self.intervals.insert(key, (a.min(b), a.max(b)));
    }

    pub fn clear(&mut self, key: DimKey) {
        self.intervals.remove(&key);
    }

    pub fn clear_all(&mut self) {
        self.intervals.clear();
    }

    pub fn get(&self, key: DimKey) -> Option<(f32, f32)> {
        self.intervals.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Drop brushes whose dimension is no longer active. A dropped brush is
    /// not restored when its dimension is re-added later.
    pub fn retain_active(&mut self, active: &[DimKey]) {
        self.intervals.retain(|key, _| active.contains(key));
    }
}

/// Classify one record against all active brushes.
///
/// A missing or non-finite value on a brushed dimension fails that brush:
/// missing data never satisfies a user-specified constraint.
pub fn classify(record: &UserRecord, layout: &Layout, brushes: &BrushSet) -> LineState {
    if brushes.is_empty() {
        return LineState::Neutral;
    }

    for axis in &layout.axes {
        let Some((lo, hi)) = brushes.get(axis.key) else {
            continue;
        };
        let Some(value) = axis.key.value(record) else {
            return LineState::Inactive;
        };
        let t = axis.scale.t(value);
        if t < lo || t > hi {
            return LineState::Inactive;
        }
    }
    LineState::Active
}
