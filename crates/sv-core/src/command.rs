//! Command vocabulary for the explorer
//!
//! Every mutation of explorer state goes through one of these commands,
//! whether it originates from a widget, a pointer event, or the tutorial
//! script. Tests drive the explorer the same way, with no UI simulation.

use crate::dimension::DimKey;
use crate::record::EfficiencyFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExplorerCommand {
    /// Add or remove a dimension from the active set. Removal that would
    /// leave fewer than two active dimensions is rejected silently.
    ToggleDimension { key: DimKey, active: bool },

    /// Replace the efficiency filter and rebuild the working set.
    ApplyFilter(EfficiencyFilter),

    /// Set the brush interval on one dimension, in that axis's normalized
    /// scale space (0 at the domain minimum, 1 at the maximum).
    MoveBrush { key: DimKey, lo: f32, hi: f32 },

    /// Remove the brush on one dimension.
    ClearBrush(DimKey),

    /// Remove every brush.
    ClearAllBrushes,

    /// Toggle single-selection of a user; `None` clears the selection
    /// (background click).
    SelectUser(Option<u32>),

    /// Advance the tutorial by one scripted step.
    AdvanceTutorial,
}
