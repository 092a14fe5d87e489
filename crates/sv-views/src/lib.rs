//! Views for the sleep study page
//!
//! The centerpiece is the parallel-coordinates explorer; the `plots` module
//! holds the companion charts of the narrative page.

pub mod explorer;
pub mod plots;

pub use explorer::{PcpExplorer, TutorialSequencer};
pub use plots::{EfficiencyPlot, HeatmapPlot, HormonePlot};
