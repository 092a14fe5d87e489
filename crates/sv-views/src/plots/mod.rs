//! Companion charts of the narrative page

pub mod colors;
pub mod efficiency;
pub mod heatmap;
pub mod hormone;

pub use efficiency::EfficiencyPlot;
pub use heatmap::HeatmapPlot;
pub use hormone::HormonePlot;
