//! Core model for the sleep study explorer
//!
//! This crate provides the participant record model, the fixed dimension
//! catalog of the parallel-coordinates explorer, and the command vocabulary
//! through which all explorer state is mutated.

pub mod command;
pub mod dimension;
pub mod record;
pub mod settings;

pub use command::ExplorerCommand;
pub use dimension::DimKey;
pub use record::{ActivityTier, EfficiencyFilter, UserRecord};
pub use settings::AppSettings;
