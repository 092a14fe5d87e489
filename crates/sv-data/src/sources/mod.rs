//! CSV sources for the study datasets

pub mod actigraph;
pub mod sleep_log;
