//! Scores developers from their exported activity tables and renders
//! Markdown skill reports.

pub mod analyze;
pub mod batch;
pub mod model;
pub mod report;
pub mod utils;
