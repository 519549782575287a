pub mod analyzer;
mod dimension;
mod model;
pub mod scorer;

pub use analyzer::{CodeBasedAnalyzer, UserAnalyzer};
pub use dimension::Dimension;
pub use model::{
    round2, AnalysisResult, DeveloperReport, DimensionScores, Level, MID_THRESHOLD,
    SENIOR_THRESHOLD,
};
