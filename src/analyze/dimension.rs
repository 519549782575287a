use serde::Serialize;
use std::fmt;

/// One independently scored facet of developer activity.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Contribution,
    CommitQuality,
    TechBreadth,
    Collaboration,
    CodeReview,
    WorkPattern,
    ProgressTrend,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Contribution,
        Dimension::CommitQuality,
        Dimension::TechBreadth,
        Dimension::Collaboration,
        Dimension::CodeReview,
        Dimension::WorkPattern,
        Dimension::ProgressTrend,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Contribution => "contribution",
            Dimension::CommitQuality => "commit_quality",
            Dimension::TechBreadth => "tech_breadth",
            Dimension::Collaboration => "collaboration",
            Dimension::CodeReview => "code_review",
            Dimension::WorkPattern => "work_pattern",
            Dimension::ProgressTrend => "progress_trend",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Contribution => "Code contribution",
            Dimension::CommitQuality => "Commit quality",
            Dimension::TechBreadth => "Tech breadth",
            Dimension::Collaboration => "Collaboration",
            Dimension::CodeReview => "Code review",
            Dimension::WorkPattern => "Work pattern",
            Dimension::ProgressTrend => "Progress trend",
        }
    }

    /// Share of the total score. All weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Dimension::Contribution => 0.12,
            Dimension::CommitQuality => 0.23,
            Dimension::TechBreadth => 0.18,
            Dimension::Collaboration => 0.12,
            Dimension::CodeReview => 0.10,
            Dimension::WorkPattern => 0.10,
            Dimension::ProgressTrend => 0.15,
        }
    }

    pub fn weight_percent(&self) -> u32 {
        (self.weight() * 100.0).round() as u32
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
