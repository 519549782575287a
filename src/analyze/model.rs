use crate::analyze::Dimension;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

pub const SENIOR_THRESHOLD: f64 = 8.0;
pub const MID_THRESHOLD: f64 = 5.0;

/// Scores of all seven dimensions, in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DimensionScores(IndexMap<Dimension, f64>);

impl DimensionScores {
    /// Builds the score set by evaluating every dimension, so no key can be
    /// missing.
    pub fn from_fn(mut score: impl FnMut(Dimension) -> f64) -> Self {
        Self(
            Dimension::ALL
                .iter()
                .map(|dimension| (*dimension, score(*dimension)))
                .collect(),
        )
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.0[&dimension]
    }

    pub fn weighted(&self, dimension: Dimension) -> f64 {
        self.get(dimension) * dimension.weight()
    }

    /// Weighted sum of all dimensions rounded to two decimals.
    pub fn weighted_total(&self) -> f64 {
        let total: f64 = Dimension::ALL.iter().map(|d| self.weighted(*d)).sum();
        round2(total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        self.0.iter().map(|(dimension, score)| (*dimension, *score))
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Junior,
    Mid,
    Senior,
}

impl Level {
    pub fn from_total(total: f64) -> Self {
        if total >= SENIOR_THRESHOLD {
            Level::Senior
        } else if total >= MID_THRESHOLD {
            Level::Mid
        } else {
            Level::Junior
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Level::Junior => "junior",
            Level::Mid => "mid",
            Level::Senior => "senior",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Level::Junior => "🌱",
            Level::Mid => "⭐",
            Level::Senior => "🏆",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Level::Junior => "Junior engineer",
            Level::Mid => "Mid-level engineer",
            Level::Senior => "Senior engineer",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.badge(), self.title())
    }
}

/// Outcome of scoring one developer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub developer_id: String,
    pub username: String,
    pub total_score: f64,
    pub level: Level,
    pub dimension_scores: DimensionScores,
}

impl AnalysisResult {
    pub fn new(
        developer_id: impl ToString,
        username: impl ToString,
        dimension_scores: DimensionScores,
    ) -> Self {
        let total_score = dimension_scores.weighted_total();
        Self {
            developer_id: developer_id.to_string(),
            username: username.to_string(),
            total_score,
            level: Level::from_total(total_score),
            dimension_scores,
        }
    }
}

/// Rendered report for one developer. `result` is `None` when the commit
/// history was missing and no score was produced.
#[derive(Debug, Clone)]
pub struct DeveloperReport {
    pub developer_id: String,
    pub report: String,
    pub result: Option<AnalysisResult>,
}

impl DeveloperReport {
    pub fn scored(report: String, result: AnalysisResult) -> Self {
        Self {
            developer_id: result.developer_id.clone(),
            report,
            result: Some(result),
        }
    }

    pub fn insufficient(developer_id: impl ToString, report: String) -> Self {
        Self {
            developer_id: developer_id.to_string(),
            report,
            result: None,
        }
    }
}
