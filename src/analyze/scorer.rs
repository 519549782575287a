//! Dimension scorers.
//!
//! Every scorer is a pure function of an [`ActivityDataset`] and returns a
//! value in `[0, 10]`. A scorer whose input table is empty returns
//! [`NEUTRAL_SCORE`]; malformed timestamps fall back to the scorer's own
//! documented default instead of failing the analysis.

use crate::analyze::{Dimension, DimensionScores};
use crate::model::{
    parse_timestamp, ActivityDataset, CodeChangeRecord, CommitRecord, TimestampError,
    UserEventRecord,
};
use chrono::{Datelike, Timelike};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

pub const NEUTRAL_SCORE: f64 = 5.0;
/// Benefit-of-doubt score when the history cannot be split into two periods.
pub const TREND_INSUFFICIENT_SCORE: f64 = 7.0;

pub const SMALL_CHANGE_LINES: u64 = 100;
pub const WORK_HOURS: std::ops::RangeInclusive<u32> = 9..=18;
pub const IGNORED_EXTENSIONS: [&str; 7] = ["", ".md", ".txt", ".json", ".yml", ".yaml", ".xml"];

const COLLABORATION_BASE: f64 = 7.0;
const WORK_PATTERN_BONUS: f64 = 2.5;

static CONVENTIONAL_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(feat|fix|docs|refactor|test|chore|style|perf)(\(.+\))?:").unwrap()
});
static FIX_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(fix|bug|hotfix|revert)").unwrap());

pub fn is_conventional(title: &str) -> bool {
    CONVENTIONAL_TITLE.is_match(title)
}

pub fn is_fix(title: &str) -> bool {
    FIX_TITLE.is_match(title)
}

pub fn score_all(dataset: &ActivityDataset) -> DimensionScores {
    DimensionScores::from_fn(|dimension| score(dataset, dimension))
}

pub fn score(dataset: &ActivityDataset, dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Contribution => contribution(dataset),
        Dimension::CommitQuality => commit_quality(dataset),
        Dimension::TechBreadth => tech_breadth(dataset),
        Dimension::Collaboration => collaboration(dataset),
        Dimension::CodeReview => code_review(dataset),
        Dimension::WorkPattern => work_pattern(dataset),
        Dimension::ProgressTrend => progress_trend(dataset),
    }
}

// Contribution

pub fn contribution(dataset: &ActivityDataset) -> f64 {
    let Some(statistics) = dataset.statistics() else {
        return NEUTRAL_SCORE;
    };
    match statistics.total_commits {
        200.. => 10.0,
        100.. => 8.0,
        50.. => 6.0,
        _ => 4.0,
    }
}

// Commit quality

/// Title and size counters over a set of commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitMetrics {
    pub rows: usize,
    pub conventional: usize,
    pub small: usize,
    pub fix: usize,
    pub merge: usize,
    pub revert: usize,
}

impl CommitMetrics {
    pub fn from_commits<'a>(commits: impl IntoIterator<Item = &'a CommitRecord>) -> Self {
        commits.into_iter().fold(Self::default(), |mut acc, commit| {
            let title = commit.title.to_lowercase();
            acc.rows += 1;
            acc.conventional += is_conventional(&commit.title) as usize;
            acc.small += (commit.total_changes() <= SMALL_CHANGE_LINES) as usize;
            acc.fix += is_fix(&commit.title) as usize;
            acc.merge += title.contains("merge") as usize;
            acc.revert += title.contains("revert") as usize;
            acc
        })
    }

    pub fn ratio(&self, count: usize) -> f64 {
        ratio(count, self.rows)
    }

    pub fn conventional_ratio(&self) -> f64 {
        self.ratio(self.conventional)
    }

    pub fn small_ratio(&self) -> f64 {
        self.ratio(self.small)
    }

    pub fn fix_ratio(&self) -> f64 {
        self.ratio(self.fix)
    }

    pub fn merge_ratio(&self) -> f64 {
        self.ratio(self.merge)
    }

    pub fn revert_ratio(&self) -> f64 {
        self.ratio(self.revert)
    }
}

pub fn message_score(metrics: &CommitMetrics) -> f64 {
    if metrics.rows == 0 {
        return NEUTRAL_SCORE;
    }
    match metrics.conventional_ratio() {
        r if r >= 0.8 => 10.0,
        r if r >= 0.6 => 8.0,
        r if r >= 0.4 => 6.0,
        _ => 4.0,
    }
}

pub fn granularity_score(metrics: &CommitMetrics) -> f64 {
    if metrics.rows == 0 {
        return NEUTRAL_SCORE;
    }
    match metrics.small_ratio() {
        r if r >= 0.6 => 10.0,
        r if r >= 0.4 => 7.0,
        _ => 5.0,
    }
}

/// Fewer fix-style commits score higher.
pub fn fix_ratio_score(metrics: &CommitMetrics) -> f64 {
    if metrics.rows == 0 {
        return NEUTRAL_SCORE;
    }
    match metrics.fix_ratio() {
        r if r < 0.15 => 10.0,
        r if r < 0.30 => 7.0,
        _ => 4.0,
    }
}

pub fn commit_quality(dataset: &ActivityDataset) -> f64 {
    if dataset.commits.is_empty() {
        return NEUTRAL_SCORE;
    }
    let metrics = CommitMetrics::from_commits(&dataset.commits);
    message_score(&metrics) * 0.4
        + granularity_score(&metrics) * 0.4
        + fix_ratio_score(&metrics) * 0.2
}

// Tech breadth

/// Source file extensions with their file counts, most frequent first.
pub fn extension_counts(changes: &[CodeChangeRecord]) -> Vec<(String, usize)> {
    changes
        .iter()
        .map(CodeChangeRecord::extension)
        .filter(|ext| !IGNORED_EXTENSIONS.contains(&ext.as_str()))
        .counts()
        .into_iter()
        .sorted_by(|(a_ext, a_count), (b_ext, b_count)| {
            b_count.cmp(a_count).then_with(|| a_ext.cmp(b_ext))
        })
        .collect()
}

pub fn tech_breadth(dataset: &ActivityDataset) -> f64 {
    if dataset.code_changes.is_empty() {
        return NEUTRAL_SCORE;
    }
    match extension_counts(&dataset.code_changes).len() {
        5.. => 10.0,
        3.. => 8.0,
        1.. => 6.0,
        _ => 4.0,
    }
}

// Collaboration

pub fn collaboration(dataset: &ActivityDataset) -> f64 {
    if dataset.commits.is_empty() {
        return NEUTRAL_SCORE;
    }
    let metrics = CommitMetrics::from_commits(&dataset.commits);
    let mut score = COLLABORATION_BASE;

    let merge_ratio = metrics.merge_ratio();
    if merge_ratio > 0.1 {
        score += 2.0;
    } else if merge_ratio > 0.05 {
        score += 1.0;
    }

    let revert_ratio = metrics.revert_ratio();
    if revert_ratio > 0.05 {
        score -= 3.0;
    } else if revert_ratio > 0.02 {
        score -= 1.0;
    }

    score.clamp(1.0, 10.0)
}

// Code review

pub fn code_review(dataset: &ActivityDataset) -> f64 {
    match dataset.code_reviews.len() {
        20.. => 9.0,
        10.. => 7.0,
        5.. => 6.0,
        _ => NEUTRAL_SCORE,
    }
}

// Work pattern

/// How much of the recorded activity falls into office hours and weekdays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventMetrics {
    pub rows: usize,
    pub work_hours: usize,
    pub work_days: usize,
}

impl EventMetrics {
    /// Blank timestamps count as events that match neither window; any
    /// unparseable timestamp fails the whole set.
    pub fn from_events(events: &[UserEventRecord]) -> Result<Self, TimestampError> {
        let mut metrics = Self {
            rows: events.len(),
            ..Default::default()
        };
        for event in events {
            let Some(created_at) = parse_timestamp(&event.created_at)? else {
                continue;
            };
            if WORK_HOURS.contains(&created_at.hour()) {
                metrics.work_hours += 1;
            }
            if created_at.weekday().num_days_from_monday() <= 4 {
                metrics.work_days += 1;
            }
        }
        Ok(metrics)
    }

    pub fn work_hours_ratio(&self) -> f64 {
        ratio(self.work_hours, self.rows)
    }

    pub fn work_days_ratio(&self) -> f64 {
        ratio(self.work_days, self.rows)
    }
}

pub fn work_pattern(dataset: &ActivityDataset) -> f64 {
    if dataset.user_events.is_empty() {
        return NEUTRAL_SCORE;
    }
    let Ok(metrics) = EventMetrics::from_events(&dataset.user_events) else {
        return NEUTRAL_SCORE;
    };
    let mut score = NEUTRAL_SCORE;
    if metrics.work_hours_ratio() >= 0.6 {
        score += WORK_PATTERN_BONUS;
    }
    if metrics.work_days_ratio() >= 0.7 {
        score += WORK_PATTERN_BONUS;
    }
    score.min(10.0)
}

// Progress trend

/// Commits split at the median commit date.
#[derive(Debug, Clone, Default)]
pub struct TrendWindows<'a> {
    pub early: Vec<&'a CommitRecord>,
    pub recent: Vec<&'a CommitRecord>,
}

impl TrendWindows<'_> {
    pub fn is_splittable(&self) -> bool {
        !self.early.is_empty() && !self.recent.is_empty()
    }

    /// Conventional-message score of the recent window minus the early one.
    pub fn improvement(&self) -> f64 {
        message_score(&CommitMetrics::from_commits(self.recent.iter().copied()))
            - message_score(&CommitMetrics::from_commits(self.early.iter().copied()))
    }
}

/// Splits commits into `date <= median` and `date > median`. Commits without
/// a date belong to neither window.
pub fn trend_windows(commits: &[CommitRecord]) -> Result<TrendWindows<'_>, TimestampError> {
    let mut dated = Vec::with_capacity(commits.len());
    for commit in commits {
        if let Some(committed_at) = parse_timestamp(&commit.committed_date)? {
            dated.push((committed_at.timestamp_micros() as i128, commit));
        }
    }
    if dated.is_empty() {
        return Ok(TrendWindows::default());
    }
    dated.sort_by_key(|(micros, _)| *micros);

    // Twice the median keeps the even-count midpoint exact.
    let middle = dated.len() / 2;
    let double_median = if dated.len() % 2 == 1 {
        dated[middle].0 * 2
    } else {
        dated[middle - 1].0 + dated[middle].0
    };

    let (early, recent): (Vec<_>, Vec<_>) = dated
        .into_iter()
        .partition(|(micros, _)| micros * 2 <= double_median);
    Ok(TrendWindows {
        early: early.into_iter().map(|(_, commit)| commit).collect(),
        recent: recent.into_iter().map(|(_, commit)| commit).collect(),
    })
}

pub fn progress_trend(dataset: &ActivityDataset) -> f64 {
    if dataset.commits.is_empty() {
        return NEUTRAL_SCORE;
    }
    let Ok(windows) = trend_windows(&dataset.commits) else {
        return TREND_INSUFFICIENT_SCORE;
    };
    if !windows.is_splittable() {
        return TREND_INSUFFICIENT_SCORE;
    }
    improvement_score(windows.improvement())
}

/// Maps the message-score change between the two windows to a trend score.
pub fn improvement_score(improvement: f64) -> f64 {
    match improvement {
        i if i >= 2.0 => 10.0,
        i if i >= 1.0 => 8.5,
        i if i >= 0.0 => 7.0,
        _ => 5.0,
    }
}

fn ratio(count: usize, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        count as f64 / rows as f64
    }
}
