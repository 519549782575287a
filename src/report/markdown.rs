use crate::analyze::scorer::{self, CommitMetrics, EventMetrics};
use crate::analyze::{AnalysisResult, Dimension};
use crate::model::{ActivityDataset, Result, TableKind};
use crate::report::{
    group_digits, heading, numeric_heading, percent, render_table, MarkdownExt, MarkdownReport,
    ReportContext,
};
use markdown_builder::Markdown;

const TOP_EXTENSIONS: usize = 10;

/// Suggestions keyed by the dimension and the score below which they apply.
const SUGGESTIONS: [(Dimension, f64, &str); 4] = [
    (
        Dimension::CommitQuality,
        7.0,
        "🎯 **Improve commit quality**: adopt the Conventional Commits format and split large changes",
    ),
    (
        Dimension::TechBreadth,
        6.0,
        "🎯 **Broaden the tech stack**: pick up new technologies and contribute to different kinds of projects",
    ),
    (
        Dimension::CodeReview,
        7.0,
        "🎯 **Review more code**: review teammates' changes regularly to raise overall quality",
    ),
    (
        Dimension::Collaboration,
        6.0,
        "🎯 **Collaborate through branches**: work on feature branches instead of committing straight to main",
    ),
];
const KEEP_IT_UP: &str = "✅ **Keep it up**: keep delivering high-quality contributions";

/// A scored developer together with the data the score came from.
pub struct DeveloperAnalysis<'a> {
    pub dataset: &'a ActivityDataset,
    pub result: &'a AnalysisResult,
}

impl<'a> DeveloperAnalysis<'a> {
    pub fn new(dataset: &'a ActivityDataset, result: &'a AnalysisResult) -> Self {
        Self { dataset, result }
    }
}

impl MarkdownReport for DeveloperAnalysis<'_> {
    fn to_markdown(&self, context: &ReportContext) -> Result<String> {
        let mut doc = Markdown::new();
        doc.header1(format!("{} Developer Skill Report", self.result.username));
        doc.block(header_block(context));

        doc.header2("📊 Overall Assessment");
        doc.block(overall_table(self.dataset, self.result)?);

        doc.header2("🎯 Dimension Scores");
        doc.block(dimension_table(self.result)?);

        doc.header2("📝 Detailed Analysis");
        for (index, dimension) in Dimension::ALL.iter().enumerate() {
            doc.header3(format!(
                "{}. {} ({:.2}/10)",
                index + 1,
                dimension.title(),
                self.result.dimension_scores.get(*dimension),
            ));
            doc.block(dimension_details(self.dataset, *dimension));
        }

        doc.header2("💡 Improvement Suggestions");
        doc.block(suggestions(self.result).join("\n"));

        doc.block(format!(
            "---\n\n**Scoring reference:** {}",
            context.scoring_reference
        ));
        Ok(doc.render())
    }
}

/// Report body for a developer without commit history.
pub struct InsufficientData<'a> {
    pub dataset: &'a ActivityDataset,
}

impl<'a> InsufficientData<'a> {
    pub fn new(dataset: &'a ActivityDataset) -> Self {
        Self { dataset }
    }
}

impl MarkdownReport for InsufficientData<'_> {
    fn to_markdown(&self, context: &ReportContext) -> Result<String> {
        let mut doc = Markdown::new();
        doc.header1(format!("{} Developer Skill Report", self.dataset.username()));
        doc.block(header_block(context));
        doc.block(format!(
            "⚠️ **Insufficient data**: `{}` is missing or empty, so no score was produced.",
            TableKind::Commits.file_name()
        ));
        Ok(doc.render())
    }
}

fn header_block(context: &ReportContext) -> String {
    format!(
        "**Generated:** {}  \n**Method:** {}\n\n---",
        context.timestamp(),
        context.method
    )
}

/// Commit and line totals, from the statistics row when exported, otherwise
/// summed over the commit table.
pub fn activity_totals(dataset: &ActivityDataset) -> (u64, u64, u64) {
    match dataset.statistics() {
        Some(stats) => (stats.total_commits, stats.total_additions, stats.total_deletions),
        None => dataset.commits.iter().fold(
            (0u64, 0u64, 0u64),
            |(commits, additions, deletions), commit| {
                (
                    commits + 1,
                    additions.saturating_add(commit.additions),
                    deletions.saturating_add(commit.deletions),
                )
            },
        ),
    }
}

fn overall_table(dataset: &ActivityDataset, result: &AnalysisResult) -> Result<String> {
    let (commits, additions, deletions) = activity_totals(dataset);
    let rows = vec![
        vec![
            "**Total score**".to_string(),
            format!("**{:.2} / 10**", result.total_score),
        ],
        vec!["**Level**".to_string(), format!("**{}**", result.level)],
        vec!["Total commits".to_string(), group_digits(commits)],
        vec!["Lines added".to_string(), group_digits(additions)],
        vec!["Lines deleted".to_string(), group_digits(deletions)],
    ];
    render_table(vec![heading("Item"), numeric_heading("Value")], rows)
}

fn dimension_table(result: &AnalysisResult) -> Result<String> {
    let rows = result
        .dimension_scores
        .iter()
        .map(|(dimension, score)| {
            vec![
                dimension.title().to_string(),
                format!("{score:.2} / 10"),
                format!("{}%", dimension.weight_percent()),
                format!("{:.2}", result.dimension_scores.weighted(dimension)),
            ]
        })
        .collect::<Vec<_>>();
    render_table(
        vec![
            heading("Dimension"),
            numeric_heading("Score"),
            numeric_heading("Weight"),
            numeric_heading("Weighted"),
        ],
        rows,
    )
}

pub fn dimension_details(dataset: &ActivityDataset, dimension: Dimension) -> String {
    match dimension {
        Dimension::Contribution => contribution_details(dataset),
        Dimension::CommitQuality => commit_quality_details(dataset),
        Dimension::TechBreadth => tech_breadth_details(dataset),
        Dimension::Collaboration => collaboration_details(dataset),
        Dimension::CodeReview => code_review_details(dataset),
        Dimension::WorkPattern => work_pattern_details(dataset),
        Dimension::ProgressTrend => progress_trend_details(dataset),
    }
}

fn contribution_details(dataset: &ActivityDataset) -> String {
    let Some(stats) = dataset.statistics() else {
        return "⚠️ No statistics exported".to_string();
    };
    let tier = match stats.total_commits {
        200.. => "✅ highly active",
        100.. => "⭐ steady contributor",
        50.. => "📚 moderate participation",
        _ => "🌱 low participation",
    };
    let assessment = if stats.total_commits >= 100 {
        "active developer with steady contributions"
    } else {
        "consider contributing more frequently"
    };
    format!(
        "- Total commits: **{}** ({tier})\n- Assessment: {assessment}",
        stats.total_commits
    )
}

fn commit_quality_details(dataset: &ActivityDataset) -> String {
    if dataset.commits.is_empty() {
        return "⚠️ No commit data".to_string();
    }
    let metrics = CommitMetrics::from_commits(&dataset.commits);
    let verdict = |good: bool, ok: &'static str, bad: &'static str| if good { ok } else { bad };
    format!(
        "#### A. Message conformance\n\
         - Conventional Commits: **{}** ({}/{})\n\
         - Assessment: {}\n\n\
         #### B. Change granularity\n\
         - Small changes (≤{} lines): **{}** ({}/{})\n\
         - Assessment: {}\n\n\
         #### C. Fix commits\n\
         - Fix ratio: **{}** ({}/{})\n\
         - Assessment: {}",
        percent(metrics.conventional_ratio()),
        metrics.conventional,
        metrics.rows,
        verdict(metrics.conventional_ratio() >= 0.8, "✅ excellent", "⚠️ needs improvement"),
        scorer::SMALL_CHANGE_LINES,
        percent(metrics.small_ratio()),
        metrics.small,
        metrics.rows,
        verdict(
            metrics.small_ratio() >= 0.6,
            "✅ good modular thinking",
            "⚠️ consider splitting large changes"
        ),
        percent(metrics.fix_ratio()),
        metrics.fix,
        metrics.rows,
        verdict(
            metrics.fix_ratio() < 0.15,
            "✅ high code quality",
            "⚠️ consider strengthening tests"
        ),
    )
}

fn tech_breadth_details(dataset: &ActivityDataset) -> String {
    if dataset.code_changes.is_empty() {
        return "⚠️ No code change data".to_string();
    }
    let extensions = scorer::extension_counts(&dataset.code_changes);
    let mut details = format!("- File types involved: **{}**\n\n", extensions.len());
    details.push_str("**Main stack:**\n");
    for (extension, count) in extensions.iter().take(TOP_EXTENSIONS) {
        details.push_str(&format!("  - `{extension}`: {count} files\n"));
    }
    details
}

fn collaboration_details(dataset: &ActivityDataset) -> String {
    if dataset.commits.is_empty() {
        return "⚠️ No commit data".to_string();
    }
    let metrics = CommitMetrics::from_commits(&dataset.commits);
    let assessment = if metrics.merge_ratio() > 0.05 && metrics.revert_ratio() < 0.02 {
        "✅ healthy collaboration"
    } else {
        "consider more branch-based collaboration"
    };
    format!(
        "- Merge commits: **{}** ({})\n- Revert rate: **{}**\n- Assessment: {assessment}",
        metrics.merge,
        percent(metrics.merge_ratio()),
        percent(metrics.revert_ratio()),
    )
}

fn code_review_details(dataset: &ActivityDataset) -> String {
    let reviews = dataset.code_reviews.len();
    if reviews == 0 {
        return "⚠️ No code review data\n\nSuggestion: take part in code reviews to raise team code quality"
            .to_string();
    }
    let assessment = if reviews >= 20 {
        "✅ actively involved"
    } else {
        "⚠️ consider reviewing more often"
    };
    format!("- Review participation: **{reviews}**\n- Assessment: {assessment}")
}

fn work_pattern_details(dataset: &ActivityDataset) -> String {
    if dataset.user_events.is_empty() {
        return "⚠️ No activity data".to_string();
    }
    let Ok(metrics) = EventMetrics::from_events(&dataset.user_events) else {
        return "⚠️ Activity timestamps could not be parsed".to_string();
    };
    let assessment = if metrics.work_hours_ratio() >= 0.6 && metrics.work_days_ratio() >= 0.7 {
        "✅ regular working rhythm"
    } else {
        "⚠️ consider rebalancing working hours"
    };
    format!(
        "- Activity in working hours: **{}**\n- Activity on weekdays: **{}**\n- Assessment: {assessment}",
        percent(metrics.work_hours_ratio()),
        percent(metrics.work_days_ratio()),
    )
}

fn progress_trend_details(dataset: &ActivityDataset) -> String {
    let Ok(windows) = scorer::trend_windows(&dataset.commits) else {
        return "⚠️ Commit dates could not be parsed".to_string();
    };
    if !windows.is_splittable() {
        return "- Not enough dated history to compare an early and a recent period".to_string();
    }
    let early = CommitMetrics::from_commits(windows.early.iter().copied());
    let recent = CommitMetrics::from_commits(windows.recent.iter().copied());
    format!(
        "- Early period: **{}** conventional ({} commits)\n\
         - Recent period: **{}** conventional ({} commits)\n\
         - Message score change: **{:+.1}**",
        percent(early.conventional_ratio()),
        early.rows,
        percent(recent.conventional_ratio()),
        recent.rows,
        windows.improvement(),
    )
}

pub fn suggestions(result: &AnalysisResult) -> Vec<&'static str> {
    let triggered = SUGGESTIONS
        .iter()
        .filter(|(dimension, threshold, _)| result.dimension_scores.get(*dimension) < *threshold)
        .map(|(_, _, text)| *text)
        .collect::<Vec<_>>();
    if triggered.is_empty() {
        vec![KEEP_IT_UP]
    } else {
        triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::DimensionScores;
    use crate::model::{CodeChangeRecord, CommitRecord, StatisticsRecord, UserEventRecord};

    fn result_with(score: impl Fn(Dimension) -> f64) -> AnalysisResult {
        AnalysisResult::new("dev", "dev", DimensionScores::from_fn(score))
    }

    fn dataset() -> ActivityDataset {
        ActivityDataset {
            commits: vec![
                CommitRecord {
                    title: "feat: add parser".to_string(),
                    additions: 40,
                    deletions: 2,
                    ..Default::default()
                },
                CommitRecord {
                    title: "Merge branch 'dev'".to_string(),
                    additions: 900,
                    deletions: 300,
                    ..Default::default()
                },
            ],
            code_changes: vec![
                CodeChangeRecord {
                    file_path: "src/parser.rs".to_string(),
                    ..Default::default()
                },
                CodeChangeRecord {
                    file_path: "web/index.ts".to_string(),
                    ..Default::default()
                },
            ],
            ..ActivityDataset::new("dev")
        }
    }

    #[test]
    fn test_suggestions_follow_thresholds() {
        let weak = result_with(|_| 5.0);
        assert_eq!(suggestions(&weak).len(), 4);

        let strong = result_with(|_| 9.0);
        assert_eq!(suggestions(&strong), vec![KEEP_IT_UP]);

        let only_breadth = result_with(|d| if d == Dimension::TechBreadth { 5.9 } else { 7.0 });
        let triggered = suggestions(&only_breadth);
        assert_eq!(triggered.len(), 1);
        assert!(triggered[0].contains("tech stack"));
    }

    #[test]
    fn test_activity_totals_fall_back_to_commits() {
        let mut data = dataset();
        assert_eq!(activity_totals(&data), (2, 940, 302));
        data.statistics.push(StatisticsRecord {
            total_commits: 321,
            total_additions: 12000,
            total_deletions: 3400,
            ..Default::default()
        });
        assert_eq!(activity_totals(&data), (321, 12000, 3400));
    }

    #[test]
    fn test_commit_quality_details_report_percentages() {
        let details = dimension_details(&dataset(), Dimension::CommitQuality);
        assert!(details.contains("**50.0%** (1/2)"));
        assert!(details.contains("Fix ratio: **0.0%** (0/2)"));
    }

    #[test]
    fn test_tech_breadth_details_list_extensions() {
        let details = dimension_details(&dataset(), Dimension::TechBreadth);
        assert!(details.contains("File types involved: **2**"));
        assert!(details.contains("`.rs`: 1 files"));
        assert!(details.contains("`.ts`: 1 files"));
    }

    #[test]
    fn test_work_pattern_details_handle_bad_timestamps() {
        let data = ActivityDataset {
            user_events: vec![UserEventRecord {
                created_at: "soon".to_string(),
                ..Default::default()
            }],
            ..ActivityDataset::new("dev")
        };
        assert_eq!(
            dimension_details(&data, Dimension::WorkPattern),
            "⚠️ Activity timestamps could not be parsed"
        );
        assert_eq!(
            dimension_details(&ActivityDataset::new("dev"), Dimension::CodeReview)
                .lines()
                .next(),
            Some("⚠️ No code review data")
        );
    }

    #[test]
    fn test_report_contains_all_sections() {
        let data = dataset();
        let result = AnalysisResult::new("dev", "dev", crate::analyze::scorer::score_all(&data));
        let context = ReportContext::new("Code-based analysis", None);
        let report = DeveloperAnalysis::new(&data, &result)
            .to_markdown(&context)
            .unwrap();

        for section in [
            "Developer Skill Report",
            "Overall Assessment",
            "Dimension Scores",
            "Detailed Analysis",
            "Improvement Suggestions",
            "Code-based analysis",
            "built-in weights",
        ] {
            assert!(report.contains(section), "missing `{section}`");
        }
        for dimension in Dimension::ALL {
            assert!(report.contains(dimension.title()));
        }
        assert!(report.contains(&format!("{:.2}", result.total_score)));
    }

    /// Runs of consecutive table lines.
    fn tables(markdown: &str) -> Vec<Vec<&str>> {
        let mut tables = Vec::new();
        let mut current = Vec::new();
        for line in markdown.lines() {
            if line.starts_with('|') {
                current.push(line);
            } else if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            tables.push(current);
        }
        tables
    }

    #[test]
    fn test_report_tables_are_well_formed() {
        let mut data = dataset();
        data.user_profile.push(crate::model::UserProfileRecord {
            username: "a-developer-with-a-rather-long-username".to_string(),
            ..Default::default()
        });
        let result = AnalysisResult::new("dev", data.username(), scorer::score_all(&data));
        let context = ReportContext::new("Code-based analysis", None);
        let report = DeveloperAnalysis::new(&data, &result)
            .to_markdown(&context)
            .unwrap();

        let tables = tables(&report);
        assert_eq!(tables.len(), 2);
        // Heading and separator rows, then the data rows.
        assert_eq!(tables[0].len(), 2 + 5);
        assert_eq!(tables[1].len(), 2 + Dimension::ALL.len());
        for table in &tables {
            let columns = table[0].matches('|').count();
            for row in table {
                assert!(row.ends_with('|'), "broken row `{row}`");
                assert_eq!(row.matches('|').count(), columns, "broken row `{row}`");
            }
        }

        assert!(report.starts_with(
            "# a-developer-with-a-rather-long-username Developer Skill Report\n"
        ));
        assert!(report.lines().any(|line| line.starts_with("**Generated:** ")));
        assert!(report.lines().any(|line| line == "**Method:** Code-based analysis"));
        assert!(report
            .lines()
            .any(|line| line.starts_with("- Fix ratio: **0.0%** (0/2)")));
        assert!(report.lines().any(|line| line.starts_with("### 2. Commit quality (")));
        for suggestion in suggestions(&result) {
            assert!(report.lines().any(|line| line == suggestion));
        }
    }

    #[test]
    fn test_insufficient_report_is_unwrapped() {
        let context = ReportContext::new("Code-based analysis", None);
        let report = InsufficientData::new(&ActivityDataset::new("ghost"))
            .to_markdown(&context)
            .unwrap();
        assert!(report.starts_with("# ghost Developer Skill Report\n"));
        assert!(report.lines().any(|line| {
            line.starts_with("⚠️ **Insufficient data**: `commits.csv`")
                && line.ends_with("so no score was produced.")
        }));
    }

    #[test]
    fn test_activity_totals_saturate() {
        let data = ActivityDataset {
            commits: vec![
                CommitRecord {
                    additions: u64::MAX,
                    deletions: 1,
                    ..Default::default()
                },
                CommitRecord {
                    additions: 5,
                    deletions: 2,
                    ..Default::default()
                },
            ],
            ..ActivityDataset::new("dev")
        };
        assert_eq!(activity_totals(&data), (2, u64::MAX, 3));
    }
}
