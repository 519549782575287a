use crate::analyze::{AnalysisResult, Dimension, Level, MID_THRESHOLD, SENIOR_THRESHOLD};
use crate::model::Result;
use crate::report::{
    heading, numeric_heading, percent, render_table, MarkdownExt, MarkdownReport, ReportContext,
};
use itertools::Itertools;
use markdown_builder::Markdown;
use std::cmp::Ordering;

/// Fleet-wide view over every scored developer of a batch run.
pub struct FleetSummary<'a> {
    pub results: &'a [AnalysisResult],
    pub insufficient: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl<'a> FleetSummary<'a> {
    pub fn new(results: &'a [AnalysisResult], insufficient: &'a [String]) -> Self {
        Self {
            results,
            insufficient,
        }
    }

    /// Results by total score, highest first. Equal totals keep input order.
    pub fn ranked(&self) -> Vec<&'a AnalysisResult> {
        self.results
            .iter()
            .sorted_by(|a, b| {
                b.total_score
                    .partial_cmp(&a.total_score)
                    .unwrap_or(Ordering::Equal)
            })
            .collect()
    }

    /// Developer count per level, largest group first and senior first on ties.
    pub fn level_distribution(&self) -> Vec<(Level, usize)> {
        self.results
            .iter()
            .map(|result| result.level)
            .counts()
            .into_iter()
            .sorted_by(|(a_level, a_count), (b_level, b_count)| {
                b_count.cmp(a_count).then_with(|| b_level.cmp(a_level))
            })
            .collect()
    }

    pub fn statistics(&self) -> Option<ScoreStatistics> {
        if self.results.is_empty() {
            return None;
        }
        let totals = self.results.iter().map(|r| r.total_score);
        Some(ScoreStatistics {
            mean: totals.clone().sum::<f64>() / self.results.len() as f64,
            max: totals.clone().fold(f64::MIN, f64::max),
            min: totals.fold(f64::MAX, f64::min),
        })
    }

    pub fn dimension_averages(&self) -> Vec<(Dimension, f64)> {
        Dimension::ALL
            .iter()
            .map(|dimension| {
                let sum: f64 = self
                    .results
                    .iter()
                    .map(|r| r.dimension_scores.get(*dimension))
                    .sum();
                let average = if self.results.is_empty() {
                    0.0
                } else {
                    sum / self.results.len() as f64
                };
                (*dimension, average)
            })
            .collect()
    }

    fn ranking_table(&self) -> Result<String> {
        let headings = [
            vec![
                numeric_heading("Rank"),
                heading("Developer"),
                numeric_heading("Total"),
                heading("Level"),
            ],
            Dimension::ALL
                .iter()
                .map(|dimension| numeric_heading(dimension.title()))
                .collect(),
        ]
        .concat();

        let rows = self
            .ranked()
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let fixed = vec![
                    (index + 1).to_string(),
                    format!("**{}**", result.username),
                    format!("{:.2}", result.total_score),
                    result.level.to_string(),
                ];
                let scores = result
                    .dimension_scores
                    .iter()
                    .map(|(_, score)| format!("{score:.2}"));
                fixed.into_iter().chain(scores).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        render_table(headings, rows)
    }

    fn distribution_table(&self) -> Result<String> {
        let total = self.results.len() as f64;
        let rows = self
            .level_distribution()
            .into_iter()
            .map(|(level, count)| {
                vec![
                    level.to_string(),
                    count.to_string(),
                    percent(count as f64 / total),
                ]
            })
            .collect();
        render_table(
            vec![
                heading("Level"),
                numeric_heading("Developers"),
                numeric_heading("Share"),
            ],
            rows,
        )
    }

    fn averages_table(&self) -> Result<String> {
        let rows = self
            .dimension_averages()
            .into_iter()
            .map(|(dimension, average)| {
                vec![
                    dimension.title().to_string(),
                    format!("{average:.2}"),
                    format!("{}%", dimension.weight_percent()),
                ]
            })
            .collect();
        render_table(
            vec![
                heading("Dimension"),
                numeric_heading("Average"),
                numeric_heading("Weight"),
            ],
            rows,
        )
    }
}

impl MarkdownReport for FleetSummary<'_> {
    fn to_markdown(&self, context: &ReportContext) -> Result<String> {
        let mut doc = Markdown::new();
        doc.header1("Developer Skill Summary");
        doc.block(format!(
            "**Generated:** {}  \n**Method:** {}  \n**Developers scored:** {}",
            context.timestamp(),
            context.method,
            self.results.len()
        ));

        if let Some(stats) = self.statistics() {
            doc.header2("🏅 Ranking");
            doc.block(self.ranking_table()?);

            doc.header2("📊 Level Distribution");
            doc.block(self.distribution_table()?);

            doc.header2("📈 Score Statistics");
            doc.block(format!(
                "- Mean: **{:.2}**\n- Max: **{:.2}**\n- Min: **{:.2}**",
                stats.mean, stats.max, stats.min
            ));

            doc.header2("🎯 Dimension Averages");
            doc.block(self.averages_table()?);
        } else {
            doc.block("No developer had enough data to be scored.");
        }

        if !self.insufficient.is_empty() {
            doc.header2("⚠️ Not Scored");
            doc.block(
                self.insufficient
                    .iter()
                    .map(|id| format!("- `{id}`: insufficient data"))
                    .join("\n"),
            );
        }

        doc.header2("📖 Legend");
        doc.block(legend());
        Ok(doc.render())
    }
}

fn legend() -> String {
    let levels = [
        format!(
            "- {}: total ≥ {SENIOR_THRESHOLD:.1}",
            Level::Senior
        ),
        format!(
            "- {}: {MID_THRESHOLD:.1} ≤ total < {SENIOR_THRESHOLD:.1}",
            Level::Mid
        ),
        format!("- {}: total < {MID_THRESHOLD:.1}", Level::Junior),
    ];
    let weights = Dimension::ALL
        .iter()
        .map(|dimension| format!("{} {}%", dimension.title(), dimension.weight_percent()))
        .join(", ");
    format!("{}\n\n**Weights:** {weights}", levels.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::DimensionScores;
    use pretty_assertions::assert_eq;

    fn result(id: &str, score: f64) -> AnalysisResult {
        AnalysisResult::new(id, id, DimensionScores::from_fn(|_| score))
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let results = vec![
            result("carol", 6.0),
            result("alice", 9.0),
            result("bob", 6.0),
        ];
        let summary = FleetSummary::new(&results, &[]);
        let order = summary
            .ranked()
            .iter()
            .map(|r| r.developer_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["alice", "carol", "bob"]);
    }

    #[test]
    fn test_level_distribution_order() {
        let results = vec![
            result("a", 9.0),
            result("b", 6.0),
            result("c", 3.0),
            result("d", 6.5),
        ];
        let summary = FleetSummary::new(&results, &[]);
        assert_eq!(
            summary.level_distribution(),
            vec![(Level::Mid, 2), (Level::Senior, 1), (Level::Junior, 1)]
        );
    }

    #[test]
    fn test_statistics_and_averages() {
        let results = vec![result("a", 8.0), result("b", 6.0)];
        let summary = FleetSummary::new(&results, &[]);
        assert_eq!(
            summary.statistics(),
            Some(ScoreStatistics {
                mean: 7.0,
                max: 8.0,
                min: 6.0
            })
        );
        assert!(summary
            .dimension_averages()
            .iter()
            .all(|(_, average)| *average == 7.0));
        assert_eq!(FleetSummary::new(&[], &[]).statistics(), None);
    }

    #[test]
    fn test_summary_lists_unscored_developers() {
        let results = vec![result("alice", 8.5)];
        let insufficient = vec!["ghost".to_string()];
        let context = ReportContext::new("Code-based analysis", None);
        let markdown = FleetSummary::new(&results, &insufficient)
            .to_markdown(&context)
            .unwrap();
        assert!(markdown.contains("**alice**"));
        assert!(markdown.contains("8.50"));
        assert!(markdown.contains("`ghost`: insufficient data"));
        assert!(markdown.contains("Legend"));
        assert!(!markdown.contains("**ghost**"));
    }

    #[test]
    fn test_summary_tables_are_well_formed() {
        let results = vec![
            result("a-developer-with-a-rather-long-username", 9.0),
            result("bob", 6.0),
            result("carol", 3.0),
        ];
        let context = ReportContext::new("Code-based analysis", None);
        let markdown = FleetSummary::new(&results, &[])
            .to_markdown(&context)
            .unwrap();

        let mut tables: Vec<Vec<&str>> = Vec::new();
        let mut in_table = false;
        for line in markdown.lines() {
            match (line.starts_with('|'), in_table) {
                (true, true) => tables.last_mut().unwrap().push(line),
                (true, false) => tables.push(vec![line]),
                _ => {}
            }
            in_table = line.starts_with('|');
        }

        let row_counts = tables.iter().map(|t| t.len() - 2).collect::<Vec<_>>();
        // ranking, level distribution, dimension averages
        assert_eq!(row_counts, vec![3, 3, Dimension::ALL.len()]);
        for table in &tables {
            let columns = table[0].matches('|').count();
            for row in table {
                assert!(row.ends_with('|'), "broken row `{row}`");
                assert_eq!(row.matches('|').count(), columns, "broken row `{row}`");
            }
        }
        assert_eq!(tables[0][0].matches('|').count(), 4 + Dimension::ALL.len() + 1);
        assert!(tables[0][2].contains("**a-developer-with-a-rather-long-username**"));

        for line in [
            "**Developers scored:** 3",
            "- Mean: **6.00**",
            "- Max: **9.00**",
            "- Min: **3.00**",
        ] {
            assert!(markdown.lines().any(|l| l == line), "missing line `{line}`");
        }
        assert!(markdown
            .lines()
            .any(|l| l.starts_with("**Weights:** Code contribution 12%, Commit quality 23%")));
    }
}
