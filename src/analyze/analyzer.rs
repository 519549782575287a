use crate::analyze::{scorer, AnalysisResult, DeveloperReport};
use crate::model::{ActivityDataset, Result, TableKind};
use crate::report::markdown::{DeveloperAnalysis, InsufficientData};
use crate::report::{MarkdownReport, ReportContext};
use std::path::Path;
use tracing::{info, warn};

/// Produces a Markdown report for one developer directory.
///
/// The code-based analyzer is the only implementation shipped here; other
/// report generators (e.g. an LLM-backed one) plug in behind the same seam.
pub trait UserAnalyzer {
    fn method_name(&self) -> &'static str;

    fn analyze(
        &self,
        developer_dir: &Path,
        scoring_reference: Option<&Path>,
    ) -> Result<DeveloperReport>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeBasedAnalyzer;

impl CodeBasedAnalyzer {
    pub const METHOD: &'static str = "Code-based analysis";

    pub fn new() -> Self {
        Self
    }

    pub fn analyze_dataset(
        &self,
        dataset: &ActivityDataset,
        scoring_reference: Option<&Path>,
    ) -> Result<DeveloperReport> {
        let context = ReportContext::new(self.method_name(), scoring_reference);

        if dataset.is_empty(TableKind::Commits) {
            warn!(
                developer = %dataset.developer_id,
                "No commit history exported, skipping scoring"
            );
            let report = InsufficientData::new(dataset).to_markdown(&context)?;
            return Ok(DeveloperReport::insufficient(&dataset.developer_id, report));
        }

        let scores = scorer::score_all(dataset);
        let result = AnalysisResult::new(&dataset.developer_id, dataset.username(), scores);
        let report = DeveloperAnalysis::new(dataset, &result).to_markdown(&context)?;
        info!(
            developer = %dataset.developer_id,
            total = result.total_score,
            level = result.level.key(),
            "Analysis completed"
        );
        Ok(DeveloperReport::scored(report, result))
    }
}

impl UserAnalyzer for CodeBasedAnalyzer {
    fn method_name(&self) -> &'static str {
        Self::METHOD
    }

    fn analyze(
        &self,
        developer_dir: &Path,
        scoring_reference: Option<&Path>,
    ) -> Result<DeveloperReport> {
        info!(dir = %developer_dir.display(), "Loading developer data");
        let dataset = ActivityDataset::from_dir(developer_dir);
        self.analyze_dataset(&dataset, scoring_reference)
    }
}
