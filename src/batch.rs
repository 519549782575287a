use crate::analyze::{AnalysisResult, UserAnalyzer};
use crate::model::{Error, Result};
use crate::report::{FleetSummary, MarkdownReport, ReportContext};
use crate::utils::{BatchProgress, DeveloperOutcome};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

pub const DEVELOPER_REPORT_FILE: &str = "analysis-result.md";
pub const SUMMARY_REPORT_FILE: &str = "all-developers-analysis-result.md";
pub const SUMMARY_JSON_FILE: &str = "all-developers-analysis-result.json";

#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    pub data_root: PathBuf,
    pub output_root: PathBuf,
    pub developer: Option<String>,
    pub scoring_reference: Option<PathBuf>,
    pub write_json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub scored: Vec<AnalysisResult>,
    pub insufficient: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub summary_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.processed == 0
    }
}

/// Analyzes every developer directory under the data root and writes the
/// per-developer reports plus the fleet summary.
///
/// A failure for one developer is recorded in [`BatchSummary::failed`] and
/// does not stop the batch. Only writing the fleet summary can fail the run.
pub fn run_batch(
    analyzer: &dyn UserAnalyzer,
    config: &BatchConfig,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    let developer_dirs = find_developer_dirs(&config.data_root, config.developer.as_deref());
    let mut summary = BatchSummary::default();

    if developer_dirs.is_empty() {
        warn!(root = %config.data_root.display(), "Nothing to analyze");
        progress.finished("Nothing to analyze");
        return Ok(summary);
    }

    progress.started(developer_dirs.len());
    for (index, dir) in developer_dirs.iter().enumerate() {
        let developer_id = developer_id(dir);
        progress.developer_started(index, &developer_id);

        let outcome = match analyze_developer(analyzer, config, dir, &developer_id) {
            Ok(Some(result)) => {
                let outcome = DeveloperOutcome::Scored {
                    total: result.total_score,
                    level: result.level,
                };
                summary.scored.push(result);
                outcome
            }
            Ok(None) => {
                summary.insufficient.push(developer_id.clone());
                DeveloperOutcome::Insufficient
            }
            Err(err) => {
                error!(developer = %developer_id, "Analysis failed: {err}");
                summary.failed.push((developer_id.clone(), err.to_string()));
                DeveloperOutcome::Failed(err.to_string())
            }
        };
        summary.processed += 1;
        progress.developer_finished(&developer_id, &outcome);
    }

    if !summary.scored.is_empty() {
        summary.summary_path = Some(write_summary(analyzer, config, &summary)?);
    }

    info!(
        processed = summary.processed,
        scored = summary.scored.len(),
        insufficient = summary.insufficient.len(),
        failed = summary.failed.len(),
        "Batch completed"
    );
    progress.finished(&format!(
        "✅ Completed analysis ({} scored, {} insufficient, {} failed)",
        summary.scored.len(),
        summary.insufficient.len(),
        summary.failed.len()
    ));
    Ok(summary)
}

/// The named developer's directory, or every subdirectory of `root` sorted
/// by name. A missing root yields nothing.
pub fn find_developer_dirs(root: &Path, developer: Option<&str>) -> Vec<PathBuf> {
    if let Some(developer) = developer {
        if !is_directory_name(developer) {
            warn!(developer, "Developer filter is not a plain directory name");
            return Vec::new();
        }
        let dir = root.join(developer);
        if dir.is_dir() {
            return vec![dir];
        }
        warn!(developer, root = %root.display(), "Developer directory not found");
        return Vec::new();
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %root.display(), "Failed to list data root: {err}");
            return Vec::new();
        }
    };
    let mut dirs = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();
    dirs
}

/// A single path component that stays inside its parent: no separators,
/// no `.` or `..`.
fn is_directory_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn developer_id(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.display().to_string())
}

fn analyze_developer(
    analyzer: &dyn UserAnalyzer,
    config: &BatchConfig,
    dir: &Path,
    developer_id: &str,
) -> Result<Option<AnalysisResult>> {
    let report = analyzer.analyze(dir, config.scoring_reference.as_deref())?;

    let output_dir = config.output_root.join(developer_id);
    fs::create_dir_all(&output_dir).map_err(|err| Error::io(&output_dir, err))?;
    let report_path = output_dir.join(DEVELOPER_REPORT_FILE);
    fs::write(&report_path, &report.report).map_err(|err| Error::io(&report_path, err))?;
    info!(developer = developer_id, file = %report_path.display(), "Report written");

    Ok(report.result)
}

fn write_summary(
    analyzer: &dyn UserAnalyzer,
    config: &BatchConfig,
    summary: &BatchSummary,
) -> Result<PathBuf> {
    let fleet = FleetSummary::new(&summary.scored, &summary.insufficient);
    let context = ReportContext::new(analyzer.method_name(), config.scoring_reference.as_deref());

    fs::create_dir_all(&config.output_root)
        .map_err(|err| Error::io(&config.output_root, err))?;
    let summary_path = config.output_root.join(SUMMARY_REPORT_FILE);
    fs::write(&summary_path, fleet.to_markdown(&context)?)
        .map_err(|err| Error::io(&summary_path, err))?;
    info!(file = %summary_path.display(), "Summary written");

    if config.write_json {
        let json_path = config.output_root.join(SUMMARY_JSON_FILE);
        let json = serde_json::to_string_pretty(&fleet.ranked())?;
        fs::write(&json_path, json).map_err(|err| Error::io(&json_path, err))?;
        info!(file = %json_path.display(), "Results written");
    }
    Ok(summary_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{DeveloperReport, DimensionScores};
    use crate::utils::SilentProgress;
    use tempfile::TempDir;

    /// Scores every developer 6.0 except `ghost` (insufficient) and `broken`
    /// (fails).
    struct FakeAnalyzer;

    impl UserAnalyzer for FakeAnalyzer {
        fn method_name(&self) -> &'static str {
            "Fake analysis"
        }

        fn analyze(&self, dir: &Path, _: Option<&Path>) -> Result<DeveloperReport> {
            let id = developer_id(dir);
            match id.as_str() {
                "ghost" => Ok(DeveloperReport::insufficient(&id, "no data".to_string())),
                "broken" => Err(Error::Render("boom".to_string())),
                _ => {
                    let result = AnalysisResult::new(&id, &id, DimensionScores::from_fn(|_| 6.0));
                    Ok(DeveloperReport::scored(format!("report for {id}"), result))
                }
            }
        }
    }

    fn data_root(ids: &[&str]) -> TempDir {
        let root = TempDir::new().unwrap();
        for id in ids {
            fs::create_dir(root.path().join(id)).unwrap();
        }
        fs::write(root.path().join("stray.csv"), "not a developer").unwrap();
        root
    }

    fn config(data: &TempDir, output: &TempDir) -> BatchConfig {
        BatchConfig {
            data_root: data.path().to_path_buf(),
            output_root: output.path().join("analysis"),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_developer_dirs_sorted_and_filtered() {
        let root = data_root(&["zed", "amy", "bob"]);
        let names = find_developer_dirs(root.path(), None)
            .iter()
            .map(|dir| developer_id(dir))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["amy", "bob", "zed"]);

        assert_eq!(
            find_developer_dirs(root.path(), Some("bob")),
            vec![root.path().join("bob")]
        );
        assert!(find_developer_dirs(root.path(), Some("nobody")).is_empty());
        for escape in ["", ".", "..", "../bob", "bob/", "amy/../bob", "/tmp", "bob\\x"] {
            assert!(
                find_developer_dirs(root.path(), Some(escape)).is_empty(),
                "`{escape}` should be rejected"
            );
        }
        assert!(find_developer_dirs(&root.path().join("missing"), None).is_empty());
    }

    #[test]
    fn test_parent_directory_filter_writes_nothing() {
        let data = data_root(&["alice"]);
        let output = TempDir::new().unwrap();
        let config = BatchConfig {
            developer: Some("..".to_string()),
            ..config(&data, &output)
        };
        let summary = run_batch(&FakeAnalyzer, &config, &SilentProgress).unwrap();
        assert!(summary.is_empty());
        assert!(!config.output_root.exists());
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let data = data_root(&["alice", "broken", "ghost"]);
        let output = TempDir::new().unwrap();
        let config = config(&data, &output);

        let summary = run_batch(&FakeAnalyzer, &config, &SilentProgress).unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.scored.len(), 1);
        assert_eq!(summary.insufficient, vec!["ghost".to_string()]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "broken");

        assert!(config.output_root.join("alice").join(DEVELOPER_REPORT_FILE).is_file());
        assert!(config.output_root.join("ghost").join(DEVELOPER_REPORT_FILE).is_file());
        assert!(!config.output_root.join("broken").exists());
        assert_eq!(
            summary.summary_path,
            Some(config.output_root.join(SUMMARY_REPORT_FILE))
        );
        assert!(!config.output_root.join(SUMMARY_JSON_FILE).exists());
    }

    #[test]
    fn test_no_summary_without_scored_developers() {
        let data = data_root(&["ghost"]);
        let output = TempDir::new().unwrap();
        let config = config(&data, &output);

        let summary = run_batch(&FakeAnalyzer, &config, &SilentProgress).unwrap();
        assert_eq!(summary.processed, 1);
        assert!(summary.summary_path.is_none());
        assert!(!config.output_root.join(SUMMARY_REPORT_FILE).exists());
    }

    #[test]
    fn test_json_results_are_ranked() {
        let data = data_root(&["bob", "alice"]);
        let output = TempDir::new().unwrap();
        let config = BatchConfig {
            write_json: true,
            ..config(&data, &output)
        };

        run_batch(&FakeAnalyzer, &config, &SilentProgress).unwrap();
        let json = fs::read_to_string(config.output_root.join(SUMMARY_JSON_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ids = value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["developer_id"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["alice", "bob"]);
    }
}
