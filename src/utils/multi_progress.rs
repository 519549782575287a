use crate::analyze::Level;
use crate::utils::ProgressStyleTemplate;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub trait MultiProgressNew {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar;
}

impl MultiProgressNew for MultiProgress {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar {
        let pb = self.add(pb);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// How the analysis of one developer ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DeveloperOutcome {
    Scored { total: f64, level: Level },
    Insufficient,
    Failed(String),
}

/// Receives batch lifecycle events.
pub trait BatchProgress {
    fn started(&self, total: usize);
    fn developer_started(&self, index: usize, developer_id: &str);
    fn developer_finished(&self, developer_id: &str, outcome: &DeveloperOutcome);
    fn finished(&self, message: &str);
}

/// Terminal progress: an overall counter plus a spinner for the current
/// developer.
pub struct ConsoleProgress {
    multi_progress: MultiProgress,
    overall_pb: ProgressBar,
    current_pb: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let multi_progress = MultiProgress::default();
        let overall_pb = multi_progress
            .add_with_style(ProgressBar::no_length(), ProgressStyleTemplate::number_bar());
        overall_pb.set_message("Developers");
        let current_pb = multi_progress.add_with_style(
            ProgressBar::new_spinner(),
            ProgressStyleTemplate::only_message(),
        );
        Self {
            multi_progress,
            overall_pb,
            current_pb,
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProgress for ConsoleProgress {
    fn started(&self, total: usize) {
        self.overall_pb.set_length(total as u64);
        self.overall_pb.set_position(0);
    }

    fn developer_started(&self, index: usize, developer_id: &str) {
        self.current_pb
            .set_message(format!("Analyzing `{developer_id}` (#{}) ...", index + 1));
    }

    fn developer_finished(&self, developer_id: &str, outcome: &DeveloperOutcome) {
        let line = match outcome {
            DeveloperOutcome::Scored { total, level } => {
                format!("✅ {developer_id}: {total:.2} / 10 ({level})")
            }
            DeveloperOutcome::Insufficient => format!("⚠️ {developer_id}: insufficient data"),
            DeveloperOutcome::Failed(err) => format!("❌ {developer_id}: {err}"),
        };
        let _ = self.multi_progress.println(line);
        self.overall_pb.inc(1);
    }

    fn finished(&self, message: &str) {
        self.overall_pb.finish();
        self.current_pb.finish_with_message(message.to_string());
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn started(&self, _: usize) {}
    fn developer_started(&self, _: usize, _: &str) {}
    fn developer_finished(&self, _: &str, _: &DeveloperOutcome) {}
    fn finished(&self, _: &str) {}
}
