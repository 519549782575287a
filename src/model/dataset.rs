use crate::model::records::{
    CodeChangeRecord, CodeReviewRecord, CommitRecord, MergeRequestRecord, StatisticsRecord,
    UserEventRecord, UserProfileRecord,
};
use crate::model::{Error, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum TableKind {
    Commits,
    Statistics,
    CodeReviews,
    CodeChanges,
    UserEvents,
    MergeRequests,
    UserProfile,
}

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::Commits,
        TableKind::Statistics,
        TableKind::CodeReviews,
        TableKind::CodeChanges,
        TableKind::UserEvents,
        TableKind::MergeRequests,
        TableKind::UserProfile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Commits => "commits",
            TableKind::Statistics => "statistics",
            TableKind::CodeReviews => "code_reviews",
            TableKind::CodeChanges => "code_changes",
            TableKind::UserEvents => "user_events",
            TableKind::MergeRequests => "merge_requests",
            TableKind::UserProfile => "user_profile",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything exported for one developer. Any table may be empty.
#[derive(Debug, Clone, Default)]
pub struct ActivityDataset {
    pub developer_id: String,
    pub commits: Vec<CommitRecord>,
    pub statistics: Vec<StatisticsRecord>,
    pub code_reviews: Vec<CodeReviewRecord>,
    pub code_changes: Vec<CodeChangeRecord>,
    pub user_events: Vec<UserEventRecord>,
    pub merge_requests: Vec<MergeRequestRecord>,
    pub user_profile: Vec<UserProfileRecord>,
}

// Create
impl ActivityDataset {
    /// Loads all tables from a developer directory.
    ///
    /// Missing files become empty tables. A file that cannot be read or
    /// parsed is logged and also becomes an empty table, so loading never
    /// fails as a whole.
    pub fn from_dir(dir: &Path) -> Self {
        let developer_id = dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());

        Self {
            commits: load_table(dir, TableKind::Commits),
            statistics: load_table(dir, TableKind::Statistics),
            code_reviews: load_table(dir, TableKind::CodeReviews),
            code_changes: load_table(dir, TableKind::CodeChanges),
            user_events: load_table(dir, TableKind::UserEvents),
            merge_requests: load_table(dir, TableKind::MergeRequests),
            user_profile: load_table(dir, TableKind::UserProfile),
            developer_id,
        }
    }

    pub fn new(developer_id: impl ToString) -> Self {
        Self {
            developer_id: developer_id.to_string(),
            ..Default::default()
        }
    }
}

// Access
impl ActivityDataset {
    pub fn len(&self, table: TableKind) -> usize {
        match table {
            TableKind::Commits => self.commits.len(),
            TableKind::Statistics => self.statistics.len(),
            TableKind::CodeReviews => self.code_reviews.len(),
            TableKind::CodeChanges => self.code_changes.len(),
            TableKind::UserEvents => self.user_events.len(),
            TableKind::MergeRequests => self.merge_requests.len(),
            TableKind::UserProfile => self.user_profile.len(),
        }
    }

    pub fn is_empty(&self, table: TableKind) -> bool {
        self.len(table) == 0
    }

    /// Profile username when exported, otherwise the directory name.
    pub fn username(&self) -> String {
        self.user_profile
            .first()
            .map(|profile| profile.username.trim())
            .filter(|username| !username.is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.developer_id.clone())
    }

    /// The aggregate statistics row, when exported.
    pub fn statistics(&self) -> Option<&StatisticsRecord> {
        self.statistics.first()
    }
}

// Parser
fn load_table<T: DeserializeOwned>(dir: &Path, table: TableKind) -> Vec<T> {
    let path = dir.join(table.file_name());
    if !path.is_file() {
        debug!(file = %path.display(), "Table not exported, using empty table");
        return Vec::new();
    }
    match read_table(&path) {
        Ok(rows) => {
            debug!(file = %path.display(), rows = rows.len(), "Loaded table");
            rows
        }
        Err(err) => {
            warn!(file = %path.display(), error = %err, "Unable to read table, using empty table");
            Vec::new()
        }
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&content);
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes())
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|err| Error::csv(path, err))
}
