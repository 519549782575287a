use serde::{Deserialize, Deserializer};
use std::path::Path;

/// One exported commit authored by the developer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommitRecord {
    pub commit_id: String,
    pub project_name: String,
    pub title: String,
    #[serde(deserialize_with = "count")]
    pub additions: u64,
    #[serde(deserialize_with = "count")]
    pub deletions: u64,
    pub committed_date: String,
    pub author_name: String,
    pub author_email: String,
}

impl CommitRecord {
    pub fn total_changes(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }
}

/// Single aggregate row produced by the exporter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatisticsRecord {
    #[serde(deserialize_with = "count")]
    pub total_commits: u64,
    #[serde(deserialize_with = "count")]
    pub total_additions: u64,
    #[serde(deserialize_with = "count")]
    pub total_deletions: u64,
    #[serde(deserialize_with = "amount")]
    pub avg_changes_per_commit: f64,
    #[serde(deserialize_with = "count")]
    pub total_merge_requests: u64,
    #[serde(deserialize_with = "count")]
    pub total_code_reviews: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeChangeRecord {
    pub file_path: String,
    pub author_name: String,
}

impl CodeChangeRecord {
    /// Lower-cased extension with its leading dot (`.rs`).
    ///
    /// Files without an extension and dot-files such as `.gitignore` yield an
    /// empty string; a trailing dot yields `"."`.
    pub fn extension(&self) -> String {
        Path::new(self.file_path.trim())
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserEventRecord {
    pub action_name: String,
    pub target_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeReviewRecord {
    pub author: String,
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeRequestRecord {
    pub title: String,
    pub state: String,
    pub author: String,
    pub created_at: String,
    pub merged_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserProfileRecord {
    pub username: String,
    pub name: String,
    pub email: String,
}

// Exported numeric cells may be blank or carry a float suffix (`12.0`).
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }
    raw.parse::<f64>()
        .map(|value| if value.is_finite() { value.max(0.0) as u64 } else { 0 })
        .map_err(|_| serde::de::Error::custom(format!("Not a valid count: {raw}")))
}

fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("Not a valid number: {raw}")))
}
