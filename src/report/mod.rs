pub mod markdown;
pub mod summary;

use crate::model::{Error, Result};
use chrono::{DateTime, Local};
use itertools::Itertools;
use markdown_builder::Markdown;
use markdown_table::{Heading, HeadingAlignment, MarkdownTable};
use std::fmt;
use std::path::Path;

pub use summary::FleetSummary;

pub const DEFAULT_SCORING_REFERENCE: &str = "built-in weights";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait MarkdownReport {
    fn to_markdown(&self, context: &ReportContext) -> Result<String>;
}

/// Run-level facts stamped into every report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generated_at: DateTime<Local>,
    pub method: String,
    pub scoring_reference: String,
}

impl ReportContext {
    pub fn new(method: impl ToString, scoring_reference: Option<&Path>) -> Self {
        let scoring_reference = scoring_reference
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_SCORING_REFERENCE.to_string());
        Self {
            generated_at: Local::now(),
            method: method.to_string(),
            scoring_reference,
        }
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Pre-rendered Markdown kept verbatim. `Paragraph` word-wraps, which would
/// split table rows and list items.
#[derive(Debug, Clone)]
struct Block(String);

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0.trim_end_matches('\n'))
    }
}

trait MarkdownExt {
    fn block(&mut self, text: impl Into<String>) -> &mut Self;
}

impl MarkdownExt for Markdown {
    fn block(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(Box::new(Block(text.into())));
        self
    }
}

fn render_table(headings: Vec<Heading>, rows: Vec<Vec<String>>) -> Result<String> {
    let mut table = MarkdownTable::new(rows);
    table.with_headings(headings);
    table
        .as_markdown()
        .map_err(|err| Error::Render(format!("{err:?}")))
}

fn heading(title: &str) -> Heading {
    Heading::new(title.to_string(), None)
}

fn numeric_heading(title: &str) -> Heading {
    Heading::new(title.to_string(), Some(HeadingAlignment::Center))
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// `1234567` → `1,234,567`.
fn group_digits(value: u64) -> String {
    let digits = value.to_string().chars().collect::<Vec<_>>();
    digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .join(",")
}
