mod dataset;
pub mod records;
mod result;
pub mod timestamp;

pub use dataset::{ActivityDataset, TableKind};
pub use records::{
    CodeChangeRecord, CodeReviewRecord, CommitRecord, MergeRequestRecord, StatisticsRecord,
    UserEventRecord, UserProfileRecord,
};
pub use result::{Error, Result};
pub use timestamp::{parse_timestamp, TimestampError};
