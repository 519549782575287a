mod multi_progress;
mod progress_style;

pub use multi_progress::{
    BatchProgress, ConsoleProgress, DeveloperOutcome, MultiProgressNew, SilentProgress,
};
pub use progress_style::ProgressStyleTemplate;
