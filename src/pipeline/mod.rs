// Pipeline: loading and analysis wired end to end.

pub mod analyze;
pub mod prepare;

pub use analyze::{analyze, AnalysisSettings, COMMENTS_SLICE, POSTS_SLICE};
pub use prepare::prepare_corpus;
