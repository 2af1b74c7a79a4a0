// Use cases layer: feed, analysis, session, and post-form workflows.

pub mod analyzer;
pub mod compose;
pub mod feed;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use analyzer::{
    AnalysisPhase, AnalysisState, AnalyzedContent, DebouncedAnalyzer, analyze_post,
};
pub use compose::Composer;
pub use feed::{FeedLoader, FeedSnapshot, LoadOutcome};
pub use session::{
    LogInUseCase, LogOutUseCase, RestoreSessionUseCase, Session, SignUpUseCase,
};
