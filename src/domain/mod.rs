// Domain layer: feed entities, error taxonomy, and the ports the use cases call.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{
    AnalyzeResult, LoginRequest, MAX_POST_CHARS, Page, PageCursor, Post, PostDraft, PostId,
    Sentiment, SentimentLabel, SignUpRequest, TokenResponse, UserProfile,
};
pub use errors::{ClientError, SessionError, ValidationError};
pub use ports::{AnalysisApi, AuthApi, PostsApi, TokenStore};
