use async_trait::async_trait;

use crate::domain::entities::{
    AnalyzeResult, LoginRequest, Page, Post, PostDraft, PostId, SignUpRequest, TokenResponse,
    UserProfile,
};
use crate::domain::errors::ClientError;

// The use cases depend on these traits, not the concrete reqwest clients.
// Dependencies point inwards to the domain layer.

// Port for the posts half of the backend.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, page: u32, size: u32) -> Result<Page<Post>, ClientError>;
    async fn get_post(&self, id: PostId) -> Result<Post, ClientError>;
    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError>;
    async fn update_post(&self, id: PostId, draft: &PostDraft) -> Result<Post, ClientError>;
    async fn delete_post(&self, id: PostId) -> Result<(), ClientError>;
}

// Port for the auth half of the backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<UserProfile, ClientError>;
    async fn log_in(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError>;
}

// Port for the separate analysis service.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, content: &str) -> Result<AnalyzeResult, ClientError>;
}

// Port for persisting the session token between runs.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, String>;
    async fn save(&self, token: &str) -> Result<(), String>;
    async fn clear(&self) -> Result<(), String>;
}
