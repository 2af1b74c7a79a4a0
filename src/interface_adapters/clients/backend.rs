use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{authorize, read_json, send, transport, trim_base};
use crate::domain::{
    AuthApi, ClientError, LoginRequest, Page, Post, PostDraft, PostId, PostsApi, SignUpRequest,
    TokenResponse, UserProfile,
};
use crate::interface_adapters::protocol::ApiEnvelope;
use crate::use_cases::Session;

// Thin wrapper around reqwest for the posts/auth backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl BackendClient {
    pub fn new(
        base_url: impl AsRef<str>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: trim_base(base_url.as_ref()),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Unwrap `data` from the envelope; a success without data is a decode failure.
    async fn data<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let res = send(authorize(request, &self.session)).await?;
        let envelope = read_json::<ApiEnvelope<T>>(res).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response envelope carried no data".to_string()))
    }
}

#[async_trait]
impl PostsApi for BackendClient {
    async fn list_posts(&self, page: u32, size: u32) -> Result<Page<Post>, ClientError> {
        let url = self.url(&format!("/api/posts?page={page}&size={size}"));
        self.data(self.http.get(url)).await
    }

    async fn get_post(&self, id: PostId) -> Result<Post, ClientError> {
        let url = self.url(&format!("/api/posts/{id}"));
        self.data(self.http.get(url)).await
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        let url = self.url("/api/posts");
        self.data(self.http.post(url).json(draft)).await
    }

    async fn update_post(&self, id: PostId, draft: &PostDraft) -> Result<Post, ClientError> {
        let url = self.url(&format!("/api/posts/{id}"));
        self.data(self.http.put(url).json(draft)).await
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/posts/{id}"));
        let request = authorize(self.http.delete(url), &self.session);
        // The body is an envelope with null data; only the status matters.
        let res = send(request).await?;
        res.bytes().await.map_err(transport)?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for BackendClient {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<UserProfile, ClientError> {
        let url = self.url("/api/auth/signup");
        self.data(self.http.post(url).json(req)).await
    }

    async fn log_in(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let url = self.url("/api/auth/login");
        self.data(self.http.post(url).json(req)).await
    }
}
