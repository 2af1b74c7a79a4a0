use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

// The serialization within this layer is a dependency leak, but its a pragmatic approach.
// Field names follow the backend's camelCase JSON.

/// Longest post body accepted by the backend, counted in chars.
pub const MAX_POST_CHARS: usize = 280;

/// Server-assigned post identifier.
pub type PostId = i64;

/// A post as returned by the backend. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub author: String,
    pub created_at: String,
    // Older backends never send it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// Body sent when creating or updating a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDraft {
    pub content: String,
    pub author: String,
}

impl PostDraft {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }

    /// Checks the rules the backend enforces so bad drafts never leave the client.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::BlankContent);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::BlankAuthor);
        }

        let len = self.content.chars().count();
        if len > MAX_POST_CHARS {
            return Err(ValidationError::ContentTooLong {
                len,
                max: MAX_POST_CHARS,
            });
        }

        Ok(())
    }
}

/// One slice of the feed plus the totals needed to know whether more exist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
}

/// Position of the feed after the last successful page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Zero-based index of the last loaded page.
    pub page: u32,
    pub has_more: bool,
}

impl PageCursor {
    pub fn after_load(page: u32, total_pages: u32) -> Self {
        Self {
            page,
            // `page < total_pages - 1`, written so neither end can wrap.
            has_more: page.saturating_add(1) < total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    pub score: f64,
    pub emoji: String,
}

/// Sentiment plus suggested hashtags for a piece of text. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub sentiment: Sentiment,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

// Auth payloads.

#[derive(Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::BlankEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::BlankPassword);
        }
        if self.nickname.trim().is_empty() {
            return Err(ValidationError::BlankNickname);
        }
        Ok(())
    }
}

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::BlankEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::BlankPassword);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub nickname: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}
