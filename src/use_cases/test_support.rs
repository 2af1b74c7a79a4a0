use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    AnalysisApi, AnalyzeResult, AuthApi, ClientError, LoginRequest, Page, Post, PostDraft,
    PostId, PostsApi, Sentiment, SentimentLabel, SignUpRequest, TokenResponse, TokenStore,
    UserProfile,
};

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn post(id: PostId, content: &str) -> Post {
    Post {
        id,
        content: content.to_string(),
        author: "Pilot".to_string(),
        created_at: "2024-05-01T10:00:00".to_string(),
        modified_at: None,
    }
}

// Builds `count` posts with ids starting at `first_id`.
pub(crate) fn posts(first_id: PostId, count: usize) -> Vec<Post> {
    (0..count as PostId)
        .map(|offset| post(first_id + offset, &format!("post {}", first_id + offset)))
        .collect()
}

fn upstream_failure() -> ClientError {
    ClientError::Upstream {
        status: 500,
        message: Some("backend exploded".to_string()),
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub list: bool,
    pub get: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

// Posts backend fake serving fixed pages and recording every call.
#[derive(Clone)]
pub(crate) struct RecordingPostsApi {
    pages: Arc<Mutex<Vec<Vec<Post>>>>,
    failures: Arc<Mutex<FailureFlags>>,
    next_id: Arc<AtomicI64>,
    list_delay: Duration,
    pub calls: CallLog,
}

impl RecordingPostsApi {
    pub(crate) fn with_pages(pages: Vec<Vec<Post>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages)),
            failures: Arc::new(Mutex::new(FailureFlags::default())),
            next_id: Arc::new(AtomicI64::new(1_000)),
            list_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub(crate) fn set_failures(&self, failures: FailureFlags) {
        *self.failures.lock().expect("failures mutex poisoned") = failures;
    }

    pub(crate) fn set_pages(&self, pages: Vec<Vec<Post>>) {
        *self.pages.lock().expect("pages mutex poisoned") = pages;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }

    fn failures(&self) -> FailureFlags {
        *self.failures.lock().expect("failures mutex poisoned")
    }
}

#[async_trait]
impl PostsApi for RecordingPostsApi {
    async fn list_posts(&self, page: u32, size: u32) -> Result<Page<Post>, ClientError> {
        self.record(format!("list page={page} size={size}"));
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if self.failures().list {
            return Err(upstream_failure());
        }

        let pages = self.pages.lock().expect("pages mutex poisoned");
        let content = pages.get(page as usize).cloned().unwrap_or_default();
        Ok(Page {
            total_elements: pages.iter().map(Vec::len).sum::<usize>() as u64,
            total_pages: pages.len() as u32,
            size,
            number: page,
            content,
        })
    }

    async fn get_post(&self, id: PostId) -> Result<Post, ClientError> {
        self.record(format!("get {id}"));
        if self.failures().get {
            return Err(upstream_failure());
        }

        let pages = self.pages.lock().expect("pages mutex poisoned");
        pages
            .iter()
            .flatten()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(ClientError::Upstream {
                status: 404,
                message: Some("post not found".to_string()),
            })
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        self.record(format!("create {}", draft.content));
        if self.failures().create {
            return Err(upstream_failure());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Post {
            id,
            content: draft.content.clone(),
            author: draft.author.clone(),
            created_at: "2024-05-02T09:00:00".to_string(),
            modified_at: None,
        })
    }

    async fn update_post(&self, id: PostId, draft: &PostDraft) -> Result<Post, ClientError> {
        self.record(format!("update {id} {}", draft.content));
        if self.failures().update {
            return Err(upstream_failure());
        }

        Ok(Post {
            id,
            content: draft.content.clone(),
            author: draft.author.clone(),
            created_at: "2024-05-01T10:00:00".to_string(),
            modified_at: Some("2024-05-02T11:00:00".to_string()),
        })
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        self.record(format!("delete {id}"));
        if self.failures().delete {
            return Err(upstream_failure());
        }
        Ok(())
    }
}

pub(crate) fn neutral_result(content: &str) -> AnalyzeResult {
    AnalyzeResult {
        sentiment: Sentiment {
            label: SentimentLabel::Neutral,
            score: 0.5,
            emoji: "😐".to_string(),
        },
        hashtags: content
            .split_whitespace()
            .filter_map(|word| word.strip_prefix('#'))
            .map(str::to_string)
            .collect(),
    }
}

// Analysis service fake with optional per-content latency.
#[derive(Clone, Default)]
pub(crate) struct RecordingAnalysisApi {
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    should_fail: bool,
    pub calls: CallLog,
}

impl RecordingAnalysisApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn delay_for(&self, content: &str, delay: Duration) {
        self.delays
            .lock()
            .expect("delays mutex poisoned")
            .insert(content.to_string(), delay);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl AnalysisApi for RecordingAnalysisApi {
    async fn analyze(&self, content: &str) -> Result<AnalyzeResult, ClientError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(content.to_string());

        let delay = self
            .delays
            .lock()
            .expect("delays mutex poisoned")
            .get(content)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(ClientError::Transport("analysis service down".to_string()));
        }
        Ok(neutral_result(content))
    }
}

// Auth backend fake issuing a fixed token.
#[derive(Clone, Default)]
pub(crate) struct RecordingAuthApi {
    pub should_reject: bool,
    pub calls: CallLog,
}

impl RecordingAuthApi {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl AuthApi for RecordingAuthApi {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<UserProfile, ClientError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(format!("signup {}", req.email));
        if self.should_reject {
            return Err(ClientError::Upstream {
                status: 409,
                message: Some("email already in use".to_string()),
            });
        }
        Ok(UserProfile {
            id: 7,
            email: req.email.clone(),
            nickname: req.nickname.clone(),
        })
    }

    async fn log_in(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(format!("login {}", req.email));
        if self.should_reject {
            return Err(ClientError::Upstream {
                status: 401,
                message: Some("password does not match".to_string()),
            });
        }
        Ok(TokenResponse {
            access_token: "token-1".to_string(),
        })
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct StoreFailures {
    pub load: bool,
    pub save: bool,
    pub clear: bool,
}

// In-memory token store with failure toggles.
#[derive(Clone, Default)]
pub(crate) struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
    failures: StoreFailures,
}

impl MemoryTokenStore {
    pub(crate) fn with_token(token: &str) -> Self {
        let store = Self::default();
        *store.token.lock().expect("token mutex poisoned") = Some(token.to_string());
        store
    }

    pub(crate) fn with_failures(mut self, failures: StoreFailures) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn stored(&self) -> Option<String> {
        self.token.lock().expect("token mutex poisoned").clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, String> {
        if self.failures.load {
            return Err("load failed".to_string());
        }
        Ok(self.stored())
    }

    async fn save(&self, token: &str) -> Result<(), String> {
        if self.failures.save {
            return Err("save failed".to_string());
        }
        *self.token.lock().expect("token mutex poisoned") = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        if self.failures.clear {
            return Err("clear failed".to_string());
        }
        *self.token.lock().expect("token mutex poisoned") = None;
        Ok(())
    }
}
