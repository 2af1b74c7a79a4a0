// Feed loading and post mutations over the posts port.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{ClientError, Page, PageCursor, Post, PostDraft, PostId, PostsApi};

/// Result of a page request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was fetched and merged into the list.
    Loaded {
        page: u32,
        /// Posts actually added, after skipping ids already listed.
        added: usize,
        has_more: bool,
    },
    /// Another page request was still in flight; nothing was sent.
    Skipped,
    /// `load_more` was called after the last page.
    Exhausted,
}

/// Point-in-time copy of the feed for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    /// `None` until the first page has loaded.
    pub cursor: Option<PageCursor>,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct FeedState {
    posts: Vec<Post>,
    cursor: Option<PageCursor>,
    in_flight: bool,
    last_error: Option<String>,
}

impl FeedState {
    fn merge_page(&mut self, page: u32, data: Page<Post>) -> LoadOutcome {
        if page == 0 {
            self.posts.clear();
        }

        // Pages can shift when posts are created between loads; keep ids unique.
        let mut seen: HashSet<PostId> = self.posts.iter().map(|post| post.id).collect();
        let before = self.posts.len();
        self.posts
            .extend(data.content.into_iter().filter(|post| seen.insert(post.id)));

        let cursor = PageCursor::after_load(page, data.total_pages);
        self.cursor = Some(cursor);
        self.last_error = None;

        LoadOutcome::Loaded {
            page,
            added: self.posts.len() - before,
            has_more: cursor.has_more,
        }
    }
}

/// In-memory feed backed by the posts API.
///
/// Page loads are single-flight: a request issued while another is pending
/// reports [`LoadOutcome::Skipped`] without touching the network. Create,
/// update and delete only change the local list after the server confirms.
/// Failures are recorded as `last_error` and returned; prior state is kept.
pub struct FeedLoader<P> {
    api: P,
    page_size: u32,
    state: Mutex<FeedState>,
}

impl<P> FeedLoader<P>
where
    P: PostsApi,
{
    pub fn new(api: P, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.lock();
        FeedSnapshot {
            posts: state.posts.clone(),
            cursor: state.cursor,
            loading: state.in_flight,
            last_error: state.last_error.clone(),
        }
    }

    /// Fetches page `page`. Page 0 replaces the list, later pages append.
    #[tracing::instrument(name = "load_page", skip(self), fields(size = self.page_size))]
    pub async fn load_page(&self, page: u32) -> Result<LoadOutcome, ClientError> {
        let Some(_flight) = InFlight::begin(&self.state) else {
            tracing::debug!("page request already in flight, skipping.");
            return Ok(LoadOutcome::Skipped);
        };

        let result = self.api.list_posts(page, self.page_size).await;

        let mut state = self.lock();
        match result {
            Ok(data) => {
                let outcome = state.merge_page(page, data);
                tracing::info!(?outcome, total = state.posts.len(), "feed page loaded.");
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load feed page.");
                state.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Reloads the feed from scratch.
    pub async fn reload(&self) -> Result<LoadOutcome, ClientError> {
        self.load_page(0).await
    }

    /// Loads the page after the cursor, or the first page if nothing is loaded yet.
    pub async fn load_more(&self) -> Result<LoadOutcome, ClientError> {
        let next = match self.lock().cursor {
            None => 0,
            Some(cursor) if cursor.has_more => cursor.page + 1,
            Some(_) => return Ok(LoadOutcome::Exhausted),
        };
        self.load_page(next).await
    }

    /// Creates a post and puts the server's copy at the head of the list.
    pub async fn create(&self, draft: PostDraft) -> Result<Post, ClientError> {
        if let Err(err) = draft.validate() {
            return Err(self.fail("create", err.into()));
        }

        let post = match self.api.create_post(&draft).await {
            Ok(post) => post,
            Err(err) => return Err(self.fail("create", err)),
        };

        let mut state = self.lock();
        state.posts.retain(|existing| existing.id != post.id);
        state.posts.insert(0, post.clone());
        state.last_error = None;
        tracing::info!(post_id = post.id, "post created.");
        Ok(post)
    }

    /// Updates a post and replaces the listed copy in place.
    pub async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, ClientError> {
        if let Err(err) = draft.validate() {
            return Err(self.fail("update", err.into()));
        }

        let post = match self.api.update_post(id, &draft).await {
            Ok(post) => post,
            Err(err) => return Err(self.fail("update", err)),
        };

        let mut state = self.lock();
        replace_in_place(&mut state.posts, &post);
        state.last_error = None;
        tracing::info!(post_id = post.id, "post updated.");
        Ok(post)
    }

    /// Deletes a post. Returns whether a listed entry was removed.
    pub async fn delete(&self, id: PostId) -> Result<bool, ClientError> {
        if let Err(err) = self.api.delete_post(id).await {
            return Err(self.fail("delete", err));
        }

        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        state.last_error = None;
        let removed = state.posts.len() < before;
        tracing::info!(post_id = id, removed, "post deleted.");
        Ok(removed)
    }

    /// Fetches one post and refreshes the listed copy if there is one.
    pub async fn fetch(&self, id: PostId) -> Result<Post, ClientError> {
        let post = match self.api.get_post(id).await {
            Ok(post) => post,
            Err(err) => return Err(self.fail("fetch", err)),
        };

        let mut state = self.lock();
        replace_in_place(&mut state.posts, &post);
        state.last_error = None;
        Ok(post)
    }

    fn fail(&self, operation: &'static str, err: ClientError) -> ClientError {
        tracing::warn!(operation, error = %err, "post operation failed.");
        self.lock().last_error = Some(err.user_message());
        err
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn replace_in_place(posts: &mut [Post], updated: &Post) {
    if let Some(slot) = posts.iter_mut().find(|post| post.id == updated.id) {
        *slot = updated.clone();
    }
}

// Marks a page request in flight; cleared on drop so a cancelled load cannot wedge the feed.
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a Mutex<FeedState>) -> Option<Self> {
        let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.in_flight {
            return None;
        }
        guard.in_flight = true;
        Some(Self { state })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}
