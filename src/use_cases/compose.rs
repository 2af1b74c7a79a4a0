// Post form state: author, content, hashtag insertion, and submission.

use crate::domain::{AnalysisApi, ClientError, MAX_POST_CHARS, Post, PostDraft, PostsApi};
use crate::use_cases::analyzer::{AnalysisState, DebouncedAnalyzer};
use crate::use_cases::feed::FeedLoader;

pub struct Composer<A> {
    author: String,
    content: String,
    analyzer: DebouncedAnalyzer<A>,
}

impl<A> Composer<A>
where
    A: AnalysisApi + 'static,
{
    pub fn new(analyzer: DebouncedAnalyzer<A>) -> Self {
        Self {
            author: String::new(),
            content: String::new(),
            analyzer,
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn analysis(&self) -> AnalysisState {
        self.analyzer.state()
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.analyzer.on_content_change(&self.content);
    }

    /// Appends a suggested hashtag as ` #tag`.
    pub fn apply_hashtag(&mut self, tag: &str) {
        let tag = tag.trim().trim_start_matches('#');
        if tag.is_empty() {
            return;
        }
        let content = format!("{} #{tag}", self.content);
        self.set_content(content);
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_over_limit(&self) -> bool {
        self.char_count() > MAX_POST_CHARS
    }

    pub fn can_submit(&self) -> bool {
        self.draft().validate().is_ok()
    }

    /// Creates the post through the feed, then resets the form on success.
    pub async fn submit<P>(&mut self, feed: &FeedLoader<P>) -> Result<Post, ClientError>
    where
        P: PostsApi,
    {
        let post = feed.create(self.draft()).await?;
        self.content.clear();
        self.analyzer.clear();
        Ok(post)
    }

    fn draft(&self) -> PostDraft {
        PostDraft::new(self.content.clone(), self.author.clone())
    }
}
