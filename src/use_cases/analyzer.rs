// Debounced sentiment/hashtag analysis for text being typed.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{AnalysisApi, AnalyzeResult};

/// Content must be longer than this many chars before it is analyzed.
pub const MIN_ANALYZE_CHARS: usize = 10;

/// Quiet period used when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Nothing scheduled; content is short or the last call failed.
    Idle,
    /// Waiting out the quiet period or for the service to answer.
    Pending,
    /// `result` holds the analysis of the current content.
    Analyzed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedContent {
    /// Exact text that was sent for analysis.
    pub content: String,
    pub result: AnalyzeResult,
}

/// Observable analyzer state, published on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisState {
    pub phase: AnalysisPhase,
    /// Bumped on every content change; responses tagged with an older value are dropped.
    pub generation: u64,
    /// Last applied analysis. Kept while newer content is pending.
    pub result: Option<AnalyzedContent>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            phase: AnalysisPhase::Idle,
            generation: 0,
            result: None,
        }
    }
}

struct Inner<A> {
    api: A,
    quiet_period: Duration,
    // Timer for the latest change; the request it starts is not tracked here.
    pending: Mutex<Option<JoinHandle<()>>>,
    state_tx: watch::Sender<AnalysisState>,
}

/// Watches free text and asks the analysis service about it once typing pauses.
///
/// Every change cancels the scheduled call. Content longer than
/// [`MIN_ANALYZE_CHARS`] is analyzed after the quiet period; shorter content
/// clears the result at once. In-flight requests are never cancelled, but a
/// response is applied only if no change happened since it was issued.
///
/// Must be driven from inside a Tokio runtime.
pub struct DebouncedAnalyzer<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for DebouncedAnalyzer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> DebouncedAnalyzer<A>
where
    A: AnalysisApi + 'static,
{
    pub fn new(api: A, quiet_period: Duration) -> Self {
        let (state_tx, _state_rx) = watch::channel(AnalysisState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                quiet_period,
                pending: Mutex::new(None),
                state_tx,
            }),
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.inner.state_tx.subscribe()
    }

    /// Feeds the latest content of the input.
    pub fn on_content_change(&self, content: &str) {
        let analyzable = content.chars().count() > MIN_ANALYZE_CHARS;

        let mut generation = 0;
        self.inner.state_tx.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            if analyzable {
                state.phase = AnalysisPhase::Pending;
            } else {
                state.phase = AnalysisPhase::Idle;
                state.result = None;
            }
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        if !analyzable {
            return;
        }

        tracing::trace!(generation, "analysis scheduled.");
        let inner = Arc::clone(&self.inner);
        let content = content.to_owned();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.quiet_period).await;
            // Detach the request so a later change only cancels timers.
            tokio::spawn(inner.request(generation, content));
        }));
    }

    /// Drops any pending work and the shown result.
    pub fn clear(&self) {
        self.on_content_change("");
    }
}

impl<A> Inner<A>
where
    A: AnalysisApi,
{
    fn is_current(&self, generation: u64) -> bool {
        self.state_tx.borrow().generation == generation
    }

    async fn request(self: Arc<Self>, generation: u64, content: String) {
        if !self.is_current(generation) {
            return;
        }

        tracing::debug!(generation, chars = content.chars().count(), "requesting analysis.");
        let outcome = self.api.analyze(&content).await;

        // Compare and apply under the watch lock so a concurrent change cannot slip between.
        let applied = self.state_tx.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            match outcome {
                Ok(result) => {
                    state.phase = AnalysisPhase::Analyzed;
                    state.result = Some(AnalyzedContent { content, result });
                }
                Err(ref err) => {
                    tracing::warn!(generation, error = %err, "analysis failed.");
                    state.phase = AnalysisPhase::Idle;
                }
            }
            true
        });

        if !applied {
            tracing::debug!(generation, "discarding stale analysis.");
        }
    }
}

/// One-shot analysis of an existing post. Failures are logged and yield `None`.
pub async fn analyze_post<A>(api: &A, content: &str) -> Option<AnalyzeResult>
where
    A: AnalysisApi + ?Sized,
{
    match api.analyze(content).await {
        Ok(result) => Some(result),
        Err(err) => {
            tracing::warn!(error = %err, "post analysis failed.");
            None
        }
    }
}
