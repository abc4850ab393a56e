use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::address::Address;
use crate::config::Config;
use crate::error::Error;
use crate::provider::IndexingProvider;
use crate::state::{QueryResult, QueryState};

/// How long an error stays on screen before the display returns to idle.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Runs balance queries and publishes their [`QueryState`].
///
/// Every submission gets a sequence number. Only the most recently
/// submitted query may publish, so a slow superseded query never
/// overwrites a newer one.
#[derive(Clone)]
pub struct QueryOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn IndexingProvider>,
    state: watch::Sender<QueryState>,
    latest: AtomicU64,
    dismiss_after: Duration,
    dismiss_task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Replace the state if `seq` is still the latest query.
    fn publish(&self, seq: u64, next: QueryState) -> bool {
        self.state.send_if_modified(|current| {
            if self.latest.load(Ordering::SeqCst) != seq {
                return false;
            }
            *current = next;
            true
        })
    }

    fn cancel_dismiss(&self) {
        let mut slot = self.dismiss_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl QueryOrchestrator {
    pub fn new(provider: Arc<dyn IndexingProvider>) -> Self {
        Self::with_dismiss_after(provider, DEFAULT_DISMISS_AFTER)
    }

    /// Use the notification timeout from `config`.
    pub fn from_config(provider: Arc<dyn IndexingProvider>, config: &Config) -> Self {
        Self::with_dismiss_after(provider, config.notification_timeout)
    }

    pub fn with_dismiss_after(provider: Arc<dyn IndexingProvider>, dismiss_after: Duration) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            inner: Arc::new(Inner {
                provider,
                state,
                latest: AtomicU64::new(0),
                dismiss_after,
                dismiss_task: Mutex::new(None),
            }),
        }
    }

    /// Receive every published transition.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState {
        self.inner.state.borrow().clone()
    }

    /// Query the balances of a typed address or ENS name.
    ///
    /// Returns the state this query published, or `None` when a newer
    /// submission superseded it.
    pub async fn submit(&self, input: &str) -> Option<QueryState> {
        let seq = self.advance(QueryState::Loading);
        let outcome = crate::query_balances(self.inner.provider.as_ref(), input).await;
        self.finish(seq, outcome)
    }

    /// Query the balances of an already canonical address, such as the one
    /// a connected wallet reports.
    pub async fn submit_address(&self, address: Address) -> Option<QueryState> {
        let seq = self.advance(QueryState::Loading);
        let outcome = crate::query_address(self.inner.provider.as_ref(), address).await;
        self.finish(seq, outcome)
    }

    /// Drop whatever is displayed and any in-flight query.
    pub fn reset(&self) {
        self.advance(QueryState::Idle);
    }

    fn advance(&self, state: QueryState) -> u64 {
        // numbered under the channel lock: publish order == seq order
        let mut seq = 0;
        self.inner.state.send_modify(|current| {
            seq = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *current = state;
        });
        self.inner.cancel_dismiss();
        seq
    }

    fn finish(&self, seq: u64, outcome: Result<QueryResult, Error>) -> Option<QueryState> {
        let next = match outcome {
            Ok(result) if result.is_empty() => QueryState::EmptyResult,
            Ok(result) => QueryState::Success(result),
            Err(err) => {
                let kind = err.kind();
                if kind.is_fault() {
                    error!(seq, error = %err, "balance query failed");
                } else {
                    info!(seq, error = %err, "balance query rejected");
                }
                QueryState::Error(kind)
            }
        };

        if !self.inner.publish(seq, next.clone()) {
            debug!(seq, "discarding superseded query result");
            return None;
        }
        if matches!(next, QueryState::Error(_)) {
            self.schedule_dismiss(seq);
        }
        Some(next)
    }

    fn schedule_dismiss(&self, seq: u64) {
        let mut slot = self
            .inner
            .dismiss_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // a newer submission already owns the slot
        if self.inner.latest.load(Ordering::SeqCst) != seq {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.dismiss_after).await;
            inner.state.send_if_modified(|current| {
                if inner.latest.load(Ordering::SeqCst) != seq
                    || !matches!(current, QueryState::Error(_))
                {
                    return false;
                }
                *current = QueryState::Idle;
                true
            });
        });
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("state", &*self.inner.state.borrow())
            .field("latest", &self.inner.latest.load(Ordering::SeqCst))
            .field("dismiss_after", &self.inner.dismiss_after)
            .finish()
    }
}
