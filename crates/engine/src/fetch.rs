use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use agenda_core::errors::AgendaError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use thiserror::Error;

/// A fetch error that can be handed to every waiter of a shared fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("{0}")]
    Failed(Arc<str>),

    #[error("{0}")]
    TimedOut(Arc<str>),
}

impl From<eyre::Report> for FetchFailure {
    fn from(report: eyre::Report) -> Self {
        Self::Failed(Arc::from(format!("{report:#}")))
    }
}

impl From<FetchFailure> for AgendaError {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::Failed(message) => AgendaError::Fetch(eyre::eyre!("{message}")),
            FetchFailure::TimedOut(message) => AgendaError::Timeout(message.to_string()),
        }
    }
}

/// Runs a backend call with an upper bound on how long it may take.
pub async fn bounded<T, Fut>(limit: Duration, what: &str, call: Fut) -> Result<T, FetchFailure>
where
    Fut: Future<Output = eyre::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => {
            result.map_err(|report| FetchFailure::from(report.wrap_err(format!("{what} failed"))))
        }
        Err(_) => Err(FetchFailure::TimedOut(Arc::from(format!(
            "{what} did not answer within {}s",
            limit.as_secs_f32()
        )))),
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchFailure>>>;

/// At most one in-flight or completed fetch per key.
///
/// Concurrent callers asking for the same key await the same future. The
/// settled result, success or failure, stays cached for the life of the
/// memo, so a failed key is not retried.
pub struct FetchOnce<K, V: Clone> {
    entries: Mutex<HashMap<K, SharedFetch<V>>>,
}

impl<K, V> FetchOnce<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the shared fetch for `key`, starting it with `loader` only
    /// if nobody has asked for this key before.
    pub fn fetch<F, Fut>(&self, key: K, loader: F) -> SharedFetch<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchFailure>> + Send + 'static,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(key)
            .or_insert_with(|| loader().boxed().shared())
            .clone()
    }

    pub fn is_cached(&self, key: &K) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for FetchOnce<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: Clone> std::fmt::Debug for FetchOnce<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOnce").finish_non_exhaustive()
    }
}
