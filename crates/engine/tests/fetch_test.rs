use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agenda_core::errors::AgendaError;
use agenda_engine::fetch::{FetchFailure, FetchOnce, bounded};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_concurrent_fetches_share_one_call() {
    let memo: FetchOnce<u32, String> = FetchOnce::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let start = |calls: Arc<AtomicUsize>| {
        memo.fetch(7, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, FetchFailure>("loaded".to_string())
        })
    };
    let first = start(Arc::clone(&calls));
    let second = start(Arc::clone(&calls));

    let (a, b) = tokio::join!(first, second);

    assert_eq!(a.unwrap(), "loaded");
    assert_eq!(b.unwrap(), "loaded");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(memo.is_cached(&7));
    assert_eq!(memo.len(), 1);
}

#[tokio::test]
async fn test_completed_fetch_is_reused() {
    let memo: FetchOnce<&'static str, u32> = FetchOnce::new();

    let first = memo.fetch("answer", || async { Ok::<_, FetchFailure>(42) }).await;
    let second = memo
        .fetch("answer", || async { Err::<u32, _>(FetchFailure::Failed("second call".into())) })
        .await;

    assert_eq!(first.unwrap(), 42);
    assert_eq!(second.unwrap(), 42);
}

#[tokio::test]
async fn test_failure_is_cached_for_every_waiter() {
    let memo: FetchOnce<u32, u32> = FetchOnce::new();

    let failed = memo
        .fetch(1, || async { Err::<u32, _>(FetchFailure::from(eyre::eyre!("backend down"))) })
        .await;
    let again = memo.fetch(1, || async { Ok::<_, FetchFailure>(1) }).await;

    assert!(matches!(failed, Err(FetchFailure::Failed(_))));
    assert_eq!(failed, again);
}

#[tokio::test]
async fn test_bounded_times_out_slow_calls() {
    let result = bounded(Duration::from_millis(10), "slow list", async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, eyre::Report>(1)
    })
    .await;

    let failure = result.unwrap_err();
    assert!(matches!(failure, FetchFailure::TimedOut(_)));
    assert!(matches!(AgendaError::from(failure), AgendaError::Timeout(_)));
}

#[tokio::test]
async fn test_bounded_wraps_backend_errors() {
    let result = bounded(Duration::from_secs(1), "session list", async {
        Err::<u32, _>(eyre::eyre!("502 Bad Gateway"))
    })
    .await;

    let failure = result.unwrap_err();
    assert!(failure.to_string().contains("session list failed"));
    assert!(failure.to_string().contains("502 Bad Gateway"));
    assert!(matches!(AgendaError::from(failure), AgendaError::Fetch(_)));
}
