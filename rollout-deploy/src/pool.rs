//! Bounded worker pool.
//!
//! `min(concurrency, n)` workers pull items from one FIFO queue, so at most
//! `concurrency` futures run at once and admission is first-come first-served.
//! Results arrive in completion order, not input order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Run `f` over every item with at most `concurrency` in flight.
///
/// Returns once every item has settled. Each item runs as its own task, so a
/// panic loses that item's result only and the worker moves on to the next
/// one; callers treat a missing result as a failure.
pub async fn run_bounded<T, R, F, Fut>(items: Vec<T>, concurrency: usize, f: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = concurrency.max(1).min(total);

    let (task_tx, task_rx) = mpsc::unbounded_channel::<T>();
    for item in items {
        // Receiver is alive until the workers below drop it.
        let _ = task_tx.send(item);
    }
    drop(task_tx);

    let queue = Arc::new(Mutex::new(task_rx));
    let f = Arc::new(f);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<R>();

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let queue = queue.clone();
        let f = f.clone();
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let next = queue.lock().await.recv().await;
                let Some(item) = next else {
                    break;
                };
                match tokio::spawn(f(item)).await {
                    Ok(result) => {
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::error!(worker, error = %err, "pool task panicked"),
                }
            }
            tracing::trace!(worker, "pool worker drained");
        }));
    }
    drop(result_tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }
    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "pool worker aborted");
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn empty_input_returns_immediately() {
        let out: Vec<u32> = run_bounded(Vec::<u32>::new(), 4, |x| async move { x }).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn every_item_yields_one_result() {
        let mut out = run_bounded((0..20).collect(), 3, |x: u32| async move { x * 2 }).await;
        out.sort_unstable();
        assert_eq!(out, (0..20).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn in_flight_never_exceeds_limit() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (c, p) = (current.clone(), peak.clone());
        run_bounded((0..12).collect::<Vec<u32>>(), 3, move |_| {
            let (c, p) = (c.clone(), p.clone());
            async move {
                let now = c.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                c.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let out = run_bounded(vec![1, 2, 3], 0, |x: u8| async move { x }).await;
        assert_eq!(out.len(), 3);
    }

    #[tokio::test]
    async fn panicking_task_loses_only_its_result() {
        let mut out = run_bounded(vec![1u8, 2, 3], 2, |x| async move {
            if x == 2 {
                panic!("boom");
            }
            x
        })
        .await;
        out.sort_unstable();
        assert_eq!(out, vec![1, 3]);
    }

    #[tokio::test]
    async fn panic_does_not_starve_the_queue() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let mut out = run_bounded(vec![1u8, 2, 3], 1, move |x| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if x == 1 {
                    panic!("first item fails");
                }
                x
            }
        })
        .await;
        out.sort_unstable();
        assert_eq!(out, vec![2, 3]);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }
}
