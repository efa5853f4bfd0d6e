//! Fixed-size worker pool over a shared work cursor.
//!
//! N tokio tasks pull items from one bounded `async-channel`; the channel is
//! the cursor, so items are claimed in submission order even though they
//! finish in any order. Results come back on an unbounded mpsc channel.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Default last-resort limit per item. An item that hits it produces no
/// result, so callers with their own per-item timeout pass a longer one to
/// [`WorkerPool::start_with_timeout`].
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(300);

/// A pool of worker tasks processing items concurrently.
///
/// ```ignore
/// let cancel = Arc::new(AtomicBool::new(false));
/// let mut pool = WorkerPool::start(4, items, cancel, |item| async move {
///     process(item).await
/// });
///
/// while let Some(result) = pool.recv().await {
///     handle(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers and feed them `items` in order.
    ///
    /// Once `cancel` is set, workers stop claiming items and the pool drains
    /// after in-flight items finish. Unclaimed items produce no result.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, cancel: Arc<AtomicBool>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::start_with_timeout(n, items, cancel, SAFETY_TIMEOUT, process_fn)
    }

    /// Like [`WorkerPool::start`], dropping any item that runs longer than
    /// `item_timeout`.
    pub fn start_with_timeout<W, F, Fut>(
        n: usize,
        items: Vec<W>,
        cancel: Arc<AtomicBool>,
        item_timeout: Duration,
        process_fn: F,
    ) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|worker| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        if cancel.load(Ordering::Relaxed) {
                            log::debug!("Worker {}: cancelled, exiting", worker);
                            break;
                        }
                        match tokio::time::timeout(item_timeout, process_fn(item)).await {
                            Ok(r) => {
                                if result_tx.send(r).is_err() {
                                    break;
                                }
                            }
                            Err(_) => {
                                log::warn!(
                                    "Worker {}: item exceeded {}ms safety timeout, dropped",
                                    worker,
                                    item_timeout.as_millis()
                                );
                            }
                        }
                    }
                })
            })
            .collect();

        // Close the result channel once every worker has exited
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if cancel.load(Ordering::Relaxed) || work_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Self {
            result_rx,
            _handles: handles,
        }
    }

    /// Next finished result, or `None` once all workers have exited.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn processes_every_item_once() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut pool = WorkerPool::start(3, (0..20).collect(), cancel, |i: usize| async move {
            tokio::time::sleep(Duration::from_millis((20 - i as u64) % 4)).await;
            i * 2
        });
        let mut results = Vec::new();
        while let Some(r) = pool.recv().await {
            results.push(r);
        }
        results.sort();
        assert_eq!(results, (0..20).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cancel_stops_claiming_new_items() {
        let cancel = Arc::new(AtomicBool::new(false));
        let started = Arc::new(AtomicUsize::new(0));
        let flag = cancel.clone();
        let counter = started.clone();
        let mut pool = WorkerPool::start(2, (0..100).collect(), cancel, move |i: usize| {
            let flag = flag.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if i == 3 {
                    flag.store(true, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                i
            }
        });
        let mut received = 0;
        while pool.recv().await.is_some() {
            received += 1;
        }
        assert!(received < 100);
        assert_eq!(received, started.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn items_past_the_item_timeout_are_dropped() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut pool = WorkerPool::start_with_timeout(
            2,
            vec![10u64, 5_000, 20],
            cancel,
            Duration::from_secs(1),
            |ms| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                ms
            },
        );
        let mut results = Vec::new();
        while let Some(r) = pool.recv().await {
            results.push(r);
        }
        results.sort();
        assert_eq!(results, vec![10, 20]);
    }

    #[tokio::test]
    async fn zero_workers_is_clamped_to_one() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut pool = WorkerPool::start(0, vec![1, 2, 3], cancel, |i: u32| async move { i });
        let mut count = 0;
        while pool.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
