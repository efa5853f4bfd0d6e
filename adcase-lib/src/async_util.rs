//! Drive an async task while consuming its progress events.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::Duration;

/// How long to keep draining events after the task finishes. Guards against
/// a sender clone leaked into a detached task.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, calling `on_event` for every event it sends.
///
/// Events still queued when the task returns are delivered before this
/// function returns, so a final summary never races its last progress line.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut channel_open = true;

    let result = loop {
        tokio::select! {
            r = &mut task => break r,
            event = event_rx.recv(), if channel_open => match event {
                Some(e) => on_event(e),
                None => channel_open = false,
            },
        }
    };

    if channel_open {
        let drain = async {
            while let Some(e) = event_rx.recv().await {
                on_event(e);
            }
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            log::warn!(
                "Event channel still open {}s after task finished",
                DRAIN_TIMEOUT.as_secs()
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_all_events_before_returning() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = async move {
            for i in 0..10 {
                tx.send(i).unwrap();
                tokio::task::yield_now().await;
            }
            "done"
        };
        let mut seen = Vec::new();
        let result = run_with_events(task, rx, |e| seen.push(e)).await;
        assert_eq!(result, "done");
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn task_finishing_after_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel::<u8>();
        drop(tx);
        let task = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            42
        };
        let result = run_with_events(task, rx, |_| {}).await;
        assert_eq!(result, 42);
    }
}
