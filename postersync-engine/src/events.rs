//! Progress events and the loop that drives a sync task while a
//! frontend consumes them.

use std::future::Future;

use postersync_core::ImageKind;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::reconcile::SyncOutcome;

/// Emitted by the engine as it works through a target. Consumed by the
/// CLI spinner; safe to drop on the floor when nobody is listening.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    TargetStarted {
        title: String,
    },
    FetchingSets {
        title: String,
    },
    UsingSet {
        title: String,
        set_title: String,
        username: String,
    },
    Uploading {
        title: String,
        label: String,
        kind: ImageKind,
    },
    ImageFailed {
        title: String,
        label: String,
        kind: ImageKind,
        message: String,
    },
    TargetFinished {
        title: String,
        outcome: SyncOutcome,
    },
}

/// How long to keep draining events after the task completes. Senders
/// held by detached tasks must not block the frontend forever.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Drive `task` to completion while feeding each received event to
/// `on_event`, then drain whatever is left on the channel.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut result = None;

    loop {
        tokio::select! {
            r = &mut task, if result.is_none() => {
                result = Some(r);
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(e) => on_event(e),
                    // channel closed before the task finished
                    None => break,
                }
            }
        }
    }

    if result.is_some() {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, event_rx.recv()).await {
                Ok(Some(e)) => on_event(e),
                Ok(None) => break,
                Err(_) => {
                    log::warn!(
                        "event drain timed out after {}s, a sender was likely leaked",
                        DRAIN_TIMEOUT.as_secs()
                    );
                    break;
                }
            }
        }
    }

    match result {
        Some(r) => r,
        None => task.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_events_and_returns_task_result() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = async move {
            for i in 0..3 {
                tx.send(i).unwrap();
            }
            "done"
        };
        let mut seen = Vec::new();
        let result = run_with_events(task, rx, |e| seen.push(e)).await;
        assert_eq!(result, "done");
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn survives_channel_closing_early() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        drop(tx);
        let result = run_with_events(async { 7 }, rx, |_| {}).await;
        assert_eq!(result, 7);
    }
}
