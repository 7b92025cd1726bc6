//! FIFO ordering for outgoing persistence calls.
//!
//! Writes must reach the backend in the order they were issued, even when the
//! caller does not await them. Every job runs on its own task, one at a time,
//! so a job that fails or panics never blocks the ones behind it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, SheetError};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Decrements the pending counter when the job settles or is dropped.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct WriteQueue {
    tx: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

impl WriteQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn new() -> WriteQueue {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(e) = tokio::spawn(job).await {
                    tracing::warn!(error = %e, "queued write panicked");
                }
            }
        });
        WriteQueue {
            tx,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a job. It is counted as pending immediately; the returned future
    /// resolves with the job's own result once it has run.
    pub fn enqueue<T, F>(&self, job: F) -> impl Future<Output = Result<T>> + use<T, F>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(Arc::clone(&self.pending));
        let (done_tx, done_rx) = oneshot::channel();

        let queued: Job = Box::pin(async move {
            let result = job.await;
            drop(guard);
            let _ = done_tx.send(result);
        });
        // A closed channel drops the job, and the guard with it.
        let sent = self.tx.send(queued).is_ok();

        async move {
            if !sent {
                return Err(SheetError::QueueClosed);
            }
            done_rx.await.unwrap_or(Err(SheetError::QueueClosed))
        }
    }

    /// Jobs queued and not yet settled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }

    /// Wait until every job queued before this call has settled.
    pub async fn flush(&self) -> Result<()> {
        self.enqueue(async { Ok(()) }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_jobs_run_in_fifo_order() {
        let queue = WriteQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for (i, delay) in [30_u64, 0, 10].into_iter().enumerate() {
            let log = Arc::clone(&log);
            handles.push(queue.enqueue(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                log.lock().unwrap().push(i);
                Ok(i)
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), i);
        }
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_pending_counts_at_enqueue_time() {
        let queue = WriteQueue::new();
        let first = queue.enqueue(async { Ok(()) });
        let second = queue.enqueue(async { Ok(()) });
        assert_eq!(queue.pending(), 2);
        assert!(queue.has_pending());

        first.await.unwrap();
        second.await.unwrap();
        queue.flush().await.unwrap();
        assert_eq!(queue.pending(), 0);
        assert!(!queue.has_pending());
    }

    #[tokio::test]
    async fn test_failure_does_not_block_later_jobs() {
        let queue = WriteQueue::new();
        let failing = queue.enqueue(async { Err::<(), _>(SheetError::SheetNotFound("s".into())) });
        let next = queue.enqueue(async { Ok(5) });
        assert!(matches!(failing.await, Err(SheetError::SheetNotFound(_))));
        assert_eq!(next.await.unwrap(), 5);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_panicking_job_is_isolated() {
        let queue = WriteQueue::new();
        let panicking = queue.enqueue(async {
            if true {
                panic!("backend exploded");
            }
            Ok(())
        });
        let next = queue.enqueue(async { Ok("still running") });
        assert!(matches!(panicking.await, Err(SheetError::QueueClosed)));
        assert_eq!(next.await.unwrap(), "still running");
        queue.flush().await.unwrap();
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_unawaited_jobs_still_run() {
        let queue = WriteQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = Arc::clone(&log);
            drop(queue.enqueue(async move {
                log.lock().unwrap().push(i);
                Ok(())
            }));
        }
        queue.flush().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }
}
