//! Dedicated thread pool that keeps CPU-bound fitting off the async runtime.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use regression_spi::{RegressionError, Result};
use tokio::sync::oneshot;
use tracing::error;

/// Runs blocking evaluation jobs on a rayon pool and hands results back as
/// futures.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// `threads: None` uses rayon's default (one per logical CPU).
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("regression-worker-{i}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads.max(1));
        }
        let pool = builder
            .build()
            .map_err(|e| RegressionError::Worker(e.to_string()))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` on the pool. A panicking job resolves to
    /// [`RegressionError::Worker`] instead of unwinding into the caller.
    pub async fn submit<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(job));
            // the receiver is gone when the request was abandoned
            let _ = tx.send(outcome);
        });

        match rx.await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "evaluation job panicked");
                Err(RegressionError::Worker(format!("job panicked: {message}")))
            }
            Err(_) => Err(RegressionError::Worker(
                "job dropped before completing".to_string(),
            )),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_returns_job_result() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        assert_eq!(pool.threads(), 2);
        let value = pool.submit(|| Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_job_error_is_passed_through() {
        let pool = WorkerPool::new(Some(1)).unwrap();
        let err = pool
            .submit::<_, ()>(|| Err(RegressionError::NoViableCandidate))
            .await
            .unwrap_err();
        assert!(matches!(err, RegressionError::NoViableCandidate));
    }

    #[tokio::test]
    async fn test_panic_becomes_worker_error() {
        let pool = WorkerPool::new(Some(1)).unwrap();
        let err = pool
            .submit::<_, ()>(|| panic!("boom"))
            .await
            .unwrap_err();
        match err {
            RegressionError::Worker(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_zero_threads_is_clamped() {
        let pool = WorkerPool::new(Some(0)).unwrap();
        assert_eq!(pool.threads(), 1);
    }
}
