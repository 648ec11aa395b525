//! The executor seam used by the non-blocking calling conventions.
//!
//! Submitting work through a trait object keeps the dispatcher free of a
//! hard runtime dependency; tests substitute their own executor to observe
//! or serialize spawned work.

use futures::future::BoxFuture;

/// Spawns fire-and-forget futures on behalf of the client.
pub trait Executor: Send + Sync {
    fn spawn(&self, future: BoxFuture<'static, ()>);
}

/// The default executor: `tokio::spawn` onto the ambient runtime.
///
/// # Panics
///
/// Spawning panics outside a tokio runtime context, matching
/// `tokio::spawn` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

impl TokioExecutor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, future: BoxFuture<'static, ()>) {
        tokio::spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tokio_executor_runs_spawned_work() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let (tx, rx) = tokio::sync::oneshot::channel();

        TokioExecutor::new().spawn(Box::pin(async move {
            flag.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }));

        rx.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
