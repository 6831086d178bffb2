//! Effect runtime adapter
//!
//! The thin contract the engine needs from the cooperative task runtime:
//! issue a state update, delay, make a blocking sub-call, and run a program as
//! an externally cancellable task. Backed by tokio; run the engine on a
//! `current_thread` runtime for strictly single-threaded scheduling.

use crate::app::App;
use futures::FutureExt;
use moduleflow_core::Action;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Issue a state update
pub fn put(app: &App, action: Action) {
    app.dispatch(action);
}

/// Suspend for `duration`; a cancellation point
pub async fn delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Blocking sub-call: suspend until `future` completes and hand back its
/// result. A cancellation point.
pub async fn call<F: Future>(future: F) -> F::Output {
    future.await
}

/// A spawned, externally cancellable effect program
#[derive(Debug)]
pub struct EffectTask {
    handle: JoinHandle<()>,
}

impl EffectTask {
    /// Start `program` on the current runtime
    pub fn spawn<F>(program: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(program),
        }
    }

    /// Run `program` on the caller's stack up to its first suspension point,
    /// then continue it as a spawned task. Updates it issues before suspending
    /// are reduced before this returns. `None` when it already finished.
    pub fn fork<F>(program: F) -> Option<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No tokio runtime, effect program not started");
            return None;
        };
        let mut program = Box::pin(program);
        if (&mut program).now_or_never().is_some() {
            return None;
        }
        Some(Self {
            handle: runtime.spawn(program),
        })
    }

    /// Request cancellation. The program stops at its next suspension point
    /// and is never resumed; scoped guards it holds are dropped.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the program to finish or be cancelled
    pub async fn join(self) {
        match self.handle.await {
            Err(e) if e.is_panic() => warn!("Effect program panicked: {}", e),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pending_delay() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();
        let task = EffectTask::spawn(async move {
            delay(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        task.cancel();
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(task.is_finished());
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fork_runs_until_first_suspension() {
        let steps = Arc::new(AtomicUsize::new(0));
        let counter = steps.clone();
        let task = EffectTask::fork(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            delay(Duration::from_secs(2)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert_eq!(steps.load(Ordering::SeqCst), 1);
        task.join().await;
        assert_eq!(steps.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fork_of_synchronous_program_spawns_nothing() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let task = EffectTask::fork(async move {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(task.is_none());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_join_absorbs_panicked_program() {
        let task = EffectTask::spawn(async {
            panic!("lifecycle task exploded");
        });
        task.join().await;
    }

    #[tokio::test]
    async fn test_call_returns_sub_call_result() {
        let value = call(async { 21 * 2 }).await;
        assert_eq!(value, 42);
    }
}
