//! Generic poller for device operations that complete asynchronously.
//!
//! The device starts an operation on request and reports "still running"
//! until a result is ready, so the client polls a status endpoint on a fixed
//! interval under a wall-clock timeout. Both timers live in one owning task
//! and one biased `select!`, so cancelling the task cancels both atomically;
//! two overlapping poll loops for the same operation cannot exist.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Outcome of a single status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus<T> {
    InProgress,
    Complete(T),
}

/// A device operation that is started now and finishes later.
#[async_trait]
pub trait PolledOperation: Send + Sync {
    type Output: Send;

    /// Ask the device to start the operation.
    async fn begin(&self) -> Result<(), ClientError>;

    /// Ask the device whether the operation is still in progress and, if
    /// not, for its result.
    async fn poll(&self) -> Result<PollStatus<Self::Output>, ClientError>;
}

/// Lifecycle of one polled operation instance.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    Idle,
    Running,
    Succeeded(T),
    Failed(String),
    /// The client-side safety bound expired before the device reported
    /// completion. Distinct from `Failed` so callers can offer "try again".
    TimedOut,
}

impl<T> OperationState<T> {
    pub fn is_running(&self) -> bool {
        matches!(self, OperationState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Succeeded(_) | OperationState::Failed(_) | OperationState::TimedOut
        )
    }
}

/// Drives one [`PolledOperation`] through start, poll-until-done, timeout
/// and cancellation.
pub struct OperationPoller<O: PolledOperation> {
    operation: Arc<O>,
    poll_interval: Duration,
    timeout: Duration,
    state: Arc<Mutex<OperationState<O::Output>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<O> OperationPoller<O>
where
    O: PolledOperation + 'static,
    O::Output: Clone,
{
    pub fn new(operation: O, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            operation: Arc::new(operation),
            poll_interval,
            timeout,
            state: Arc::new(Mutex::new(OperationState::Idle)),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> OperationState<O::Output> {
        self.state.lock().unwrap().clone()
    }

    /// Start the operation and begin polling. A no-op with a warning while
    /// already Running; from any other state the previous run's handles are
    /// cancelled before reuse.
    pub async fn start(&self) {
        if self.state().is_running() {
            warn!("operation already running; start() ignored");
            return;
        }
        self.cancel_task();

        if let Err(e) = self.operation.begin().await {
            warn!("failed to start operation: {}", e);
            *self.state.lock().unwrap() = OperationState::Failed(e.to_string());
            return;
        }

        *self.state.lock().unwrap() = OperationState::Running;

        let operation = self.operation.clone();
        let state = self.state.clone();
        let poll_interval = self.poll_interval;
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut ticker = tokio::time::interval(poll_interval);

            loop {
                tokio::select! {
                    // On a tie the timeout wins: no poll is issued at or
                    // after the deadline.
                    biased;
                    _ = tokio::time::sleep_until(deadline) => {
                        debug!("operation timed out after {:?}", timeout);
                        *state.lock().unwrap() = OperationState::TimedOut;
                        break;
                    }
                    _ = ticker.tick() => match operation.poll().await {
                        Ok(PollStatus::InProgress) => {}
                        Ok(PollStatus::Complete(result)) => {
                            *state.lock().unwrap() = OperationState::Succeeded(result);
                            break;
                        }
                        Err(e) => {
                            warn!("operation poll failed: {}", e);
                            *state.lock().unwrap() = OperationState::Failed(e.to_string());
                            break;
                        }
                    }
                }
            }
        });

        *self.task.lock().unwrap() = Some(task);
    }

    /// Cancel polling. A Running operation resets to Idle; a terminal state
    /// stays readable until the next `start()`.
    pub fn stop(&self) {
        self.cancel_task();
        let mut state = self.state.lock().unwrap();
        if state.is_running() {
            *state = OperationState::Idle;
        }
    }

    fn cancel_task(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }
}

impl<O: PolledOperation> Drop for OperationPoller<O> {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted operation: reports "in progress" for a set number of polls,
    /// then completes (or errors).
    struct ScriptedOperation {
        in_progress_polls: usize,
        polls: AtomicUsize,
        begins: AtomicUsize,
        fail_begin: bool,
        fail_poll: bool,
    }

    impl ScriptedOperation {
        fn completing_after(in_progress_polls: usize) -> Self {
            Self {
                in_progress_polls,
                polls: AtomicUsize::new(0),
                begins: AtomicUsize::new(0),
                fail_begin: false,
                fail_poll: false,
            }
        }

        fn never_completing() -> Self {
            Self::completing_after(usize::MAX)
        }
    }

    #[async_trait]
    impl PolledOperation for ScriptedOperation {
        type Output = Vec<String>;

        async fn begin(&self) -> Result<(), ClientError> {
            self.begins.fetch_add(1, Ordering::SeqCst);
            if self.fail_begin {
                return Err(ClientError::Device("busy".to_string()));
            }
            Ok(())
        }

        async fn poll(&self) -> Result<PollStatus<Self::Output>, ClientError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if self.fail_poll {
                return Err(ClientError::Status {
                    path: "/api/wifi/scan".to_string(),
                    status: 500,
                });
            }
            if n < self.in_progress_polls {
                Ok(PollStatus::InProgress)
            } else {
                Ok(PollStatus::Complete(vec!["done".to_string()]))
            }
        }
    }

    fn poller(operation: ScriptedOperation) -> OperationPoller<ScriptedOperation> {
        OperationPoller::new(operation, Duration::from_secs(1), Duration::from_secs(15))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_fourteen_in_progress_polls() {
        let poller = poller(ScriptedOperation::completing_after(14));
        assert_eq!(poller.state(), OperationState::Idle);

        poller.start().await;
        assert!(poller.state().is_running());

        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(
            poller.state(),
            OperationState::Succeeded(vec!["done".to_string()])
        );
        // 14 "still running" responses plus the final "done": 15 requests.
        assert_eq!(poller.operation.polls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_polling() {
        let poller = poller(ScriptedOperation::never_completing());
        poller.start().await;

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(poller.state(), OperationState::TimedOut);
        // Polls at 0..=14 s; the deadline wins the 15 s tick. No 16th.
        assert_eq!(poller.operation.polls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_ignored() {
        let poller = poller(ScriptedOperation::never_completing());
        poller.start().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        poller.start().await;
        assert_eq!(poller.operation.begins.load(Ordering::SeqCst), 1);
        assert!(poller.state().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_from_terminal_state() {
        let poller = poller(ScriptedOperation::completing_after(0));
        poller.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(poller.state().is_terminal());

        poller.start().await;
        assert_eq!(poller.operation.begins.load(Ordering::SeqCst), 2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(matches!(poller.state(), OperationState::Succeeded(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_and_resets_to_idle() {
        let poller = poller(ScriptedOperation::never_completing());
        poller.start().await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        let polled_before = poller.operation.polls.load(Ordering::SeqCst);

        poller.stop();
        assert_eq!(poller.state(), OperationState::Idle);

        // Polling has genuinely stopped.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(poller.operation.polls.load(Ordering::SeqCst), polled_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_failure_is_terminal() {
        let mut operation = ScriptedOperation::completing_after(0);
        operation.fail_begin = true;
        let poller = poller(operation);

        poller.start().await;
        assert!(matches!(poller.state(), OperationState::Failed(_)));
        assert_eq!(poller.operation.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_is_distinct_from_timeout() {
        let mut operation = ScriptedOperation::never_completing();
        operation.fail_poll = true;
        let poller = poller(operation);

        poller.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        match poller.state() {
            OperationState::Failed(detail) => assert!(detail.contains("500")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
