//! Task dispatcher: one worker thread per submission, results marshaled
//! back to the event loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use testbed_core::{Outcome, WorkItemId, WorkStatus};

use crate::audit::{AuditLevel, AuditLog};
use crate::error::HalError;
use crate::queue::DeferredQueue;

/// A unit of background work, created at submission and consumed by its
/// worker thread.
struct WorkItem<W> {
    id: WorkItemId,
    label: String,
    payload: W,
    started_at: DateTime<Utc>,
}

/// Handle returned by [`TaskDispatcher::submit`].
///
/// Observes the work item's lifecycle; offers no cancellation.
#[derive(Debug, Clone)]
pub struct WorkItemHandle {
    id: WorkItemId,
    label: String,
    submitted_at: DateTime<Utc>,
    status: Arc<Mutex<WorkStatus>>,
}

impl WorkItemHandle {
    /// The work item's unique id.
    pub fn id(&self) -> &WorkItemId {
        &self.id
    }

    /// The human-readable label (component name) this work was submitted
    /// under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the work item was submitted.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Current lifecycle status.
    pub fn status(&self) -> WorkStatus {
        *self.status.lock().unwrap()
    }
}

/// Runs blocking work off the UI thread and guarantees its outcome reaches
/// the UI thread through the deferred-callback queue.
///
/// One dedicated worker thread is spawned per submission; there is no pool
/// and no reuse. `S` is the UI-state type the delivered callbacks mutate.
pub struct TaskDispatcher<S: 'static> {
    queue: Arc<dyn DeferredQueue<S>>,
    audit: Arc<AuditLog>,
}

impl<S: 'static> Clone for TaskDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<S: 'static> TaskDispatcher<S> {
    /// Create a dispatcher delivering into `queue`, auditing to `audit`.
    pub fn new(queue: Arc<dyn DeferredQueue<S>>, audit: Arc<AuditLog>) -> Self {
        Self { queue, audit }
    }

    /// Submit a unit of work for background execution.
    ///
    /// Returns immediately; never blocks the caller. The payload runs on a
    /// fresh worker thread and must not touch UI state; it only produces a
    /// value. When it finishes (normally, with an error, or by panicking),
    /// exactly one deferred callback is scheduled, wrapping `on_complete`
    /// with the [`Outcome`]. A payload error or panic becomes a failure
    /// outcome; nothing escapes the worker thread.
    ///
    /// If the event loop is already gone the outcome is logged and dropped.
    pub fn submit<W, F>(&self, label: impl Into<String>, work: W, on_complete: F) -> WorkItemHandle
    where
        W: FnOnce() -> Result<String, HalError> + Send + 'static,
        F: FnOnce(Outcome, &mut S) + Send + 'static,
    {
        let label = label.into();
        let item = WorkItem {
            id: WorkItemId::generate(),
            label: label.clone(),
            payload: work,
            started_at: Utc::now(),
        };
        let handle = WorkItemHandle {
            id: item.id.clone(),
            label,
            submitted_at: item.started_at,
            status: Arc::new(Mutex::new(WorkStatus::Submitted)),
        };

        let status = Arc::clone(&handle.status);
        let queue = Arc::clone(&self.queue);
        let audit = Arc::clone(&self.audit);

        thread::spawn(move || {
            set_status(&status, WorkStatus::Running);
            audit.record(
                AuditLevel::Info,
                &format!("AUDIT: Starting validation -> {}", item.label),
            );

            let started_at = item.started_at;
            let outcome = execute(item);
            let duration_ms = (Utc::now() - started_at).num_milliseconds();

            if outcome.is_failure() {
                set_status(&status, WorkStatus::Failed);
                audit.record(
                    AuditLevel::Error,
                    &format!("AUDIT: Result - {} ({} ms)", outcome.value, duration_ms),
                );
            } else {
                set_status(&status, WorkStatus::Completed);
                audit.record(
                    AuditLevel::Info,
                    &format!("AUDIT: Result - {} ({} ms)", outcome.value, duration_ms),
                );
            }

            let delivered_status = Arc::clone(&status);
            let scheduled = queue.schedule(Box::new(move |state| {
                set_status(&delivered_status, WorkStatus::Delivered);
                on_complete(outcome, state);
            }));

            if scheduled.is_err() {
                warn!("Failed to deliver outcome - event loop gone");
                audit.record(AuditLevel::Warn, "AUDIT: Outcome dropped, UI closed");
            }
        });

        handle
    }
}

/// Run a work item's payload at the worker boundary.
///
/// Converts `Err` and panics into failure outcomes so no fault can escape
/// the worker thread.
fn execute<W>(item: WorkItem<W>) -> Outcome
where
    W: FnOnce() -> Result<String, HalError>,
{
    let WorkItem {
        id, label, payload, ..
    } = item;

    match panic::catch_unwind(AssertUnwindSafe(payload)) {
        Ok(Ok(value)) => {
            debug!(id = %id, "Work completed");
            Outcome::success(id, value)
        }
        Ok(Err(err)) => {
            debug!(id = %id, error = %err, "Work returned an error");
            Outcome::failure(id, &label, err.to_string())
        }
        Err(cause) => {
            let detail = panic_detail(cause.as_ref());
            debug!(id = %id, detail = %detail, "Work panicked");
            Outcome::failure(id, &label, detail)
        }
    }
}

fn set_status(cell: &Arc<Mutex<WorkStatus>>, status: WorkStatus) {
    *cell.lock().unwrap() = status;
}

fn panic_detail(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{CallbackQueue, CallbackReceiver};
    use std::collections::HashSet;
    use std::thread::ThreadId;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct TestState {
        results: Vec<String>,
        status_message: String,
        callback_threads: Vec<ThreadId>,
    }

    fn dispatcher_pair() -> (TaskDispatcher<TestState>, CallbackReceiver<TestState>) {
        let (tx, rx) = CallbackQueue::unbounded();
        let dispatcher = TaskDispatcher::new(Arc::new(tx), Arc::new(AuditLog::disabled()));
        (dispatcher, rx)
    }

    async fn drain_one(rx: &mut CallbackReceiver<TestState>, state: &mut TestState) {
        let callback = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("queue closed");
        callback(state);
    }

    #[tokio::test]
    async fn test_end_to_end_delivery() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();

        let handle = dispatcher.submit(
            "Component X",
            || Ok("Component X: OK".to_string()),
            |outcome, state: &mut TestState| state.results.push(outcome.value),
        );

        drain_one(&mut rx, &mut state).await;

        assert_eq!(state.results, vec!["Component X: OK".to_string()]);
        assert_eq!(handle.status(), WorkStatus::Delivered);
        assert!(handle.status().is_terminal());
    }

    #[tokio::test]
    async fn test_exactly_one_delivery_per_submission() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();
        let mut submitted = HashSet::new();

        for n in 0..10 {
            let handle = dispatcher.submit(
                format!("Component_{n}"),
                move || Ok(format!("Component_{n}: OK")),
                |outcome, state: &mut TestState| {
                    state.results.push(outcome.work_item_id.into_inner());
                },
            );
            submitted.insert(handle.id().clone().into_inner());
        }

        for _ in 0..10 {
            drain_one(&mut rx, &mut state).await;
        }

        let delivered: HashSet<_> = state.results.iter().cloned().collect();
        assert_eq!(delivered.len(), 10, "deliveries must be distinct");
        assert_eq!(delivered, submitted);

        // No duplicate delivery shows up afterwards.
        let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra delivery");
    }

    #[tokio::test]
    async fn test_callbacks_run_on_event_loop_thread() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();
        let loop_thread = std::thread::current().id();

        for n in 0..100 {
            dispatcher.submit(
                format!("Component_{n}"),
                || Ok("ok".to_string()),
                |_outcome, state: &mut TestState| {
                    state.callback_threads.push(std::thread::current().id());
                },
            );
        }

        for _ in 0..100 {
            drain_one(&mut rx, &mut state).await;
        }

        assert_eq!(state.callback_threads.len(), 100);
        assert!(state.callback_threads.iter().all(|id| *id == loop_thread));
    }

    #[tokio::test]
    async fn test_panicking_work_becomes_failure_outcome() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();

        let handle = dispatcher.submit(
            "IMU_Sensor",
            || panic!("sensor exploded"),
            |outcome, state: &mut TestState| state.results.push(outcome.value),
        );

        drain_one(&mut rx, &mut state).await;

        assert_eq!(state.results.len(), 1);
        assert!(state.results[0].contains("FAILED"));
        assert!(state.results[0].contains("sensor exploded"));
        assert_eq!(handle.status(), WorkStatus::Delivered);
    }

    #[tokio::test]
    async fn test_hal_error_becomes_failure_outcome() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();

        dispatcher.submit(
            "Torque_Sensor_01",
            || {
                Err(HalError::BusTimeout {
                    component: "Torque_Sensor_01".to_string(),
                    waited_ms: 1500,
                })
            },
            |outcome, state: &mut TestState| state.results.push(outcome.value),
        );

        drain_one(&mut rx, &mut state).await;

        assert!(state.results[0].contains("FAILED"));
        assert!(state.results[0].contains("bus timeout"));
    }

    #[tokio::test]
    async fn test_submit_does_not_block() {
        let (dispatcher, _rx) = dispatcher_pair();

        let before = Instant::now();
        let handle = dispatcher.submit(
            "Slow_Component",
            || {
                std::thread::sleep(Duration::from_secs(2));
                Ok("Slow_Component: OK".to_string())
            },
            |_outcome, _state| {},
        );
        let elapsed = before.elapsed();

        assert!(
            elapsed < Duration::from_millis(100),
            "submit blocked for {elapsed:?}"
        );
        assert!(handle.status().is_active());
    }

    #[tokio::test]
    async fn test_last_completed_wins_on_shared_surface() {
        let (dispatcher, mut rx) = dispatcher_pair();
        let mut state = TestState::default();

        // Submitted first, finishes last.
        dispatcher.submit(
            "Slow_Component",
            || {
                std::thread::sleep(Duration::from_millis(150));
                Ok("Slow_Component: OK".to_string())
            },
            |outcome, state: &mut TestState| state.status_message = outcome.value,
        );
        dispatcher.submit(
            "Fast_Component",
            || {
                std::thread::sleep(Duration::from_millis(10));
                Ok("Fast_Component: OK".to_string())
            },
            |outcome, state: &mut TestState| state.status_message = outcome.value,
        );

        drain_one(&mut rx, &mut state).await;
        drain_one(&mut rx, &mut state).await;

        assert_eq!(state.status_message, "Slow_Component: OK");
    }

    #[tokio::test]
    async fn test_dropped_event_loop_is_survived() {
        let (dispatcher, rx) = dispatcher_pair();
        drop(rx);

        let handle = dispatcher.submit(
            "Component X",
            || Ok("Component X: OK".to_string()),
            |_outcome, _state| {},
        );

        // The worker finishes and drops the outcome without crashing; the
        // work is never marked Delivered.
        for _ in 0..100 {
            if handle.status().has_finished_work() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(handle.status(), WorkStatus::Completed);
    }
}
