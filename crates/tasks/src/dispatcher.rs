//! Worker dispatcher: one spawned worker per submitted task.
//!
//! There is no pool and no admission control; every submission is
//! accepted and gets its own Tokio task immediately. Workers hold no
//! registry lock while waiting on the model, and there is no per-task
//! cancellation. The dispatcher-wide [`CancellationToken`] exists only for
//! process shutdown, where interrupted workers still complete their task
//! (as `done`, with [`INTERRUPTED_RESULT`]). A panicking model likewise
//! completes its task with the panic message instead of leaving it running.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use croplens_core::error::CoreError;
use croplens_core::task::{Task, TaskKind, TaskPayload};
use croplens_core::types::TaskId;
use croplens_gateway::{ChatModel, ModelSelection};

use crate::outcome::{gateway_outcome_to_task_result, INTERRUPTED_RESULT, PANICKED_RESULT_PREFIX};
use crate::pipeline::run_pipeline;
use crate::registry::TaskRegistry;

/// Broadcast channel capacity for completion notices.
const COMPLETION_CHANNEL_CAPACITY: usize = 256;

/// Spawns and tracks task workers.
///
/// Created once at startup and shared via `Arc`.
pub struct TaskDispatcher {
    registry: Arc<dyn TaskRegistry>,
    model: Arc<dyn ChatModel>,
    models: ModelSelection,
    tracker: TaskTracker,
    cancel: CancellationToken,
    completed_tx: broadcast::Sender<TaskId>,
}

impl TaskDispatcher {
    pub fn new(
        registry: Arc<dyn TaskRegistry>,
        model: Arc<dyn ChatModel>,
        models: ModelSelection,
    ) -> Self {
        let (completed_tx, _) = broadcast::channel(COMPLETION_CHANNEL_CAPACITY);
        Self {
            registry,
            model,
            models,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            completed_tx,
        }
    }

    pub fn registry(&self) -> &Arc<dyn TaskRegistry> {
        &self.registry
    }

    /// Register a task and start its worker. Returns without waiting.
    pub async fn submit(&self, owner: &str, kind: TaskKind, payload: TaskPayload) -> Task {
        let task = self.registry.submit(owner, kind, payload).await;

        let worker = Worker {
            registry: Arc::clone(&self.registry),
            model: Arc::clone(&self.model),
            models: self.models.clone(),
            cancel: self.cancel.clone(),
            completed_tx: self.completed_tx.clone(),
        };
        let task_id = task.id.clone();
        self.tracker.spawn(async move { worker.run(task_id).await });

        tracing::info!(
            task_id = %task.id,
            owner,
            kind = %kind,
            in_flight = self.tracker.len(),
            "Task submitted",
        );

        task
    }

    /// Receive the id of every task as its worker finishes.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<TaskId> {
        self.completed_tx.subscribe()
    }

    /// Wait until `task_id` is done and return its final snapshot.
    ///
    /// Deterministic completion hook for tests and embedders; the HTTP
    /// layer polls [`TaskRegistry::get_status`] instead.
    pub async fn await_completion(&self, task_id: &str) -> Result<Task, CoreError> {
        // Subscribe before the first status read so a completion between
        // the read and the recv is not missed.
        let mut rx = self.completed_tx.subscribe();
        loop {
            let task = self.registry.get_status(task_id).await?;
            if !task.is_running() {
                return Ok(task);
            }
            match rx.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => {
                    return Err(CoreError::Internal(
                        "Completion channel closed while waiting".into(),
                    ))
                }
            }
        }
    }

    /// Number of workers still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Interrupt running workers and wait up to `grace` for them to finish.
    pub async fn shutdown(&self, grace: Duration) {
        tracing::info!(in_flight = self.tracker.len(), "Shutting down task dispatcher");
        self.cancel.cancel();
        self.tracker.close();

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                in_flight = self.tracker.len(),
                grace_secs = grace.as_secs(),
                "Workers still running after shutdown grace period",
            );
        } else {
            tracing::info!("Task dispatcher shut down complete");
        }
    }
}

/// Everything one worker needs, moved into its Tokio task.
struct Worker {
    registry: Arc<dyn TaskRegistry>,
    model: Arc<dyn ChatModel>,
    models: ModelSelection,
    cancel: CancellationToken,
    completed_tx: broadcast::Sender<TaskId>,
}

impl Worker {
    async fn run(self, task_id: TaskId) {
        let task = match self.registry.get_status(&task_id).await {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(
                    task_id = %task_id,
                    error = %e,
                    "Worker could not load its task",
                );
                return;
            }
        };

        let started = std::time::Instant::now();
        let pipeline = AssertUnwindSafe(run_pipeline(
            self.model.as_ref(),
            &self.models,
            task.kind,
            &task.payload,
        ))
        .catch_unwind();

        let outcome = tokio::select! {
            answer = pipeline => answer.unwrap_or_else(|panic| {
                let reason = panic_message(panic.as_ref());
                tracing::error!(task_id = %task_id, reason, "Model pipeline panicked");
                format!("{PANICKED_RESULT_PREFIX}{reason}")
            }),
            _ = self.cancel.cancelled() => {
                tracing::warn!(task_id = %task_id, "Worker interrupted by shutdown");
                INTERRUPTED_RESULT.to_string()
            }
        };

        match self
            .registry
            .complete(&task_id, gateway_outcome_to_task_result(outcome))
            .await
        {
            Ok(done) => tracing::info!(
                task_id = %done.id,
                owner = %done.owner,
                kind = %done.kind,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Task completed",
            ),
            Err(e) => tracing::error!(
                task_id = %task_id,
                error = %e,
                "Failed to record task completion",
            ),
        }

        // No receivers is normal.
        let _ = self.completed_tx.send(task_id);
    }
}

/// Text carried by a panic payload, if it is a string.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
