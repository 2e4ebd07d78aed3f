//! Task and report registry.
//!
//! [`TaskRegistry`] is the seam the dispatcher and the HTTP layer talk to.
//! [`InMemoryTaskRegistry`] keeps every record for the lifetime of the
//! process (no eviction, no persistence) behind a single mutex. The lock
//! is held only for the map/list operation itself, never across a model
//! call.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use croplens_core::error::CoreError;
use croplens_core::task::{
    summarize_agent_status, Report, Task, TaskCompletion, TaskKind, TaskPayload, TaskStatus,
};
use croplens_core::types::{Owner, TaskId};

use crate::ids::TaskIdGenerator;

#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Record a new `running` task and return its snapshot.
    ///
    /// Does not perform the work; the task is visible to
    /// [`get_status`](Self::get_status) as soon as this returns.
    async fn submit(&self, owner: &str, kind: TaskKind, payload: TaskPayload) -> Task;

    /// Snapshot of a task, or `NotFound` for an id never issued.
    async fn get_status(&self, task_id: &str) -> Result<Task, CoreError>;

    /// Move a running task to `done` and prepend its report.
    ///
    /// Returns `Conflict` if the task already completed, so a task can
    /// only ever be finished once.
    async fn complete(&self, task_id: &str, completion: TaskCompletion)
        -> Result<Task, CoreError>;

    /// Owner's reports, most recently completed first. Empty for unknown owners.
    async fn list_reports(&self, owner: &str) -> Vec<Report>;

    /// Owner's tasks, most recently submitted first.
    async fn list_tasks(&self, owner: &str) -> Vec<Task>;

    /// `"idle"` or a summary naming the owner's running task kinds.
    async fn agent_status(&self, owner: &str) -> String;

    /// Number of running tasks across all owners.
    async fn running_count(&self) -> usize;
}

#[derive(Default)]
struct RegistryState {
    tasks: HashMap<TaskId, Task>,
    /// Task ids per owner, in submission order.
    by_owner: HashMap<Owner, Vec<TaskId>>,
    /// Reports per owner, newest first.
    reports: HashMap<Owner, VecDeque<Report>>,
}

/// Process-lifetime registry guarded by one lock.
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    state: Mutex<RegistryState>,
    ids: TaskIdGenerator,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn submit(&self, owner: &str, kind: TaskKind, payload: TaskPayload) -> Task {
        let task = Task::running(self.ids.next_id(owner), owner.to_string(), kind, payload);

        let mut state = self.state.lock().await;
        state
            .by_owner
            .entry(task.owner.clone())
            .or_default()
            .push(task.id.clone());
        state.tasks.insert(task.id.clone(), task.clone());
        drop(state);

        tracing::debug!(task_id = %task.id, owner, kind = %kind, "Task registered");
        task
    }

    async fn get_status(&self, task_id: &str) -> Result<Task, CoreError> {
        self.state
            .lock()
            .await
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| not_found(task_id))
    }

    async fn complete(
        &self,
        task_id: &str,
        completion: TaskCompletion,
    ) -> Result<Task, CoreError> {
        let mut state = self.state.lock().await;

        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| not_found(task_id))?;

        if task.status == TaskStatus::Done {
            return Err(CoreError::Conflict(format!(
                "Task {task_id} has already completed"
            )));
        }

        let now = chrono::Utc::now();
        task.status = TaskStatus::Done;
        task.message = completion.message;
        task.result = Some(completion.result);
        task.completed_at = Some(now);

        let snapshot = task.clone();
        state
            .reports
            .entry(snapshot.owner.clone())
            .or_default()
            .push_front(Report::from_task(&snapshot, now));

        Ok(snapshot)
    }

    async fn list_reports(&self, owner: &str) -> Vec<Report> {
        self.state
            .lock()
            .await
            .reports
            .get(owner)
            .map(|reports| reports.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn list_tasks(&self, owner: &str) -> Vec<Task> {
        let state = self.state.lock().await;
        state
            .by_owner
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .rev()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn agent_status(&self, owner: &str) -> String {
        let state = self.state.lock().await;
        let running: Vec<TaskKind> = state
            .by_owner
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id))
                    .filter(|t| t.is_running())
                    .map(|t| t.kind)
                    .collect()
            })
            .unwrap_or_default();
        drop(state);

        summarize_agent_status(&running)
    }

    async fn running_count(&self) -> usize {
        self.state
            .lock()
            .await
            .tasks
            .values()
            .filter(|t| t.is_running())
            .count()
    }
}

fn not_found(task_id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Task",
        id: task_id.to_string(),
    }
}
