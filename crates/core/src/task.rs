//! Background task and report records.
//!
//! A [`Task`] is created `running` by the registry and moved to `done`
//! exactly once by its worker. There is no failed state: a
//! failed model call still completes the task, carrying the error text as
//! its result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Owner, TaskId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Status message of a freshly submitted task.
pub const MSG_PROCESSING: &str = "processing";

/// Status message of a task whose worker has finished.
pub const MSG_COMPLETED: &str = "Completed";

/// Agent status reported when an owner has nothing running.
pub const AGENT_IDLE: &str = "idle";

/// Prefix of the agent status reported while tasks are running.
pub const AGENT_RUNNING_PREFIX: &str = "Running: ";

// ---------------------------------------------------------------------------
// TaskKind
// ---------------------------------------------------------------------------

/// Job categories accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    LeafAnalysis,
    Chat,
    ShopSearch,
    DoctorSearch,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::LeafAnalysis,
        TaskKind::Chat,
        TaskKind::ShopSearch,
        TaskKind::DoctorSearch,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::LeafAnalysis => "leaf_analysis",
            TaskKind::Chat => "chat",
            TaskKind::ShopSearch => "shop_search",
            TaskKind::DoctorSearch => "doctor_search",
        }
    }

    /// Lower-case label used in agent status summaries.
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::LeafAnalysis => "leaf analysis",
            TaskKind::Chat => "chat",
            TaskKind::ShopSearch => "shop search",
            TaskKind::DoctorSearch => "doctor search",
        }
    }

    /// Title given to the report produced by a task of this kind.
    pub fn report_title(self) -> &'static str {
        match self {
            TaskKind::LeafAnalysis => "Crop Diagnosis",
            TaskKind::Chat => "Agricultural Chat",
            TaskKind::ShopSearch => "Fertilizer Recommendations",
            TaskKind::DoctorSearch => "Plant Doctor Search",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown task kind '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Done,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Fully formed request supplied by the caller at submission time.
///
/// The dispatcher never builds the user prompt itself; it only wraps it
/// in the kind's system prompt (and, for leaf analysis, chains the
/// vision description into the diagnosis prompt).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// User message text.
    pub prompt: String,
    /// Optional `data:image/jpeg;base64,...` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Optional farm location, appended to the diagnosis prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TaskPayload {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Reject payloads that would send an empty user message.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() && self.image.is_none() {
            return Err(CoreError::Validation("Prompt must not be empty".into()));
        }
        if let Some(image) = &self.image {
            if !image.starts_with("data:image/") {
                return Err(CoreError::Validation(
                    "Image must be a data:image/... URI".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub owner: Owner,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub message: String,
    pub result: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    /// Kept for the worker; image data URIs are far too large to echo
    /// back in status responses.
    #[serde(skip)]
    pub payload: TaskPayload,
}

impl Task {
    /// A new task in the `running` state.
    pub fn running(id: TaskId, owner: Owner, kind: TaskKind, payload: TaskPayload) -> Self {
        Self {
            id,
            owner,
            kind,
            status: TaskStatus::Running,
            message: MSG_PROCESSING.to_string(),
            result: None,
            created_at: chrono::Utc::now(),
            completed_at: None,
            payload,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }
}

/// Terminal values a worker writes into its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    pub message: String,
    pub result: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Materialized output of a completed task, listed per owner.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub created_at: Timestamp,
    pub content: String,
    /// Back-reference to the originating task (lookup only).
    pub task_id: TaskId,
}

impl Report {
    pub fn from_task(task: &Task, created_at: Timestamp) -> Self {
        Self {
            title: task.kind.report_title().to_string(),
            created_at,
            content: task.result.clone().unwrap_or_default(),
            task_id: task.id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent status
// ---------------------------------------------------------------------------

/// Human-readable summary of what an owner's agent is doing.
///
/// `running` lists the kinds of the owner's running tasks; an empty
/// slice yields [`AGENT_IDLE`]. Repeated kinds are reported once.
pub fn summarize_agent_status(running: &[TaskKind]) -> String {
    if running.is_empty() {
        return AGENT_IDLE.to_string();
    }

    let mut labels: Vec<&str> = Vec::with_capacity(running.len());
    for kind in running {
        let label = kind.label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    format!("{AGENT_RUNNING_PREFIX}{}", labels.join(", "))
}
