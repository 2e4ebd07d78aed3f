//! Background task registry and worker dispatcher.
//!
//! Long-running model pipelines are decoupled from request handling:
//! [`TaskDispatcher::submit`] records a running task and spawns one worker
//! for it; callers poll the [`TaskRegistry`] for status, agent activity
//! and accumulated reports.

pub mod dispatcher;
pub mod ids;
pub mod outcome;
pub mod pipeline;
pub mod registry;

pub use dispatcher::TaskDispatcher;
pub use registry::{InMemoryTaskRegistry, TaskRegistry};
