use std::sync::Arc;

use croplens_tasks::{TaskDispatcher, TaskRegistry};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Task/report registry, read by status and report handlers.
    pub registry: Arc<dyn TaskRegistry>,
    /// Spawns one worker per submitted task.
    pub dispatcher: Arc<TaskDispatcher>,
}

impl AppState {
    /// Build state around a dispatcher, sharing its registry.
    pub fn new(config: ServerConfig, dispatcher: Arc<TaskDispatcher>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::clone(dispatcher.registry()),
            dispatcher,
        }
    }
}
