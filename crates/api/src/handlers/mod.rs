//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers talk to the registry and dispatcher in [`AppState`] and map
//! errors via [`AppError`].
//!
//! [`AppState`]: crate::state::AppState
//! [`AppError`]: crate::error::AppError

pub mod forms;
pub mod reports;
pub mod tasks;
