//! Domain types shared by the Croplens gateway, task and API crates.
//!
//! Zero internal dependencies: everything here is plain data, constants
//! and pure functions.

pub mod error;
pub mod extract;
pub mod prompts;
pub mod task;
pub mod types;
