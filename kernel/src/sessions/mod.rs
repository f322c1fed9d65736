//! Session management for the Scrivener kernel.
//!
//! A [`SessionManager`] ties a token source and a document store to the
//! stream merge coordinators of the sessions it runs.

pub mod error;
pub mod manager;
pub mod task;

pub use error::ManagerError;
pub use manager::SessionManager;
pub use task::{EditTarget, EditTask};
