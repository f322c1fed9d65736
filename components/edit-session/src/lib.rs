//! Streaming edit sessions for AI-assisted note edits.
//!
//! A [`StreamMergeCoordinator`] owns one [`EditSession`]: it receives the
//! model's output chunk by chunk, keeps a [`DiffView`](diff_engine::DiffView)
//! of the candidate against the original selection, records user edits on
//! suggested lines, reverts blocks on request, and finally splices the
//! result into the document or restores the document untouched.
//!
//! Everything here is synchronous and owns its state. Hosts that drive
//! sessions from several threads put each coordinator behind its own lock.

pub mod coordinator;
pub mod error;
pub mod ids;
pub mod selection;
pub mod session;

pub use coordinator::StreamMergeCoordinator;
pub use error::SessionError;
pub use ids::SessionId;
pub use selection::{Selection, locate_lines};
pub use session::{EditSession, SessionPhase};
