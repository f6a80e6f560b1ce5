//! Session orchestration: the state machine driving one deck build.
//!
//! [`SessionFlow`] owns the model gateway and deck backend behind trait
//! objects and walks a session through language selection, input capture,
//! mode choice, entry editing and submission. [`SessionState`] is the
//! structural state; every operation validates the current state before
//! acting and rolls back to the preceding state on failure.

pub mod flow;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use flow::{SessionError, SessionFlow};
pub use state::SessionState;
