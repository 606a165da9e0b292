//! Configuration loader and schema types.
//!
//! All sync parameters live in an explicit [`Settings`] struct handed to the
//! orchestrator; there is no process-wide state.

mod load;
mod schema;

pub use schema::*;
