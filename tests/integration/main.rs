//! Crate-level integration tests.

mod properties;
mod session_flow;
mod state_transitions;
