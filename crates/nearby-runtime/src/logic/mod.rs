//! Core logic: the owner state and the task that drives it

pub mod state;
pub mod task;

pub use state::{CoreState, CoreStats};
pub use task::CoreTask;
