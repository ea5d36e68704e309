//! The concurrent scan pipeline.

pub mod scheduler;

pub use scheduler::Scheduler;
