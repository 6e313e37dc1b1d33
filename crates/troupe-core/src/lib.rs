//! Thin crew definitions and the memory-aware run harness for troupe.
//!
//! Agents, tasks, and crews here are plain data handed to an external
//! [`ExecutionEngine`]; this crate owns only validation and the glue that
//! injects recalled memory into a run and stores the result back.

pub mod definition;
pub mod engine;
pub mod error;
pub mod harness;

/// Crew building blocks.
pub use definition::{AgentDefinition, CrewDefinition, Process, TaskDefinition};
/// Execution engine contract and input map.
pub use engine::{ExecutionEngine, RunInputs};
/// Core error type.
pub use error::CoreError;
/// Memory-aware crew runner and its context sizing.
pub use harness::{MemoryCrew, RunOptions};
