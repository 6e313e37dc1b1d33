//! Error types for crew definition and execution.

use thiserror::Error;

/// Errors returned while validating or running a crew.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A task references an agent the crew does not define.
    #[error("task '{task}' references unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },
    /// A task dependency does not name an earlier task.
    ///
    /// Sequential crews require tasks listed in execution order, so a
    /// dependency must already have appeared in the list.
    #[error("task '{task}' depends on '{dependency}', which is not an earlier task")]
    UnresolvedDependency { task: String, dependency: String },
    /// Two tasks or two agents share a name.
    #[error("duplicate definition: {0}")]
    DuplicateName(String),
    /// The external execution engine failed.
    #[error("engine error: {0}")]
    Engine(String),
    /// Memory layer failure surfaced through the harness.
    #[error(transparent)]
    Memory(#[from] troupe_memory::MemoryError),
}
