//! Execution engine contract for the external orchestration framework.

use crate::definition::CrewDefinition;
use crate::error::CoreError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Named inputs interpolated into task descriptions by the engine.
pub type RunInputs = HashMap<String, String>;

/// Black-box engine that runs a crew and returns its final text result.
///
/// The harness never inspects intermediate agent traffic: the engine is
/// handed the crew definition plus named inputs and owns agent sequencing
/// and LLM invocation end to end.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Run the crew to completion and return the final textual result.
    async fn kickoff(&self, crew: &CrewDefinition, inputs: &RunInputs) -> Result<String, CoreError>;
}
