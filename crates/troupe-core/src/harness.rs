//! Memory-aware crew runner.
//!
//! Wraps a crew definition, an execution engine, and a semantic index so
//! every run is primed with recalled context and its result is stored back
//! for future runs.

use crate::definition::CrewDefinition;
use crate::engine::{ExecutionEngine, RunInputs};
use crate::error::CoreError;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use troupe_memory::{MemoryAnalytics, RecordKind, SemanticIndex};

/// How many recent interactions are replayed into an echo-style run.
const RECENT_CONTEXT_LIMIT: usize = 3;

/// How many semantic matches are injected into a research run.
const RESEARCH_CONTEXT_LIMIT: usize = 3;

/// Inputs shorter than this are not worth remembering as facts.
const FACT_MIN_CHARS: usize = 5;

/// Context sizing for a crew's runs.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Recent interactions replayed into [`MemoryCrew::run_with_memory`].
    pub recent_limit: usize,
    /// Semantic matches injected by [`MemoryCrew::run_research`].
    pub context_limit: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            recent_limit: RECENT_CONTEXT_LIMIT,
            context_limit: RESEARCH_CONTEXT_LIMIT,
        }
    }
}

/// A crew bound to an engine and a persistent semantic memory.
///
/// Crew-level records are keyed by the crew name: the whole crew acts as one
/// remembering actor, while cross-agent retrieval still sees entries other
/// crews sharing the same store have written.
pub struct MemoryCrew {
    crew: CrewDefinition,
    engine: Arc<dyn ExecutionEngine>,
    memory: SemanticIndex,
    options: RunOptions,
}

impl MemoryCrew {
    /// Bind a validated crew to an engine and memory with default options.
    pub fn new(
        crew: CrewDefinition,
        engine: Arc<dyn ExecutionEngine>,
        memory: SemanticIndex,
    ) -> Result<Self, CoreError> {
        Self::with_options(crew, engine, memory, RunOptions::default())
    }

    /// Bind a validated crew with explicit context sizing.
    pub fn with_options(
        crew: CrewDefinition,
        engine: Arc<dyn ExecutionEngine>,
        memory: SemanticIndex,
        options: RunOptions,
    ) -> Result<Self, CoreError> {
        crew.validate()?;
        Ok(Self {
            crew,
            engine,
            memory,
            options,
        })
    }

    /// The crew definition this runner executes.
    pub fn crew(&self) -> &CrewDefinition {
        &self.crew
    }

    /// Read access to the underlying memory.
    pub fn memory(&self) -> &SemanticIndex {
        &self.memory
    }

    /// Run the crew on a single input, replaying recent interactions.
    ///
    /// The previous few input/output pairs are prepended to the engine input
    /// so the crew can refer back to them; the new interaction is stored
    /// afterwards, along with a fact for inputs long enough to matter.
    pub async fn run_with_memory(&mut self, input: &str) -> Result<String, CoreError> {
        let context_input = {
            let recent = self
                .memory
                .recent_interactions(&self.crew.name, self.options.recent_limit);
            if recent.is_empty() {
                input.to_string()
            } else {
                let mut lines = vec!["Previous interactions:".to_string()];
                for interaction in recent {
                    lines.push(format!(
                        "- Input: {}, Output: {}",
                        interaction.input, interaction.output
                    ));
                }
                lines.push(format!("Current input: {input}"));
                lines.join("\n")
            }
        };

        let mut inputs = RunInputs::new();
        inputs.insert("input_message".to_string(), context_input);
        let output = self.engine.kickoff(&self.crew, &inputs).await?;
        info!(
            "crew run complete (crew={}, output_len={})",
            self.crew.name,
            output.len()
        );

        self.memory.store_interaction(&self.crew.name, input, &output);
        if input.chars().count() > FACT_MIN_CHARS {
            self.memory
                .store_fact(&self.crew.name, &format!("User said: {input}"));
        }
        Ok(output)
    }

    /// Run the crew's research workflow on a topic.
    ///
    /// Prior relevant memories are formatted into a `context` input, the
    /// result is stored as an interaction, and durable facts are lifted out
    /// of the report by keyword heuristic.
    pub async fn run_research(&mut self, topic: &str) -> Result<String, CoreError> {
        let context = self.research_context(topic);

        let mut inputs = RunInputs::new();
        inputs.insert("topic".to_string(), topic.to_string());
        inputs.insert("current_year".to_string(), Utc::now().format("%Y").to_string());
        if !context.is_empty() {
            inputs.insert(
                "context".to_string(),
                format!("\n\nPrevious research context:\n{context}"),
            );
        }

        let output = self.engine.kickoff(&self.crew, &inputs).await?;
        self.memory.store_interaction(
            &self.crew.name,
            &format!("Research topic: {topic}"),
            &output,
        );
        self.extract_and_store_facts(topic, &output);
        Ok(output)
    }

    /// Combined structured and embedding analytics.
    pub fn memory_analytics(&self) -> MemoryAnalytics {
        self.memory.memory_analytics()
    }

    /// Flush unsaved embeddings and release the memory.
    pub fn close(self) -> Result<(), CoreError> {
        self.memory.close()?;
        Ok(())
    }

    /// Format prior relevant memories for prompt injection.
    fn research_context(&self, topic: &str) -> String {
        let hits = self
            .memory
            .relevant_context(&self.crew.name, topic, self.options.context_limit);
        if hits.is_empty() {
            return String::new();
        }
        debug!(
            "injecting research context (crew={}, hits={})",
            self.crew.name,
            hits.len()
        );
        let mut lines = vec!["Previous relevant research context:".to_string()];
        for hit in &hits {
            let source = hit.source.map(|s| s.as_str()).unwrap_or("unknown");
            match hit.metadata.kind {
                RecordKind::Fact => lines.push(format!(
                    "- [{source}, {:.2}] Fact: {}",
                    hit.similarity,
                    hit.metadata.fact.as_deref().unwrap_or_default()
                )),
                RecordKind::Interaction => lines.push(format!(
                    "- [{source}, {:.2}] Previous research: {}",
                    hit.similarity,
                    hit.metadata.input.as_deref().unwrap_or_default()
                )),
            }
        }
        lines.join("\n")
    }

    /// Keyword heuristic lifting durable facts out of a research report.
    fn extract_and_store_facts(&mut self, topic: &str, output: &str) {
        let lowered = output.to_lowercase();
        if lowered.contains("key findings") {
            self.memory.store_fact(
                &self.crew.name,
                &format!("Research completed on {topic} with comprehensive findings"),
            );
        }
        if lowered.contains("sources") || lowered.contains("references") {
            self.memory.store_fact(
                &self.crew.name,
                &format!("Authoritative sources identified for {topic} research"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryCrew, RunOptions};
    use crate::definition::{AgentDefinition, CrewDefinition, TaskDefinition};
    use crate::engine::{ExecutionEngine, RunInputs};
    use crate::error::CoreError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;
    use troupe_memory::SemanticIndex;
    use troupe_test_utils::{FailingEmbedder, StubEmbedder};

    /// Engine returning a canned response while recording the inputs it saw.
    struct ScriptedEngine {
        response: String,
        seen_inputs: Mutex<Vec<RunInputs>>,
    }

    impl ScriptedEngine {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                seen_inputs: Mutex::new(Vec::new()),
            }
        }

        fn inputs(&self) -> Vec<RunInputs> {
            self.seen_inputs.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ExecutionEngine for ScriptedEngine {
        async fn kickoff(
            &self,
            _crew: &CrewDefinition,
            inputs: &RunInputs,
        ) -> Result<String, CoreError> {
            self.seen_inputs.lock().expect("lock").push(inputs.clone());
            Ok(self.response.clone())
        }
    }

    fn echo_crew() -> CrewDefinition {
        CrewDefinition::new("echo_crew")
            .agent(AgentDefinition::new("echo", "Echo agent"))
            .task(TaskDefinition::new("echo", "Echo {input_message}", "echo"))
    }

    fn memory_at(dir: &Path) -> SemanticIndex {
        SemanticIndex::open(
            dir.join("memory.json"),
            dir.join("embeddings.index"),
            Arc::new(StubEmbedder::new(&["rust", "ownership", "topic"])),
        )
        .expect("open memory")
    }

    #[tokio::test]
    async fn first_run_passes_input_through_unchanged() {
        let temp = tempdir().expect("tempdir");
        let engine = Arc::new(ScriptedEngine::new("echoed"));
        let mut crew =
            MemoryCrew::new(echo_crew(), engine.clone(), memory_at(temp.path())).expect("crew");

        let output = crew.run_with_memory("hello rust").await.expect("run");
        assert_eq!(output, "echoed");
        let inputs = engine.inputs();
        assert_eq!(inputs[0]["input_message"], "hello rust");
    }

    #[tokio::test]
    async fn later_runs_replay_recent_interactions() {
        let temp = tempdir().expect("tempdir");
        let engine = Arc::new(ScriptedEngine::new("echoed"));
        let mut crew =
            MemoryCrew::new(echo_crew(), engine.clone(), memory_at(temp.path())).expect("crew");

        crew.run_with_memory("first message").await.expect("run");
        crew.run_with_memory("second message").await.expect("run");

        let inputs = engine.inputs();
        let contextual = &inputs[1]["input_message"];
        assert!(contextual.starts_with("Previous interactions:"));
        assert!(contextual.contains("- Input: first message, Output: echoed"));
        assert!(contextual.ends_with("Current input: second message"));
    }

    #[tokio::test]
    async fn recent_limit_bounds_replayed_interactions() {
        let temp = tempdir().expect("tempdir");
        let engine = Arc::new(ScriptedEngine::new("echoed"));
        let options = RunOptions {
            recent_limit: 1,
            ..RunOptions::default()
        };
        let mut crew = MemoryCrew::with_options(
            echo_crew(),
            engine.clone(),
            memory_at(temp.path()),
            options,
        )
        .expect("crew");

        crew.run_with_memory("first message").await.expect("run");
        crew.run_with_memory("second message").await.expect("run");
        crew.run_with_memory("third message").await.expect("run");

        // Only the single most recent interaction is replayed.
        let contextual = &engine.inputs()[2]["input_message"];
        assert!(!contextual.contains("first message"));
        assert!(contextual.contains("- Input: second message, Output: echoed"));
    }

    #[tokio::test]
    async fn runs_store_interactions_and_long_input_facts() {
        let temp = tempdir().expect("tempdir");
        let engine = Arc::new(ScriptedEngine::new("echoed"));
        let mut crew =
            MemoryCrew::new(echo_crew(), engine, memory_at(temp.path())).expect("crew");

        crew.run_with_memory("hi").await.expect("run");
        crew.run_with_memory("a much longer message").await.expect("run");

        let summary = crew.memory().memory_summary();
        let echo = summary.get("echo_crew").expect("crew summary");
        assert_eq!(echo.interaction_count, 2);
        // Only the long input became a fact.
        assert_eq!(echo.fact_count, 1);
        assert_eq!(
            crew.memory().agent_facts("echo_crew")[0].fact,
            "User said: a much longer message"
        );
    }

    #[tokio::test]
    async fn research_injects_context_and_extracts_facts() {
        let temp = tempdir().expect("tempdir");
        let report = "Key findings: ownership is central. Sources: the rust book.";
        let engine = Arc::new(ScriptedEngine::new(report));
        let mut crew =
            MemoryCrew::new(echo_crew(), engine.clone(), memory_at(temp.path())).expect("crew");

        crew.run_research("rust ownership").await.expect("run");
        // Both heuristics fired on the report text.
        assert_eq!(
            crew.memory().memory_summary()["echo_crew"].fact_count,
            2
        );

        crew.run_research("rust ownership").await.expect("run");
        let inputs = engine.inputs();
        assert!(!inputs[0].contains_key("context"));
        let context = inputs[1].get("context").expect("context input");
        assert!(context.contains("Previous research context:"));
        assert!(context.contains("Fact:") || context.contains("Previous research:"));
        assert!(inputs[1].contains_key("current_year"));
    }

    #[tokio::test]
    async fn embedding_failures_degrade_to_no_context() {
        let temp = tempdir().expect("tempdir");
        let engine = Arc::new(ScriptedEngine::new("Key findings: none."));
        let memory = SemanticIndex::open(
            temp.path().join("memory.json"),
            temp.path().join("embeddings.index"),
            Arc::new(FailingEmbedder::new(4)),
        )
        .expect("open memory");
        let mut crew = MemoryCrew::new(echo_crew(), engine.clone(), memory).expect("crew");

        crew.run_research("anything").await.expect("run");
        crew.run_research("anything").await.expect("run");

        // Structured memory still accumulates; no semantic context exists.
        assert_eq!(
            crew.memory().memory_summary()["echo_crew"].interaction_count,
            2
        );
        assert_eq!(crew.memory().total_embeddings(), 0);
        assert!(!engine.inputs()[1].contains_key("context"));
    }

    #[tokio::test]
    async fn invalid_crew_is_rejected_at_construction() {
        let temp = tempdir().expect("tempdir");
        let crew = CrewDefinition::new("bad")
            .task(TaskDefinition::new("orphan", "No agents exist", "ghost"));
        let engine = Arc::new(ScriptedEngine::new("unused"));
        assert!(MemoryCrew::new(crew, engine, memory_at(temp.path())).is_err());
    }
}
