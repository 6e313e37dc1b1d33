use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use troupe::config::{MemoryConfig, TroupeConfig};
use troupe::core::{
    AgentDefinition, CoreError, CrewDefinition, ExecutionEngine, MemoryCrew, RunInputs, RunOptions,
    TaskDefinition,
};
use troupe::init_logging;
use troupe::memory::{HashEmbedder, SemanticIndex};

/// Offline stand-in for a real orchestration framework: repeats the message.
struct EchoEngine;

#[async_trait]
impl ExecutionEngine for EchoEngine {
    async fn kickoff(
        &self,
        _crew: &CrewDefinition,
        inputs: &RunInputs,
    ) -> Result<String, CoreError> {
        let message = inputs.get("input_message").cloned().unwrap_or_default();
        Ok(format!("Echo: {message}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello from troupe!".to_string());

    let config = TroupeConfig::builder()
        .memory(MemoryConfig {
            storage_path: ".troupe/echo_memory.json".into(),
            embeddings_path: ".troupe/echo_embeddings.index".into(),
            ..MemoryConfig::default()
        })
        .build();

    let embedder = Arc::new(HashEmbedder::new(config.memory.embedding_dimension));
    let memory = SemanticIndex::open(
        &config.memory.storage_path,
        &config.memory.embeddings_path,
        embedder,
    )
    .context("failed to open memory store")?;

    let crew = CrewDefinition::new("echo_crew")
        .agent(
            AgentDefinition::new("echo_agent", "Echo specialist")
                .goal("Repeat the user's message faithfully")
                .backstory("A minimal agent that proves memory survives across runs"),
        )
        .task(
            TaskDefinition::new(
                "echo_task",
                "Echo the message: {input_message}",
                "echo_agent",
            )
            .expected_output("The same message, echoed back"),
        );

    let options = RunOptions {
        recent_limit: config.crew.recent_limit,
        context_limit: config.crew.context_limit,
    };
    let mut crew = MemoryCrew::with_options(crew, Arc::new(EchoEngine), memory, options)
        .context("failed to assemble crew")?;

    let output = crew
        .run_with_memory(&message)
        .await
        .context("crew run failed")?;
    println!("{output}");

    let analytics = crew.memory_analytics();
    let interactions = analytics
        .agents
        .get("echo_crew")
        .map(|summary| summary.interaction_count)
        .unwrap_or(0);
    println!(
        "\nMemory: {interactions} interactions recorded, {} embeddings total",
        analytics.embeddings.total_embeddings
    );

    crew.close().context("failed to flush memory")?;
    Ok(())
}
