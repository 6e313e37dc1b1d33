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

/// Offline stand-in for a real orchestration framework.
///
/// Produces a canned report shaped like real crew output, including the
/// prior-context block when one was injected, so repeated runs demonstrate
/// recall without any network access.
struct ScriptedResearchEngine;

#[async_trait]
impl ExecutionEngine for ScriptedResearchEngine {
    async fn kickoff(
        &self,
        crew: &CrewDefinition,
        inputs: &RunInputs,
    ) -> Result<String, CoreError> {
        let topic = inputs.get("topic").cloned().unwrap_or_default();
        let year = inputs.get("current_year").cloned().unwrap_or_default();
        let mut report = format!(
            "# Research report: {topic} ({year})\n\n\
             Key findings: the {topic} landscape is summarized by the \
             {} agents of {}.\n\n\
             Sources: scripted demo engine.",
            crew.agents.len(),
            crew.name,
        );
        if let Some(context) = inputs.get("context") {
            report.push_str("\n\nContext considered:");
            report.push_str(context);
        }
        Ok(report)
    }
}

fn research_crew() -> CrewDefinition {
    CrewDefinition::new("research_crew")
        .agent(
            AgentDefinition::new("researcher", "Senior research analyst")
                .goal("Gather comprehensive information on {topic}")
                .backstory("Thorough, source-driven, allergic to speculation"),
        )
        .agent(
            AgentDefinition::new("summarizer", "Content summarization specialist")
                .goal("Distill findings into a tight summary"),
        )
        .agent(
            AgentDefinition::new("validator", "Fact-checking specialist")
                .goal("Verify claims and flag weak sourcing"),
        )
        .agent(
            AgentDefinition::new("coordinator", "Research coordinator")
                .goal("Synthesize everything into a final report"),
        )
        .task(
            TaskDefinition::new("research", "Research {topic} thoroughly", "researcher")
                .expected_output("Raw findings with sources"),
        )
        .task(
            TaskDefinition::new("summarize", "Summarize the research findings", "summarizer")
                .expected_output("A concise summary")
                .depends_on("research"),
        )
        .task(
            TaskDefinition::new("validate", "Validate the summary", "validator")
                .expected_output("A validated summary")
                .depends_on("summarize"),
        )
        .task(
            TaskDefinition::new("coordinate", "Assemble the final report", "coordinator")
                .expected_output("A complete research report")
                .depends_on("validate"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let topic = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "AI LLMs".to_string());

    let config = TroupeConfig::builder()
        .memory(MemoryConfig {
            storage_path: ".troupe/research_memory.json".into(),
            embeddings_path: ".troupe/research_embeddings.index".into(),
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

    let options = RunOptions {
        recent_limit: config.crew.recent_limit,
        context_limit: config.crew.context_limit,
    };
    let mut crew = MemoryCrew::with_options(
        research_crew(),
        Arc::new(ScriptedResearchEngine),
        memory,
        options,
    )
    .context("failed to assemble crew")?;

    let report = crew
        .run_research(&topic)
        .await
        .context("research run failed")?;
    println!("{report}");

    let analytics = crew.memory_analytics();
    println!(
        "\n--- memory analytics ---\nagents tracked: {}\nembeddings: {} ({}d, model {})",
        analytics.agents.len(),
        analytics.embeddings.total_embeddings,
        analytics.embeddings.embedding_dimension,
        analytics.embeddings.model,
    );

    let insights = crew
        .memory()
        .cross_agent_insights(&topic, Some("research_crew"));
    if !insights.is_empty() {
        println!("\ncross-agent insights:");
        for hit in &insights {
            println!(
                "- [{:.2}] {} ({})",
                hit.similarity, hit.metadata.agent_name, hit.rank
            );
        }
    }

    crew.close().context("failed to flush memory")?;
    Ok(())
}
