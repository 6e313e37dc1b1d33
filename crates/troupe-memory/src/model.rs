//! Record models shared by the structured store and semantic index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single stored agent interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Input presented to the agent.
    pub input: String,
    /// Output the agent produced.
    pub output: String,
}

/// A single learned fact attributed to an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactRecord {
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// The fact text.
    pub fact: String,
}

/// Per-agent append-only log of interactions and facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentLog {
    /// Interactions in insertion order.
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    /// Facts in insertion order.
    #[serde(default)]
    pub facts: Vec<FactRecord>,
}

/// Kind of record mirrored into the vector index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// An input/output interaction.
    Interaction,
    /// A learned fact.
    Fact,
}

/// Sidecar metadata describing one embedded entry.
///
/// `input`/`output` are set for interactions (output truncated to a preview),
/// `fact` carries the full text for facts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryMetadata {
    /// Owning agent name.
    pub agent_name: String,
    /// Record kind.
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Embed-time timestamp (UTC).
    pub timestamp: DateTime<Utc>,
    /// Interaction input, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Interaction output preview, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Fact text, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
}

/// Origin tag assigned while merging context results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Matched within the requesting agent's own memories.
    AgentSpecific,
    /// Matched across other agents' memories.
    CrossAgent,
}

impl ContextSource {
    /// Stable string form used in formatted context blocks.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextSource::AgentSpecific => "agent_specific",
            ContextSource::CrossAgent => "cross_agent",
        }
    }
}

/// One semantic search result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    /// The exact text stored at embed time.
    pub text: String,
    /// Sidecar metadata for the entry.
    pub metadata: EntryMetadata,
    /// Cosine similarity against the query.
    pub similarity: f32,
    /// 1-based position among surviving results.
    pub rank: usize,
    /// Merge origin, set by context assembly only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ContextSource>,
}

/// Per-agent interaction and fact counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSummary {
    /// Number of stored interactions.
    pub interaction_count: usize,
    /// Number of stored facts.
    pub fact_count: usize,
    /// Timestamp of the most recent interaction, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,
}

/// Embedding-side analytics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbeddingAnalytics {
    /// Total embedded entries.
    pub total_embeddings: usize,
    /// Fixed vector dimension.
    pub embedding_dimension: usize,
    /// Identifier of the embedding model in use.
    pub model: String,
    /// Embedded-entry counts per agent.
    pub agent_distribution: HashMap<String, usize>,
}

/// Aggregate analytics across both stores.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemoryAnalytics {
    /// Structured-store summary per agent.
    pub agents: HashMap<String, AgentSummary>,
    /// Vector-store analytics.
    pub embeddings: EmbeddingAnalytics,
}
