//! Semantic index mirroring structured writes into a searchable vector store.

use crate::embed::Embedder;
use crate::error::MemoryError;
use crate::index::FlatIndex;
use crate::model::{
    AgentSummary, ContextSource, EmbeddingAnalytics, EntryMetadata, FactRecord, InteractionRecord,
    MemoryAnalytics, RecordKind, SearchHit,
};
use crate::store::StructuredStore;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of appends between automatic embedding snapshots.
const SAVE_INTERVAL: usize = 10;

/// Maximum characters of interaction output carried in sidecar metadata.
const OUTPUT_PREVIEW_CHARS: usize = 200;

/// Result cap applied by [`SemanticIndex::cross_agent_insights`].
const INSIGHT_LIMIT: usize = 5;

/// Options controlling a semantic search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum surviving results to return.
    pub top_k: usize,
    /// Restrict results to a single agent when set.
    pub agent_filter: Option<String>,
    /// Minimum cosine similarity for a hit to survive.
    pub min_similarity: f32,
}

impl Default for SearchOptions {
    /// Default options: five results, no agent filter, 0.3 threshold.
    fn default() -> Self {
        Self {
            top_k: 5,
            agent_filter: None,
            min_similarity: 0.3,
        }
    }
}

impl SearchOptions {
    /// Options scoped to a single agent.
    pub fn for_agent(agent: impl Into<String>) -> Self {
        Self {
            agent_filter: Some(agent.into()),
            ..Self::default()
        }
    }

    /// Replace the result cap.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the similarity threshold.
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

/// Sidecar document holding the text and metadata arrays parallel to the index.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Sidecar {
    #[serde(default)]
    texts: Vec<String>,
    #[serde(default)]
    metadata: Vec<EntryMetadata>,
}

/// Structured store paired with an embedding index for similarity search.
///
/// Writes hit the structured store first (synchronously durable), then are
/// mirrored into three parallel sequences: texts, vectors in the index, and
/// sidecar metadata. Vector snapshots are batched: every tenth append
/// persists the index blob and sidecar, so the most recent appends can be
/// memory-only until [`SemanticIndex::close`] or the next batch boundary.
pub struct SemanticIndex {
    store: StructuredStore,
    embedder: Arc<dyn Embedder>,
    index: FlatIndex,
    texts: Vec<String>,
    metadata: Vec<EntryMetadata>,
    index_path: PathBuf,
    unsaved: usize,
}

impl SemanticIndex {
    /// Open the semantic index over the given snapshot and index paths.
    ///
    /// Structured-store load failures propagate. An unreadable or mismatched
    /// embedding index falls back to a fresh one so retrieval degrades to
    /// "no memory" instead of failing the caller.
    pub fn open(
        structured_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MemoryError> {
        let store = StructuredStore::open(structured_path)?;
        let index_path = index_path.as_ref().to_path_buf();
        let (index, texts, metadata) = match load_embeddings(&index_path, embedder.dimension()) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    "starting with a fresh embedding index (path={}, error={err})",
                    index_path.display()
                );
                (FlatIndex::new(embedder.dimension()), Vec::new(), Vec::new())
            }
        };
        info!(
            "opened semantic index (path={}, embeddings={})",
            index_path.display(),
            texts.len()
        );
        Ok(Self {
            store,
            embedder,
            index,
            texts,
            metadata,
            index_path,
            unsaved: 0,
        })
    }

    /// Store an interaction and mirror it into the vector index.
    pub fn store_interaction(&mut self, agent: &str, input: &str, output: &str) {
        self.store.store_interaction(agent, input, output);
        let text = format!("Agent: {agent}\nInput: {input}\nOutput: {output}");
        let metadata = EntryMetadata {
            agent_name: agent.to_string(),
            kind: RecordKind::Interaction,
            timestamp: Utc::now(),
            input: Some(input.to_string()),
            output: Some(preview(output, OUTPUT_PREVIEW_CHARS)),
            fact: None,
        };
        self.add_to_vector_store(&text, metadata);
    }

    /// Store a fact and mirror it into the vector index.
    pub fn store_fact(&mut self, agent: &str, fact: &str) {
        self.store.store_fact(agent, fact);
        let text = format!("Agent: {agent}\nFact: {fact}");
        let metadata = EntryMetadata {
            agent_name: agent.to_string(),
            kind: RecordKind::Fact,
            timestamp: Utc::now(),
            input: None,
            output: None,
            fact: Some(fact.to_string()),
        };
        self.add_to_vector_store(&text, metadata);
    }

    /// Embed a text and append it to the parallel vector sequences.
    ///
    /// Failures are logged and swallowed: the structured write preceding this
    /// call is already durable, and search simply never surfaces the missing
    /// entry.
    pub fn add_to_vector_store(&mut self, text: &str, metadata: EntryMetadata) {
        let vector = match self.embedder.embed(text) {
            Ok(vector) => vector,
            Err(err) => {
                warn!(
                    "failed to embed entry (agent={}, error={err})",
                    metadata.agent_name
                );
                return;
            }
        };
        if let Err(err) = self.index.add(&vector) {
            warn!(
                "failed to index entry (agent={}, error={err})",
                metadata.agent_name
            );
            return;
        }
        self.texts.push(text.to_string());
        self.metadata.push(metadata);
        self.unsaved += 1;
        if self.texts.len() % SAVE_INTERVAL == 0 {
            if let Err(err) = self.save_embeddings() {
                warn!(
                    "failed to persist embeddings (path={}, error={err})",
                    self.index_path.display()
                );
            }
        }
    }

    /// Search all stored memories by cosine similarity.
    ///
    /// Fetches twice the requested cap from the raw index to leave room for
    /// threshold and agent filtering, then keeps the first `top_k` survivors.
    /// Ranks are 1-based positions among survivors. An empty index or a
    /// failed query embedding yields an empty list; nothing propagates out of
    /// the search path.
    pub fn semantic_search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        if self.texts.is_empty() || options.top_k == 0 {
            return Vec::new();
        }
        let query_vector = match self.embedder.embed(query) {
            Ok(vector) => vector,
            Err(err) => {
                warn!("failed to embed query (error={err})");
                return Vec::new();
            }
        };
        let fetch = (options.top_k * 2).min(self.texts.len());
        let raw = match self.index.search(&query_vector, fetch) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("vector search failed (error={err})");
                return Vec::new();
            }
        };

        let mut hits = Vec::new();
        for (score, position) in raw {
            if score < options.min_similarity {
                continue;
            }
            let metadata = &self.metadata[position];
            if let Some(filter) = &options.agent_filter {
                if &metadata.agent_name != filter {
                    continue;
                }
            }
            hits.push(SearchHit {
                text: self.texts[position].clone(),
                metadata: metadata.clone(),
                similarity: score,
                rank: hits.len() + 1,
                source: None,
            });
            if hits.len() == options.top_k {
                break;
            }
        }
        debug!(
            "semantic search (query_len={}, survivors={})",
            query.len(),
            hits.len()
        );
        hits
    }

    /// Collect context for an agent, preferring its own memories.
    ///
    /// Runs an agent-scoped search and an unscoped one over `limit * 2`
    /// candidates, merges agent-specific hits first, and deduplicates by
    /// exact text so an agent's own copy of a memory wins ties against
    /// cross-agent duplicates.
    pub fn relevant_context(&self, agent: &str, query: &str, limit: usize) -> Vec<SearchHit> {
        let agent_hits =
            self.semantic_search(query, &SearchOptions::for_agent(agent).with_top_k(limit));
        let all_hits = self.semantic_search(query, &SearchOptions::default().with_top_k(limit * 2));

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::new();
        for mut hit in agent_hits {
            if merged.len() == limit {
                break;
            }
            if seen.insert(hit.text.clone()) {
                hit.source = Some(ContextSource::AgentSpecific);
                merged.push(hit);
            }
        }
        for mut hit in all_hits {
            if merged.len() == limit {
                break;
            }
            if seen.insert(hit.text.clone()) {
                hit.source = Some(ContextSource::CrossAgent);
                merged.push(hit);
            }
        }
        merged
    }

    /// Surface what other agents know about a topic.
    pub fn cross_agent_insights(&self, topic: &str, exclude_agent: Option<&str>) -> Vec<SearchHit> {
        let mut hits = self.semantic_search(topic, &SearchOptions::default().with_top_k(10));
        if let Some(excluded) = exclude_agent {
            hits.retain(|hit| hit.metadata.agent_name != excluded);
        }
        hits.truncate(INSIGHT_LIMIT);
        hits
    }

    /// Structured summary combined with embedding-side analytics.
    pub fn memory_analytics(&self) -> MemoryAnalytics {
        let mut agent_distribution: HashMap<String, usize> = HashMap::new();
        for metadata in &self.metadata {
            *agent_distribution
                .entry(metadata.agent_name.clone())
                .or_default() += 1;
        }
        MemoryAnalytics {
            agents: self.store.memory_summary(),
            embeddings: EmbeddingAnalytics {
                total_embeddings: self.texts.len(),
                embedding_dimension: self.embedder.dimension(),
                model: self.embedder.model_id().to_string(),
                agent_distribution,
            },
        }
    }

    /// Persist the index blob and its sidecar document.
    pub fn save_embeddings(&mut self) -> Result<(), MemoryError> {
        if let Some(parent) = self.index_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.index.save(&self.index_path)?;
        let sidecar = Sidecar {
            texts: self.texts.clone(),
            metadata: self.metadata.clone(),
        };
        std::fs::write(
            sidecar_path(&self.index_path),
            serde_json::to_string_pretty(&sidecar)?,
        )?;
        self.unsaved = 0;
        debug!(
            "saved embeddings (path={}, total={})",
            self.index_path.display(),
            self.texts.len()
        );
        Ok(())
    }

    /// Flush any unsaved embeddings and consume the index.
    ///
    /// Batched appends may still be memory-only; call this on every exit path
    /// instead of relying on drop order.
    pub fn close(mut self) -> Result<(), MemoryError> {
        if self.unsaved > 0 {
            self.save_embeddings()?;
        }
        Ok(())
    }

    /// Read-only access to the inner structured store.
    pub fn structured(&self) -> &StructuredStore {
        &self.store
    }

    /// All interactions for an agent, oldest first.
    pub fn agent_history(&self, agent: &str) -> &[InteractionRecord] {
        self.store.agent_history(agent)
    }

    /// All facts for an agent, oldest first.
    pub fn agent_facts(&self, agent: &str) -> &[FactRecord] {
        self.store.agent_facts(agent)
    }

    /// The most recent interactions for an agent, insertion order preserved.
    pub fn recent_interactions(&self, agent: &str, limit: usize) -> &[InteractionRecord] {
        self.store.recent_interactions(agent, limit)
    }

    /// Per-agent structured summary.
    pub fn memory_summary(&self) -> HashMap<String, AgentSummary> {
        self.store.memory_summary()
    }

    /// Clear one agent's structured log.
    ///
    /// Vector entries are NOT purged: content already embedded for the agent
    /// keeps surfacing in semantic search. The behavior is preserved as
    /// documented; purge-on-clear would need a compaction pass over the
    /// parallel arrays.
    pub fn clear_agent_memory(&mut self, agent: &str) {
        self.store.clear_agent_memory(agent);
    }

    /// Clear all structured memory. Vector entries are not purged; see
    /// [`SemanticIndex::clear_agent_memory`].
    pub fn clear_all_memory(&mut self) {
        self.store.clear_all_memory();
    }

    /// Number of embedded entries.
    pub fn total_embeddings(&self) -> usize {
        self.texts.len()
    }
}

/// Sidecar document path: the index path with a `.metadata.json` extension.
fn sidecar_path(index_path: &Path) -> PathBuf {
    index_path.with_extension("metadata.json")
}

/// Load the index blob and sidecar arrays, verifying they stay in step.
fn load_embeddings(
    index_path: &Path,
    dimension: usize,
) -> Result<(FlatIndex, Vec<String>, Vec<EntryMetadata>), MemoryError> {
    if !index_path.exists() {
        return Ok((FlatIndex::new(dimension), Vec::new(), Vec::new()));
    }
    let index = FlatIndex::load(index_path)?;
    if index.dimension() != dimension {
        return Err(MemoryError::Index(format!(
            "stored dimension {} does not match embedder dimension {dimension}",
            index.dimension()
        )));
    }
    let sidecar_path = sidecar_path(index_path);
    let sidecar: Sidecar = if sidecar_path.exists() {
        serde_json::from_str(&std::fs::read_to_string(&sidecar_path)?)?
    } else {
        Sidecar::default()
    };
    if index.len() != sidecar.texts.len() || sidecar.texts.len() != sidecar.metadata.len() {
        return Err(MemoryError::Index(format!(
            "parallel arrays out of step: {} vectors, {} texts, {} metadata entries",
            index.len(),
            sidecar.texts.len(),
            sidecar.metadata.len()
        )));
    }
    Ok((index, sidecar.texts, sidecar.metadata))
}

/// Copy at most `max_chars` characters, marking truncation with an ellipsis.
fn preview(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut preview: String = value.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}
