//! Configuration schema for the troupe harness.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the troupe harness.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TroupeConfig {
    /// Optional schema URL, accepted and ignored.
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    /// Memory store settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Crew run settings.
    #[serde(default)]
    pub crew: CrewRunConfig,
}

impl TroupeConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> TroupeConfigBuilder {
        TroupeConfigBuilder::new()
    }
}

/// Builder for assembling a `TroupeConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct TroupeConfigBuilder {
    config: TroupeConfig,
}

impl TroupeConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: TroupeConfig::default(),
        }
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the crew run configuration.
    pub fn crew(mut self, crew: CrewRunConfig) -> Self {
        self.config.crew = crew;
        self
    }

    /// Finish building.
    pub fn build(self) -> TroupeConfig {
        self.config
    }
}

/// Memory store paths and embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the structured JSON snapshot.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Path of the vector index blob; the sidecar derives from this.
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,
    /// Identifier of the embedding model to use.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Fixed embedding dimension, tied to the model.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            embeddings_path: default_embeddings_path(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

/// Options for crew runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewRunConfig {
    /// Print engine traffic while running.
    #[serde(default)]
    pub verbose: bool,
    /// How many recent interactions to replay into a run.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// How many semantic matches to inject as context.
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
}

impl Default for CrewRunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            recent_limit: default_recent_limit(),
            context_limit: default_context_limit(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".troupe/memory.json")
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from(".troupe/embeddings.index")
}

fn default_embedding_model() -> String {
    "feature-hash-v1".to_string()
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_recent_limit() -> usize {
    3
}

fn default_context_limit() -> usize {
    3
}
