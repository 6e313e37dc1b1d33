//! Persistent agent memory with semantic retrieval for troupe.
//!
//! Two layered stores: [`StructuredStore`] keeps per-agent interaction and
//! fact logs in a single JSON snapshot, and [`SemanticIndex`] mirrors every
//! structured write into an embedding index for cross-agent similarity
//! search.

pub mod embed;
pub mod error;
pub mod index;
pub mod model;
pub mod semantic;
pub mod store;

/// Embedding function contract and the default hashing embedder.
pub use embed::{DEFAULT_EMBEDDING_DIM, Embedder, HashEmbedder};
/// Memory error type.
pub use error::MemoryError;
/// Exact inner-product vector index.
pub use index::FlatIndex;
/// Record and result models.
pub use model::{
    AgentLog, AgentSummary, ContextSource, EmbeddingAnalytics, EntryMetadata, FactRecord,
    InteractionRecord, MemoryAnalytics, RecordKind, SearchHit,
};
/// Semantic index and its search options.
pub use semantic::{SearchOptions, SemanticIndex};
/// Structured snapshot store.
pub use store::StructuredStore;
