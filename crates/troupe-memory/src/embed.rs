//! Embedding function contract and the default hashing embedder.

use crate::error::MemoryError;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Default embedding dimension, matching common MiniLM-class models.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Text-to-vector embedding function.
///
/// Implementations return unit-normalized vectors of a fixed dimension and
/// must be deterministic for a given model identity.
pub trait Embedder: Send + Sync {
    /// Embed text into a unit-normalized vector of [`Embedder::dimension`] floats.
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;

    /// Fixed output dimension.
    fn dimension(&self) -> usize;

    /// Stable identifier for the underlying model.
    fn model_id(&self) -> &str;
}

/// Deterministic feature-hashing embedder.
///
/// Hashes lowercased alphanumeric tokens and their bigrams into signed
/// buckets and L2-normalizes the result. Not a trained model, but
/// deterministic and dependency-free, which keeps the demo harness runnable
/// offline; swap in a real [`Embedder`] for production-quality retrieval.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the given bucket count.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        if self.dimension == 0 {
            return Err(MemoryError::Embedding(
                "embedding dimension must be non-zero".to_string(),
            ));
        }
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        for token in &tokens {
            bump(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            bump(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        // Tokenless input stays the zero vector: similar to nothing.
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "feature-hash-v1"
    }
}

/// Add a signed unit contribution for one hashed feature.
fn bump(vector: &mut [f32], feature: &str) {
    let mut hasher = DefaultHasher::new();
    feature.hash(&mut hasher);
    let hash = hasher.finish();
    let slot = (hash % vector.len() as u64) as usize;
    let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
    vector[slot] += sign;
}
