//! Deterministic embedders for tests.

use troupe_memory::{Embedder, MemoryError};

/// Embedder mapping a fixed vocabulary onto dedicated axes.
///
/// Each vocabulary word owns one dimension; unknown tokens contribute
/// nothing, so texts with no shared vocabulary score exactly zero against
/// each other. That makes similarity assertions exact instead of
/// hash-dependent.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    vocabulary: Vec<String>,
}

impl StubEmbedder {
    /// Build an embedder whose dimension equals the vocabulary size.
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|word| word.to_string()).collect(),
        }
    }
}

impl Embedder for StubEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let lowered = text.to_lowercase();
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for token in lowered.split(|c: char| !c.is_alphanumeric()) {
            if let Some(axis) = self.vocabulary.iter().position(|word| word == token) {
                vector[axis] += 1.0;
            }
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn model_id(&self) -> &str {
        "stub-vocab"
    }
}

/// Embedder that always fails, for exercising degraded paths.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder {
    dimension: usize,
}

impl FailingEmbedder {
    /// Failing embedder reporting the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
        Err(MemoryError::Embedding("stubbed failure".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "failing-stub"
    }
}
