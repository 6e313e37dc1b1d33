//! Test helpers shared across troupe crates.

pub mod embedder;

pub use embedder::{FailingEmbedder, StubEmbedder};
