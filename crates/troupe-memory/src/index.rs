//! Exact inner-product vector index with whole-file persistence.

use crate::error::MemoryError;
use std::cmp::Ordering;
use std::path::Path;

/// Magic bytes identifying a serialized index blob.
const INDEX_MAGIC: &[u8; 4] = b"TFI1";

/// Header: magic, dimension (u32 le), vector count (u32 le).
const HEADER_LEN: usize = 12;

/// Flat inner-product index over unit-normalized vectors.
///
/// Append-only: positions are stable and shared with the sidecar text and
/// metadata arrays kept by the semantic index. Search is exact, which is
/// plenty for the record counts a demo harness sees.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    values: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            values: Vec::new(),
        }
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.values.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Configured vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append a vector, preserving insertion order.
    pub fn add(&mut self, vector: &[f32]) -> Result<(), MemoryError> {
        if vector.len() != self.dimension {
            return Err(MemoryError::Index(format!(
                "dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        self.values.extend_from_slice(vector);
        Ok(())
    }

    /// Up to `k` (score, position) pairs ordered by descending inner product.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>, MemoryError> {
        if query.len() != self.dimension {
            return Err(MemoryError::Index(format!(
                "dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }
        let mut scored: Vec<(f32, usize)> = self
            .values
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, stored)| (inner_product(query, stored), position))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize the whole index into a binary blob file.
    pub fn save(&self, path: &Path) -> Result<(), MemoryError> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.values.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for value in &self.values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load an index blob written by [`FlatIndex::save`].
    pub fn load(path: &Path) -> Result<Self, MemoryError> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < HEADER_LEN || &bytes[..4] != INDEX_MAGIC {
            return Err(MemoryError::Index(format!(
                "not an index blob: {}",
                path.display()
            )));
        }
        let dimension = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let count = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let expected = HEADER_LEN + dimension * count * 4;
        if bytes.len() != expected {
            return Err(MemoryError::Index(format!(
                "truncated index blob: expected {expected} bytes, got {}",
                bytes.len()
            )));
        }
        let values = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self { dimension, values })
    }
}

/// Inner product of two equal-length vectors.
fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::FlatIndex;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn search_ranks_by_descending_inner_product() {
        let mut index = FlatIndex::new(3);
        index.add(&[1.0, 0.0, 0.0]).expect("add");
        index.add(&[0.0, 1.0, 0.0]).expect("add");
        index.add(&[0.6, 0.8, 0.0]).expect("add");

        let hits = index.search(&[1.0, 0.0, 0.0], 3).expect("search");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].1, 0);
        assert_eq!(hits[1].1, 2);
        assert_eq!(hits[2].1, 1);
        assert!(hits[0].0 > hits[1].0 && hits[1].0 > hits[2].0);
    }

    #[test]
    fn search_caps_at_k_and_at_len() {
        let mut index = FlatIndex::new(2);
        index.add(&[1.0, 0.0]).expect("add");
        index.add(&[0.0, 1.0]).expect("add");
        assert_eq!(index.search(&[1.0, 0.0], 1).expect("search").len(), 1);
        assert_eq!(index.search(&[1.0, 0.0], 10).expect("search").len(), 2);
        assert!(index.search(&[1.0, 0.0], 0).expect("search").is_empty());
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut index = FlatIndex::new(3);
        assert!(index.add(&[1.0, 0.0]).is_err());
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("vectors.index");

        let mut index = FlatIndex::new(2);
        index.add(&[0.5, 0.5]).expect("add");
        index.add(&[1.0, 0.0]).expect("add");
        index.save(&path).expect("save");

        let loaded = FlatIndex::load(&path).expect("load");
        assert_eq!(loaded.dimension(), 2);
        assert_eq!(loaded.len(), 2);
        let hits = loaded.search(&[1.0, 0.0], 1).expect("search");
        assert_eq!(hits[0].1, 1);
    }

    #[test]
    fn load_rejects_garbage() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("vectors.index");
        std::fs::write(&path, b"definitely not an index").expect("write");
        assert!(FlatIndex::load(&path).is_err());
    }
}
