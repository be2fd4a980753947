//! Embedding adapters used by the passage index.
//!
//! Embedding quality is deliberately out of scope; the deterministic hash
//! engine keeps retrieval functional offline, and anything better can satisfy
//! the same trait.

pub mod hash_engine;

pub use hash_engine::HashEmbedder;

use crate::domain::DomainError;

/// Abstraction over any embedding engine feeding the similarity index.
pub trait EmbeddingEngine: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn dims(&self) -> usize;

    fn model_name(&self) -> &str;
}
