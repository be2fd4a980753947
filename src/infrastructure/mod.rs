//! Infrastructure layer wiring concrete adapters (embeddings, index, generation).

pub mod embeddings;
pub mod generation;
pub mod index;

pub use embeddings::{EmbeddingEngine, HashEmbedder};
pub use generation::OpenAiGenerator;
pub use index::SledPassageIndex;
