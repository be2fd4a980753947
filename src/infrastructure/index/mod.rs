//! Passage-index adapters.
//!
//! Currently exposes the embedded sled-backed index that powers similarity
//! retrieval over the remedy reference corpus.

pub mod sled_index;

pub use sled_index::SledPassageIndex;
