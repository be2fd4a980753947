use std::path::{Path, PathBuf};
use std::sync::Arc;

use bincode::Options;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use sled::{Config, Db, IVec, Tree};
use uuid::Uuid;

use crate::{
    application::dtos::IngestPassageRequest,
    application::services::Retriever,
    domain::{Document, DomainError, Passage, PassageEmbedding},
    infrastructure::embeddings::EmbeddingEngine,
};

const PASSAGES_TREE: &str = "passages";

/// Embedded similarity index backed by `sled`.
///
/// Full `Passage` payloads live in a single tree and similarity is computed
/// in-memory with cosine scores, which is acceptable for a reference corpus of
/// moderate size and keeps the index embeddable without extra services. A more
/// sophisticated index can satisfy the same `Retriever` trait without touching
/// callers.
pub struct SledPassageIndex {
    db: Db,
    passages: Tree,
    embedder: Arc<dyn EmbeddingEngine>,
    top_k: usize,
    _data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl SledPassageIndex {
    /// Opens (or creates) a sled database rooted at `data_dir`. `top_k` bounds
    /// how many passages a retrieval returns.
    pub fn open(
        data_dir: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingEngine>,
        top_k: usize,
    ) -> Result<Self, DomainError> {
        let dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|err| {
            DomainError::index(format!("failed to create data directory {:?}: {err}", dir))
        })?;

        let db = Config::default()
            .path(&dir)
            .cache_capacity(64 * 1024 * 1024)
            .mode(sled::Mode::HighThroughput)
            .open()
            .map_err(|err| DomainError::index(format!("failed to open sled db: {err}")))?;

        let passages = db
            .open_tree(PASSAGES_TREE)
            .map_err(|err| DomainError::index(format!("failed to open passages tree: {err}")))?;

        Ok(Self {
            db,
            passages,
            embedder,
            top_k: top_k.max(1),
            _data_dir: dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Embeds and persists one reference passage. Returns the stored record's id.
    pub fn add_passage(&self, request: IngestPassageRequest) -> Result<Uuid, DomainError> {
        if request.text.trim().is_empty() {
            return Err(DomainError::validation("passage text cannot be empty"));
        }

        let vector = self.embedder.embed(&request.text)?;
        let embedding = PassageEmbedding::new(self.embedder.model_name(), vector);
        let passage = Passage::new(request.source, request.text, request.tags, embedding);

        let _guard = self.write_lock.lock();

        let bytes = Self::serialize(&passage)?;
        self.passages
            .insert(Self::encode_key(&passage.id), bytes)
            .map_err(|err| DomainError::index(format!("failed to persist passage: {err}")))?;

        self.passages
            .flush()
            .map_err(|err| DomainError::index(format!("failed to flush passages: {err}")))?;

        Ok(passage.id)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, DomainError> {
        bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .serialize(value)
            .map_err(|err| DomainError::index(format!("serialization error: {err}")))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DomainError> {
        bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .deserialize(bytes)
            .map_err(|err| DomainError::index(format!("deserialization error: {err}")))
    }

    fn encode_key(id: &Uuid) -> [u8; 16] {
        *id.as_bytes()
    }

    fn decode_passage(bytes: &IVec) -> Result<Passage, DomainError> {
        Self::deserialize(bytes.as_ref())
    }

    fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, DomainError> {
        if query.len() != candidate.len() {
            return Err(DomainError::embedding(format!(
                "embedding dimension mismatch: query {} vs candidate {}",
                query.len(),
                candidate.len()
            )));
        }

        let mut dot = 0.0f32;
        let mut q_norm = 0.0f32;
        let mut c_norm = 0.0f32;

        for (q, c) in query.iter().zip(candidate.iter()) {
            dot += q * c;
            q_norm += q * q;
            c_norm += c * c;
        }

        let denom = q_norm.sqrt() * c_norm.sqrt();
        if denom == 0.0 {
            return Err(DomainError::embedding(
                "cannot compute cosine similarity with zero vector",
            ));
        }

        Ok((dot / denom).clamp(-1.0, 1.0))
    }
}

impl Retriever for SledPassageIndex {
    fn search(&self, query: &str) -> Result<Vec<Document>, DomainError> {
        let query_vector = self
            .embedder
            .embed(query)
            .map_err(|err| DomainError::retrieval(format!("failed to embed query: {err}")))?;

        let mut scored: Vec<(Passage, f32)> = Vec::new();

        for entry in self.passages.iter() {
            let (_, value) = entry
                .map_err(|err| DomainError::retrieval(format!("failed to read passage: {err}")))?;
            let passage = Self::decode_passage(&value)?;

            let score = Self::cosine_similarity(&query_vector, &passage.embedding.vector)?;
            scored.push((passage, score));
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        Ok(scored
            .into_iter()
            .map(|(passage, score)| passage.as_document(score))
            .collect())
    }
}

impl Drop for SledPassageIndex {
    fn drop(&mut self) {
        let _ = self.db.flush();
    }
}
