use ahash::AHasher;
use std::hash::{Hash, Hasher};

use crate::domain::DomainError;

use super::EmbeddingEngine;

/// A lightweight, deterministic embedding engine that hashes tokens into a
/// fixed-size vector. Not production-grade semantic search, but it keeps the
/// remedy index functional without downloading models or shipping native
/// dependencies.
pub struct HashEmbedder {
    model_name: String,
    dimensions: usize,
}

impl HashEmbedder {
    pub fn try_new(model_name: impl Into<String>, dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::validation(
                "embedding dimensions must be greater than zero",
            ));
        }
        let dims = dimensions.clamp(8, 4096);
        Ok(Self {
            model_name: model_name.into(),
            dimensions: dims,
        })
    }

    fn tokenize<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> {
        text.split(|c: char| c.is_ascii_whitespace() || c.is_ascii_punctuation())
            .filter(|token| !token.is_empty())
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = AHasher::default();
        token.to_ascii_lowercase().hash(&mut hasher);
        hasher.finish() as usize
    }

    fn embed_internal(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let mut seen_any = false;

        for token in self.tokenize(text) {
            let idx = self.hash_token(token) % self.dimensions;
            vector[idx] += 1.0;
            seen_any = true;
        }

        if !seen_any {
            return vector;
        }

        // L2 normalize to keep cosine scores in [-1, 1]
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::try_new("vaidya/token-hash", 256)
            .expect("default hash embedder configuration is valid")
    }
}

impl EmbeddingEngine for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::validation("text payload cannot be empty"));
        }
        Ok(self.embed_internal(text))
    }

    fn dims(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_deterministic() {
        let engine = HashEmbedder::default();
        let a = engine.embed("bitter herbs aid digestion").unwrap();
        let b = engine.embed("bitter herbs aid digestion").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), engine.dims());
    }

    #[test]
    fn embeddings_are_l2_normalized() {
        let engine = HashEmbedder::default();
        let vector = engine.embed("triphala churna at night").unwrap();
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tokenization_ignores_case_and_punctuation() {
        let engine = HashEmbedder::default();
        let a = engine.embed("Ginger, tea!").unwrap();
        let b = engine.embed("ginger tea").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_dimensions_is_rejected() {
        assert!(HashEmbedder::try_new("m", 0).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        let engine = HashEmbedder::default();
        assert!(engine.embed("   ").is_err());
    }
}
