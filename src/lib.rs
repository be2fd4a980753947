//! Ayurvedic remedy assistant core.
//!
//! Answers an ailment query constrained by two categorical facets (body type
//! and remedy type) by retrieving reference passages from a similarity index
//! and asking a text generator for an answer grounded only in those passages.
//! When the generator reports the exact no-remedy sentinel, the relaxation
//! machine broadens the facets in a fixed priority order and retries,
//! terminating within at most four generation attempts.
//!
//! Retrieval and generation are consumed through the [`Retriever`] and
//! [`Generator`] traits; [`bootstrap`] wires the default adapters (embedded
//! sled index + OpenAI-compatible chat client), and callers with their own
//! adapters construct a [`RemedyService`] directly.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod settings;

pub use application::services::{
    assemble_context, Generator, RelaxationMachine, RemedyPrompt, RemedyPromptBuilder,
    RemedyService, RerouteAction, Retriever,
};
pub use application::{IngestPassageRequest, RemedyOutcome, RemedyRequest, RemedyResponse};
pub use domain::{
    BodyType, Document, DomainError, RemedyType, EMPTY_CONTEXT_PLACEHOLDER, EXHAUSTED_SENTINEL,
    MISSING_AILMENT_GUIDANCE, NO_REMEDY_SENTINEL,
};
pub use settings::{AppConfig, ConfigManager, GeneratorSettings, IndexSettings};

use infrastructure::{HashEmbedder, OpenAiGenerator, SledPassageIndex};

/// Handles produced by [`bootstrap`]: the service plus the index kept around
/// for corpus population.
pub struct AppHandles {
    pub service: Arc<RemedyService>,
    pub index: Arc<SledPassageIndex>,
    pub config: AppConfig,
}

/// Builds the default environment: configuration from the project data
/// directory (with env overrides), the embedded passage index, and the
/// chat-completions generator keyed by `OPENAI_API_KEY`.
pub fn bootstrap() -> Result<AppHandles, DomainError> {
    let data_dir = settings::default_data_dir()
        .ok_or_else(|| DomainError::other("could not resolve a project data directory"))?;
    let manager = ConfigManager::load(&data_dir)
        .map_err(|err| DomainError::other(format!("failed to load configuration: {err}")))?;

    bootstrap_with(manager.current(), data_dir)
}

/// Same wiring as [`bootstrap`] but from an explicit configuration. The index
/// lives under `data_dir/index` unless the configuration overrides its path.
pub fn bootstrap_with(config: AppConfig, data_dir: PathBuf) -> Result<AppHandles, DomainError> {
    let embedder = Arc::new(HashEmbedder::try_new(
        config.index.embedding_model.clone(),
        config.index.embedding_dimensions,
    )?);

    let index_dir = config
        .index
        .path
        .clone()
        .unwrap_or_else(|| data_dir.join("index"));
    let index = Arc::new(SledPassageIndex::open(
        index_dir,
        embedder,
        config.index.top_k,
    )?);

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; generation requests will be rejected upstream");
    }
    let generator = Arc::new(OpenAiGenerator::new(
        config.generator.base_url.clone(),
        api_key,
        config.generator.model.clone(),
        config.generator.temperature,
    ));

    let service = Arc::new(RemedyService::new(
        Arc::clone(&index) as Arc<dyn Retriever>,
        generator,
    ));

    Ok(AppHandles {
        service,
        index,
        config,
    })
}
