//! Domain layer: core business entities and value objects for the remedy assistant.

pub mod errors;
pub mod models;

pub use errors::DomainError;
pub use models::{
    BodyType, Document, Passage, PassageEmbedding, QueryState, RemedyType, EMPTY_CONTEXT_PLACEHOLDER,
    EXHAUSTED_SENTINEL, MISSING_AILMENT_GUIDANCE, NO_REMEDY_SENTINEL,
};
