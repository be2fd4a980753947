//! Application layer wiring DTOs and services for the remedy assistant.

pub mod dtos;
pub mod services;

pub use dtos::{IngestPassageRequest, RemedyOutcome, RemedyRequest, RemedyResponse};
pub use services::RemedyService;
