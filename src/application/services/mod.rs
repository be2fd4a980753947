//! Service layer orchestrating the relaxation core and infrastructure adapters.

pub mod context;
pub mod prompt;
pub mod relaxation;

mod remedy_service;

pub use context::assemble_context;
pub use prompt::{RemedyPrompt, RemedyPromptBuilder};
pub use relaxation::{RelaxationMachine, RerouteAction};
pub use remedy_service::{Generator, RemedyService, Retriever};
