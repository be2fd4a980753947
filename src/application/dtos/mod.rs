use serde::{Deserialize, Serialize};

/// Payload accepted from callers asking for a remedy.
///
/// Facet fields are free-form text and are parsed case-insensitively against
/// the closed enumerations in `domain::models`; omitted facets default to the
/// unconstrained values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyRequest {
    pub ailment_description: String,
    #[serde(default = "default_body_type")]
    pub body_type: String,
    #[serde(default = "default_remedy_type")]
    pub remedy_type: String,
}

impl RemedyRequest {
    pub fn new(
        ailment_description: impl Into<String>,
        remedy_type: impl Into<String>,
        body_type: impl Into<String>,
    ) -> Self {
        Self {
            ailment_description: ailment_description.into(),
            body_type: body_type.into(),
            remedy_type: remedy_type.into(),
        }
    }
}

/// How a remedy run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemedyOutcome {
    /// The generator produced a grounded answer at some breadth.
    Found,
    /// Every relaxation path was tried and none produced an answer.
    Exhausted,
    /// The ailment description was blank; nothing was retrieved or generated.
    NeedsInput,
}

/// Response envelope for remedy runs.
///
/// `answer` is the externally visible text. The facet fields report the values
/// active when the answer was accepted, which may be broader than what the
/// caller originally asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyResponse {
    pub answer: String,
    pub outcome: RemedyOutcome,
    pub body_type: String,
    pub remedy_type: String,
    pub attempts: usize,
}

impl RemedyResponse {
    pub fn found(&self) -> bool {
        self.outcome == RemedyOutcome::Found
    }
}

/// Payload accepted when adding a reference passage to the embedded index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestPassageRequest {
    pub source: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_body_type() -> String {
    "General".to_string()
}

fn default_remedy_type() -> String {
    "Overall".to_string()
}
