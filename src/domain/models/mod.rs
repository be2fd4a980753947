use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound to keep tag arrays compact for storage and filtering.
pub const MAX_TAGS: usize = 12;

/// Exact sentinel the generator is instructed to emit when no grounded answer
/// exists for the current facet combination. Compared byte-for-byte; keep it
/// synchronized with the prompt template.
pub const NO_REMEDY_SENTINEL: &str = "No remedy found.";

/// Terminal marker written into the query state once every relaxation path has
/// been tried. Distinct from [`NO_REMEDY_SENTINEL`], which means "keep relaxing".
pub const EXHAUSTED_SENTINEL: &str = "None";

/// Substituted for the assembled context when retrieval returns no passages,
/// so the generator can tell "no grounding" apart from an empty prompt.
pub const EMPTY_CONTEXT_PLACEHOLDER: &str = "No relevant reference found.";

/// Soft response returned when the ailment description is blank; no external
/// call is made in that case.
pub const MISSING_AILMENT_GUIDANCE: &str = "Please enter an ailment to get a remedy.";

/// Ayurvedic body-type facet. `General` is the unconstrained value on this
/// axis; anything unrecognized is kept verbatim and treated as constrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    General,
    Vata,
    Pitta,
    Kapha,
    Other(String),
}

impl BodyType {
    /// Parses free-form facet text, case-insensitively. Blank input means the
    /// caller imposed no constraint on this axis.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return BodyType::General;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "general" => BodyType::General,
            "vata" => BodyType::Vata,
            "pitta" => BodyType::Pitta,
            "kapha" => BodyType::Kapha,
            _ => BodyType::Other(trimmed.to_string()),
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, BodyType::General)
    }

    pub fn label(&self) -> &str {
        match self {
            BodyType::General => "General",
            BodyType::Vata => "Vata",
            BodyType::Pitta => "Pitta",
            BodyType::Kapha => "Kapha",
            BodyType::Other(label) => label,
        }
    }
}

impl Default for BodyType {
    fn default() -> Self {
        BodyType::General
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Remedy-type facet. `Overall` is the unconstrained value on this axis.
///
/// Parsing accepts both the short canonical names and the longer labels the
/// original selection UI submits ("Herbal/Ayurvedic medications" and friends),
/// matched by leading keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemedyType {
    Overall,
    Herbal,
    Dietary,
    Yoga,
    Cleansing,
    Breathing,
    Other(String),
}

impl RemedyType {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return RemedyType::Overall;
        }
        let lowered = trimmed.to_ascii_lowercase();
        if lowered == "overall" {
            RemedyType::Overall
        } else if lowered.starts_with("herbal") {
            RemedyType::Herbal
        } else if lowered.starts_with("diet") {
            RemedyType::Dietary
        } else if lowered.starts_with("yoga") {
            RemedyType::Yoga
        } else if lowered.starts_with("cleansing") {
            RemedyType::Cleansing
        } else if lowered.starts_with("breathing") {
            RemedyType::Breathing
        } else {
            RemedyType::Other(trimmed.to_string())
        }
    }

    pub fn is_overall(&self) -> bool {
        matches!(self, RemedyType::Overall)
    }

    pub fn label(&self) -> &str {
        match self {
            RemedyType::Overall => "Overall",
            RemedyType::Herbal => "Herbal",
            RemedyType::Dietary => "Dietary",
            RemedyType::Yoga => "Yoga",
            RemedyType::Cleansing => "Cleansing",
            RemedyType::Breathing => "Breathing",
            RemedyType::Other(label) => label,
        }
    }
}

impl Default for RemedyType {
    fn default() -> Self {
        RemedyType::Overall
    }
}

impl fmt::Display for RemedyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reference passage as returned by retrieval. The relaxation core only
/// consumes `text`, in retrieval order; source and score are carried for
/// diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source: Option<String>,
    pub score: Option<f32>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            score: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Stored form of a reference passage inside the embedded index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub id: Uuid,
    pub source: String,
    pub text: String,
    pub tags: Vec<String>,
    pub embedding: PassageEmbedding,
    pub created_at: DateTime<Utc>,
}

impl Passage {
    pub fn new(
        source: impl Into<String>,
        text: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
        embedding: PassageEmbedding,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: sanitize_single_line(source),
            text: text.into(),
            tags: normalize_tags(tags),
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn as_document(&self, score: f32) -> Document {
        Document::new(self.text.clone())
            .with_source(self.source.clone())
            .with_score(score)
    }
}

/// Vector representation of a stored passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
}

impl PassageEmbedding {
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
        }
    }

    pub fn dims(&self) -> usize {
        self.vector.len()
    }
}

/// Mutable record threaded through one relaxation run. Created once per query,
/// owned exclusively by the machine, discarded after the final response is read.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// Free-text input; immutable for the run.
    pub ailment_description: String,
    /// Current body-type facet; relaxed toward `General`, never back.
    pub body_type: BodyType,
    /// Current remedy-type facet; relaxed toward `Overall`, never back,
    /// except for the one restoration step owed to originally-specific queries.
    pub remedy_type: RemedyType,
    /// Snapshot of the caller's original remedy-type facet.
    pub stored_remedy_type: RemedyType,
    /// True iff both original facets were constrained. Set once at entry.
    pub is_specific: bool,
    /// Assembled text from the latest retrieval.
    pub context: String,
    /// Latest generator output or terminal sentinel.
    pub response: String,
    /// Number of generation attempts so far.
    pub attempts: usize,
}

impl QueryState {
    pub fn new(
        ailment_description: impl Into<String>,
        body_type: BodyType,
        remedy_type: RemedyType,
    ) -> Self {
        Self {
            ailment_description: ailment_description.into(),
            body_type,
            stored_remedy_type: remedy_type.clone(),
            remedy_type,
            is_specific: false,
            context: String::new(),
            response: String::new(),
            attempts: 0,
        }
    }
}

fn sanitize_single_line(input: impl Into<String>) -> String {
    input
        .into()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn normalize_tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    tags.into_iter()
        .filter_map(|tag| {
            let normalized = tag.into().trim().to_lowercase().replace(' ', "-");
            if normalized.is_empty() {
                None
            } else {
                Some(normalized)
            }
        })
        .take(MAX_TAGS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_type_parses_case_insensitively() {
        assert_eq!(BodyType::parse("KAPHA"), BodyType::Kapha);
        assert_eq!(BodyType::parse("  general "), BodyType::General);
        assert_eq!(BodyType::parse("pItTa"), BodyType::Pitta);
    }

    #[test]
    fn unknown_body_type_stays_constrained() {
        let parsed = BodyType::parse("Tridosha");
        assert_eq!(parsed, BodyType::Other("Tridosha".into()));
        assert!(!parsed.is_general());
    }

    #[test]
    fn blank_facet_text_means_unconstrained() {
        assert!(BodyType::parse("   ").is_general());
        assert!(RemedyType::parse("").is_overall());
    }

    #[test]
    fn remedy_type_accepts_long_ui_labels() {
        assert_eq!(
            RemedyType::parse("Herbal/Ayurvedic medications"),
            RemedyType::Herbal
        );
        assert_eq!(
            RemedyType::parse("Dietary/Nutritional Changes"),
            RemedyType::Dietary
        );
        assert_eq!(RemedyType::parse("Yoga Postures/Exercise"), RemedyType::Yoga);
        assert_eq!(RemedyType::parse("Cleansing Procedures"), RemedyType::Cleansing);
        assert_eq!(RemedyType::parse("Breathing Exercises"), RemedyType::Breathing);
    }

    #[test]
    fn query_state_snapshots_original_remedy_type() {
        let state = QueryState::new("dry skin", BodyType::Vata, RemedyType::Herbal);
        assert_eq!(state.stored_remedy_type, RemedyType::Herbal);
        assert_eq!(state.remedy_type, RemedyType::Herbal);
        assert!(!state.is_specific);
        assert_eq!(state.attempts, 0);
    }

    #[test]
    fn passage_tags_are_normalized_and_capped() {
        let embedding = PassageEmbedding::new("test", vec![1.0]);
        let tags: Vec<String> = (0..20).map(|i| format!("Tag {i}")).collect();
        let passage = Passage::new("chapter-1", "text", tags, embedding);
        assert_eq!(passage.tags.len(), MAX_TAGS);
        assert_eq!(passage.tags[0], "tag-0");
    }
}
