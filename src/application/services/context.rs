use crate::domain::{Document, EMPTY_CONTEXT_PLACEHOLDER};

/// Joins retrieved passages into a single context blob.
///
/// Texts are trimmed and separated by one blank line, preserving retrieval
/// order; nothing is re-ranked or deduplicated. An empty result set yields the
/// fixed placeholder rather than an empty string, so the generator can tell
/// "ran with no grounding" apart from "ran with grounding but found nothing".
pub fn assemble_context(documents: &[Document]) -> String {
    if documents.is_empty() {
        return EMPTY_CONTEXT_PLACEHOLDER.to_string();
    }

    documents
        .iter()
        .map(|doc| doc.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}
