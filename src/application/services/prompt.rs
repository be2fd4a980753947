/// Default system prompt. The quoted sentinel is a routing contract: the
/// relaxation machine compares generator output against it byte-for-byte.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert Ayurvedic practitioner.
Use ONLY the information provided in the CONTEXT to answer the user's query.
Do NOT guess or invent information.
If no remedy is found in the context, reply exactly:
"No remedy found."

Remedy Logic:
- If body type is "Vata", "Pitta", or "Kapha", find remedies specific to that body type.
- If body type is "General", find remedies for any body type.
- If remedy type is "Overall", return remedies of any type.
- If remedy type is specified (e.g., Herbal, Dietary, Yoga), return remedies matching that type.
- If no remedy matches both body type and remedy type, reply:
"No remedy found."
"#;

/// A fully rendered generation request: system instruction plus user message.
#[derive(Debug, Clone)]
pub struct RemedyPrompt {
    pub system: String,
    pub user: String,
}

/// Builder for remedy-generation prompts.
#[derive(Debug, Clone)]
pub struct RemedyPromptBuilder {
    system_prompt: String,
}

impl Default for RemedyPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RemedyPromptBuilder {
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system instruction. The replacement must still steer the
    /// generator toward the exact no-remedy sentinel, or relaxation never fires.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn build(
        &self,
        context: &str,
        ailment_description: &str,
        remedy_type: &str,
        body_type: &str,
    ) -> RemedyPrompt {
        let user = format!(
            "CONTEXT:\n{context}\n\nUSER QUERY:\nSymptoms or Disease: {ailment_description}\nRequested Remedy Type: {remedy_type}\nBody Type: {body_type}\n\nAnswer:"
        );

        RemedyPrompt {
            system: self.system_prompt.clone(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NO_REMEDY_SENTINEL;

    #[test]
    fn default_system_prompt_carries_the_exact_sentinel() {
        let quoted = format!("\"{NO_REMEDY_SENTINEL}\"");
        assert!(DEFAULT_SYSTEM_PROMPT.contains(&quoted));
    }

    #[test]
    fn user_prompt_embeds_context_and_current_facets() {
        let prompt = RemedyPromptBuilder::new().build(
            "Ashwagandha calms Vata.",
            "restlessness",
            "Herbal",
            "Vata",
        );
        assert!(prompt.user.contains("CONTEXT:\nAshwagandha calms Vata."));
        assert!(prompt.user.contains("Symptoms or Disease: restlessness"));
        assert!(prompt.user.contains("Requested Remedy Type: Herbal"));
        assert!(prompt.user.contains("Body Type: Vata"));
    }

    #[test]
    fn custom_system_prompt_is_used_verbatim() {
        let prompt = RemedyPromptBuilder::new()
            .with_system_prompt("answer briefly")
            .build("ctx", "q", "Overall", "General");
        assert_eq!(prompt.system, "answer briefly");
    }
}
