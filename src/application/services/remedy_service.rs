use std::sync::Arc;

use tracing::info;

use crate::{
    application::dtos::{RemedyOutcome, RemedyRequest, RemedyResponse},
    domain::{BodyType, Document, DomainError, QueryState, RemedyType, MISSING_AILMENT_GUIDANCE},
};

use super::context::assemble_context;
use super::prompt::{RemedyPrompt, RemedyPromptBuilder};
use super::relaxation::RelaxationMachine;

/// Abstraction over any nearest-neighbor lookup that returns reference
/// passages for free text (embedded index, remote service, test double).
pub trait Retriever: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Document>, DomainError>;
}

/// Abstraction over any text generator steerable through the prompt's
/// sentinel instruction.
pub trait Generator: Send + Sync {
    fn complete(&self, prompt: &RemedyPrompt) -> Result<String, DomainError>;
}

/// The orchestrator behind the public query operations. Holds shared,
/// read-only adapter handles; each run owns its query state exclusively, so
/// concurrent calls need no coordination.
pub struct RemedyService {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    prompts: RemedyPromptBuilder,
}

impl RemedyService {
    pub fn new(retriever: Arc<dyn Retriever>, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
            prompts: RemedyPromptBuilder::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: RemedyPromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Adaptive remedy lookup: retrieve once, then generate and progressively
    /// relax facets until an answer is found or every breadth is exhausted.
    ///
    /// A blank ailment description short-circuits before any external call and
    /// returns the fixed guidance text as a soft outcome, not an error.
    pub fn find_remedy(&self, request: RemedyRequest) -> Result<RemedyResponse, DomainError> {
        if request.ailment_description.trim().is_empty() {
            return Ok(RemedyResponse {
                answer: MISSING_AILMENT_GUIDANCE.to_string(),
                outcome: RemedyOutcome::NeedsInput,
                body_type: request.body_type,
                remedy_type: request.remedy_type,
                attempts: 0,
            });
        }

        let mut state = QueryState::new(
            request.ailment_description,
            BodyType::parse(&request.body_type),
            RemedyType::parse(&request.remedy_type),
        );

        RelaxationMachine::new(self.retriever.as_ref(), self.generator.as_ref(), &self.prompts)
            .run(&mut state)?;

        let response = Self::finalize(&state);
        info!(
            outcome = ?response.outcome,
            attempts = response.attempts,
            body_type = %response.body_type,
            remedy_type = %response.remedy_type,
            "remedy run finished"
        );

        Ok(response)
    }

    /// Convenience wrapper over [`RemedyService::find_remedy`] mirroring the
    /// harness-facing call shape: free-text inputs in, final response text out.
    pub fn run(
        &self,
        ailment_description: &str,
        remedy_type: &str,
        body_type: &str,
    ) -> Result<String, DomainError> {
        self.find_remedy(RemedyRequest::new(ailment_description, remedy_type, body_type))
            .map(|response| response.answer)
    }

    /// Single-pass lookup without relaxation: one retrieval, one generation,
    /// raw generator text returned (sentinel included verbatim when nothing in
    /// the corpus grounds an answer).
    pub fn find_remedy_targeted(&self, request: RemedyRequest) -> Result<String, DomainError> {
        if request.ailment_description.trim().is_empty() {
            return Ok(MISSING_AILMENT_GUIDANCE.to_string());
        }

        let documents = self.retriever.search(&request.ailment_description)?;
        let context = assemble_context(&documents);
        let prompt = self.prompts.build(
            &context,
            &request.ailment_description,
            RemedyType::parse(&request.remedy_type).label(),
            BodyType::parse(&request.body_type).label(),
        );

        self.generator.complete(&prompt)
    }

    /// Formats the terminal state into the externally visible response. The
    /// facet labels are the ones active when the answer was accepted, which may
    /// be broader than the caller's originals; the exhausted marker flows into
    /// the same template so the final text encodes it.
    fn finalize(state: &QueryState) -> RemedyResponse {
        let outcome = if state.response == crate::domain::EXHAUSTED_SENTINEL {
            RemedyOutcome::Exhausted
        } else {
            RemedyOutcome::Found
        };

        RemedyResponse {
            answer: format!(
                "For body type: {} and remedy type: {}, Remedy: {}",
                state.body_type, state.remedy_type, state.response
            ),
            outcome,
            body_type: state.body_type.label().to_string(),
            remedy_type: state.remedy_type.label().to_string(),
            attempts: state.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NO_REMEDY_SENTINEL;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRetriever {
        calls: AtomicUsize,
    }

    impl Retriever for CountingRetriever {
        fn search(&self, _query: &str) -> Result<Vec<Document>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Document::new("Reference passage.")])
        }
    }

    struct QueueGenerator {
        replies: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl QueueGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Generator for QueueGenerator {
        fn complete(&self, _prompt: &RemedyPrompt) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock();
            if replies.len() > 1 {
                Ok(replies.pop().unwrap())
            } else {
                Ok(replies.last().cloned().unwrap())
            }
        }
    }

    fn service(
        retriever: Arc<CountingRetriever>,
        generator: Arc<QueueGenerator>,
    ) -> RemedyService {
        RemedyService::new(retriever, generator)
    }

    #[test]
    fn fully_general_query_with_no_grounding_reports_exhaustion() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&[NO_REMEDY_SENTINEL]));
        let svc = service(Arc::clone(&retriever), Arc::clone(&generator));

        let response = svc
            .find_remedy(RemedyRequest::new("rare ailment", "Overall", "General"))
            .unwrap();

        assert_eq!(response.outcome, RemedyOutcome::Exhausted);
        assert_eq!(response.attempts, 1);
        assert!(response.answer.contains("None"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn constrained_body_relaxes_once_and_succeeds() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&[
            NO_REMEDY_SENTINEL,
            "Cooling pranayama in the morning.",
        ]));
        let svc = service(Arc::clone(&retriever), Arc::clone(&generator));

        let response = svc
            .find_remedy(RemedyRequest::new("overheating", "Overall", "Pitta"))
            .unwrap();

        assert_eq!(response.outcome, RemedyOutcome::Found);
        assert_eq!(response.attempts, 2);
        // Accepted at the relaxed breadth.
        assert_eq!(response.body_type, "General");
        assert_eq!(response.remedy_type, "Overall");
        assert!(response
            .answer
            .contains("Remedy: Cooling pranayama in the morning."));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blank_ailment_short_circuits_without_external_calls() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&["unused"]));
        let svc = service(Arc::clone(&retriever), Arc::clone(&generator));

        let response = svc
            .find_remedy(RemedyRequest::new("   ", "Herbal", "Vata"))
            .unwrap();

        assert_eq!(response.outcome, RemedyOutcome::NeedsInput);
        assert_eq!(response.answer, MISSING_AILMENT_GUIDANCE);
        assert_eq!(response.attempts, 0);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn found_answer_reports_the_facets_it_was_accepted_under() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&["Licorice tea after meals."]));
        let svc = service(retriever, generator);

        let response = svc
            .find_remedy(RemedyRequest::new(
                "acid reflux",
                "Herbal/Ayurvedic medications",
                "pitta",
            ))
            .unwrap();

        assert_eq!(response.outcome, RemedyOutcome::Found);
        assert_eq!(response.body_type, "Pitta");
        assert_eq!(response.remedy_type, "Herbal");
        assert_eq!(
            response.answer,
            "For body type: Pitta and remedy type: Herbal, Remedy: Licorice tea after meals."
        );
    }

    #[test]
    fn targeted_flow_is_single_pass_and_returns_raw_text() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&[NO_REMEDY_SENTINEL]));
        let svc = service(Arc::clone(&retriever), Arc::clone(&generator));

        let text = svc
            .find_remedy_targeted(RemedyRequest::new("insomnia", "Yoga", "Vata"))
            .unwrap();

        assert_eq!(text, NO_REMEDY_SENTINEL);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_returns_the_final_text_only() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&["Rest and warm fluids."]));
        let svc = service(retriever, generator);

        let text = svc.run("head cold", "Overall", "General").unwrap();
        assert_eq!(
            text,
            "For body type: General and remedy type: Overall, Remedy: Rest and warm fluids."
        );
    }

    #[test]
    fn targeted_flow_guards_blank_input() {
        let retriever = Arc::new(CountingRetriever::default());
        let generator = Arc::new(QueueGenerator::new(&["unused"]));
        let svc = service(Arc::clone(&retriever), generator);

        let text = svc
            .find_remedy_targeted(RemedyRequest::new("", "Overall", "General"))
            .unwrap();

        assert_eq!(text, MISSING_AILMENT_GUIDANCE);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
    }
}
