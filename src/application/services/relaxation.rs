//! The adaptive retrieval-relaxation state machine.
//!
//! One run drives a [`QueryState`] from the initial specificity check through
//! retrieval and up to four generation attempts, broadening the facet
//! constraints between attempts in a fixed priority order. Each reroute moves a
//! facet strictly toward its axis's unconstrained value (the single restoration
//! step for originally-specific queries happens only once the body facet has
//! been relaxed), so the run always terminates.

use tracing::debug;

use crate::domain::{
    BodyType, DomainError, QueryState, RemedyType, EXHAUSTED_SENTINEL, NO_REMEDY_SENTINEL,
};

use super::context::assemble_context;
use super::prompt::RemedyPromptBuilder;
use super::remedy_service::{Generator, Retriever};

/// Machine states. `Finalize` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CheckSpecificity,
    Retrieve,
    Generate,
    Reroute,
    Finalize,
}

/// The single action the reroute table selects for a given state. Exactly one
/// variant applies to any (body_type, remedy_type, is_specific) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerouteAction {
    /// Widen the remedy-type facet to `Overall` and regenerate.
    RelaxRemedy,
    /// Widen the body-type facet to `General` and regenerate.
    RelaxBody,
    /// Widen the body-type facet to `General`, restore the caller's original
    /// remedy type, and regenerate. Owed only to originally-specific queries:
    /// General + the original remedy type is a strictly broader combination
    /// that has not been tried yet.
    RelaxBodyRestoreRemedy,
    /// Both facets already unconstrained; the search space is exhausted.
    Exhaust,
}

/// Pure reroute policy. Collapses each axis to constrained-or-not, so the
/// table is exhaustive over every facet value, including non-canonical ones.
pub fn reroute_action(state: &QueryState) -> RerouteAction {
    match (state.body_type.is_general(), state.remedy_type.is_overall()) {
        (true, true) => RerouteAction::Exhaust,
        (true, false) => RerouteAction::RelaxRemedy,
        (false, true) if state.is_specific => RerouteAction::RelaxBodyRestoreRemedy,
        (false, true) => RerouteAction::RelaxBody,
        (false, false) => RerouteAction::RelaxRemedy,
    }
}

fn apply_reroute(state: &mut QueryState) -> RerouteAction {
    let action = reroute_action(state);
    match action {
        RerouteAction::RelaxRemedy => {
            state.remedy_type = RemedyType::Overall;
        }
        RerouteAction::RelaxBody => {
            state.body_type = BodyType::General;
        }
        RerouteAction::RelaxBodyRestoreRemedy => {
            state.body_type = BodyType::General;
            state.remedy_type = state.stored_remedy_type.clone();
        }
        RerouteAction::Exhaust => {
            state.response = EXHAUSTED_SENTINEL.to_string();
        }
    }
    action
}

/// Orchestrates retrieval, generation, and the reroute policy over one
/// exclusively-owned [`QueryState`]. Dependencies are passed in, never global.
pub struct RelaxationMachine<'a> {
    retriever: &'a dyn Retriever,
    generator: &'a dyn Generator,
    prompts: &'a RemedyPromptBuilder,
}

impl<'a> RelaxationMachine<'a> {
    pub fn new(
        retriever: &'a dyn Retriever,
        generator: &'a dyn Generator,
        prompts: &'a RemedyPromptBuilder,
    ) -> Self {
        Self {
            retriever,
            generator,
            prompts,
        }
    }

    /// Runs the machine to `Finalize`. On success the caller reads
    /// `state.response`; retriever or generator failures propagate untouched.
    pub fn run(&self, state: &mut QueryState) -> Result<(), DomainError> {
        let mut step = Step::CheckSpecificity;

        loop {
            step = match step {
                Step::CheckSpecificity => {
                    state.is_specific =
                        !state.body_type.is_general() && !state.remedy_type.is_overall();
                    debug!(is_specific = state.is_specific, "checked query specificity");
                    Step::Retrieve
                }
                Step::Retrieve => {
                    // Retrieval is keyed on the ailment description alone, which
                    // never changes, so this state runs exactly once per run.
                    let documents = self.retriever.search(&state.ailment_description)?;
                    debug!(passages = documents.len(), "retrieved reference passages");
                    state.context = assemble_context(&documents);
                    Step::Generate
                }
                Step::Generate => {
                    let prompt = self.prompts.build(
                        &state.context,
                        &state.ailment_description,
                        state.remedy_type.label(),
                        state.body_type.label(),
                    );
                    state.response = self.generator.complete(&prompt)?;
                    state.attempts += 1;
                    if state.response == NO_REMEDY_SENTINEL {
                        Step::Reroute
                    } else {
                        Step::Finalize
                    }
                }
                Step::Reroute => {
                    let action = apply_reroute(state);
                    debug!(
                        ?action,
                        body_type = %state.body_type,
                        remedy_type = %state.remedy_type,
                        attempts = state.attempts,
                        "relaxed facet constraints"
                    );
                    if action == RerouteAction::Exhaust {
                        Step::Finalize
                    } else {
                        Step::Generate
                    }
                }
                Step::Finalize => break,
            };
        }

        Ok(())
    }
}
