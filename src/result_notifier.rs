use std::fmt::Display;

use itertools::Itertools;

use crate::dfa::StateId;
use crate::record::Record;

/// One step of an extracted completion: the symbols of the step, the state
/// it lands in, and whether it consumed a real input symbol. An insertion
/// step with several characters means any one of them works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStep<A> {
    pub characters: Vec<A>,
    pub target_state: StateId,
    pub accepted: bool,
}

/// Reads a terminal record's chain from the root forward into completion
/// steps. The root record is a placeholder and is skipped.
pub fn completion_steps<'a, A: Clone>(record: &'a Record<'a, A>) -> Vec<CompletionStep<A>> {
    record
        .chain()
        .iter()
        .filter(|step| step.prev().is_some())
        .map(|step| CompletionStep {
            characters: step.characters().to_vec(),
            target_state: step.target_state(),
            accepted: step.accepted(),
        })
        .collect()
}

/// Renders a completion on one line: accepted symbols plain, insertions
/// bracketed with their alternatives separated by `|`.
pub fn render_completion<A: Display>(completion: &[CompletionStep<A>]) -> String {
    completion
        .iter()
        .map(|step| {
            if step.accepted {
                format!("{}", step.characters[0])
            } else {
                format!("[{}]", step.characters.iter().join("|"))
            }
        })
        .join(" ")
}

// Trait of a notifier of enumerated completions
pub trait ResultNotifier<A> {
    fn notify(&mut self, completion: &[CompletionStep<A>]);
}

// Notifier to write each completion to stdout
pub struct StdoutResultNotifier;

impl<A: Display> ResultNotifier<A> for StdoutResultNotifier {
    fn notify(&mut self, completion: &[CompletionStep<A>]) {
        println!("{}", render_completion(completion));
    }
}

/// Notifier collecting rendered completions, mainly for tests.
pub struct CollectingResultNotifier {
    pub rendered: Vec<String>,
}

impl CollectingResultNotifier {
    pub fn new() -> Self {
        CollectingResultNotifier {
            rendered: Vec::new(),
        }
    }
}

impl<A: Display> ResultNotifier<A> for CollectingResultNotifier {
    fn notify(&mut self, completion: &[CompletionStep<A>]) {
        self.rendered.push(render_completion(completion));
    }
}
