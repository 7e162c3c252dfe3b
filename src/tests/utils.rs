use typed_arena::Arena;

use crate::dfa::{Dfa, StateId};
use crate::result_notifier::{completion_steps, CompletionStep};
use crate::traverser::Traverser;

/// Builds a DFA over `char` from an edge list. Transition order in the list
/// defines the iteration order of each state's outgoing edges.
pub fn dfa_from_edges(
    states: usize,
    initial: StateId,
    edges: &[(StateId, char, StateId)],
    finals: &[StateId],
) -> Dfa<char> {
    let mut dfa = Dfa::new(states, initial).expect("valid initial state");
    for &(from, symbol, to) in edges {
        dfa.add_transition(from, symbol, to).expect("valid transition");
    }
    for &state in finals {
        dfa.set_final(state).expect("valid final state");
    }
    dfa
}

/// Runs the traverser over `word` and extracts the steps of every terminal
/// record, in the order the traverser found them.
pub fn enumerate_completions(dfa: &Dfa<char>, word: &[char]) -> Vec<Vec<CompletionStep<char>>> {
    let arena = Arena::new();
    let mut traverser = Traverser::new(dfa, &arena);
    let mut symbols = word.iter().copied();
    let final_records = traverser.execute(|| symbols.next());
    final_records
        .iter()
        .map(|&record| completion_steps(record))
        .collect()
}

/// Flattens a completion into a word, picking the first symbol of every
/// insertion step.
pub fn first_choice_word(completion: &[CompletionStep<char>]) -> Vec<char> {
    completion.iter().map(|step| step.characters[0]).collect()
}

/// Shorthand for an expected accept step.
pub fn accept_step(symbol: char, target_state: StateId) -> CompletionStep<char> {
    CompletionStep {
        characters: vec![symbol],
        target_state,
        accepted: true,
    }
}

/// Shorthand for an expected insertion step.
pub fn missing_step(symbols: &[char], target_state: StateId) -> CompletionStep<char> {
    CompletionStep {
        characters: symbols.to_vec(),
        target_state,
        accepted: false,
    }
}
