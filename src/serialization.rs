use serde::{Deserialize, Serialize};
use string_interner::{DefaultSymbol, StringInterner};
use thiserror::Error;

use crate::dfa::{Dfa, DfaError, StateId};

/// Errors raised while loading a DFA description.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to parse DFA description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid DFA description: {0}")]
    Dfa(#[from] DfaError),
}

#[derive(Serialize, Deserialize)]
struct SerializedDfa {
    /// Number of states; states are numbered 0..states.
    states: usize,
    initial: StateId,
    finals: Vec<StateId>,
    transitions: Vec<SerializedTransition>,
}

#[derive(Serialize, Deserialize)]
struct SerializedTransition {
    from: StateId,
    symbol: String,
    to: StateId,
}

/// Deserializes a JSON DFA description, interning its symbols.
///
/// The order of the `transitions` list defines the iteration order of each
/// state's outgoing transitions, which the traverser's grouped-reverse
/// index preserves.
pub fn dfa_from_json(
    input: &str,
    interner: &mut StringInterner,
) -> Result<Dfa<DefaultSymbol>, SerializationError> {
    let description: SerializedDfa = serde_json::from_str(input)?;

    let mut dfa = Dfa::new(description.states, description.initial)?;
    for transition in description.transitions {
        let symbol = interner.get_or_intern(&transition.symbol);
        dfa.add_transition(transition.from, symbol, transition.to)?;
    }
    for state in description.finals {
        dfa.set_final(state)?;
    }
    Ok(dfa)
}

/// Serializes the given DFA into a JSON string, resolving its symbols.
pub fn dfa_to_json(dfa: &Dfa<DefaultSymbol>, interner: &StringInterner) -> String {
    let mut transitions = Vec::new();
    for state in 0..dfa.state_count() {
        for (symbol, &target) in dfa.outgoing(state) {
            transitions.push(SerializedTransition {
                from: state,
                symbol: interner.resolve(*symbol).unwrap_or("?").to_string(),
                to: target,
            });
        }
    }

    let serialized = SerializedDfa {
        states: dfa.state_count(),
        initial: dfa.initial_state(),
        finals: (0..dfa.state_count())
            .filter(|&state| dfa.is_final_state(state))
            .collect(),
        transitions,
    };

    serde_json::to_string_pretty(&serialized).expect("Serialization failed")
}

/// Generates a DOT representation of the given DFA suitable for Graphviz.
///
/// Final states are drawn with a `doublecircle` shape, while non-final
/// states use a `circle`. An invisible __start__ node points to the initial
/// state.
pub fn to_dot(dfa: &Dfa<DefaultSymbol>, interner: &StringInterner) -> String {
    let mut dot = String::new();
    dot.push_str("digraph DFA {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=circle];\n");
    dot.push_str("  __start__ [shape=point];\n");
    dot.push_str(&format!("  __start__ -> state{};\n", dfa.initial_state()));

    // Define nodes.
    for state in 0..dfa.state_count() {
        // Use doublecircle for final states.
        let shape = if dfa.is_final_state(state) {
            "doublecircle"
        } else {
            "circle"
        };
        dot.push_str(&format!(
            "  state{} [label=\"State {}\", shape={}];\n",
            state, state, shape
        ));
    }

    // Define edges for transitions.
    for state in 0..dfa.state_count() {
        for (symbol, &target) in dfa.outgoing(state) {
            dot.push_str(&format!(
                "  state{} -> state{} [label=\"{}\"];\n",
                state,
                target,
                interner.resolve(*symbol).unwrap_or("?")
            ));
        }
    }

    dot.push_str("}\n");
    dot
}
