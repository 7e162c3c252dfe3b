use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use thiserror::Error;

/// Index of a state inside the transition table.
pub type StateId = usize;

/// Errors produced while constructing a DFA. All of them are programmer
/// errors in the description, surfaced at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DfaError {
    /// The initial state is not one of the declared states.
    #[error("initial state {state} is outside the valid range 0..{count}")]
    InvalidInitialState { state: StateId, count: usize },

    /// A transition endpoint is not one of the declared states.
    #[error("transition endpoint {state} is outside the valid range 0..{count}")]
    InvalidTransitionState { state: StateId, count: usize },

    /// A final state is not one of the declared states.
    #[error("final state {state} is outside the valid range 0..{count}")]
    InvalidFinalState { state: StateId, count: usize },
}

/// A Deterministic Finite Automaton over alphabet `A`, with states densely
/// numbered `0..N`.
///
/// The transition function may be partial: a missing `(state, symbol)` entry
/// means there is no accept edge on that symbol from that state. Each
/// per-state map preserves insertion order, so iterating `δ(s, ·)` is
/// deterministic across runs.
#[derive(Debug, Clone)]
pub struct Dfa<A> {
    /// The transition function, indexed by source state:
    /// given (current_state, symbol) → next_state.
    transitions: Vec<IndexMap<A, StateId>>,
    /// The unique initial state.
    initial_state: StateId,
    /// The set of accepting (final) states.
    final_states: HashSet<StateId>,
}

impl<A> Dfa<A>
where
    A: Eq + Hash + Clone + Debug,
{
    /// Creates a DFA with `count` states and no transitions or final states.
    pub fn new(count: usize, initial_state: StateId) -> Result<Self, DfaError> {
        if initial_state >= count {
            return Err(DfaError::InvalidInitialState {
                state: initial_state,
                count,
            });
        }
        Ok(Dfa {
            transitions: vec![IndexMap::new(); count],
            initial_state,
            final_states: HashSet::new(),
        })
    }

    /// Builds a DFA from its parts, validating every state reference.
    pub fn from_parts(
        initial_state: StateId,
        transitions: Vec<IndexMap<A, StateId>>,
        final_states: impl IntoIterator<Item = StateId>,
    ) -> Result<Self, DfaError> {
        let count = transitions.len();
        if initial_state >= count {
            return Err(DfaError::InvalidInitialState {
                state: initial_state,
                count,
            });
        }
        for outgoing in &transitions {
            for (_, &target) in outgoing {
                if target >= count {
                    return Err(DfaError::InvalidTransitionState {
                        state: target,
                        count,
                    });
                }
            }
        }
        let mut finals = HashSet::new();
        for state in final_states {
            if state >= count {
                return Err(DfaError::InvalidFinalState { state, count });
            }
            finals.insert(state);
        }
        Ok(Dfa {
            transitions,
            initial_state,
            final_states: finals,
        })
    }

    /// Adds a transition from state `from` on symbol `symbol` to state `to`.
    /// Redefining an existing `(from, symbol)` pair overwrites the target but
    /// keeps the symbol's original position in the iteration order.
    pub fn add_transition(
        &mut self,
        from: StateId,
        symbol: A,
        to: StateId,
    ) -> Result<(), DfaError> {
        let count = self.transitions.len();
        if from >= count {
            return Err(DfaError::InvalidTransitionState { state: from, count });
        }
        if to >= count {
            return Err(DfaError::InvalidTransitionState { state: to, count });
        }
        self.transitions[from].insert(symbol, to);
        Ok(())
    }

    /// Marks the given state as an accepting (final) state.
    pub fn set_final(&mut self, state: StateId) -> Result<(), DfaError> {
        let count = self.transitions.len();
        if state >= count {
            return Err(DfaError::InvalidFinalState { state, count });
        }
        self.final_states.insert(state);
        Ok(())
    }

    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_final_state(&self, state: StateId) -> bool {
        self.final_states.contains(&state)
    }

    /// The forward transition function. Returns `None` when no accept edge
    /// exists on `symbol` from `state`.
    pub fn next_state(&self, state: StateId, symbol: &A) -> Option<StateId> {
        self.transitions.get(state)?.get(symbol).copied()
    }

    /// The outgoing transitions of `state`, in insertion order.
    pub fn outgoing(&self, state: StateId) -> &IndexMap<A, StateId> {
        &self.transitions[state]
    }

    /// Tests whether the DFA accepts the given input word.
    pub fn accepts(&self, input: &[A]) -> bool {
        // Start at the initial state
        let mut current_state = self.initial_state;

        // Consume the input
        for symbol in input {
            // If no transition is defined, the DFA rejects
            match self.next_state(current_state, symbol) {
                Some(next) => current_state = next,
                None => return false,
            }
        }

        // After consuming the entire word, check if we're in a final state
        self.final_states.contains(&current_state)
    }

    /// Builds the grouped-reverse view of the transition table: for each
    /// state, the outgoing symbols clustered by the state they lead to.
    ///
    /// The symbol lists follow the iteration order of `δ(s, ·)` and the keys
    /// follow first-appearance order, so concatenating the lists of a state
    /// yields exactly the domain of `δ(s, ·)` with no duplicates.
    pub fn grouped_transitions(&self) -> Vec<IndexMap<StateId, Vec<A>>> {
        self.transitions
            .iter()
            .map(|outgoing| {
                let mut groups: IndexMap<StateId, Vec<A>> = IndexMap::new();
                for (symbol, &target) in outgoing {
                    groups.entry(target).or_default().push(symbol.clone());
                }
                groups
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfa_accepts_ends_in_one() {
        // We'll accept binary strings that end in '1'. State 0 means "last
        // bit was 0" (initial), state 1 means "last bit was 1" (final).
        let mut dfa = Dfa::new(2, 0).unwrap();
        dfa.set_final(1).unwrap();

        dfa.add_transition(0, '0', 0).unwrap();
        dfa.add_transition(0, '1', 1).unwrap();
        dfa.add_transition(1, '0', 0).unwrap();
        dfa.add_transition(1, '1', 1).unwrap();

        // "" => start in state 0, which is not final => reject
        assert!(!dfa.accepts(&[]));
        // "1" => 0 --'1'--> 1 => final => accept
        assert!(dfa.accepts(&['1']));
        // "0" => 0 --'0'--> 0 => not final => reject
        assert!(!dfa.accepts(&['0']));
        // "10110" ends in state 0 => reject
        assert!(!dfa.accepts(&['1', '0', '1', '1', '0']));
        // "10111" ends in state 1 => accept
        assert!(dfa.accepts(&['1', '0', '1', '1', '1']));
    }

    #[test]
    fn test_partial_transition_function_rejects() {
        let mut dfa = Dfa::new(2, 0).unwrap();
        dfa.set_final(1).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();

        // No edge on 'b' from state 0.
        assert!(!dfa.accepts(&['b']));
        assert_eq!(dfa.next_state(0, &'b'), None);
        assert_eq!(dfa.next_state(0, &'a'), Some(1));
    }

    #[test]
    fn test_construction_rejects_out_of_range_states() {
        assert_eq!(
            Dfa::<char>::new(2, 2).unwrap_err(),
            DfaError::InvalidInitialState { state: 2, count: 2 }
        );

        let mut dfa = Dfa::new(2, 0).unwrap();
        assert_eq!(
            dfa.add_transition(0, 'a', 5).unwrap_err(),
            DfaError::InvalidTransitionState { state: 5, count: 2 }
        );
        assert_eq!(
            dfa.set_final(3).unwrap_err(),
            DfaError::InvalidFinalState { state: 3, count: 2 }
        );

        let mut bad = IndexMap::new();
        bad.insert('a', 7);
        assert_eq!(
            Dfa::from_parts(0, vec![bad], []).unwrap_err(),
            DfaError::InvalidTransitionState { state: 7, count: 1 }
        );
    }

    #[test]
    fn test_grouped_transitions_cluster_by_target() {
        // 0 --'a'--> 1, 0 --'b'--> 1, 0 --'c'--> 2, 1 --'d'--> 0
        let mut dfa = Dfa::new(3, 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.add_transition(0, 'b', 1).unwrap();
        dfa.add_transition(0, 'c', 2).unwrap();
        dfa.add_transition(1, 'd', 0).unwrap();

        let grouped = dfa.grouped_transitions();
        assert_eq!(grouped.len(), 3);

        let from_zero = &grouped[0];
        assert_eq!(from_zero.len(), 2);
        assert_eq!(from_zero[&1], vec!['a', 'b']);
        assert_eq!(from_zero[&2], vec!['c']);
        // Keys appear in first-appearance order.
        let keys: Vec<_> = from_zero.keys().copied().collect();
        assert_eq!(keys, vec![1, 2]);

        assert_eq!(grouped[1][&0], vec!['d']);
        assert!(grouped[2].is_empty());
    }

    #[test]
    fn test_grouped_transitions_follow_insertion_order() {
        // Same transitions, different declaration order.
        let mut dfa = Dfa::new(3, 0).unwrap();
        dfa.add_transition(0, 'c', 2).unwrap();
        dfa.add_transition(0, 'b', 1).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();

        let grouped = dfa.grouped_transitions();
        let keys: Vec<_> = grouped[0].keys().copied().collect();
        assert_eq!(keys, vec![2, 1]);
        assert_eq!(grouped[0][&1], vec!['b', 'a']);
    }

    #[test]
    fn test_redefined_transition_keeps_position() {
        let mut dfa = Dfa::new(3, 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.add_transition(0, 'b', 2).unwrap();
        dfa.add_transition(0, 'a', 2).unwrap();

        let symbols: Vec<_> = dfa.outgoing(0).keys().copied().collect();
        assert_eq!(symbols, vec!['a', 'b']);
        assert_eq!(dfa.next_state(0, &'a'), Some(2));
    }
}
