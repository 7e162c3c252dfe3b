use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use log::{debug, trace};
use typed_arena::Arena;

use crate::dfa::{Dfa, StateId};
use crate::pruning::is_useful_alternative;
use crate::record::Record;

/// Breadth-first enumeration of all minimal ways to complete an input word
/// into one the DFA accepts.
///
/// The traverser expands generations of derivation tails. Each surviving
/// tail produces at most one accept child (consuming the next real input
/// symbol) and one insertion child per group of outgoing symbols, and the
/// pruning predicates keep the generation set finite and non-redundant.
/// Input is pulled lazily from the caller-supplied function, at most once
/// per position, and buffered so every tail can re-read it.
pub struct Traverser<'a, A> {
    dfa: &'a Dfa<A>,
    /// Arena owning every record created by this traverser.
    arena: &'a Arena<Record<'a, A>>,
    /// Per state, the outgoing symbols grouped by the state they lead to.
    grouped_reverse: Vec<IndexMap<StateId, Vec<A>>>,
    /// Input symbols read so far.
    input_buffer: Vec<A>,
    /// Whether the input function has returned its end sentinel. Once set,
    /// the function is never called again.
    input_over: bool,
    final_records: Vec<&'a Record<'a, A>>,
}

impl<'a, A> Traverser<'a, A>
where
    A: Eq + Hash + Clone + Debug,
{
    /// Creates a traverser for `dfa`, allocating its records in `arena`.
    /// The grouped-reverse index is built once here.
    pub fn new(dfa: &'a Dfa<A>, arena: &'a Arena<Record<'a, A>>) -> Self {
        Self {
            dfa,
            arena,
            grouped_reverse: dfa.grouped_transitions(),
            input_buffer: Vec::new(),
            input_over: false,
            final_records: Vec::new(),
        }
    }

    /// Enumerates every non-redundant terminal record for the input produced
    /// by `input`. The function is called at most once per position and must
    /// return `None` once the input is exhausted.
    ///
    /// All per-call state is reset, so a traverser can be reused for
    /// several inputs against the same DFA.
    pub fn execute<F>(&mut self, mut input: F) -> Vec<&'a Record<'a, A>>
    where
        F: FnMut() -> Option<A>,
    {
        trace!("Enter Traverser::execute");
        self.input_buffer.clear();
        self.input_over = false;
        self.final_records.clear();

        let mut current_tails = vec![Record::initial(self.arena, self.dfa.initial_state())];
        let mut generation = 0;
        while !current_tails.is_empty() {
            debug!(
                "generation {}: {} tails, {} final records",
                generation,
                current_tails.len(),
                self.final_records.len()
            );
            let mut next_tails = Vec::new();
            for i in 0..current_tails.len() {
                let tail = current_tails[i];
                if tail.has_loops(0) {
                    trace!("dropping looping tail {:?}", tail);
                    continue;
                }
                // Compared against the final records found so far and the
                // peers inserted before this tail; later peers are tested
                // against this one when their turn comes.
                if !is_useful_alternative(tail, &self.final_records, &current_tails[..i]) {
                    continue;
                }
                if self.is_record_final(tail, &mut input) {
                    debug!("found final record {:?}", tail);
                    self.final_records.push(tail);
                } else {
                    self.expand(tail, &mut input, &mut next_tails);
                }
            }
            current_tails = next_tails;
            generation += 1;
        }
        trace!("Exit Traverser::execute");
        self.final_records.clone()
    }

    /// A record is terminal when it lands in a final state, has consumed the
    /// whole buffered input, and one more attempted read hits end-of-input.
    fn is_record_final<F>(&mut self, record: &'a Record<'a, A>, input: &mut F) -> bool
    where
        F: FnMut() -> Option<A>,
    {
        self.dfa.is_final_state(record.target_state())
            && record.accepted_count() == self.input_buffer.len()
            && self.symbol_at(record.accepted_count(), input).is_none()
    }

    /// Produces the children of `tail` and inserts them into `next_tails`:
    /// an accept child for the next input symbol (unless the shortcut check
    /// suppresses it), a partial insertion child narrowing the accept
    /// child's group, and one insertion child per remaining group.
    fn expand<F>(
        &mut self,
        tail: &'a Record<'a, A>,
        input: &mut F,
        next_tails: &mut Vec<&'a Record<'a, A>>,
    ) where
        F: FnMut() -> Option<A>,
    {
        let state = tail.target_state();
        let symbol = self.symbol_at(tail.accepted_count(), input).cloned();
        let next = symbol.as_ref().and_then(|s| self.dfa.next_state(state, s));
        let groups = &self.grouped_reverse[state];

        if let (Some(symbol), Some(next)) = (symbol, next) {
            if self.is_shortcut(tail, &symbol, next) {
                trace!("suppressing shortcut accept into state {}", next);
            } else {
                insert_by_missing_count(
                    next_tails,
                    Record::accept(self.arena, tail, symbol.clone(), next),
                );
            }
            let siblings = &groups[&next];
            if siblings.len() >= 2 {
                insert_by_missing_count(
                    next_tails,
                    Record::partial_missing(self.arena, tail, siblings, &symbol, next),
                );
            }
            for (&target, symbols) in groups {
                if target != next {
                    insert_by_missing_count(
                        next_tails,
                        Record::missing(self.arena, tail, symbols, target),
                    );
                }
            }
        } else {
            // No accept edge on the buffered symbol, or no input left:
            // every group becomes an insertion child.
            for (&target, symbols) in groups {
                insert_by_missing_count(
                    next_tails,
                    Record::missing(self.arena, tail, symbols, target),
                );
            }
        }
    }

    /// The accept child of an insertion tail duplicates a cheaper derivation
    /// when the same target is reachable on the same symbol directly from
    /// the tail's last accept record, skipping the insertions in between.
    fn is_shortcut(&self, tail: &'a Record<'a, A>, symbol: &A, next_state: StateId) -> bool {
        if tail.accepted() {
            return false;
        }
        match tail.last_accept() {
            Some(last) => self.dfa.next_state(last.target_state(), symbol) == Some(next_state),
            None => false,
        }
    }

    /// Returns the buffered symbol at `position`, pulling from the input
    /// function if the position has not been read yet.
    fn symbol_at<F>(&mut self, position: usize, input: &mut F) -> Option<&A>
    where
        F: FnMut() -> Option<A>,
    {
        while self.input_buffer.len() <= position && !self.input_over {
            match input() {
                Some(symbol) => self.input_buffer.push(symbol),
                None => self.input_over = true,
            }
        }
        self.input_buffer.get(position)
    }
}

/// Inserts `record` into `tails`, kept sorted by ascending `missing_count`.
/// Ties go after existing records with the same count, so cheaper tails are
/// tested first in the next generation.
fn insert_by_missing_count<'a, A>(tails: &mut Vec<&'a Record<'a, A>>, record: &'a Record<'a, A>) {
    let position = tails.partition_point(|t| t.missing_count() <= record.missing_count());
    tails.insert(position, record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn feed<A: Clone>(word: &[A]) -> impl FnMut() -> Option<A> + '_ {
        let mut position = 0;
        move || {
            let symbol = word.get(position).cloned();
            position += 1;
            symbol
        }
    }

    #[test]
    fn test_insert_by_missing_count_is_right_biased() {
        let arena = Arena::new();
        let root = Record::initial(&arena, 0);
        let cheap = Record::accept(&arena, root, 'a', 1);
        let first_tie = Record::missing(&arena, root, &['b'], 1);
        let second_tie = Record::missing(&arena, root, &['c'], 2);
        let expensive = Record::missing(&arena, first_tie, &['d'], 3);

        let mut tails = Vec::new();
        insert_by_missing_count(&mut tails, expensive);
        insert_by_missing_count(&mut tails, first_tie);
        insert_by_missing_count(&mut tails, cheap);
        insert_by_missing_count(&mut tails, second_tie);

        // Sorted by count; the later insert with an equal count goes after.
        assert_eq!(tails, vec![cheap, first_tie, second_tie, expensive]);
    }

    #[test]
    fn test_accept_only_run() {
        // 0 --'a'--> 1, 1 --'a'--> 0, with 1 final.
        let mut dfa = Dfa::new(2, 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.add_transition(1, 'a', 0).unwrap();
        dfa.set_final(1).unwrap();

        let arena = Arena::new();
        let mut traverser = Traverser::new(&dfa, &arena);
        let finals = traverser.execute(feed(&['a', 'a', 'a']));

        assert_eq!(finals.len(), 1);
        let chain = finals[0].chain();
        assert_eq!(chain.len(), 4);
        assert!(chain[1..].iter().all(|r| r.accepted()));
        assert_eq!(finals[0].accepted_count(), 3);
        assert_eq!(finals[0].missing_count(), 0);
        assert_eq!(finals[0].target_state(), 1);
    }

    #[test]
    fn test_shortcut_suppresses_detour_accept() {
        // 'c' goes directly from 0 to 1, and also from 2 to 1; 'x' detours
        // through 2. The insert-'x'-then-accept-'c' derivation duplicates
        // the direct accept and must not appear.
        let mut dfa = Dfa::new(3, 0).unwrap();
        dfa.add_transition(0, 'c', 1).unwrap();
        dfa.add_transition(0, 'x', 2).unwrap();
        dfa.add_transition(2, 'c', 1).unwrap();
        dfa.set_final(1).unwrap();

        let arena = Arena::new();
        let mut traverser = Traverser::new(&dfa, &arena);
        let finals = traverser.execute(feed(&['c']));

        assert_eq!(finals.len(), 1);
        let chain = finals[0].chain();
        assert_eq!(chain.len(), 2);
        assert!(chain[1].accepted());
        assert_eq!(chain[1].characters(), &['c']);
        assert_eq!(chain[1].target_state(), 1);
    }

    #[test]
    fn test_input_is_pulled_once_per_position() {
        let mut dfa = Dfa::new(2, 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.set_final(1).unwrap();

        let pulls = Cell::new(0);
        let word = ['a'];
        let mut position = 0;
        let input = || {
            pulls.set(pulls.get() + 1);
            let symbol = word.get(position).copied();
            position += 1;
            symbol
        };

        let arena = Arena::new();
        let mut traverser = Traverser::new(&dfa, &arena);
        let finals = traverser.execute(input);

        assert_eq!(finals.len(), 1);
        // One pull per symbol plus a single end-of-input probe.
        assert_eq!(pulls.get(), 2);
    }

    #[test]
    fn test_traverser_is_reusable_across_calls() {
        let mut dfa = Dfa::new(2, 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.set_final(1).unwrap();

        let arena = Arena::new();
        let mut traverser = Traverser::new(&dfa, &arena);

        let first = traverser.execute(feed(&['a']));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].accepted_count(), 1);

        // A fresh input; the previous call's buffer and results are gone.
        let second = traverser.execute(feed(&[]));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].accepted_count(), 0);
        assert_eq!(second[0].missing_count(), 1);
        assert_eq!(second[0].characters(), &['a']);
    }

    #[test]
    fn test_no_transitions_terminates_empty() {
        let dfa = Dfa::<char>::new(1, 0).unwrap();

        let arena = Arena::new();
        let mut traverser = Traverser::new(&dfa, &arena);
        let finals = traverser.execute(feed(&['a']));

        assert!(finals.is_empty());
    }
}
