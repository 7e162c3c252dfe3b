use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use smallvec::{smallvec, SmallVec};
use typed_arena::Arena;

use crate::dfa::StateId;

/// One step of a derivation: either a real input symbol was consumed
/// (`accepted`), or one of `characters` was hypothetically inserted to take
/// the automaton through a transition the input did not provide.
///
/// Records are allocated in an arena, never mutated, and link back to their
/// predecessor, so many derivation tails share a common ancestry.
pub struct Record<'a, A> {
    /// The preceding step, or `None` for the root record.
    prev: Option<&'a Record<'a, A>>,
    /// The state this step lands in.
    target_state: StateId,
    /// The symbols associated with this step. A single symbol for an accept
    /// step; all symbols producing the step's transition for an insertion
    /// step. Empty only for the root record.
    characters: SmallVec<[A; 2]>,
    /// Whether this step consumed a real input symbol.
    accepted: bool,
    /// Real input symbols consumed up to and including this step.
    accepted_count: usize,
    /// Insertion steps along the chain up to and including this step.
    missing_count: usize,
    /// The nearest accepting ancestor of `prev`, cached at construction.
    prev_last_accept: Option<&'a Record<'a, A>>,
}

impl<'a, A> Record<'a, A> {
    pub fn prev(&self) -> Option<&'a Record<'a, A>> {
        self.prev
    }

    pub fn target_state(&self) -> StateId {
        self.target_state
    }

    pub fn characters(&self) -> &[A] {
        &self.characters
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted_count
    }

    pub fn missing_count(&self) -> usize {
        self.missing_count
    }

    pub fn total_count(&self) -> usize {
        self.accepted_count + self.missing_count
    }

    /// Returns the nearest record along the chain, including this one, that
    /// consumed a real input symbol. The root record counts as accepting, so
    /// this is `None` only on a chain with no root, which cannot be built.
    pub fn last_accept(&'a self) -> Option<&'a Record<'a, A>> {
        if self.accepted {
            Some(self)
        } else {
            self.prev_last_accept
        }
    }

    /// Walks the chain from the root to this record, root first.
    pub fn chain(&'a self) -> Vec<&'a Record<'a, A>> {
        let mut records = Vec::with_capacity(self.total_count() + 1);
        let mut cursor = Some(self);
        while let Some(record) = cursor {
            records.push(record);
            cursor = record.prev;
        }
        records.reverse();
        records
    }

    /// Returns `true` iff two ancestors of this record (the record itself is
    /// not considered) land in the same state with the same number of
    /// consumed input symbols, more than `min_len` steps apart.
    ///
    /// With `min_len = 0` this detects any repeat of
    /// `(target_state, accepted_count)` along the ancestry: the traversal
    /// re-entered a state without consuming new input.
    pub fn has_loops(&self, min_len: usize) -> bool {
        let mut first_seen: HashMap<(StateId, usize), usize> = HashMap::new();
        let mut index = 0;
        let mut cursor = self.prev;
        while let Some(record) = cursor {
            let key = (record.target_state, record.accepted_count);
            match first_seen.get(&key) {
                Some(&first) if index - first > min_len => return true,
                Some(_) => {}
                None => {
                    first_seen.insert(key, index);
                }
            }
            index += 1;
            cursor = record.prev;
        }
        false
    }
}

impl<'a, A: Clone> Record<'a, A> {
    /// Creates the root record for a traversal starting in `initial_state`.
    ///
    /// The root counts as accepting but contributes nothing to
    /// `accepted_count`; it exists so every chain has a uniform origin.
    pub fn initial(arena: &'a Arena<Record<'a, A>>, initial_state: StateId) -> &'a Record<'a, A> {
        arena.alloc(Record {
            prev: None,
            target_state: initial_state,
            characters: SmallVec::new(),
            accepted: true,
            accepted_count: 0,
            missing_count: 0,
            prev_last_accept: None,
        })
    }

    /// Creates the step that consumes the real input symbol `symbol` and
    /// moves to `target_state`.
    pub fn accept(
        arena: &'a Arena<Record<'a, A>>,
        prev: &'a Record<'a, A>,
        symbol: A,
        target_state: StateId,
    ) -> &'a Record<'a, A> {
        arena.alloc(Record {
            prev: Some(prev),
            target_state,
            characters: smallvec![symbol],
            accepted: true,
            accepted_count: prev.accepted_count + 1,
            missing_count: prev.missing_count,
            prev_last_accept: prev.last_accept(),
        })
    }

    /// Creates the step that inserts any one of `symbols` to move to
    /// `target_state` without consuming input.
    pub fn missing(
        arena: &'a Arena<Record<'a, A>>,
        prev: &'a Record<'a, A>,
        symbols: &[A],
        target_state: StateId,
    ) -> &'a Record<'a, A> {
        debug_assert!(!symbols.is_empty());
        arena.alloc(Record {
            prev: Some(prev),
            target_state,
            characters: symbols.iter().cloned().collect(),
            accepted: false,
            accepted_count: prev.accepted_count,
            missing_count: prev.missing_count + 1,
            prev_last_accept: prev.last_accept(),
        })
    }
}

impl<'a, A: Clone + PartialEq> Record<'a, A> {
    /// Creates an insertion step over `symbols` with the first occurrence of
    /// `excluded` removed. The caller guarantees `symbols` has at least two
    /// elements, so the resulting list is non-empty.
    pub fn partial_missing(
        arena: &'a Arena<Record<'a, A>>,
        prev: &'a Record<'a, A>,
        symbols: &[A],
        excluded: &A,
        target_state: StateId,
    ) -> &'a Record<'a, A> {
        debug_assert!(symbols.len() >= 2);
        let mut characters: SmallVec<[A; 2]> = SmallVec::with_capacity(symbols.len() - 1);
        let mut excluded_once = false;
        for symbol in symbols {
            if !excluded_once && symbol == excluded {
                excluded_once = true;
            } else {
                characters.push(symbol.clone());
            }
        }
        debug_assert!(!characters.is_empty());
        arena.alloc(Record {
            prev: Some(prev),
            target_state,
            characters,
            accepted: false,
            accepted_count: prev.accepted_count,
            missing_count: prev.missing_count + 1,
            prev_last_accept: prev.last_accept(),
        })
    }
}

impl<'a, A: PartialEq> Record<'a, A> {
    /// Returns `true` iff both records are insertion steps into the same
    /// state and this record's symbol list is `other`'s list with exactly one
    /// element removed, preserving order.
    pub fn is_partial_of(&self, other: &Record<'a, A>) -> bool {
        if self.accepted || other.accepted {
            return false;
        }
        if self.target_state != other.target_state {
            return false;
        }
        if self.characters.len() + 1 != other.characters.len() {
            return false;
        }
        let mut remaining = other.characters.iter();
        self.characters.iter().all(|c| remaining.any(|o| o == c))
    }
}

impl<A> PartialEq for Record<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        // Records compared by their pointer address.
        std::ptr::eq(self, other)
    }
}

impl<A> Eq for Record<'_, A> {}

impl<A> Hash for Record<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Simple hash based on the pointer.
        state.write_usize(self as *const _ as usize);
    }
}

impl<A: Debug> Debug for Record<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Record(state: {}, characters: {:?}, accepted: {}, consumed: {}, inserted: {})",
            self.target_state,
            self.characters,
            self.accepted,
            self.accepted_count,
            self.missing_count
        )
    }
}
