//! Predicates deciding whether a derivation tail is worth expanding.
//!
//! A tail survives when it is loop-free (`Record::has_loops`) and when it is
//! a useful alternative: no already-found terminal record and no cheaper
//! same-generation peer reaches the same point through a structurally
//! comparable but shorter derivation.

use log::trace;
use std::fmt::Debug;

use crate::record::Record;

/// Returns `true` iff `tested` does not uselessly extend any record in
/// `final_records` or in `earlier_tails` (the same-generation peers that
/// were inserted before it; later peers have higher or equal insertion cost
/// and are themselves tested against this record later).
pub fn is_useful_alternative<'a, A: PartialEq + Debug>(
    tested: &'a Record<'a, A>,
    final_records: &[&'a Record<'a, A>],
    earlier_tails: &[&'a Record<'a, A>],
) -> bool {
    for &reference in final_records.iter().chain(earlier_tails) {
        if std::ptr::eq(reference, tested) {
            continue;
        }
        if uselessly_extends(tested, reference) {
            trace!("{:?} uselessly extends {:?}", tested, reference);
            return false;
        }
    }
    true
}

/// Returns `true` iff `tested` reaches the same `(state, accepted_count)`
/// as some record in `reference`'s chain through a chain that looks like
/// that record's chain with additional insertion steps: extra insertion
/// cost paid for a point a shorter derivation already covers.
pub fn uselessly_extends<'a, A: PartialEq>(
    tested: &'a Record<'a, A>,
    reference: &'a Record<'a, A>,
) -> bool {
    match base_candidate(tested, reference) {
        Some(base) => extends(tested, base),
        None => false,
    }
}

/// Walks `reference`'s chain, starting at `reference` itself, for the first
/// record landing in `tested`'s state with `tested`'s consumed-input count.
/// The counts are non-increasing going back, so the walk stops as soon as
/// they drop below `tested`'s.
fn base_candidate<'a, A>(
    tested: &'a Record<'a, A>,
    reference: &'a Record<'a, A>,
) -> Option<&'a Record<'a, A>> {
    let mut cursor = Some(reference);
    while let Some(record) = cursor {
        if record.accepted_count() < tested.accepted_count() {
            return None;
        }
        if record.accepted_count() == tested.accepted_count()
            && record.target_state() == tested.target_state()
        {
            return Some(record);
        }
        cursor = record.prev();
    }
    None
}

/// Walks `tested`'s chain and `base`'s chain in lockstep, newest first.
///
/// Meeting at the same record means `tested`'s chain is `base`'s chain plus
/// interstitial insertions: it extends `base`. The tested side running out,
/// or becoming cheaper than the base side, means the chains diverged. The
/// base side advances only when the tested record is a partial of it; on any
/// other mismatch only the tested side advances, skipping the insertions
/// `base` never made.
fn extends<'a, A: PartialEq>(tested: &'a Record<'a, A>, base: &'a Record<'a, A>) -> bool {
    let mut newer = Some(tested);
    let mut older = Some(base);
    loop {
        match (newer, older) {
            (Some(n), Some(o)) => {
                if std::ptr::eq(n, o) {
                    return true;
                }
                if n.total_count() < o.total_count() {
                    return false;
                }
                if n.is_partial_of(o) {
                    newer = n.prev();
                    older = o.prev();
                } else {
                    newer = n.prev();
                }
            }
            (None, _) => return false,
            (Some(_), None) => return true,
        }
    }
}
