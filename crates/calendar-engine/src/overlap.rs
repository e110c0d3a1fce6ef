//! Detect existing events that overlap a candidate on the same day.
//!
//! Comparison is on the literal `date` field only. Recurring events are not
//! expanded here; callers who want occurrence-level checks materialise
//! occurrences first and pass them in as the `existing` slice.
//! Adjacent events (where one ends exactly when another starts) do NOT overlap.

use crate::model::Scheduled;

/// Whether two same-day ranges intersect as half-open `[start, end)` intervals.
pub fn overlaps<A: Scheduled + ?Sized, B: Scheduled + ?Sized>(a: &A, b: &B) -> bool {
    a.date() == b.date() && a.start_time() < b.end_time() && b.start_time() < a.end_time()
}

/// Find every entry of `existing` that overlaps `candidate`, in input order.
///
/// Entries sharing the candidate's id are skipped, so an event being edited
/// never overlaps its own persisted version.
pub fn find_overlaps<'a, C, E>(candidate: &C, existing: &'a [E]) -> Vec<&'a E>
where
    C: Scheduled + ?Sized,
    E: Scheduled,
{
    let own_id = candidate.id();
    existing
        .iter()
        .filter(|other| own_id.is_none() || other.id() != own_id)
        .filter(|other| overlaps(candidate, *other))
        .collect()
}
