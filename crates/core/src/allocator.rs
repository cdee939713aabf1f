//! Conflict-free slot allocation
//!
//! A pure, deterministic walk over free intervals that hands the earliest
//! slots to the best-ranked candidates. No side effects; the orchestrator
//! persists whatever comes out.

use chrono::Duration;
use hireflow_domain::{AssignmentStatus, CandidateRank, FreeInterval, SlotAssignment};

/// Assign consecutive slots of `slot_length` to the top-ranked candidates.
///
/// Intervals are walked chronologically; each one is carved into
/// back-to-back slots that never cross its end. Rank 1 gets the earliest
/// slot. At most `max_candidates` assignments are produced, and candidates
/// beyond the available slots simply stay unassigned. Intervals with the
/// same start are tie-broken towards the longer one; overlapping input
/// never yields overlapping assignments.
pub fn allocate(
    shortlist: &[CandidateRank],
    free: &[FreeInterval],
    slot_length: Duration,
    max_candidates: usize,
) -> Vec<SlotAssignment> {
    if slot_length <= Duration::zero() || max_candidates == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<&CandidateRank> = shortlist.iter().collect();
    candidates.sort_by_key(|c| c.rank);
    candidates.truncate(max_candidates);

    let mut intervals: Vec<FreeInterval> = free.to_vec();
    intervals.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut assignments = Vec::with_capacity(candidates.len());
    let mut queue = candidates.into_iter();
    let mut next = queue.next();
    // Tracks the end of the last carved slot so overlapping intervals
    // cannot double-book.
    let mut last_end = None;

    for interval in intervals {
        let mut cursor = match last_end {
            Some(end) if end > interval.start => end,
            _ => interval.start,
        };

        while let Some(candidate) = next {
            let slot_end = cursor + slot_length;
            if slot_end > interval.end {
                break;
            }
            assignments.push(SlotAssignment {
                candidate: candidate.clone(),
                start: cursor,
                end: slot_end,
                status: AssignmentStatus::Proposed,
            });
            cursor = slot_end;
            last_end = Some(slot_end);
            next = queue.next();
        }

        if next.is_none() {
            break;
        }
    }

    assignments
}
