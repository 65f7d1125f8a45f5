//! Status / Failure Protocol: the shared status map and first-failure-wins
//! abort signal (spec.md §3, §4.7).

use std::collections::HashMap;
use std::time::Instant;

/// Lifecycle of one segment, as tracked by the shared status map.
/// Absence from the map means "not yet started" (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    Fetching,
    AwaitingPredecessor,
    Concatenating,
    Succeeded,
    Failed,
}

/// Returned by [`TransferState::set_state`] when the transfer has already
/// been aborted by an earlier failure; callers unwind without recording
/// the attempted transition (spec.md §4.7 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortReason {
    /// Index of the segment whose failure triggered the abort.
    pub failed_segment: usize,
}

/// Shared mutable state guarded by a single mutex (spec.md §9: "a single
/// mutex, not sharded"). One instance per transfer.
#[derive(Debug)]
pub struct TransferState {
    status: HashMap<usize, SegmentStatus>,
    first_failure: Option<usize>,
    last_activity: Instant,
}

impl Default for TransferState {
    fn default() -> Self {
        Self {
            status: HashMap::new(),
            first_failure: None,
            last_activity: Instant::now(),
        }
    }
}

impl TransferState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks forward progress; the Admission Controller's watchdog measures
    /// elapsed time since the most recent call to this, not since a fixed
    /// per-acquisition deadline (spec.md §4.6, §5).
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.last_activity.elapsed()
    }

    /// Status / Failure Protocol (spec.md §4.7):
    /// 1. If the transfer is already aborted (`first_failure` set) and this
    ///    isn't the segment that set it, refuse the transition.
    /// 2. Otherwise record `status`.
    /// 3. If `status` is `Failed`, record `first_failure` (first write wins).
    /// 4. Return the abort reason on refusal so the caller can unwind.
    pub fn set_state(&mut self, segment: usize, status: SegmentStatus) -> Result<(), AbortReason> {
        if let Some(failed) = self.first_failure {
            if failed != segment {
                return Err(AbortReason {
                    failed_segment: failed,
                });
            }
        }

        self.status.insert(segment, status);

        if status == SegmentStatus::Failed {
            self.first_failure.get_or_insert(segment);
        }

        Ok(())
    }

    pub fn status_of(&self, segment: usize) -> Option<SegmentStatus> {
        self.status.get(&segment).copied()
    }

    pub fn first_failure(&self) -> Option<usize> {
        self.first_failure
    }

    /// True once every one of `segment_count` segments has recorded
    /// `Succeeded` and no segment has failed (spec.md §4.6 finalization
    /// check). Vacuously true for `segment_count == 0`.
    pub fn all_succeeded(&self, segment_count: usize) -> bool {
        self.first_failure.is_none()
            && self.status.len() == segment_count
            && self
                .status
                .values()
                .all(|s| *s == SegmentStatus::Succeeded)
    }
}
