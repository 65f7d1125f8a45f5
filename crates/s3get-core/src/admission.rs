//! Admission Controller: two independent counting semaphores gate how many
//! segments may be in flight and how many may be buffered awaiting their
//! turn to write (spec.md §3, §4.4).

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::state::TransferState;

/// Outcome of an admission attempt — the Rust rendering of spec.md's
/// `{acquired, timeout, aborted}`.
pub enum Admission {
    Acquired(OwnedSemaphorePermit),
    TimedOut,
    Aborted,
}

/// Owns `RequestSlots` and `BufferSlots` (spec.md §3's `AdmissionCapacity`).
pub struct AdmissionController {
    request_slots: Arc<Semaphore>,
    buffer_slots: Arc<Semaphore>,
    poll_interval: Duration,
    timeout: Duration,
}

impl AdmissionController {
    pub fn new(
        max_concurrent_requests: usize,
        max_pending_appends: usize,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            request_slots: Arc::new(Semaphore::new(max_concurrent_requests)),
            buffer_slots: Arc::new(Semaphore::new(max_pending_appends)),
            poll_interval,
            timeout,
        }
    }

    pub async fn acquire_request(&self, state: &Arc<Mutex<TransferState>>) -> Admission {
        self.acquire(&self.request_slots, state).await
    }

    pub async fn acquire_buffer(&self, state: &Arc<Mutex<TransferState>>) -> Admission {
        self.acquire(&self.buffer_slots, state).await
    }

    /// Polls `semaphore` at `poll_interval`, checking on every tick whether
    /// the transfer has already been aborted by another segment's failure,
    /// or whether `timeout` has elapsed since the last successful admission
    /// anywhere in the transfer (spec.md §4.6's watchdog — measured against
    /// shared last-activity, not a deadline fixed at the start of this call).
    async fn acquire(&self, semaphore: &Arc<Semaphore>, state: &Arc<Mutex<TransferState>>) -> Admission {
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                biased;
                permit = semaphore.clone().acquire_owned() => {
                    let permit = permit.expect("semaphore is never closed");
                    state.lock().await.record_activity();
                    return Admission::Acquired(permit);
                }
                _ = interval.tick() => {
                    let guard = state.lock().await;
                    if guard.first_failure().is_some() {
                        return Admission::Aborted;
                    }
                    if guard.idle_for() > self.timeout {
                        return Admission::TimedOut;
                    }
                }
            }
        }
    }
}
