//! OrderingToken chain: enforces strictly ascending-index writes without a
//! dedicated sequencer task (spec.md §3, §4.5, §9).
//!
//! Each segment task owns a `TokenSender` for its own index and a
//! `TokenReceiver` for its predecessor's. Awaiting the receiver blocks until
//! the predecessor either sends or — just as validly — is simply dropped on
//! task exit; Rust's `oneshot` treats a dropped `Sender` as closing the
//! channel, which `await_predecessor` maps to "proceed" the same as an
//! explicit send. No `finally`-style bookkeeping is required.

use tokio::sync::oneshot;

pub type TokenSender = oneshot::Sender<()>;
pub type TokenReceiver = oneshot::Receiver<()>;

/// Waits for the predecessor segment to finish (send or drop its token).
/// `None` means this is segment 0, which has no predecessor to wait for.
pub async fn await_predecessor(predecessor: Option<TokenReceiver>) {
    if let Some(rx) = predecessor {
        let _ = rx.await;
    }
}
