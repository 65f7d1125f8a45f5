//! Error kinds surfaced as abort causes (spec.md §7).

use thiserror::Error;

/// Object Probe failures: malformed URI, missing object, or a timed-out size query.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("malformed object URI: {0}")]
    MalformedUri(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("size probe timed out")]
    Timeout,
    #[error("size probe failed: {0}")]
    Other(#[source] anyhow::Error),
}

/// Segment Planner failure: the object exceeds the representable planning range.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("object size {0} bytes exceeds the 2^50 byte planning limit")]
    TooLarge(u64),
}

/// The underlying cause of a failed ranged GET (spec.md §4.3).
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("short body: expected {expected} bytes, got {received}")]
    ShortBody { expected: u64, received: u64 },
}

/// Range Fetcher failure for one segment: `FetchError{n, cause}` (spec.md §4.3).
#[derive(Debug, Error)]
#[error("segment {index} fetch failed: {cause}")]
pub struct FetchError {
    pub index: usize,
    #[source]
    pub cause: FetchCause,
}

/// Ordered Writer failures: local write or rename failed; disk full; permission denied.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write to destination failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("finalize (rename staging file to destination) failed: {0}")]
    Finalize(#[source] std::io::Error),
}

/// Top-level transfer outcome the Supervisor reports (spec.md §4.6, §7).
/// Deliberately coarse — "no finer taxonomy is exposed to the shell" (§6).
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("segment {0} failed and aborted the transfer")]
    SegmentFailed(usize),
    #[error("no admission progress for {0:?}; aborting transfer")]
    Timeout(std::time::Duration),
    #[error(transparent)]
    Write(#[from] WriteError),
}
