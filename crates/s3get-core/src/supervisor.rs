//! Supervisor: launch loop, per-segment task shape, watchdog integration,
//! and finalization (spec.md §4.6).

use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, OwnedSemaphorePermit};

use crate::admission::{Admission, AdmissionController};
use crate::blob_store::{self, BlobStore, ObjectLocation};
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::fetcher;
use crate::ordering::{self, TokenReceiver, TokenSender};
use crate::segmenter::{self, Segment};
use crate::state::{SegmentStatus, TransferState};
use crate::storage::{Destination, OrderedWriter};

/// Runs one full transfer: probe, plan, launch loop, finalize (spec.md §2,
/// §4.6). `config` must already be validated (spec.md §6's config layer is
/// the system boundary for that check, not this function).
pub async fn run(
    blob_store: Arc<dyn BlobStore>,
    source_uri: &str,
    destination: Destination,
    config: &TransferConfig,
) -> Result<(), TransferError> {
    let location = Arc::new(blob_store::parse_uri(source_uri)?);
    let size = blob_store.object_size(&location).await?;
    let segments = segmenter::plan(size, config.max_segment_size)?;
    let segment_count = segments.len();

    tracing::info!(source = source_uri, size, segment_count, "planned transfer");

    let writer = Arc::new(OrderedWriter::create(&destination, config.file_buffer_size)?);
    let state = Arc::new(Mutex::new(TransferState::new()));
    let admission = AdmissionController::new(
        config.max_concurrent_requests,
        config.max_pending_appends,
        config.poll_interval(),
        config.timeout(),
    );

    let mut predecessor: Option<TokenReceiver> = None;
    let mut last_handle: Option<tokio::task::JoinHandle<()>> = None;

    for segment in segments {
        let request_permit = match admission.acquire_request(&state).await {
            Admission::Acquired(permit) => permit,
            Admission::TimedOut | Admission::Aborted => break,
        };
        let buffer_permit = match admission.acquire_buffer(&state).await {
            Admission::Acquired(permit) => permit,
            Admission::TimedOut | Admission::Aborted => {
                drop(request_permit);
                break;
            }
        };

        let (own_token, own_rx) = oneshot::channel();
        let pred_rx = predecessor.take();
        predecessor = Some(own_rx);

        let task_blob_store = Arc::clone(&blob_store);
        let task_location = Arc::clone(&location);
        let task_writer = Arc::clone(&writer);
        let task_state = Arc::clone(&state);

        last_handle = Some(tokio::spawn(run_segment_task(
            task_blob_store,
            task_location,
            segment,
            task_writer,
            task_state,
            pred_rx,
            own_token,
            request_permit,
            buffer_permit,
        )));
    }

    if let Some(handle) = last_handle {
        let _ = handle.await;
    }

    let (first_failure, all_ok) = {
        let guard = state.lock().await;
        (guard.first_failure(), guard.all_succeeded(segment_count))
    };

    let writer = Arc::try_unwrap(writer)
        .unwrap_or_else(|_| panic!("all segment tasks have completed; writer must be uniquely owned"));

    if all_ok {
        writer.finalize().await?;
        tracing::info!(segment_count, "transfer complete");
        Ok(())
    } else {
        writer.cleanup().await;
        match first_failure {
            Some(n) => Err(TransferError::SegmentFailed(n)),
            None => Err(TransferError::Timeout(config.timeout())),
        }
    }
}

/// One segment's lifecycle: fetch, wait for ordering, write, record status
/// (spec.md §4.6's task shape). Every early return drops `request_permit`
/// and/or `buffer_permit` explicitly; `own_token` is dropped implicitly at
/// function exit on every path, which is exactly the unconditional signal
/// the OrderingToken chain relies on (spec.md §3, §9).
#[allow(clippy::too_many_arguments)]
async fn run_segment_task(
    blob_store: Arc<dyn BlobStore>,
    location: Arc<ObjectLocation>,
    segment: Segment,
    writer: Arc<OrderedWriter>,
    state: Arc<Mutex<TransferState>>,
    predecessor: Option<TokenReceiver>,
    _own_token: TokenSender,
    request_permit: OwnedSemaphorePermit,
    buffer_permit: OwnedSemaphorePermit,
) {
    let index = segment.index;

    if state.lock().await.set_state(index, SegmentStatus::Fetching).is_err() {
        drop(request_permit);
        drop(buffer_permit);
        return;
    }

    let fetch_result = fetcher::fetch_segment(blob_store.as_ref(), &location, &segment).await;
    drop(request_permit); // released as soon as the GET completes (spec.md §4.4)

    let bytes = match fetch_result {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(segment = index, error = %err, "segment fetch failed");
            let _ = state.lock().await.set_state(index, SegmentStatus::Failed);
            drop(buffer_permit);
            return;
        }
    };

    if state
        .lock()
        .await
        .set_state(index, SegmentStatus::AwaitingPredecessor)
        .is_err()
    {
        drop(buffer_permit);
        return;
    }

    ordering::await_predecessor(predecessor).await;

    if state.lock().await.set_state(index, SegmentStatus::Concatenating).is_err() {
        drop(buffer_permit);
        return;
    }

    match writer.append(&bytes).await {
        Ok(()) => {
            let _ = state.lock().await.set_state(index, SegmentStatus::Succeeded);
        }
        Err(err) => {
            tracing::error!(segment = index, error = %err, "segment write failed");
            let _ = state.lock().await.set_state(index, SegmentStatus::Failed);
        }
    }
    drop(buffer_permit); // released once the Ordered Writer has consumed the body (spec.md §4.4)
}
